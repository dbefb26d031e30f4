mod business;
mod casino;
mod market;
