//! Shared data model for the stardrop inventory game.
//!
//! Configuration types (catalog items, cases, drop tables) deserialize from JSON with `serde`.
//! Persisted player state encodes with `commonware-codec`.

pub mod casino;

pub use casino::*;
