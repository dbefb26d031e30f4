//! Inventory game domain types.
//!
//! Defines the catalog, case, inventory, round, business and player state used by the
//! execution engines and clients.

mod business;
mod case;
mod codec;
mod constants;
mod item;
mod player;
mod round;

pub use business::*;
pub use case::*;
pub use codec::{
    bounded_str, read_string, read_uuid, string_encode_size, write_string, write_uuid,
    UUID_ENCODE_SIZE,
};
pub use constants::*;
pub use item::*;
pub use player::*;
pub use round::*;
