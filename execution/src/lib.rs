pub mod casino;
pub mod config;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

mod layer;

mod state;

pub use casino::{
    business::BusinessEvent, catalog::Catalog, crash::CashOut, mint_item, Clock, GameError,
    GameRng, RandSource, Randomness, SystemClock,
};
pub use config::{ConfigError, GameConfig};
pub use layer::{Action, Layer, Outcome};
pub use state::{decode_player, encode_player, load_or_new, Memory, Persister, Store, StoreError};
