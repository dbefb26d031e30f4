/// Maximum item or case name length accepted by the codec.
pub const MAX_NAME_LENGTH: usize = 64;

/// Maximum icon (emoji or asset key) length accepted by the codec.
pub const MAX_ICON_LENGTH: usize = 32;

/// Upper bound on inventory size when decoding persisted players.
pub const MAX_INVENTORY_ITEMS: usize = 10_000;

/// Starting balance for new players.
pub const INITIAL_BALANCE: u64 = 1_000;

/// Serial numbers are drawn uniformly from 1..=MAX_SERIAL.
pub const MAX_SERIAL: u16 = 10_000;

/// Crash game return-to-player used by the observed deployment.
pub const DEFAULT_CRASH_RTP: f64 = 0.95;

/// Crash multiplier growth rate per second: multiplier(t) = e^(k*t).
pub const DEFAULT_CRASH_GROWTH_RATE: f64 = 0.06;

/// Slot return-to-player used by the observed deployment.
pub const DEFAULT_SLOT_RTP: f64 = 0.97;

/// Bet multiples used to build the four slot variants.
pub const DEFAULT_SLOT_BET_MULTIPLES: [f64; 4] = [0.5, 1.5, 5.0, 20.0];

/// Number of symbols (variants) offered on each slot spin.
pub const SLOT_VARIANTS: usize = 4;

/// Number of reels in a slot spin.
pub const SLOT_REELS: usize = 3;

/// Lower and upper tolerance for price-proximity draws.
pub const PRICE_TOLERANCE_LOW: f64 = 0.7;
pub const PRICE_TOLERANCE_HIGH: f64 = 1.3;

/// Business drop interval (60 seconds).
pub const BUSINESS_TICK_MS: u64 = 60_000;

/// Maximum cases opened in one purchase.
pub const MAX_CASE_QUANTITY: u32 = 10;

/// Case opening strip geometry: winner index and total length.
pub const STRIP_WINNER_INDEX: usize = 40;
pub const STRIP_LENGTH: usize = 60;

/// Persistence debounce window.
pub const SAVE_DEBOUNCE_MS: u64 = 500;

/// Slot reel strip geometry: resolved symbol index and total length.
pub const REEL_TARGET_INDEX: usize = 25;
pub const REEL_STRIP_LENGTH: usize = 30;
