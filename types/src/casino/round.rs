//! Transient per-round state for the item-wager games.
//!
//! None of these are persisted: a round lives only between its start and its resolution.

use serde::Serialize;

use super::{CatalogItem, InventoryItem, SLOT_REELS, SLOT_VARIANTS};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CrashStatus {
    Idle,
    Flying,
    Crashed,
    CashedOut,
}

/// State of one crash ("rocket") round.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CrashRoundState {
    pub status: CrashStatus,
    pub stake: InventoryItem,
    /// Multiplier at which the round crashes, always >= 1.0.
    pub crash_point: f64,
    /// Wall-clock start of the flight in milliseconds.
    pub started_at: u64,
    /// Last multiplier derived from elapsed time (frozen once the round resolves).
    pub current_multiplier: f64,
    /// Item minted on a successful cash-out.
    pub winnings: Option<InventoryItem>,
}

impl CrashRoundState {
    pub fn is_flying(&self) -> bool {
        self.status == CrashStatus::Flying
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum UpgradeStatus {
    Idle,
    Spinning,
    Win,
    Lose,
}

/// State of one upgrade wheel spin.
///
/// `won` is drawn first and is the only source of truth for resolution; the angle and rotation
/// are derived from it for presentation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UpgradeRoundState {
    pub status: UpgradeStatus,
    pub stake_item: InventoryItem,
    pub target_item: CatalogItem,
    pub win_probability: f64,
    pub won: bool,
    /// Landing angle in [0, 360).
    pub landing_angle_degrees: f64,
    /// Full spins plus landing angle, for the renderer.
    pub total_rotation_degrees: f64,
    /// Target item minted on a win.
    pub minted: Option<InventoryItem>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SlotStatus {
    Idle,
    PreSpin,
    Spinning,
    Finished,
}

/// One of the four symbols offered on a slot spin.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SlotVariant {
    pub item: CatalogItem,
    pub payout: u64,
}

/// State of one slot spin.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SlotRoundState {
    pub status: SlotStatus,
    pub bet: u64,
    pub variants: [SlotVariant; SLOT_VARIANTS],
    /// Combined win probability (4p), clamped to 1.
    pub win_probability: f64,
    /// Variant index landed on each reel.
    pub reels: [usize; SLOT_REELS],
    pub winning_item: Option<CatalogItem>,
    pub minted: Option<InventoryItem>,
}

impl SlotRoundState {
    pub fn is_win(&self) -> bool {
        self.winning_item.is_some()
    }
}
