use bytes::Bytes;
use commonware_codec::{DecodeExt, Encode};
use stardrop_types::casino::Player;
use std::{collections::HashMap, future::Future};
use thiserror::Error as ThisError;
use tracing::{debug, warn};

/// Recoverable persistence failure.
#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("codec error: {0}")]
    Codec(#[from] commonware_codec::Error),
    #[error("invalid player id: {0}")]
    InvalidKey(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Asynchronous key-value store of players keyed by player id.
pub trait Store {
    fn load(&self, player_id: &str) -> impl Future<Output = Result<Option<Player>, StoreError>>;
    fn save(
        &mut self,
        player_id: &str,
        player: &Player,
    ) -> impl Future<Output = Result<(), StoreError>>;
}

/// Encode a player for storage.
pub fn encode_player(player: &Player) -> Bytes {
    player.encode().freeze()
}

/// Decode a stored player.
pub fn decode_player(bytes: &[u8]) -> Result<Player, StoreError> {
    Ok(Player::decode(bytes)?)
}

#[derive(Default)]
pub struct Memory {
    state: HashMap<String, Bytes>,
}

impl Memory {
    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }
}

impl Store for Memory {
    async fn load(&self, player_id: &str) -> Result<Option<Player>, StoreError> {
        self.state
            .get(player_id)
            .map(|bytes| decode_player(bytes))
            .transpose()
    }

    async fn save(&mut self, player_id: &str, player: &Player) -> Result<(), StoreError> {
        self.state
            .insert(player_id.to_string(), encode_player(player));
        Ok(())
    }
}

/// Load a player, or create a fresh account if none is stored.
///
/// A record that exists but cannot be read is an error, never a fresh account: starting over
/// would let the next save overwrite it.
pub async fn load_or_new<S: Store>(
    store: &S,
    player_id: &str,
    initial_balance: u64,
) -> Result<Player, StoreError> {
    match store.load(player_id).await {
        Ok(Some(player)) => Ok(player),
        Ok(None) => Ok(Player::new(initial_balance)),
        Err(e) => {
            warn!(player_id, "failed to load player: {:?}", e);
            Err(e)
        }
    }
}

/// Debounced writer for one player.
///
/// The first mutation after a save opens a window of `debounce_ms`; the player is written once
/// when the window closes, however many mutations landed inside it. Failed writes stay dirty
/// and are retried after another window.
pub struct Persister<S: Store> {
    store: S,
    player_id: String,
    debounce_ms: u64,
    due_at: Option<u64>,
    failures: u64,
}

impl<S: Store> Persister<S> {
    pub fn new(store: S, player_id: impl Into<String>, debounce_ms: u64) -> Self {
        Self {
            store,
            player_id: player_id.into(),
            debounce_ms,
            due_at: None,
            failures: 0,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn is_dirty(&self) -> bool {
        self.due_at.is_some()
    }

    /// Consecutive failed writes.
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Record a mutation at `now`.
    pub fn mark_dirty(&mut self, now: u64) {
        if self.due_at.is_none() {
            self.due_at = Some(now.saturating_add(self.debounce_ms));
        }
    }

    /// Write `player` if dirty and the debounce window has closed. Returns whether a write
    /// succeeded.
    pub async fn flush(&mut self, player: &Player, now: u64) -> bool {
        match self.due_at {
            Some(due_at) if due_at <= now => self.write(player, now).await,
            _ => false,
        }
    }

    /// Write `player` immediately if dirty (used on teardown).
    pub async fn flush_now(&mut self, player: &Player, now: u64) -> Result<(), StoreError> {
        if self.due_at.is_none() {
            return Ok(());
        }
        let result = self.store.save(&self.player_id, player).await;
        self.record(&result, now);
        result
    }

    async fn write(&mut self, player: &Player, now: u64) -> bool {
        let result = self.store.save(&self.player_id, player).await;
        self.record(&result, now);
        result.is_ok()
    }

    fn record(&mut self, result: &Result<(), StoreError>, now: u64) {
        match result {
            Ok(()) => {
                debug!(player_id = %self.player_id, "saved player");
                self.due_at = None;
                self.failures = 0;
            }
            Err(e) => {
                self.failures += 1;
                warn!(
                    player_id = %self.player_id,
                    failures = self.failures,
                    "failed to save player: {:?}", e
                );
                self.due_at = Some(now.saturating_add(self.debounce_ms));
            }
        }
    }
}
