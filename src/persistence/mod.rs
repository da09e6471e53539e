//! Board save/load
//!
//! A versioned JSON envelope around the board snapshot. Decoding rebuilds
//! the board so a tampered or corrupt save is rejected before play.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::puzzle::{BoardSnapshot, PuzzleField};

/// Current save format
pub const SAVE_VERSION: u32 = 1;

/// Saved game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveEnvelope {
    pub version: u32,
    pub board: BoardSnapshot,
    /// Moves made so far
    #[serde(default)]
    pub moves: u32,
}

impl SaveEnvelope {
    pub fn new(field: &PuzzleField, moves: u32) -> Self {
        Self {
            version: SAVE_VERSION,
            board: field.snapshot(),
            moves,
        }
    }

    pub fn encode(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(json: &str) -> Result<Self, ConfigError> {
        let envelope: Self = serde_json::from_str(json)?;
        if envelope.version != SAVE_VERSION {
            return Err(ConfigError::SaveVersion(envelope.version));
        }
        Ok(envelope)
    }

    /// Rebuild the saved board
    pub fn restore(&self) -> Result<PuzzleField, ConfigError> {
        PuzzleField::from_snapshot(&self.board)
    }
}

/// LocalStorage key
#[cfg(target_arch = "wasm32")]
const STORAGE_KEY: &str = "fifteen_save";

/// Load the saved game from LocalStorage (WASM only)
#[cfg(target_arch = "wasm32")]
pub fn load() -> Option<(PuzzleField, u32)> {
    let json = crate::platform::web::storage_get(STORAGE_KEY)?;
    let restored = SaveEnvelope::decode(&json).and_then(|env| Ok((env.restore()?, env.moves)));
    match restored {
        Ok(saved) => Some(saved),
        Err(err) => {
            log::warn!("Discarding saved game: {}", err);
            clear();
            None
        }
    }
}

/// Save the game to LocalStorage (WASM only)
#[cfg(target_arch = "wasm32")]
pub fn save(field: &PuzzleField, moves: u32) {
    match SaveEnvelope::new(field, moves).encode() {
        Ok(json) => {
            if crate::platform::web::storage_set(STORAGE_KEY, &json) {
                log::debug!("Game saved ({} moves)", moves);
            }
        }
        Err(err) => log::warn!("Could not encode save: {}", err),
    }
}

/// Clear the saved game (WASM only)
#[cfg(target_arch = "wasm32")]
pub fn clear() {
    crate::platform::web::storage_remove(STORAGE_KEY);
    log::info!("Saved game cleared");
}

/// Native stubs
#[cfg(not(target_arch = "wasm32"))]
pub fn load() -> Option<(PuzzleField, u32)> {
    None
}

#[cfg(not(target_arch = "wasm32"))]
pub fn save(_field: &PuzzleField, _moves: u32) {
    // No-op for native
}

#[cfg(not(target_arch = "wasm32"))]
pub fn clear() {
    // No-op for native
}
