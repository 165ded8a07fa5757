//! Score board
//!
//! Receives score deltas from the tick's event callback, keeps the running
//! total for the current run and the best final score per level id.
//! Best scores persist to LocalStorage on the web build.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreBoard {
    /// Running total for the current level session
    #[serde(skip)]
    total: u64,
    /// Best score reached on each level id
    best: BTreeMap<String, u64>,
}

impl ScoreBoard {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "hole_city_scores";

    pub fn new() -> Self {
        Self::default()
    }

    /// Add a score delta for `level_id`; returns the new total
    pub fn record(&mut self, level_id: &str, delta: u64) -> u64 {
        self.total = self.total.saturating_add(delta);
        let best = self.best.entry(level_id.to_string()).or_insert(0);
        if self.total > *best {
            *best = self.total;
        }
        self.total
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Start a fresh run; best scores are kept
    pub fn reset_total(&mut self) {
        self.total = 0;
    }

    pub fn best_for(&self, level_id: &str) -> Option<u64> {
        self.best.get(level_id).copied()
    }

    /// Load best scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<ScoreBoard>(&json) {
                    Ok(board) => {
                        log::info!("Loaded best scores for {} levels", board.best.len());
                        return board;
                    }
                    Err(e) => log::warn!("Stored scores are invalid ({e}), starting fresh"),
                }
            }
        }

        log::info!("No scores found, starting fresh");
        Self::new()
    }

    /// Save best scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Scores saved ({} levels)", self.best.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
