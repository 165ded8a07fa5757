//! Hole growth controller
//!
//! Eaten volume accumulates in `pending_volume`. Each time it reaches the
//! current threshold the hole gains a growth level, the threshold amount is
//! banked into `total_volume`, and the next threshold grows geometrically:
//! `need = base_need * need_factor^level`. Radius follows
//! `growth_constant * cbrt(total_volume)`, capped at `max_radius`, so it can
//! never shrink.

use serde::{Deserialize, Serialize};

/// Growth schedule tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthTuning {
    pub base_need: f32,
    pub need_factor: f32,
    pub growth_constant: f32,
    pub max_radius: f32,
}

impl Default for GrowthTuning {
    fn default() -> Self {
        Self {
            base_need: 14.0,
            need_factor: 1.35,
            growth_constant: 0.48,
            max_radius: 15.0,
        }
    }
}

/// Radius/volume/level state of the hole
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthController {
    tuning: GrowthTuning,
    total_volume: f32,
    grow_level: u32,
    pending_volume: f32,
    need_volume: f32,
}

impl GrowthController {
    /// Start at `start_radius` with an empty progress bar
    pub fn new(tuning: GrowthTuning, start_radius: f32) -> Self {
        let k = tuning.growth_constant.max(f32::EPSILON);
        let total_volume = (start_radius.max(0.0) / k).powi(3);
        Self {
            tuning,
            total_volume,
            grow_level: 0,
            pending_volume: 0.0,
            need_volume: tuning.base_need,
        }
    }

    /// Feed eaten volume; returns the number of growth levels gained
    pub fn feed(&mut self, volume: f32) -> u32 {
        if !volume.is_finite() || volume <= 0.0 {
            return 0;
        }
        self.pending_volume += volume;

        let mut gained = 0;
        // A single large object can cross several thresholds at once
        while self.need_volume > 0.0 && self.pending_volume >= self.need_volume {
            self.pending_volume -= self.need_volume;
            self.total_volume += self.need_volume;
            self.grow_level += 1;
            gained += 1;
            self.need_volume = self.need_for_level(self.grow_level);
        }

        if gained > 0 {
            log::info!(
                "Hole grew to level {} (radius {:.2}, next need {:.1})",
                self.grow_level,
                self.radius(),
                self.need_volume
            );
        }
        gained
    }

    fn need_for_level(&self, level: u32) -> f32 {
        self.tuning.base_need * self.tuning.need_factor.powi(level as i32)
    }

    pub fn radius(&self) -> f32 {
        (self.tuning.growth_constant * self.total_volume.cbrt()).min(self.tuning.max_radius)
    }

    /// Progress toward the next level in `[0, 1]`
    pub fn progress(&self) -> f32 {
        if self.need_volume > 0.0 {
            (self.pending_volume / self.need_volume).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn grow_level(&self) -> u32 {
        self.grow_level
    }

    pub fn total_volume(&self) -> f32 {
        self.total_volume
    }

    pub fn pending_volume(&self) -> f32 {
        self.pending_volume
    }

    pub fn need_volume(&self) -> f32 {
        self.need_volume
    }

    pub fn tuning(&self) -> &GrowthTuning {
        &self.tuning
    }
}
