//! Deterministic hash field
//!
//! Pure functions from grid coordinates to reproducible pseudo-random values.
//! No internal state and no ambient randomness: the same inputs always give
//! the same output, which is what keeps world generation replayable.

/// Largest `f32` strictly below 1.0
const BELOW_ONE: f32 = 1.0 - f32::EPSILON / 2.0;

/// Salt multipliers (decorrelate draws that share a grid cell)
const SALT_X: f64 = 17.31;
const SALT_Z: f64 = 9.77;

/// Hash two coordinates into `[0, 1)` using a trigonometric scramble
#[inline]
pub fn hash2(gx: f32, gz: f32) -> f32 {
    let n = ((gx as f64) * 127.1 + (gz as f64) * 311.7).sin() * 43_758.545_312_3;
    let fract = n - n.floor();
    (fract as f32).clamp(0.0, BELOW_ONE)
}

/// Hash integer grid coordinates with a salt
///
/// Different salts give independent-looking draws for the same cell.
#[inline]
pub fn hash_salted(gx: i32, gz: i32, salt: u32) -> f32 {
    let s = salt as f64;
    hash2((gx as f64 + s * SALT_X) as f32, (gz as f64 - s * SALT_Z) as f32)
}

/// Deterministically pick an element from `items`
///
/// Returns `None` only for an empty slice.
pub fn pick<T>(items: &[T], gx: i32, gz: i32, salt: u32) -> Option<&T> {
    if items.is_empty() {
        return None;
    }
    let idx = (hash_salted(gx, gz, salt) * items.len() as f32).floor() as usize % items.len();
    items.get(idx)
}
