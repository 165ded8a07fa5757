//! Level descriptors
//!
//! Static per-level data consumed by the world generator: theme, grid layout,
//! safe radius, zone/tier tables and prop sprinkling rules.

use serde::{Deserialize, Serialize};

use super::entity::{EntityKind, Footprint};

/// Complete description of one level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelDescriptor {
    /// Stable identifier (e.g. "starter-city")
    pub id: String,
    /// 1-based level number
    pub number: u32,
    pub name: String,
    pub description: String,
    /// Seed for the prop yaw jitter stream
    pub seed: u64,
    pub theme: Theme,
    /// Hole radius at the start of the level
    pub hole_start_radius: f32,
    pub grid: GridSpec,
    pub zones: ZoneRules,
    /// Size tiers referenced by index from `zones` and `props`
    pub tiers: Vec<TierDef>,
    /// Secondary decoration rules, applied per cell
    #[serde(default)]
    pub props: Vec<PropRule>,
    /// Reject placements whose padded footprint overlaps an earlier one
    #[serde(default)]
    pub overlap_check: bool,
    pub mass: MassRule,
}

impl LevelDescriptor {
    /// Parse a level from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn tier(&self, index: usize) -> Option<&TierDef> {
        self.tiers.get(index)
    }
}

/// Logical grid the generator walks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSpec {
    /// Cells per axis
    pub size: u32,
    /// Cell edge length in world units
    pub cell_size: f32,
    /// No entity is placed closer than this to the origin
    pub safe_radius: f32,
    /// Maximum offset from the cell centre, per axis
    pub jitter: f32,
    /// Building draws per cell
    pub slots_per_cell: u32,
    /// Chance that a slot receives a building at all
    pub fill_chance: f32,
    /// Every Nth row and column is kept clear as a road
    #[serde(default)]
    pub road_every: Option<u32>,
    /// Ground tile edge length
    pub tile_size: f32,
    /// Ground tiles per axis
    pub tile_count: u32,
    /// Half extent of the toroidal arena
    pub wrap_half_extent: f32,
}

impl GridSpec {
    /// Whether the cell lies on a reserved road row or column
    pub fn is_road(&self, gx: u32, gz: u32) -> bool {
        match self.road_every {
            Some(n) if n > 0 => gx % n == n - 1 || gz % n == n - 1,
            _ => false,
        }
    }

    /// World coordinate of the first cell centre
    pub fn origin(&self) -> f32 {
        -((self.size.saturating_sub(1)) as f32 * self.cell_size) / 2.0
    }
}

/// Distance band around the origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Zone {
    Center,
    Mid,
    Outer,
}

/// A weighted reference to a tier
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TierWeight {
    pub tier: usize,
    pub weight: f32,
}

/// Zone bands and their tier tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneRules {
    pub center_radius: f32,
    pub mid_radius: f32,
    pub center: Vec<TierWeight>,
    pub mid: Vec<TierWeight>,
    pub outer: Vec<TierWeight>,
}

impl ZoneRules {
    pub fn zone_for(&self, distance: f32) -> Zone {
        if distance < self.center_radius {
            Zone::Center
        } else if distance < self.mid_radius {
            Zone::Mid
        } else {
            Zone::Outer
        }
    }

    pub fn table(&self, zone: Zone) -> &[TierWeight] {
        match zone {
            Zone::Center => &self.center,
            Zone::Mid => &self.mid,
            Zone::Outer => &self.outer,
        }
    }

    /// Map a draw in `[0, 1)` to a tier index using the zone's weights
    pub fn draw(&self, zone: Zone, h: f32) -> Option<usize> {
        let table = self.table(zone);
        let total: f32 = table.iter().map(|t| t.weight.max(0.0)).sum();
        if total <= 0.0 {
            return None;
        }
        let mut target = h.clamp(0.0, 1.0) * total;
        for entry in table {
            let w = entry.weight.max(0.0);
            if target < w {
                return Some(entry.tier);
            }
            target -= w;
        }
        table.iter().rev().find(|t| t.weight > 0.0).map(|t| t.tier)
    }
}

/// A size tier with its model pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierDef {
    pub name: String,
    pub kind: EntityKind,
    pub footprint: Footprint,
    pub models: Vec<String>,
    pub points: u32,
    /// Clearance added around the footprint for overlap checks
    pub pad: f32,
}

/// Per-cell sprinkling of decorative props
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropRule {
    pub tier: usize,
    /// Independent salt for this rule's draws
    pub salt: u32,
    pub max_per_cell: u32,
    /// Chance each sprinkled prop is kept
    pub chance: f32,
    /// Scatter half-width as a fraction of the cell size
    pub spread: f32,
}

/// `mass = clamp(volume * coefficient, min, max)`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MassRule {
    pub coefficient: f32,
    pub min: f32,
    pub max: f32,
}

impl Default for MassRule {
    fn default() -> Self {
        Self {
            coefficient: 0.12,
            min: 0.25,
            max: 90.0,
        }
    }
}

/// Visual theme (consumed by the renderer only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub background: String,
    pub fog: Fog,
    pub ground: GroundStyle,
    pub ambient_light: f32,
    pub directional_light: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fog {
    pub color: String,
    pub near: f32,
    pub far: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GroundStyle {
    Road(RoadPalette),
    Grass(GrassPalette),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadPalette {
    pub block: String,
    pub road: String,
    pub sidewalk: String,
    pub center_line: String,
    pub edge_line: String,
    pub intersection: String,
    pub zebra: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrassPalette {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub dirt: String,
}
