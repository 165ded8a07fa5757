//! Deterministic world generation
//!
//! Walks the level grid once and emits the immutable entity list. Rejected
//! placements (safe zone, overlap) are skipped and never retried, so density
//! is a function of the acceptance rate rather than a target count.

use std::f32::consts::FRAC_PI_2;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::entity::{Entity, EntityId, EntityKind, mass_for_volume};
use super::hash::{hash_salted, pick};
use super::level::{LevelDescriptor, TierDef};

/// Salts for the independent per-slot draws
const SALT_FILL: u32 = 11;
const SALT_JITTER_X: u32 = 23;
const SALT_JITTER_Z: u32 = 29;
const SALT_TIER: u32 = 37;
const SALT_MODEL: u32 = 42;
const SALT_YAW: u32 = 53;

/// Spacing between slot coordinates in hash space
const SLOT_STRIDE: i32 = 16;

/// Gap between the ground and a spawned box
const SPAWN_LIFT: f32 = 0.05;

/// Maximum prop yaw jitter either side of its base facing (radians)
const PROP_YAW_JITTER: f32 = 0.5;

/// Padded axis-aligned rectangle on the ground plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Aabb2 {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl Aabb2 {
    pub fn around(x: f32, z: f32, w: f32, d: f32, pad: f32) -> Self {
        Self {
            min_x: x - w / 2.0 - pad,
            max_x: x + w / 2.0 + pad,
            min_z: z - d / 2.0 - pad,
            max_z: z + d / 2.0 + pad,
        }
    }

    /// Touching edges count as overlap
    pub fn intersects(&self, other: &Aabb2) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_z <= other.max_z
            && self.max_z >= other.min_z
    }
}

/// Debug counters for a generation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GenerationStats {
    pub road_cells: u32,
    pub empty_slots: u32,
    pub safe_zone_rejected: u32,
    pub overlap_rejected: u32,
    pub buildings: u32,
    pub props: u32,
}

/// Output of [`generate_world`]
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedWorld {
    pub entities: Vec<Entity>,
    /// Padded footprint of each entity (parallel to `entities`)
    pub bounds: Vec<Aabb2>,
    pub stats: GenerationStats,
}

/// A visual ground tile (roads or grass)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroundTile {
    pub id: String,
    pub x: f32,
    pub z: f32,
    pub grid_x: u32,
    pub grid_z: u32,
}

/// Accumulates accepted placements
struct Placer<'a> {
    level: &'a LevelDescriptor,
    entities: Vec<Entity>,
    bounds: Vec<Aabb2>,
    stats: GenerationStats,
    rng: Pcg32,
}

impl<'a> Placer<'a> {
    fn new(level: &'a LevelDescriptor) -> Self {
        Self {
            level,
            entities: Vec::new(),
            bounds: Vec::new(),
            stats: GenerationStats::default(),
            rng: Pcg32::seed_from_u64(level.seed),
        }
    }

    /// Try to place one entity of `tier` at (x, z). Returns whether it was kept.
    fn try_place(&mut self, tier: &TierDef, x: f32, z: f32, hx: i32, hz: i32) -> bool {
        if x.hypot(z) < self.level.grid.safe_radius {
            self.stats.safe_zone_rejected += 1;
            return false;
        }

        let fp = tier.footprint;
        let aabb = Aabb2::around(x, z, fp.w, fp.d, tier.pad);
        if self.level.overlap_check && self.bounds.iter().any(|b| b.intersects(&aabb)) {
            self.stats.overlap_rejected += 1;
            return false;
        }

        let Some(model) = pick(&tier.models, hx, hz, SALT_MODEL) else {
            return false;
        };

        let index = match tier.kind {
            EntityKind::Building => &mut self.stats.buildings,
            EntityKind::Prop => &mut self.stats.props,
        };
        let id = EntityId::new(tier.kind.id_prefix(), *index);
        *index += 1;

        let yaw = match tier.kind {
            // Quarter turns keep buildings aligned to the street grid
            EntityKind::Building => (hash_salted(hx, hz, SALT_YAW) * 4.0).floor() * FRAC_PI_2,
            EntityKind::Prop => {
                let facing = (hash_salted(hx, hz, SALT_YAW) * 4.0).floor() * FRAC_PI_2;
                facing + self.rng.random_range(-PROP_YAW_JITTER..PROP_YAW_JITTER)
            }
        };

        let volume = fp.volume();
        let mass = self.level.mass;
        self.entities.push(Entity {
            id,
            kind: tier.kind,
            position: Vec3::new(x, fp.h / 2.0 + SPAWN_LIFT, z),
            footprint: fp,
            volume,
            mass: mass_for_volume(volume, mass.coefficient, mass.min, mass.max),
            yaw,
            model: model.clone(),
            points: tier.points,
        });
        self.bounds.push(aabb);
        true
    }
}

/// Generate every entity of a level
///
/// Pure function of the descriptor: the same level always yields the same
/// list, in the same order, with the same ids.
pub fn generate_world(level: &LevelDescriptor) -> GeneratedWorld {
    let grid = &level.grid;
    let start = grid.origin();
    let mut placer = Placer::new(level);

    for gx in 0..grid.size {
        for gz in 0..grid.size {
            if grid.is_road(gx, gz) {
                placer.stats.road_cells += 1;
                continue;
            }

            let cx = start + gx as f32 * grid.cell_size;
            let cz = start + gz as f32 * grid.cell_size;

            for slot in 0..grid.slots_per_cell {
                let hx = gx as i32 * SLOT_STRIDE + slot as i32;
                let hz = gz as i32 * SLOT_STRIDE + slot as i32;

                if hash_salted(hx, hz, SALT_FILL) >= grid.fill_chance {
                    placer.stats.empty_slots += 1;
                    continue;
                }

                let x = cx + (hash_salted(hx, hz, SALT_JITTER_X) - 0.5) * 2.0 * grid.jitter;
                let z = cz + (hash_salted(hx, hz, SALT_JITTER_Z) - 0.5) * 2.0 * grid.jitter;

                let zone = level.zones.zone_for(x.hypot(z));
                let tier = level
                    .zones
                    .draw(zone, hash_salted(hx, hz, SALT_TIER))
                    .and_then(|i| level.tier(i));
                match tier {
                    Some(tier) => {
                        placer.try_place(tier, x, z, hx, hz);
                    }
                    None => placer.stats.empty_slots += 1,
                }
            }

            sprinkle_props(&mut placer, gx, gz, cx, cz);
        }
    }

    let Placer {
        entities,
        bounds,
        stats,
        ..
    } = placer;
    log::info!(
        "Generated level {}: {} buildings, {} props ({} safe-zone and {} overlap rejections)",
        level.id,
        stats.buildings,
        stats.props,
        stats.safe_zone_rejected,
        stats.overlap_rejected
    );

    GeneratedWorld {
        entities,
        bounds,
        stats,
    }
}

/// Scatter decorative props around a cell centre, one rule at a time
fn sprinkle_props(placer: &mut Placer<'_>, gx: u32, gz: u32, cx: f32, cz: f32) {
    let level = placer.level;
    for rule in &level.props {
        let Some(tier) = level.tier(rule.tier) else {
            continue;
        };
        let cell_x = gx as i32;
        let cell_z = gz as i32;
        let count = (hash_salted(cell_x, cell_z, rule.salt) * (rule.max_per_cell + 1) as f32)
            .floor() as u32;
        let spread = rule.spread * level.grid.cell_size;

        for i in 0..count.min(rule.max_per_cell) {
            let hx = cell_x * SLOT_STRIDE + i as i32;
            let hz = cell_z * SLOT_STRIDE - i as i32;
            if hash_salted(hx, hz, rule.salt + 1) >= rule.chance {
                placer.stats.empty_slots += 1;
                continue;
            }
            let x = cx + (hash_salted(hx, hz, rule.salt + 2) - 0.5) * 2.0 * spread;
            let z = cz + (hash_salted(hx, hz, rule.salt + 3) - 0.5) * 2.0 * spread;
            placer.try_place(tier, x, z, hx, hz);
        }
    }
}

/// Ground tiles centred on the origin (`tile_count` per axis)
pub fn generate_ground_tiles(level: &LevelDescriptor) -> Vec<GroundTile> {
    let g = &level.grid;
    let offset = (g.tile_count.saturating_sub(1)) as f32 * g.tile_size / 2.0;
    let mut tiles = Vec::with_capacity((g.tile_count * g.tile_count) as usize);
    for x in 0..g.tile_count {
        for z in 0..g.tile_count {
            tiles.push(GroundTile {
                id: format!("tile-{x}-{z}"),
                x: x as f32 * g.tile_size - offset,
                z: z as f32 * g.tile_size - offset,
                grid_x: x,
                grid_z: z,
            });
        }
    }
    tiles
}
