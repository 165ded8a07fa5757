//! Game state for one level session
//!
//! Generation runs to completion in [`GameState::new`] before any movement or
//! sensor processing; the tick only ever sees a fully populated world.

use std::collections::BTreeMap;

use super::consume::{ConsumptionStats, ConsumptionTracker};
use super::entity::{Entity, EntityId};
use super::generate::{GenerationStats, GroundTile, generate_ground_tiles, generate_world};
use super::growth::GrowthController;
use super::level::LevelDescriptor;
use super::movement::{CameraRig, MovementController};
use super::physics::{BodyUserData, HoleGeometry, PhysicsBodies, WellWorld};
use crate::config::GameConfig;

/// Everything a running level owns
#[derive(Debug, Clone)]
pub struct GameState {
    pub level: LevelDescriptor,
    pub config: GameConfig,
    /// Generated entities by id (positions are spawn positions)
    pub entities: BTreeMap<EntityId, Entity>,
    pub tiles: Vec<GroundTile>,
    pub generation: GenerationStats,
    pub tracker: ConsumptionTracker,
    pub growth: GrowthController,
    pub movement: MovementController,
    pub camera: CameraRig,
    pub world: WellWorld,
    pub score: u64,
    pub paused: bool,
    /// Fixed ticks advanced so far
    pub time_ticks: u64,
}

impl GameState {
    pub fn new(level: LevelDescriptor, config: GameConfig) -> Self {
        let generated = generate_world(&level);
        let tiles = generate_ground_tiles(&level);

        let mut world = WellWorld::new();
        let mut movement = MovementController::new(
            config.movement,
            level.grid.wrap_half_extent,
            level.grid.tile_size,
        );
        let mut entities = BTreeMap::new();
        for entity in generated.entities {
            let body = world.spawn(
                entity.position,
                entity.footprint,
                BodyUserData {
                    id: Some(entity.id.clone()),
                    volume: Some(entity.volume),
                    points: entity.points,
                },
            );
            movement.register(entity.id.clone(), body);
            entities.insert(entity.id.clone(), entity);
        }

        let growth = GrowthController::new(config.growth, level.hole_start_radius);
        log::info!(
            "Level {} '{}' ready: {} entities, hole radius {:.2}",
            level.number,
            level.name,
            entities.len(),
            growth.radius()
        );

        Self {
            tracker: ConsumptionTracker::new(config.consumption),
            camera: CameraRig::new(config.camera),
            growth,
            movement,
            world,
            entities,
            tiles,
            generation: generated.stats,
            score: 0,
            paused: false,
            time_ticks: 0,
            level,
            config,
        }
    }

    pub fn hole_radius(&self) -> f32 {
        self.growth.radius()
    }

    pub fn hole_geometry(&self) -> HoleGeometry {
        HoleGeometry::new(
            self.hole_radius(),
            self.config.consumption.fit_factor,
            self.config.physics,
        )
    }

    pub fn consumption_stats(&self) -> ConsumptionStats {
        self.tracker.stats()
    }

    /// Entities not yet eaten, in id order
    pub fn live_entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities
            .values()
            .filter(|e| !self.tracker.is_eaten(&e.id))
    }

    pub fn remaining(&self) -> usize {
        self.entities.len() - self.tracker.eaten_count()
    }

    /// Current physics position of an entity
    pub fn position_of(&self, id: &EntityId) -> Option<glam::Vec3> {
        self.movement
            .body(id)
            .and_then(|body| self.world.translation(body))
    }

    /// Every entity has been eaten
    pub fn is_cleared(&self) -> bool {
        !self.entities.is_empty() && self.remaining() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::levels::{green_meadow, starter_city};

    #[test]
    fn test_new_spawns_a_body_per_entity() {
        let state = GameState::new(starter_city(), GameConfig::default());
        assert!(!state.entities.is_empty());
        assert_eq!(state.world.len(), state.entities.len());
        for (id, entity) in &state.entities {
            assert_eq!(state.position_of(id), Some(entity.position));
        }
        assert_eq!(state.remaining(), state.entities.len());
        assert!(!state.is_cleared());
    }

    #[test]
    fn test_start_radius_comes_from_level() {
        let level = green_meadow();
        let start = level.hole_start_radius;
        let state = GameState::new(level, GameConfig::default());
        assert!((state.hole_radius() - start).abs() < 1e-4);
        assert_eq!(state.score, 0);
        assert_eq!(state.time_ticks, 0);
    }
}
