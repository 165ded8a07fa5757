//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded hashing and RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod consume;
pub mod entity;
pub mod generate;
pub mod growth;
pub mod hash;
pub mod level;
pub mod levels;
pub mod movement;
pub mod physics;
pub mod state;
pub mod tick;

pub use consume::{
    BottomOutcome, ConsumptionRules, ConsumptionStats, ConsumptionTracker, MouthOutcome,
    Rejection, ScoreRule, SensorContact,
};
pub use entity::{Entity, EntityId, EntityKind, Footprint};
pub use generate::{
    GeneratedWorld, GenerationStats, GroundTile, generate_ground_tiles, generate_world,
};
pub use growth::{GrowthController, GrowthTuning};
pub use hash::{hash_salted, hash2, pick};
pub use level::{GroundStyle, LevelDescriptor, Theme};
pub use levels::{all_levels, level_by_id, level_by_number};
pub use movement::{CameraRig, CameraTuning, MoveInput, MovementController, MovementTuning};
pub use physics::{
    BodyHandle, BodyUserData, HoleGeometry, PhysicsBodies, SensorEvent, SensorKind, WellTuning,
    WellWorld,
};
pub use state::GameState;
pub use tick::{GameEvent, TickInput, tick};
