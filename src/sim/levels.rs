//! Built-in levels and the level registry

use super::entity::{EntityKind, Footprint};
use super::level::{
    Fog, GrassPalette, GridSpec, GroundStyle, LevelDescriptor, MassRule, PropRule, RoadPalette,
    Theme, TierDef, TierWeight, ZoneRules,
};

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_owned()).collect()
}

fn w(tier: usize, weight: f32) -> TierWeight {
    TierWeight { tier, weight }
}

fn tier(
    name: &str,
    kind: EntityKind,
    footprint: Footprint,
    models: &[&str],
    points: u32,
    pad: f32,
) -> TierDef {
    TierDef {
        name: name.to_owned(),
        kind,
        footprint,
        models: names(models),
        points,
        pad,
    }
}

const LOW_RISE: &[&str] = &[
    "low-detail-building-a",
    "low-detail-building-b",
    "low-detail-building-c",
    "low-detail-building-d",
    "low-detail-building-e",
    "low-detail-building-f",
    "low-detail-building-g",
    "low-detail-building-h",
    "low-detail-building-i",
    "low-detail-building-j",
    "low-detail-building-k",
    "low-detail-building-l",
    "low-detail-building-m",
    "low-detail-building-n",
    "low-detail-building-wide-a",
    "low-detail-building-wide-b",
];

const MID_RISE: &[&str] = &[
    "building-a",
    "building-b",
    "building-c",
    "building-d",
    "building-e",
    "building-f",
    "building-g",
    "building-h",
    "building-i",
    "building-j",
    "building-k",
    "building-l",
    "building-m",
    "building-n",
];

const SKYSCRAPERS: &[&str] = &[
    "building-skyscraper-a",
    "building-skyscraper-b",
    "building-skyscraper-c",
    "building-skyscraper-d",
    "building-skyscraper-e",
];

const STREET_DETAILS: &[&str] = &[
    "detail-awning",
    "detail-awning-wide",
    "detail-overhang",
    "detail-overhang-wide",
    "detail-parasol-a",
    "detail-parasol-b",
];

const CARS: &[&str] = &["car-sedan", "car-hatchback", "car-taxi", "car-police", "car-van"];
const PEOPLE: &[&str] = &["human-a", "human-b", "human-c", "human-d"];

fn city_palette() -> RoadPalette {
    RoadPalette {
        block: "#64748b".into(),
        road: "#334155".into(),
        sidewalk: "#94a3b8".into(),
        center_line: "#fbbf24".into(),
        edge_line: "#ffffff".into(),
        intersection: "#1e293b".into(),
        zebra: "#ffffff".into(),
    }
}

fn night_palette() -> RoadPalette {
    RoadPalette {
        block: "#1e293b".into(),
        road: "#0f172a".into(),
        sidewalk: "#334155".into(),
        center_line: "#f59e0b".into(),
        edge_line: "#94a3b8".into(),
        intersection: "#020617".into(),
        zebra: "#e2e8f0".into(),
    }
}

/// Level 1: mixed low-rise city with street details
pub fn starter_city() -> LevelDescriptor {
    const SMALL: usize = 0;
    const MID: usize = 1;
    const BIG: usize = 2;
    const DETAIL: usize = 3;

    LevelDescriptor {
        id: "starter-city".into(),
        number: 1,
        name: "Starter City".into(),
        description: "A small neighbourhood - start with the street furniture".into(),
        seed: 0x5747_4152_5445_5231,
        theme: Theme {
            background: "#0f172a".into(),
            fog: Fog {
                color: "#0f172a".into(),
                near: 50.0,
                far: 120.0,
            },
            ground: GroundStyle::Road(city_palette()),
            ambient_light: 0.5,
            directional_light: 1.3,
        },
        hole_start_radius: 1.1,
        grid: GridSpec {
            size: 9,
            cell_size: 9.5,
            safe_radius: 12.0,
            jitter: 9.5 * 0.38,
            slots_per_cell: 5,
            fill_chance: 0.75,
            road_every: None,
            tile_size: 25.0,
            tile_count: 9,
            wrap_half_extent: 50.0,
        },
        zones: ZoneRules {
            center_radius: 22.0,
            mid_radius: 40.0,
            center: vec![w(MID, 0.6), w(SMALL, 0.25), w(BIG, 0.15)],
            mid: vec![w(SMALL, 0.55), w(MID, 0.35), w(BIG, 0.10)],
            outer: vec![w(SMALL, 0.7), w(MID, 0.3)],
        },
        tiers: vec![
            tier("small", EntityKind::Building, Footprint::new(2.2, 4.2, 2.2), LOW_RISE, 10, 0.6),
            tier("mid", EntityKind::Building, Footprint::new(4.2, 9.0, 4.2), MID_RISE, 25, 1.0),
            tier("big", EntityKind::Building, Footprint::new(7.8, 18.0, 7.8), MID_RISE, 50, 1.5),
            tier(
                "detail",
                EntityKind::Prop,
                Footprint::new(1.0, 1.0, 1.0),
                STREET_DETAILS,
                2,
                0.45,
            ),
        ],
        props: vec![PropRule {
            tier: DETAIL,
            salt: 300,
            max_per_cell: 12,
            chance: 0.75,
            spread: 0.42,
        }],
        overlap_check: true,
        mass: MassRule::default(),
    }
}

/// Level 2: dense night city on a road grid
pub fn night_city() -> LevelDescriptor {
    const SMALL: usize = 0;
    const MEDIUM: usize = 1;
    const TALL: usize = 2;
    const CAR: usize = 3;
    const PERSON: usize = 4;

    LevelDescriptor {
        id: "night-city".into(),
        number: 2,
        name: "Night City".into(),
        description: "Skyscrapers after dark - harder to grow into".into(),
        seed: 0x4e49_4748_5443_4954,
        theme: Theme {
            background: "#020617".into(),
            fog: Fog {
                color: "#020617".into(),
                near: 40.0,
                far: 100.0,
            },
            ground: GroundStyle::Road(night_palette()),
            ambient_light: 0.3,
            directional_light: 0.8,
        },
        hole_start_radius: 1.3,
        grid: GridSpec {
            size: 11,
            cell_size: 12.0,
            safe_radius: 10.0,
            jitter: 2.5,
            slots_per_cell: 3,
            fill_chance: 0.6,
            road_every: Some(3),
            tile_size: 28.0,
            tile_count: 11,
            wrap_half_extent: 72.0,
        },
        zones: ZoneRules {
            center_radius: 40.0,
            mid_radius: 60.0,
            center: vec![w(TALL, 0.4), w(MEDIUM, 0.3), w(SMALL, 0.3)],
            mid: vec![w(MEDIUM, 0.7), w(SMALL, 0.3)],
            outer: vec![w(SMALL, 1.0)],
        },
        tiers: vec![
            tier(
                "small",
                EntityKind::Building,
                Footprint::new(3.5, 5.0, 3.5).scaled(0.945),
                LOW_RISE,
                15,
                0.8,
            ),
            tier(
                "medium",
                EntityKind::Building,
                Footprint::new(4.0, 8.0, 4.0).scaled(0.945),
                MID_RISE,
                38,
                1.0,
            ),
            tier(
                "tall",
                EntityKind::Building,
                Footprint::new(5.0, 16.0, 5.0).scaled(1.035),
                SKYSCRAPERS,
                75,
                1.5,
            ),
            tier("car", EntityKind::Prop, Footprint::new(1.6, 1.1, 3.2), CARS, 8, 0.4),
            tier("person", EntityKind::Prop, Footprint::new(0.6, 1.7, 0.6), PEOPLE, 2, 0.2),
        ],
        props: vec![
            PropRule {
                tier: CAR,
                salt: 500,
                max_per_cell: 2,
                chance: 0.5,
                spread: 0.5,
            },
            PropRule {
                tier: PERSON,
                salt: 700,
                max_per_cell: 5,
                chance: 0.8,
                spread: 0.5,
            },
        ],
        overlap_check: true,
        mass: MassRule::default(),
    }
}

/// Level 3: open meadow of trees, bushes and fences
pub fn green_meadow() -> LevelDescriptor {
    const TREE_SMALL: usize = 0;
    const TREE_LARGE: usize = 1;
    const BUSH: usize = 2;
    const FENCE: usize = 3;

    LevelDescriptor {
        id: "green-meadow".into(),
        number: 3,
        name: "Green Meadow".into(),
        description: "A quiet meadow full of trees and bushes".into(),
        seed: 0x4d45_4144_4f57_3033,
        theme: Theme {
            background: "#7dd3fc".into(),
            fog: Fog {
                color: "#7dd3fc".into(),
                near: 60.0,
                far: 150.0,
            },
            ground: GroundStyle::Grass(GrassPalette {
                primary: "#4ade80".into(),
                secondary: "#22c55e".into(),
                accent: "#86efac".into(),
                dirt: "#a3754a".into(),
            }),
            ambient_light: 0.8,
            directional_light: 1.5,
        },
        hole_start_radius: 1.0,
        grid: GridSpec {
            size: 10,
            cell_size: 10.0,
            safe_radius: 6.0,
            jitter: 2.0,
            slots_per_cell: 1,
            fill_chance: 0.8,
            road_every: None,
            tile_size: 20.0,
            tile_count: 12,
            wrap_half_extent: 56.0,
        },
        zones: ZoneRules {
            center_radius: 0.0,
            mid_radius: 0.0,
            center: Vec::new(),
            mid: Vec::new(),
            outer: vec![
                w(TREE_LARGE, 0.15),
                w(TREE_SMALL, 0.25),
                w(BUSH, 0.25),
                w(FENCE, 0.15),
            ],
        },
        tiers: vec![
            tier(
                "tree-small",
                EntityKind::Prop,
                Footprint::new(2.0, 4.0, 2.0),
                &["tree-small"],
                5,
                0.3,
            ),
            tier(
                "tree-large",
                EntityKind::Prop,
                Footprint::new(3.0, 6.0, 3.0),
                &["tree-large"],
                15,
                0.4,
            ),
            tier("bush", EntityKind::Prop, Footprint::new(1.5, 1.2, 1.5), &["planter"], 3, 0.2),
            tier(
                "fence",
                EntityKind::Prop,
                Footprint::new(2.0, 1.2, 0.5),
                &["fence", "fence-low", "fence-1x2", "fence-2x2"],
                2,
                0.2,
            ),
        ],
        props: Vec::new(),
        overlap_check: false,
        mass: MassRule::default(),
    }
}

/// All built-in levels in play order
pub fn all_levels() -> Vec<LevelDescriptor> {
    vec![starter_city(), night_city(), green_meadow()]
}

pub fn level_by_number(number: u32) -> Option<LevelDescriptor> {
    all_levels().into_iter().find(|l| l.number == number)
}

pub fn level_by_id(id: &str) -> Option<LevelDescriptor> {
    all_levels().into_iter().find(|l| l.id == id)
}
