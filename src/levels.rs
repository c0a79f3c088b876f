//! Built-in level presets
//!
//! Each tier on the level-select screen starts a ride on a fixed function.

use serde::Serialize;

use crate::error::ConfigError;
use crate::quiz::Tier;
use crate::track::Domain;

/// Track function and domain for one level
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelPreset {
    pub tier: Tier,
    pub expression: &'static str,
    pub xmin: f64,
    pub xmax: f64,
}

static PRESETS: [LevelPreset; 5] = [
    LevelPreset {
        tier: Tier::Easy,
        expression: "x + 1",
        xmin: 0.0,
        xmax: 10.0,
    },
    LevelPreset {
        tier: Tier::Medium,
        expression: "x + 1",
        xmin: 0.0,
        xmax: 10.0,
    },
    LevelPreset {
        tier: Tier::Hard,
        expression: "10 - x**2",
        xmin: 0.0,
        xmax: 10.0,
    },
    LevelPreset {
        tier: Tier::VeryHard,
        expression: "x + 1",
        xmin: 0.0,
        xmax: 10.0,
    },
    LevelPreset {
        tier: Tier::Einstein,
        expression: "x + 1",
        xmin: 0.0,
        xmax: 10.0,
    },
];

/// Every preset, in level order
pub fn all() -> &'static [LevelPreset] {
    &PRESETS
}

impl LevelPreset {
    pub fn for_tier(tier: Tier) -> &'static LevelPreset {
        &PRESETS[tier.level() as usize - 1]
    }

    pub fn for_level(level: u8) -> Result<&'static LevelPreset, ConfigError> {
        Ok(Self::for_tier(Tier::from_level(level)?))
    }

    pub fn domain(&self) -> Result<Domain, ConfigError> {
        Domain::new(self.xmin, self.xmax)
    }
}
