//! Generator configuration with defaults matching the standard profile.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::terrain::Terrain;

fn default_radius() -> u32 {
    40
}

fn default_base_terrain() -> Terrain {
    Terrain::Sand
}

fn default_density() -> f64 {
    20.0
}

fn default_amplitude() -> f64 {
    5.0
}

fn default_octaves() -> u32 {
    4
}

fn default_max_difference() -> u32 {
    3
}

fn default_max_relaxation_passes() -> u32 {
    10_000
}

fn default_ridge_density() -> f64 {
    0.003
}

fn default_min_length() -> u32 {
    4
}

fn default_max_length() -> u32 {
    10
}

fn default_deviation() -> f64 {
    0.3
}

fn default_altitude_bonus() -> i32 {
    2
}

fn default_max_attempts() -> u32 {
    64
}

fn default_max_midpoint_attempts() -> u32 {
    16
}

fn default_repeat() -> u32 {
    1
}

fn default_deposit_density() -> f64 {
    8.0
}

fn default_deposit_threshold() -> f64 {
    0.55
}

fn default_diffusion() -> Vec<DiffusionPass> {
    vec![
        DiffusionPass {
            catalyst: Terrain::Mountain,
            target: Terrain::Rocky,
            eligible: None,
            probabilities: [0.0, 0.45, 0.6, 0.75, 0.85, 0.95, 1.0],
            repeat: 1,
        },
        DiffusionPass {
            catalyst: Terrain::Rocky,
            target: Terrain::Rocky,
            eligible: None,
            probabilities: [0.0, 0.1, 0.25, 0.4, 0.6, 0.8, 1.0],
            repeat: 2,
        },
        DiffusionPass {
            catalyst: Terrain::Rocky,
            target: Terrain::Rough,
            eligible: None,
            probabilities: [0.0, 0.15, 0.2, 0.3, 0.4, 0.5, 0.6],
            repeat: 1,
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Hex radius of the map; the map holds `3r² + 3r + 1` tiles.
    #[serde(default = "default_radius")]
    pub radius: u32,
    #[serde(default = "default_base_terrain")]
    pub base_terrain: Terrain,
    #[serde(default)]
    pub altitude: AltitudeConfig,
    #[serde(default)]
    pub ridges: RidgeConfig,
    #[serde(default = "default_diffusion")]
    pub diffusion: Vec<DiffusionPass>,
    #[serde(default)]
    pub deposits: DepositConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AltitudeConfig {
    /// Hex-centre units per noise period; larger means smoother terrain.
    #[serde(default = "default_density")]
    pub density: f64,
    #[serde(default = "default_amplitude")]
    pub amplitude: f64,
    #[serde(default = "default_octaves")]
    pub octaves: u32,
    /// Largest altitude gap allowed between neighbours.
    #[serde(default = "default_max_difference")]
    pub max_difference: u32,
    #[serde(default = "default_max_relaxation_passes")]
    pub max_relaxation_passes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RidgeConfig {
    /// Ridges per tile.
    #[serde(default = "default_ridge_density")]
    pub density: f64,
    #[serde(default = "default_min_length")]
    pub min_length: u32,
    #[serde(default = "default_max_length")]
    pub max_length: u32,
    /// Midpoint jitter as a fraction of the segment length, in hex steps.
    #[serde(default = "default_deviation")]
    pub deviation: f64,
    #[serde(default = "default_altitude_bonus")]
    pub altitude_bonus: i32,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_max_midpoint_attempts")]
    pub max_midpoint_attempts: u32,
}

/// One cellular pass turning `eligible` tiles into `target` next to `catalyst`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffusionPass {
    pub catalyst: Terrain,
    pub target: Terrain,
    /// Terrain the pass converts; the map's base terrain when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eligible: Option<Terrain>,
    /// Conversion chance indexed by the number of catalyst neighbours.
    pub probabilities: [f64; 7],
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl DiffusionPass {
    pub fn eligible_on(&self, base_terrain: Terrain) -> Terrain {
        self.eligible.unwrap_or(base_terrain)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositConfig {
    #[serde(default = "default_deposit_density")]
    pub density: f64,
    /// Noise level above which a hosting tile carries the deposit.
    #[serde(default = "default_deposit_threshold")]
    pub threshold: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            radius: default_radius(),
            base_terrain: default_base_terrain(),
            altitude: AltitudeConfig::default(),
            ridges: RidgeConfig::default(),
            diffusion: default_diffusion(),
            deposits: DepositConfig::default(),
        }
    }
}

impl Default for AltitudeConfig {
    fn default() -> Self {
        Self {
            density: default_density(),
            amplitude: default_amplitude(),
            octaves: default_octaves(),
            max_difference: default_max_difference(),
            max_relaxation_passes: default_max_relaxation_passes(),
        }
    }
}

impl Default for RidgeConfig {
    fn default() -> Self {
        Self {
            density: default_ridge_density(),
            min_length: default_min_length(),
            max_length: default_max_length(),
            deviation: default_deviation(),
            altitude_bonus: default_altitude_bonus(),
            max_attempts: default_max_attempts(),
            max_midpoint_attempts: default_max_midpoint_attempts(),
        }
    }
}

impl Default for DepositConfig {
    fn default() -> Self {
        Self {
            density: default_deposit_density(),
            threshold: default_deposit_threshold(),
        }
    }
}

impl GeneratorConfig {
    pub fn standard() -> Self {
        Self::default()
    }

    pub fn with_radius(mut self, radius: u32) -> Self {
        self.radius = radius;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        at_least("radius", self.radius as f64, 1.0)?;

        let altitude = &self.altitude;
        positive("altitude.density", altitude.density)?;
        at_least("altitude.amplitude", altitude.amplitude, 0.0)?;
        at_least("altitude.octaves", altitude.octaves as f64, 1.0)?;
        at_least("altitude.max_difference", altitude.max_difference as f64, 1.0)?;
        at_least(
            "altitude.max_relaxation_passes",
            altitude.max_relaxation_passes as f64,
            1.0,
        )?;

        let ridges = &self.ridges;
        within("ridges.density", ridges.density, 0.0, 0.999)?;
        at_least("ridges.min_length", ridges.min_length as f64, 2.0)?;
        if ridges.min_length > ridges.max_length {
            return Err(ConfigError::EmptyRidgeRange {
                min: ridges.min_length,
                max: ridges.max_length,
            });
        }
        within(
            "ridges.min_length",
            ridges.min_length as f64,
            2.0,
            2.0 * self.radius as f64,
        )?;
        within(
            "ridges.max_length",
            ridges.max_length as f64,
            2.0,
            2.0 * self.radius as f64,
        )?;
        within("ridges.deviation", ridges.deviation, 0.0, 1.0)?;
        at_least("ridges.max_attempts", ridges.max_attempts as f64, 1.0)?;
        at_least(
            "ridges.max_midpoint_attempts",
            ridges.max_midpoint_attempts as f64,
            1.0,
        )?;

        for pass in &self.diffusion {
            for probability in pass.probabilities {
                within("diffusion.probabilities", probability, 0.0, 1.0)?;
            }
        }

        positive("deposits.density", self.deposits.density)?;
        within("deposits.threshold", self.deposits.threshold, -1.0, 1.0)?;
        Ok(())
    }
}

fn at_least(field: &'static str, value: f64, min: f64) -> Result<(), ConfigError> {
    if value >= min {
        Ok(())
    } else {
        Err(ConfigError::TooSmall { field, min, value })
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::TooSmall {
            field,
            min: f64::MIN_POSITIVE,
            value,
        })
    }
}

fn within(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            min,
            max,
            value,
        })
    }
}
