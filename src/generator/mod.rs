//! Procedural map generation as an ordered list of phases.
//!
//! Every phase runs to completion on the shared [`TileMap`] and draws from its
//! own named random stream, so a seed and a phase list fully determine the map.

mod altitude;
mod deposits;
mod diffusion;
mod ridges;
mod shape;

use std::any::Any;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::GeneratorConfig;
use crate::error::GenerationError;
use crate::map::TileMap;
use crate::rng::{PhaseRng, RngStreams};

pub use altitude::{
    altitude_from_sample, assign_altitude, level_pair, noise_position, relax_altitudes,
    AltitudePhase, RelaxPhase, RelaxStats,
};
pub use deposits::{scatter_deposits, DepositPhase};
pub use diffusion::{diffuse, DiffusionPhase};
pub use ridges::{carve_ridges, ridge_count, RidgePhase};
pub use shape::{hexagonal_shape, ShapePhase};

pub struct PhaseContext<'a> {
    pub config: &'a GeneratorConfig,
    pub seed: u64,
}

/// What a phase did to the map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PhaseOutcome {
    /// Tiles created or modified.
    pub changed: usize,
}

impl PhaseOutcome {
    pub fn changed(changed: usize) -> Self {
        Self { changed }
    }
}

pub trait Phase {
    fn name(&self) -> &str;

    fn run(
        &mut self,
        ctx: &PhaseContext<'_>,
        map: &mut TileMap,
        rng: &mut PhaseRng<'_>,
    ) -> Result<PhaseOutcome, GenerationError>;

    fn as_any(&self) -> &dyn Any;
}

#[derive(Debug, Clone, Serialize)]
pub struct PhaseReport {
    pub name: String,
    pub changed: usize,
    pub duration_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub seed: u64,
    pub tile_count: usize,
    pub phases: Vec<PhaseReport>,
}

pub struct WorldGeneratorBuilder {
    config: GeneratorConfig,
    seed: u64,
    phases: Vec<Box<dyn Phase>>,
}

impl WorldGeneratorBuilder {
    pub fn new(config: GeneratorConfig, seed: u64) -> Self {
        Self {
            config,
            seed,
            phases: Vec::new(),
        }
    }

    pub fn with_phase(mut self, phase: impl Phase + 'static) -> Self {
        self.phases.push(Box::new(phase));
        self
    }

    pub fn build(self) -> WorldGenerator {
        WorldGenerator {
            config: self.config,
            seed: self.seed,
            phases: self.phases,
        }
    }
}

pub struct WorldGenerator {
    config: GeneratorConfig,
    seed: u64,
    phases: Vec<Box<dyn Phase>>,
}

impl WorldGenerator {
    /// Shape, altitude, relaxation, ridges, diffusion and deposits, followed by
    /// a final relaxation that restores the altitude constraint.
    pub fn standard(config: GeneratorConfig, seed: u64) -> Self {
        WorldGeneratorBuilder::new(config, seed)
            .with_phase(ShapePhase)
            .with_phase(AltitudePhase)
            .with_phase(RelaxPhase::new("relax"))
            .with_phase(RidgePhase::default())
            .with_phase(DiffusionPhase)
            .with_phase(DepositPhase)
            .with_phase(RelaxPhase::new("settle"))
            .build()
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn phase_names(&self) -> Vec<&str> {
        self.phases.iter().map(|phase| phase.name()).collect()
    }

    /// Looks up a phase by type, e.g. to read back the ridges it carved.
    pub fn phase<T: 'static>(&self) -> Option<&T> {
        self.phases
            .iter()
            .find_map(|phase| phase.as_any().downcast_ref::<T>())
    }

    pub fn generate(&mut self) -> Result<(TileMap, GenerationReport), GenerationError> {
        self.config.validate()?;

        let mut streams = RngStreams::new(self.seed);
        let mut map = TileMap::new();
        let ctx = PhaseContext {
            config: &self.config,
            seed: self.seed,
        };
        let mut reports = Vec::with_capacity(self.phases.len());

        for phase in self.phases.iter_mut() {
            let start = Instant::now();
            let name = phase.name().to_string();
            let mut rng = streams.stream(&name);
            debug!(target: "hexterra::worldgen", phase = %name, "worldgen.phase.start");
            let outcome = phase.run(&ctx, &mut map, &mut rng)?;
            let duration_ms = start.elapsed().as_secs_f64() * 1_000.0;
            info!(
                target: "hexterra::worldgen",
                phase = %name,
                changed = outcome.changed,
                duration_ms,
                "worldgen.phase.done"
            );
            reports.push(PhaseReport {
                name,
                changed: outcome.changed,
                duration_ms,
            });
        }

        let report = GenerationReport {
            seed: self.seed,
            tile_count: map.len(),
            phases: reports,
        };
        Ok((map, report))
    }
}

/// Phases after the shape phase refuse to run on an empty map.
pub(crate) fn require_tiles(map: &TileMap, phase: &str) -> Result<(), GenerationError> {
    if map.is_empty() {
        Err(GenerationError::EmptyMap {
            phase: phase.to_string(),
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::hex_count;
    use crate::terrain::Terrain;

    fn small_config() -> GeneratorConfig {
        let mut config = GeneratorConfig::standard().with_radius(12);
        config.ridges.density = 0.01;
        config
    }

    #[test]
    fn standard_pipeline_order() {
        let generator = WorldGenerator::standard(small_config(), 1);
        assert_eq!(
            generator.phase_names(),
            vec!["shape", "altitude", "relax", "ridges", "diffusion", "deposits", "settle"]
        );
    }

    #[test]
    fn generates_full_hexagon() {
        let mut generator = WorldGenerator::standard(small_config(), 2137);
        let (map, report) = generator.generate().unwrap();
        assert_eq!(map.len(), hex_count(12));
        assert_eq!(report.tile_count, map.len());
        assert_eq!(report.phases.len(), 7);
        assert!(map.count_terrain(Terrain::Mountain) > 0);
    }

    #[test]
    fn ridges_are_readable_after_generation() {
        let mut generator = WorldGenerator::standard(small_config(), 5);
        let (map, _) = generator.generate().unwrap();
        let ridges = generator.phase::<RidgePhase>().unwrap().ridges();
        assert_eq!(ridges.len(), ridge_count(0.01, map.len()));
    }

    #[test]
    fn relaxation_stats_match_the_report() {
        let mut generator = WorldGenerator::standard(small_config(), 8);
        let (_, report) = generator.generate().unwrap();
        let stats = generator.phase::<RelaxPhase>().unwrap().last_stats();
        assert!(stats.passes >= 1);
        let relax = report.phases.iter().find(|p| p.name == "relax").unwrap();
        assert_eq!(relax.changed, stats.corrections);
    }

    #[test]
    fn invalid_config_is_rejected_before_any_phase() {
        let mut generator = WorldGenerator::standard(GeneratorConfig::standard().with_radius(0), 1);
        assert!(matches!(
            generator.generate(),
            Err(GenerationError::Config(_))
        ));
    }

    #[test]
    fn phases_without_shape_see_an_empty_map() {
        let mut generator = WorldGeneratorBuilder::new(small_config(), 1)
            .with_phase(AltitudePhase)
            .build();
        assert!(matches!(
            generator.generate(),
            Err(GenerationError::EmptyMap { .. })
        ));
    }
}
