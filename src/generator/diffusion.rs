use std::any::Any;

use rand::Rng;
use tracing::debug;

use crate::config::DiffusionPass;
use crate::error::GenerationError;
use crate::map::TileMap;
use crate::rng::PhaseRng;
use crate::terrain::Terrain;

use super::{require_tiles, Phase, PhaseContext, PhaseOutcome};

/// Runs one synchronous diffusion step: every eligible tile counts its
/// catalyst neighbours in the map as it was before the step and converts to
/// the target with the matching probability. Passes without an explicit
/// eligible terrain act on `base_terrain`. Returns the number converted.
pub fn diffuse<R: Rng + ?Sized>(
    map: &mut TileMap,
    pass: &DiffusionPass,
    base_terrain: Terrain,
    rng: &mut R,
) -> usize {
    let eligible = pass.eligible_on(base_terrain);
    let before: Vec<Terrain> = map.iter().map(|tile| tile.terrain).collect();
    let mut converted = Vec::new();

    for id in map.ids() {
        if before[id.index()] != eligible {
            continue;
        }
        let catalysts = map
            .neighbour_ids(id)
            .into_iter()
            .filter(|n| before[n.index()] == pass.catalyst)
            .count();
        let roll: f64 = rng.gen();
        if roll < pass.probabilities[catalysts] {
            converted.push(id);
        }
    }

    for &id in &converted {
        if let Some(tile) = map.get_mut(id) {
            tile.terrain = pass.target;
        }
    }
    converted.len()
}

#[derive(Debug, Default)]
pub struct DiffusionPhase;

impl Phase for DiffusionPhase {
    fn name(&self) -> &str {
        "diffusion"
    }

    fn run(
        &mut self,
        ctx: &PhaseContext<'_>,
        map: &mut TileMap,
        rng: &mut PhaseRng<'_>,
    ) -> Result<PhaseOutcome, GenerationError> {
        require_tiles(map, self.name())?;
        let mut changed = 0;
        for pass in &ctx.config.diffusion {
            for round in 0..pass.repeat {
                let converted = diffuse(map, pass, ctx.config.base_terrain, rng);
                debug!(
                    target: "hexterra::worldgen",
                    catalyst = %pass.catalyst,
                    target_terrain = %pass.target,
                    round,
                    converted,
                    "worldgen.diffusion"
                );
                changed += converted;
            }
        }
        Ok(PhaseOutcome::changed(changed))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
