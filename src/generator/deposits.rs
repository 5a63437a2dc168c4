use std::any::Any;

use noise::{NoiseFn, Perlin};

use crate::config::DepositConfig;
use crate::error::GenerationError;
use crate::map::TileMap;
use crate::rng::PhaseRng;
use crate::tile::Deposit;

use super::{noise_position, require_tiles, Phase, PhaseContext, PhaseOutcome};

/// Marks deposits where an independent noise field per deposit kind rises
/// above the threshold on terrain that can host it. Returns the number of
/// deposits placed.
pub fn scatter_deposits(
    map: &mut TileMap,
    config: &DepositConfig,
    seeds: [u32; Deposit::ALL.len()],
) -> usize {
    let fields = seeds.map(Perlin::new);
    let mut placed = 0;
    for tile in map.iter_mut() {
        let position = noise_position(tile.coords, config.density);
        for deposit in Deposit::ALL {
            if !deposit.hosts().contains(&tile.terrain) {
                continue;
            }
            if fields[deposit.index()].get(position) > config.threshold {
                tile.deposits.set(deposit, true);
                placed += 1;
            }
        }
    }
    placed
}

#[derive(Debug, Default)]
pub struct DepositPhase;

impl Phase for DepositPhase {
    fn name(&self) -> &str {
        "deposits"
    }

    fn run(
        &mut self,
        ctx: &PhaseContext<'_>,
        map: &mut TileMap,
        rng: &mut PhaseRng<'_>,
    ) -> Result<PhaseOutcome, GenerationError> {
        require_tiles(map, self.name())?;
        let seeds = Deposit::ALL.map(|_| rng.noise_seed());
        Ok(PhaseOutcome::changed(scatter_deposits(
            map,
            &ctx.config.deposits,
            seeds,
        )))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::hexagonal_shape;
    use crate::hex::HexCoord;
    use crate::terrain::Terrain;

    fn mixed_map() -> TileMap {
        let mut map = hexagonal_shape(8, Terrain::Sand).unwrap();
        for (i, tile) in map.iter_mut().enumerate() {
            tile.terrain = Terrain::ALL[i % Terrain::ALL.len()];
        }
        map
    }

    #[test]
    fn deposits_only_appear_on_hosting_terrain() {
        let mut map = mixed_map();
        let config = DepositConfig {
            density: 3.0,
            threshold: -1.0,
        };
        let placed = scatter_deposits(&mut map, &config, [1, 2, 3]);
        assert!(placed > 0);
        for tile in map.iter() {
            for deposit in Deposit::ALL {
                if tile.deposits.has(deposit) {
                    assert!(deposit.hosts().contains(&tile.terrain), "{deposit:?} on {tile}");
                }
            }
        }
        let water = map.iter().find(|t| t.terrain == Terrain::Water).unwrap();
        assert!(!water.deposits.any());
    }

    #[test]
    fn same_seeds_same_deposits() {
        let config = DepositConfig::default();
        let mut a = mixed_map();
        let mut b = mixed_map();
        scatter_deposits(&mut a, &config, [5, 6, 7]);
        scatter_deposits(&mut b, &config, [5, 6, 7]);
        for coords in a.coords().collect::<Vec<HexCoord>>() {
            assert_eq!(a.at(coords).unwrap().deposits, b.at(coords).unwrap().deposits);
        }
    }
}
