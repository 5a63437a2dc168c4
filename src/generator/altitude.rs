use std::any::Any;

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use tracing::debug;

use crate::config::AltitudeConfig;
use crate::error::GenerationError;
use crate::hex::HexCoord;
use crate::map::{TileId, TileMap};
use crate::rng::PhaseRng;

use super::{require_tiles, Phase, PhaseContext, PhaseOutcome};

/// Scales a noise sample to an integer altitude, rounding half away from zero.
pub fn altitude_from_sample(sample: f64, amplitude: f64) -> i32 {
    (sample.clamp(-1.0, 1.0) * amplitude).round() as i32
}

/// Noise-space position of a hex: its cartesian centre divided by `density`.
pub fn noise_position(coords: HexCoord, density: f64) -> [f64; 2] {
    let (x, y) = coords.center();
    [x as f64 / density, y as f64 / density]
}

/// Samples fractal noise at every tile and overwrites its altitude.
/// Returns the number of tiles that ended up off the zero plane.
pub fn assign_altitude(map: &mut TileMap, config: &AltitudeConfig, seed: u32) -> usize {
    let noise = Fbm::<Perlin>::new(seed).set_octaves(config.octaves as usize);
    let mut raised = 0;
    for tile in map.iter_mut() {
        let sample = noise.get(noise_position(tile.coords, config.density));
        tile.altitude = altitude_from_sample(sample, config.amplitude);
        if tile.altitude != 0 {
            raised += 1;
        }
    }
    raised
}

/// Pulls the more extreme of two altitudes toward the other until their gap is
/// exactly `max_difference`. Ties pull the first value.
pub fn level_pair(a: i32, b: i32, max_difference: u32) -> (i32, i32) {
    let gap = a.abs_diff(b);
    if gap <= max_difference {
        return (a, b);
    }
    let excess = (gap - max_difference) as i32;
    let pull = |extreme: i32, other: i32| {
        if extreme > other {
            extreme - excess
        } else {
            extreme + excess
        }
    };
    if a.abs() >= b.abs() {
        (pull(a, b), b)
    } else {
        (a, pull(b, a))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelaxStats {
    /// Full scans performed, including the final clean one.
    pub passes: u32,
    pub corrections: usize,
}

/// Scans the map in insertion order, levelling every neighbour pair whose
/// altitude gap exceeds `max_difference`, until a scan finds nothing.
pub fn relax_altitudes(
    map: &mut TileMap,
    max_difference: u32,
    max_passes: u32,
) -> Result<RelaxStats, GenerationError> {
    let ids: Vec<TileId> = map.ids().collect();
    let neighbours: Vec<Vec<TileId>> = ids.iter().map(|&id| map.neighbour_ids(id)).collect();
    let mut altitudes: Vec<i32> = map.iter().map(|tile| tile.altitude).collect();
    let mut stats = RelaxStats::default();

    while stats.passes < max_passes {
        stats.passes += 1;
        let mut found = 0;
        for id in &ids {
            let a = id.index();
            for n in &neighbours[a] {
                let b = n.index();
                if altitudes[a].abs_diff(altitudes[b]) > max_difference {
                    let (left, right) = level_pair(altitudes[a], altitudes[b], max_difference);
                    altitudes[a] = left;
                    altitudes[b] = right;
                    found += 1;
                }
            }
        }
        stats.corrections += found;
        if found == 0 {
            for (tile, altitude) in map.iter_mut().zip(altitudes) {
                tile.altitude = altitude;
            }
            return Ok(stats);
        }
    }

    Err(GenerationError::RelaxationDidNotConverge { passes: max_passes })
}

#[derive(Debug, Default)]
pub struct AltitudePhase;

impl Phase for AltitudePhase {
    fn name(&self) -> &str {
        "altitude"
    }

    fn run(
        &mut self,
        ctx: &PhaseContext<'_>,
        map: &mut TileMap,
        rng: &mut PhaseRng<'_>,
    ) -> Result<PhaseOutcome, GenerationError> {
        require_tiles(map, self.name())?;
        let seed = rng.noise_seed();
        let raised = assign_altitude(map, &ctx.config.altitude, seed);
        Ok(PhaseOutcome::changed(raised))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Relaxation pass; the standard pipeline runs one after noise and a second,
/// named `settle`, after ridges have raised their tiles.
#[derive(Debug)]
pub struct RelaxPhase {
    name: &'static str,
    last: RelaxStats,
}

impl RelaxPhase {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            last: RelaxStats::default(),
        }
    }

    pub fn last_stats(&self) -> RelaxStats {
        self.last
    }
}

impl Phase for RelaxPhase {
    fn name(&self) -> &str {
        self.name
    }

    fn run(
        &mut self,
        ctx: &PhaseContext<'_>,
        map: &mut TileMap,
        _rng: &mut PhaseRng<'_>,
    ) -> Result<PhaseOutcome, GenerationError> {
        require_tiles(map, self.name)?;
        let altitude = &ctx.config.altitude;
        let stats = relax_altitudes(map, altitude.max_difference, altitude.max_relaxation_passes)?;
        debug!(
            target: "hexterra::worldgen",
            phase = self.name,
            passes = stats.passes,
            corrections = stats.corrections,
            "worldgen.relax"
        );
        self.last = stats;
        Ok(PhaseOutcome::changed(stats.corrections))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::hexagonal_shape;
    use crate::terrain::Terrain;

    #[test]
    fn samples_round_half_away_from_zero() {
        assert_eq!(altitude_from_sample(0.5, 3.0), 2);
        assert_eq!(altitude_from_sample(-0.5, 3.0), -2);
        assert_eq!(altitude_from_sample(0.25, 2.0), 1);
        assert_eq!(altitude_from_sample(0.0, 5.0), 0);
    }

    #[test]
    fn samples_are_clamped_to_amplitude() {
        assert_eq!(altitude_from_sample(1.7, 5.0), 5);
        assert_eq!(altitude_from_sample(-3.0, 5.0), -5);
    }

    #[test]
    fn level_pair_pulls_the_extreme_value() {
        assert_eq!(level_pair(10, 0, 3), (3, 0));
        assert_eq!(level_pair(0, -10, 3), (0, -3));
        assert_eq!(level_pair(-2, 6, 3), (-2, 1));
        assert_eq!(level_pair(5, -5, 1), (-4, -5));
        assert_eq!(level_pair(1, 2, 3), (1, 2));
    }

    #[test]
    fn relaxation_removes_spikes() {
        let mut map = hexagonal_shape(4, Terrain::Sand).unwrap();
        map.at_mut(HexCoord::ORIGIN).unwrap().altitude = 20;
        map.at_mut(HexCoord::new(2, 1)).unwrap().altitude = -15;

        let stats = relax_altitudes(&mut map, 3, 1_000).unwrap();
        assert!(stats.corrections > 0);
        assert!(map.altitude_violations(3).is_empty());
    }

    #[test]
    fn relaxed_map_is_left_alone() {
        let mut map = hexagonal_shape(3, Terrain::Sand).unwrap();
        let stats = relax_altitudes(&mut map, 3, 10).unwrap();
        assert_eq!(stats, RelaxStats { passes: 1, corrections: 0 });
    }

    #[test]
    fn pass_cap_is_reported() {
        let mut map = hexagonal_shape(4, Terrain::Sand).unwrap();
        map.at_mut(HexCoord::ORIGIN).unwrap().altitude = 40;
        assert!(matches!(
            relax_altitudes(&mut map, 1, 1),
            Err(GenerationError::RelaxationDidNotConverge { passes: 1 })
        ));
    }

    #[test]
    fn noise_is_deterministic_per_seed() {
        let config = AltitudeConfig::default();
        let mut a = hexagonal_shape(10, Terrain::Sand).unwrap();
        let mut b = hexagonal_shape(10, Terrain::Sand).unwrap();
        assign_altitude(&mut a, &config, 77);
        assign_altitude(&mut b, &config, 77);
        let alt_a: Vec<i32> = a.iter().map(|t| t.altitude).collect();
        let alt_b: Vec<i32> = b.iter().map(|t| t.altitude).collect();
        assert_eq!(alt_a, alt_b);
        let bound = config.amplitude as i32;
        assert!(alt_a.iter().all(|alt| alt.abs() <= bound));
    }
}
