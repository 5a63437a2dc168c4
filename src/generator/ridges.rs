use std::any::Any;
use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::config::RidgeConfig;
use crate::error::GenerationError;
use crate::hex::{ring_traverse, HexCoord};
use crate::map::TileMap;
use crate::rng::PhaseRng;
use crate::terrain::Terrain;

use super::{require_tiles, Phase, PhaseContext, PhaseOutcome};

pub fn ridge_count(density: f64, tile_count: usize) -> usize {
    (density * tile_count as f64).round() as usize
}

/// Carves `ridge_count` mountain ridges into the map. Ridges never share a
/// tile; every tile on one becomes a mountain and gains the altitude bonus.
/// Returns each ridge's tiles in order from start to end.
pub fn carve_ridges<R: Rng + ?Sized>(
    map: &mut TileMap,
    config: &RidgeConfig,
    rng: &mut R,
) -> Result<Vec<Vec<HexCoord>>, GenerationError> {
    let count = ridge_count(config.density, map.len());
    let mut claimed = HashSet::new();
    let mut ridges = Vec::with_capacity(count);

    for ridge in 0..count {
        let planner = RidgePlanner {
            map: &*map,
            config,
            claimed: &claimed,
        };
        let path = planner
            .plan(rng)
            .ok_or(GenerationError::RidgeEndpointNotFound {
                ridge,
                attempts: config.max_attempts,
            })?;

        for &coords in &path {
            claimed.insert(coords);
            if let Some(tile) = map.at_mut(coords) {
                tile.terrain = Terrain::Mountain;
                tile.altitude += config.altitude_bonus;
            }
        }
        debug!(
            target: "hexterra::worldgen",
            ridge,
            length = path.len(),
            start = %path[0],
            end = %path[path.len() - 1],
            "worldgen.ridge"
        );
        ridges.push(path);
    }
    Ok(ridges)
}

struct RidgePlanner<'a> {
    map: &'a TileMap,
    config: &'a RidgeConfig,
    claimed: &'a HashSet<HexCoord>,
}

impl RidgePlanner<'_> {
    fn plan<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Vec<HexCoord>> {
        let free: Vec<HexCoord> = self
            .map
            .coords()
            .filter(|coords| !self.claimed.contains(coords))
            .collect();

        for _ in 0..self.config.max_attempts {
            let start = *free.choose(rng)?;
            let candidates = self.endpoint_candidates(start);
            let Some(&end) = candidates.choose(rng) else {
                continue;
            };

            let mut taken = HashSet::from([start, end]);
            if let Some(interior) = self.subdivide(start, end, &mut taken, rng) {
                let mut path = Vec::with_capacity(interior.len() + 2);
                path.push(start);
                path.extend(interior);
                path.push(end);
                return Some(path);
            }
        }
        None
    }

    /// Unclaimed tiles whose distance from `start` lies in the length range.
    fn endpoint_candidates(&self, start: HexCoord) -> Vec<HexCoord> {
        let min_length = self.config.min_length.max(1);
        let reach = self
            .map
            .coords()
            .map(|coords| start.distance(coords))
            .max()
            .unwrap_or(0)
            .min(self.config.max_length);
        let mut candidates = Vec::new();
        if reach < min_length {
            return candidates;
        }
        ring_traverse(start, reach, |coords, step| {
            if step.ring >= min_length && self.is_free(coords, None) {
                candidates.push(coords);
            }
        });
        candidates
    }

    fn is_free(&self, coords: HexCoord, taken: Option<&HashSet<HexCoord>>) -> bool {
        self.map.contains(coords)
            && !self.claimed.contains(&coords)
            && taken.map_or(true, |taken| !taken.contains(&coords))
    }

    /// Interior tiles of a connected path between `a` and `b`, exclusive.
    fn subdivide<R: Rng + ?Sized>(
        &self,
        a: HexCoord,
        b: HexCoord,
        taken: &mut HashSet<HexCoord>,
        rng: &mut R,
    ) -> Option<Vec<HexCoord>> {
        let distance = a.distance(b);
        match distance {
            0 | 1 => Some(Vec::new()),
            2 => {
                let shared: Vec<HexCoord> = a
                    .neighbours()
                    .into_iter()
                    .filter(|c| c.distance(b) == 1 && self.is_free(*c, Some(&*taken)))
                    .collect();
                let middle = *shared.choose(rng)?;
                taken.insert(middle);
                Some(vec![middle])
            }
            _ => {
                let middle = self.pick_midpoint(a, b, distance, taken, rng)?;
                taken.insert(middle);
                let mut path = self.subdivide(a, middle, taken, rng)?;
                path.push(middle);
                path.extend(self.subdivide(middle, b, taken, rng)?);
                Some(path)
            }
        }
    }

    /// Perturbed midpoint strictly closer to both ends than they are to each other.
    fn pick_midpoint<R: Rng + ?Sized>(
        &self,
        a: HexCoord,
        b: HexCoord,
        distance: u32,
        taken: &HashSet<HexCoord>,
        rng: &mut R,
    ) -> Option<HexCoord> {
        let (ax, ay) = a.center();
        let (bx, by) = b.center();
        let mx = f64::from(ax + bx) / 2.0;
        let my = f64::from(ay + by) / 2.0;
        let bound = jitter_bound(distance, self.config.deviation);

        for _ in 0..self.config.max_midpoint_attempts {
            let (dx, dy) = if bound > 0 {
                (rng.gen_range(-bound..=bound), rng.gen_range(-bound..=bound))
            } else {
                (0, 0)
            };
            let middle = HexCoord::from_center(mx + f64::from(dx), my + f64::from(dy));
            if middle == a || middle == b || !self.is_free(middle, Some(taken)) {
                continue;
            }
            if a.distance(middle) < distance && middle.distance(b) < distance {
                return Some(middle);
            }
        }
        None
    }
}

/// Largest midpoint offset, in centre units, for a segment `distance` hexes
/// long. Neighbouring centres sit two units apart.
fn jitter_bound(distance: u32, deviation: f64) -> i32 {
    (2.0 * f64::from(distance) * deviation).round() as i32
}

#[derive(Debug, Default)]
pub struct RidgePhase {
    ridges: Vec<Vec<HexCoord>>,
}

impl RidgePhase {
    pub fn ridges(&self) -> &[Vec<HexCoord>] {
        &self.ridges
    }
}

impl Phase for RidgePhase {
    fn name(&self) -> &str {
        "ridges"
    }

    fn run(
        &mut self,
        ctx: &PhaseContext<'_>,
        map: &mut TileMap,
        rng: &mut PhaseRng<'_>,
    ) -> Result<PhaseOutcome, GenerationError> {
        require_tiles(map, self.name())?;
        self.ridges = carve_ridges(map, &ctx.config.ridges, rng)?;
        let changed = self.ridges.iter().map(Vec::len).sum();
        Ok(PhaseOutcome::changed(changed))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
