use std::any::Any;

use crate::error::{GenerationError, MapError};
use crate::hex::{ring_collect, HexCoord};
use crate::map::TileMap;
use crate::rng::PhaseRng;
use crate::terrain::Terrain;
use crate::tile::Tile;

use super::{Phase, PhaseContext, PhaseOutcome};

/// Fills a hexagon of `radius` around the origin with flat `terrain` tiles,
/// inserted in spiral order.
pub fn hexagonal_shape(radius: u32, terrain: Terrain) -> Result<TileMap, MapError> {
    let tiles = ring_collect(HexCoord::ORIGIN, radius, |coords, _, _: &[Tile]| {
        Tile::new(coords, terrain, 0)
    });
    let mut map = TileMap::with_capacity(tiles.len());
    for tile in tiles {
        map.insert(tile)?;
    }
    Ok(map)
}

#[derive(Debug, Default)]
pub struct ShapePhase;

impl Phase for ShapePhase {
    fn name(&self) -> &str {
        "shape"
    }

    fn run(
        &mut self,
        ctx: &PhaseContext<'_>,
        map: &mut TileMap,
        _rng: &mut PhaseRng<'_>,
    ) -> Result<PhaseOutcome, GenerationError> {
        *map = hexagonal_shape(ctx.config.radius, ctx.config.base_terrain)?;
        Ok(PhaseOutcome::changed(map.len()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
