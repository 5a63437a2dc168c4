//! Terraforming: single-tile operations arranged in rotatable seven-cell
//! patterns. Applying a pattern may break the altitude constraint until the
//! map is relaxed again.

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::hex::{HexCoord, DIRECTIONS};
use crate::map::TileMap;
use crate::terrain::Terrain;
use crate::tile::Tile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Explode,
    Elevate,
    Pulverize,
    Melt,
    Comet,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Explode,
        Operation::Elevate,
        Operation::Pulverize,
        Operation::Melt,
        Operation::Comet,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::Explode => "explode",
            Operation::Elevate => "elevate",
            Operation::Pulverize => "pulverize",
            Operation::Melt => "melt",
            Operation::Comet => "comet",
        }
    }

    pub fn apply(self, tile: &mut Tile) {
        match self {
            Operation::Explode => {
                if tile.terrain != Terrain::Mountain {
                    tile.altitude -= 1;
                }
                tile.terrain = if tile.terrain.is_liquid_or_frozen() {
                    Terrain::Sand
                } else {
                    Terrain::Rocky
                };
            }
            Operation::Elevate => {
                if tile.terrain == Terrain::Mountain {
                    return;
                }
                tile.altitude += 1;
                if tile.terrain != Terrain::Water {
                    tile.terrain = Terrain::Sand;
                }
            }
            Operation::Pulverize => match tile.terrain {
                Terrain::Rocky => tile.terrain = Terrain::Sand,
                Terrain::Sand => tile.terrain = Terrain::Soil,
                _ => {}
            },
            Operation::Melt => match tile.terrain {
                Terrain::Sand => tile.terrain = Terrain::Rocky,
                Terrain::Soil => tile.terrain = Terrain::Sand,
                Terrain::Ice => tile.terrain = Terrain::Water,
                Terrain::Water => {
                    tile.terrain = Terrain::Sand;
                    tile.altitude -= 1;
                }
                _ => {}
            },
            Operation::Comet => {
                if matches!(tile.terrain, Terrain::Sand | Terrain::Soil) {
                    tile.terrain = Terrain::Ice;
                }
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A centre cell plus one cell per hex direction, each holding an optional
/// operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerraformPattern {
    pub centre: Option<Operation>,
    pub cells: [Option<Operation>; 6],
}

impl TerraformPattern {
    pub fn new(centre: Option<Operation>, cells: [Option<Operation>; 6]) -> Self {
        Self { centre, cells }
    }

    /// Every cell is empty with probability one half, otherwise a uniformly
    /// chosen operation.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut pick = || {
            if rng.gen_bool(0.5) {
                None
            } else {
                Operation::ALL.choose(&mut *rng).copied()
            }
        };
        let centre = pick();
        let cells = [pick(), pick(), pick(), pick(), pick(), pick()];
        Self { centre, cells }
    }

    /// Turns the pattern by `steps` sixths; direction `d` moves to `(d + steps) % 6`.
    pub fn rotate(&self, steps: usize) -> Self {
        let mut cells = [None; 6];
        for (dir, op) in self.cells.iter().enumerate() {
            cells[(dir + steps) % DIRECTIONS.len()] = *op;
        }
        Self {
            centre: self.centre,
            cells,
        }
    }

    /// Offsets from the centre paired with their operation, empty cells skipped.
    pub fn operations(&self) -> impl Iterator<Item = (HexCoord, Operation)> + '_ {
        let centre = self.centre.map(|op| (HexCoord::ORIGIN, op));
        centre.into_iter().chain(
            self.cells
                .iter()
                .enumerate()
                .filter_map(|(dir, op)| op.map(|op| (HexCoord::direction(dir), op))),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.operations().next().is_none()
    }

    /// Applies the pattern around `centre`, skipping cells off the map.
    /// Returns the number of tiles operated on.
    pub fn apply(&self, map: &mut TileMap, centre: HexCoord) -> usize {
        let mut applied = 0;
        for (offset, op) in self.operations() {
            if let Some(tile) = map.at_mut(centre + offset) {
                op.apply(tile);
                applied += 1;
            }
        }
        debug!(
            target: "hexterra::worldgen",
            centre = %centre,
            applied,
            "terraform.applied"
        );
        applied
    }

    /// The tiles `apply` would produce, without touching the map.
    pub fn preview(&self, map: &TileMap, centre: HexCoord) -> Vec<Tile> {
        self.operations()
            .filter_map(|(offset, op)| {
                let mut tile = map.at(centre + offset)?.clone();
                op.apply(&mut tile);
                Some(tile)
            })
            .collect()
    }
}
