//! Tile arena shared by the generator, colonies and renderers.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::MapError;
use crate::hex::HexCoord;
use crate::terrain::Terrain;
use crate::tile::Tile;

/// Handle to a tile in a [`TileMap`]. Stable for the lifetime of the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(u32);

impl TileId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One tile per coordinate, kept in insertion order so every scan is
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct TileMap {
    tiles: Vec<Tile>,
    index: HashMap<HexCoord, TileId>,
}

/// An adjacent pair whose altitudes differ by more than allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AltitudeViolation {
    pub a: HexCoord,
    pub b: HexCoord,
    pub difference: u32,
}

impl TileMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tiles: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, tile: Tile) -> Result<TileId, MapError> {
        if self.index.contains_key(&tile.coords) {
            return Err(MapError::DuplicateCoordinate(tile.coords));
        }
        let id = TileId(self.tiles.len() as u32);
        self.index.insert(tile.coords, id);
        self.tiles.push(tile);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn contains(&self, coords: HexCoord) -> bool {
        self.index.contains_key(&coords)
    }

    pub fn id_of(&self, coords: HexCoord) -> Option<TileId> {
        self.index.get(&coords).copied()
    }

    pub fn get(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id.index())
    }

    pub fn get_mut(&mut self, id: TileId) -> Option<&mut Tile> {
        self.tiles.get_mut(id.index())
    }

    pub fn at(&self, coords: HexCoord) -> Option<&Tile> {
        self.id_of(coords).and_then(|id| self.get(id))
    }

    pub fn at_mut(&mut self, coords: HexCoord) -> Option<&mut Tile> {
        let id = self.id_of(coords)?;
        self.get_mut(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = TileId> {
        (0..self.tiles.len() as u32).map(TileId)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.tiles.iter_mut()
    }

    pub fn coords(&self) -> impl Iterator<Item = HexCoord> + '_ {
        self.tiles.iter().map(|tile| tile.coords)
    }

    /// Handles of the neighbours of `id` that exist on the map, in direction order.
    pub fn neighbour_ids(&self, id: TileId) -> Vec<TileId> {
        match self.get(id) {
            Some(tile) => tile
                .coords
                .neighbours()
                .into_iter()
                .filter_map(|coords| self.id_of(coords))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Every adjacent pair whose altitude gap exceeds `max_difference`, each
    /// pair reported once.
    pub fn altitude_violations(&self, max_difference: u32) -> Vec<AltitudeViolation> {
        let mut violations = Vec::new();
        for tile in &self.tiles {
            for coords in tile.coords.neighbours() {
                if coords <= tile.coords {
                    continue;
                }
                if let Some(other) = self.at(coords) {
                    let difference = tile.altitude.abs_diff(other.altitude);
                    if difference > max_difference {
                        violations.push(AltitudeViolation {
                            a: tile.coords,
                            b: coords,
                            difference,
                        });
                    }
                }
            }
        }
        violations
    }

    pub fn terrain_counts(&self) -> BTreeMap<Terrain, usize> {
        let mut counts = BTreeMap::new();
        for tile in &self.tiles {
            *counts.entry(tile.terrain).or_insert(0) += 1;
        }
        counts
    }

    pub fn count_terrain(&self, terrain: Terrain) -> usize {
        self.tiles.iter().filter(|t| t.terrain == terrain).count()
    }

    pub fn altitude_range(&self) -> Option<(i32, i32)> {
        let min = self.tiles.iter().map(|t| t.altitude).min()?;
        let max = self.tiles.iter().map(|t| t.altitude).max()?;
        Some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::spiral;

    fn flat_map(radius: u32) -> TileMap {
        let mut map = TileMap::new();
        for (coords, _) in spiral(HexCoord::ORIGIN, radius) {
            map.insert(Tile::new(coords, Terrain::Sand, 0)).unwrap();
        }
        map
    }

    #[test]
    fn rejects_duplicate_coordinates() {
        let mut map = flat_map(1);
        let err = map
            .insert(Tile::new(HexCoord::ORIGIN, Terrain::Soil, 3))
            .unwrap_err();
        assert_eq!(err, MapError::DuplicateCoordinate(HexCoord::ORIGIN));
        assert_eq!(map.len(), 7);
    }

    #[test]
    fn handles_resolve_to_the_same_tile() {
        let mut map = flat_map(2);
        let coords = HexCoord::new(1, -2);
        let id = map.id_of(coords).unwrap();
        map.get_mut(id).unwrap().altitude = 4;
        assert_eq!(map.at(coords).unwrap().altitude, 4);
    }

    #[test]
    fn edge_tiles_have_fewer_neighbours() {
        let map = flat_map(2);
        let centre = map.id_of(HexCoord::ORIGIN).unwrap();
        assert_eq!(map.neighbour_ids(centre).len(), 6);
        let corner = map.id_of(HexCoord::new(2, 0)).unwrap();
        assert_eq!(map.neighbour_ids(corner).len(), 3);
    }

    #[test]
    fn reports_each_violation_once() {
        let mut map = flat_map(1);
        map.at_mut(HexCoord::ORIGIN).unwrap().altitude = 5;
        let violations = map.altitude_violations(3);
        assert_eq!(violations.len(), 6);
        assert!(violations.iter().all(|v| v.difference == 5));
        assert!(map.altitude_violations(5).is_empty());
    }
}
