//! Colony bookkeeping: tiles touched, buildings placed, stockpile and balance.
//!
//! Feasibility failures are reported as `false` and leave the colony and the
//! map untouched. The balance is always rebuilt from scratch by sweeping the
//! buildings in placement order; earlier buildings get first claim on scarce
//! resources.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::{BuildingCatalog, BuildingType, BuildingTypeId, BASE_BUILDING};
use crate::error::ColonyError;
use crate::hex::HexCoord;
use crate::map::{TileId, TileMap};
use crate::resources::ResourceVector;
use crate::tile::{BuildingId, ColonyId, InfraKind, Tile};

#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    pub kind: BuildingTypeId,
    pub tile: TileId,
    pub coords: HexCoord,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub balance: ResourceVector,
    pub resources: ResourceVector,
    pub active: usize,
    pub inactive: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildingSnapshot {
    pub name: String,
    pub coords: HexCoord,
    pub active: bool,
}

/// Read-only view for presentation layers.
#[derive(Debug, Clone, Serialize)]
pub struct ColonySnapshot {
    pub id: ColonyId,
    pub resources: ResourceVector,
    pub balance: ResourceVector,
    pub housing: u32,
    pub tiles: usize,
    pub buildings: Vec<BuildingSnapshot>,
}

pub struct Colony {
    id: ColonyId,
    catalog: Arc<BuildingCatalog>,
    tiles: Vec<TileId>,
    tile_set: HashSet<TileId>,
    buildings: Vec<Building>,
    resources: ResourceVector,
    balance: ResourceVector,
}

impl Colony {
    /// Places the catalog's base building on `base` for free, infrastructure
    /// included.
    pub fn found(
        id: ColonyId,
        catalog: Arc<BuildingCatalog>,
        map: &mut TileMap,
        base: HexCoord,
        resources: ResourceVector,
    ) -> Result<Self, ColonyError> {
        let base_kind = catalog
            .id_of(BASE_BUILDING)
            .ok_or_else(|| ColonyError::MissingBaseType(BASE_BUILDING.to_string()))?;
        let tile = map.id_of(base).ok_or(ColonyError::UnknownTile(base))?;
        if map.get(tile).is_some_and(Tile::is_occupied) {
            return Err(ColonyError::Occupied(base));
        }

        let mut colony = Self {
            id,
            catalog,
            tiles: Vec::new(),
            tile_set: HashSet::new(),
            buildings: Vec::new(),
            resources,
            balance: ResourceVector::ZERO,
        };
        colony.place(map, tile, base_kind);
        colony.recompute_balance(map);
        info!(
            target: "hexterra::colony",
            colony = id.0,
            base = %base,
            balance = %colony.balance,
            "colony.founded"
        );
        Ok(colony)
    }

    pub fn id(&self) -> ColonyId {
        self.id
    }

    pub fn catalog(&self) -> &BuildingCatalog {
        &self.catalog
    }

    pub fn resources(&self) -> ResourceVector {
        self.resources
    }

    /// Balance as of the last recompute.
    pub fn balance(&self) -> ResourceVector {
        self.balance
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn tiles(&self) -> &[TileId] {
        &self.tiles
    }

    pub fn owns(&self, tile: TileId) -> bool {
        self.tile_set.contains(&tile)
    }

    pub fn active_count(&self) -> usize {
        self.buildings.iter().filter(|b| b.active).count()
    }

    pub fn inactive_count(&self) -> usize {
        self.buildings.len() - self.active_count()
    }

    /// Housing provided by active buildings.
    pub fn housing(&self) -> u32 {
        self.buildings
            .iter()
            .filter(|b| b.active)
            .filter_map(|b| self.catalog.get(b.kind))
            .map(BuildingType::housing)
            .sum()
    }

    pub fn building_type(&self, building: &Building) -> Option<&BuildingType> {
        self.catalog.get(building.kind)
    }

    /// Lays `kind` infrastructure on the tile at `coords`. Fails if the tile is
    /// unknown, already has it, or the colony cannot pay.
    pub fn add_infrastructure(&mut self, map: &mut TileMap, coords: HexCoord, kind: InfraKind) -> bool {
        let Some(id) = map.id_of(coords) else {
            return false;
        };
        let Some(tile) = map.get_mut(id) else {
            return false;
        };
        if tile.has_infra(kind) {
            return false;
        }
        let cost = self.catalog.infra_cost(kind);
        if (self.resources - cost).deficit() {
            debug!(
                target: "hexterra::colony",
                colony = self.id.0,
                %coords,
                %kind,
                "colony.infrastructure.unaffordable"
            );
            return false;
        }

        tile.infrastructure.set(kind, true);
        tile.owner = Some(self.id);
        self.resources -= cost;
        self.register(id);
        self.recompute_balance(map);
        debug!(
            target: "hexterra::colony",
            colony = self.id.0,
            %coords,
            %kind,
            "colony.infrastructure.added"
        );
        true
    }

    /// Full price of putting `kind` on the tile at `coords`: the building's
    /// own cost plus every needed infrastructure the tile lacks.
    pub fn placement_cost(&self, map: &TileMap, coords: HexCoord, kind: BuildingTypeId) -> Option<ResourceVector> {
        let building = self.catalog.get(kind)?;
        let tile = map.at(coords)?;
        let cost = building
            .needed_infrastructure()
            .filter(|infra| !tile.has_infra(*infra))
            .fold(building.cost(), |cost, infra| cost + self.catalog.infra_cost(infra));
        Some(cost)
    }

    /// Places a building, laying any missing infrastructure it needs. Terrain
    /// and deposit rules are the caller's concern; an occupied tile or an
    /// unaffordable total cost fails.
    pub fn add_building(&mut self, map: &mut TileMap, coords: HexCoord, kind: BuildingTypeId) -> bool {
        let Some(id) = map.id_of(coords) else {
            return false;
        };
        if map.get(id).map_or(true, Tile::is_occupied) {
            return false;
        }
        let Some(cost) = self.placement_cost(map, coords, kind) else {
            return false;
        };
        if (self.resources - cost).deficit() {
            debug!(
                target: "hexterra::colony",
                colony = self.id.0,
                %coords,
                cost = %cost,
                "colony.building.unaffordable"
            );
            return false;
        }

        self.resources -= cost;
        self.place(map, id, kind);
        self.recompute_balance(map);
        debug!(
            target: "hexterra::colony",
            colony = self.id.0,
            %coords,
            building = self.catalog.get(kind).map_or("?", BuildingType::name),
            balance = %self.balance,
            "colony.building.added"
        );
        true
    }

    /// Balance the buildings would produce right now, without committing it.
    pub fn preview_balance(&self, map: &TileMap) -> ResourceVector {
        self.sweep(map).0
    }

    /// Rebuilds `active` flags and the balance from scratch.
    pub fn recompute_balance(&mut self, map: &TileMap) -> ResourceVector {
        let (balance, active) = self.sweep(map);
        for (building, active) in self.buildings.iter_mut().zip(active) {
            if building.active != active {
                debug!(
                    target: "hexterra::colony",
                    colony = self.id.0,
                    coords = %building.coords,
                    active,
                    "colony.building.toggled"
                );
            }
            building.active = active;
        }
        self.balance = balance;
        balance
    }

    /// Recomputes the balance and adds it to the stockpile.
    pub fn tick(&mut self, map: &TileMap) -> TickReport {
        let balance = self.recompute_balance(map);
        self.resources += balance;
        TickReport {
            balance,
            resources: self.resources,
            active: self.active_count(),
            inactive: self.inactive_count(),
        }
    }

    pub fn snapshot(&self) -> ColonySnapshot {
        ColonySnapshot {
            id: self.id,
            resources: self.resources,
            balance: self.balance,
            housing: self.housing(),
            tiles: self.tiles.len(),
            buildings: self
                .buildings
                .iter()
                .map(|b| BuildingSnapshot {
                    name: self
                        .building_type(b)
                        .map_or_else(String::new, |t| t.name().to_string()),
                    coords: b.coords,
                    active: b.active,
                })
                .collect(),
        }
    }

    /// Greedy sweep in placement order. A building missing infrastructure is
    /// inactive; otherwise it is active unless adding its net output would put
    /// the running balance into deficit.
    fn sweep(&self, map: &TileMap) -> (ResourceVector, Vec<bool>) {
        let mut balance = ResourceVector::ZERO;
        let mut active = Vec::with_capacity(self.buildings.len());
        for building in &self.buildings {
            let Some(kind) = self.catalog.get(building.kind) else {
                active.push(false);
                continue;
            };
            let connected = map.get(building.tile).is_some_and(|tile| {
                kind.needed_infrastructure().all(|infra| tile.has_infra(infra))
            });
            if !connected {
                active.push(false);
                continue;
            }
            let candidate = balance + kind.net();
            if candidate.deficit() {
                active.push(false);
            } else {
                balance = candidate;
                active.push(true);
            }
        }
        (balance, active)
    }

    fn register(&mut self, tile: TileId) {
        if self.tile_set.insert(tile) {
            self.tiles.push(tile);
        }
    }

    fn place(&mut self, map: &mut TileMap, id: TileId, kind: BuildingTypeId) {
        let index = self.buildings.len();
        let Some(tile) = map.get_mut(id) else {
            return;
        };
        if let Some(building) = self.catalog.get(kind) {
            for infra in building.needed_infrastructure() {
                tile.infrastructure.set(infra, true);
            }
        }
        tile.building = Some(BuildingId {
            colony: self.id,
            index,
        });
        tile.owner = Some(self.id);
        let coords = tile.coords;
        self.register(id);
        self.buildings.push(Building {
            kind,
            tile: id,
            coords,
            active: false,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::hexagonal_shape;
    use crate::resources::Resource;
    use crate::terrain::Terrain;

    fn flat_map() -> TileMap {
        hexagonal_shape(4, Terrain::Sand).unwrap()
    }

    fn money(amount: i64) -> ResourceVector {
        ResourceVector::of(&[(Resource::Money, amount)])
    }

    fn standard_colony(map: &mut TileMap, start: ResourceVector) -> Colony {
        Colony::found(
            ColonyId(0),
            Arc::new(BuildingCatalog::standard()),
            map,
            HexCoord::ORIGIN,
            start,
        )
        .unwrap()
    }

    #[test]
    fn founding_is_free_and_ticks_add_base_output() {
        let mut map = flat_map();
        let mut colony = standard_colony(&mut map, money(1000));
        assert_eq!(colony.resources(), money(1000));
        assert_eq!(colony.buildings().len(), 1);

        let tile = map.at(HexCoord::ORIGIN).unwrap();
        assert!(tile.is_occupied());
        assert_eq!(tile.owner, Some(ColonyId(0)));
        assert!(InfraKind::ALL.into_iter().all(|kind| tile.has_infra(kind)));

        let base_output = colony.catalog().by_name(BASE_BUILDING).unwrap().produces();
        let report = colony.tick(&map);
        assert_eq!(report.balance, base_output);
        assert_eq!(colony.resources(), money(1000) + base_output);
        assert_eq!(report.active, 1);
    }

    #[test]
    fn unaffordable_building_changes_nothing() {
        let mut map = flat_map();
        let mut colony = standard_colony(&mut map, money(1000));
        let fab = colony.catalog().id_of("electronics_fab").unwrap();
        let before = colony.resources();
        let target = HexCoord::new(1, 0);

        assert!(!colony.add_building(&mut map, target, fab));
        assert_eq!(colony.resources(), before);
        assert_eq!(colony.buildings().len(), 1);
        let tile = map.at(target).unwrap();
        assert!(!tile.is_occupied());
        assert!(tile.owner.is_none());
    }

    #[test]
    fn money_alone_can_block_a_building() {
        let target = HexCoord::new(1, 0);
        let plant = BuildingCatalog::standard().id_of("concrete_plant").unwrap();
        let stocked = |money| {
            ResourceVector::of(&[
                (Resource::Money, money),
                (Resource::Steel, 500),
                (Resource::Concrete, 500),
            ])
        };

        let mut map = flat_map();
        let mut colony = standard_colony(&mut map, stocked(0));
        let cost = colony.placement_cost(&map, target, plant).unwrap();
        let price = cost[Resource::Money];
        assert!(price > 0);

        let mut map = flat_map();
        let mut colony = standard_colony(&mut map, stocked(price - 1));
        let shortfall = colony.resources() - cost;
        assert_eq!(shortfall.deficits(), vec![Resource::Money]);
        assert_eq!(shortfall[Resource::Money], -1);
        assert!(!colony.add_building(&mut map, target, plant));
        assert_eq!(colony.resources(), stocked(price - 1));
        assert!(!map.at(target).unwrap().is_occupied());

        let mut map = flat_map();
        let mut colony = standard_colony(&mut map, stocked(price));
        assert!(colony.add_building(&mut map, target, plant));
        assert_eq!(colony.resources()[Resource::Money], 0);
    }

    #[test]
    fn building_pays_for_missing_infrastructure() {
        let mut map = flat_map();
        let start = money(1000).with(Resource::Steel, 50);
        let mut colony = standard_colony(&mut map, start);
        let solar = colony.catalog().id_of("solar_array").unwrap();
        let target = HexCoord::new(0, 1);

        let expected = colony.placement_cost(&map, target, solar).unwrap();
        let solar_type = colony.catalog().by_name("solar_array").unwrap();
        assert_eq!(
            expected,
            solar_type.cost() + colony.catalog().infra_cost(InfraKind::Wires)
        );
        assert!(colony.add_building(&mut map, target, solar));
        assert_eq!(colony.resources(), start - expected);
        assert!(map.at(target).unwrap().has_infra(InfraKind::Wires));
        assert!(colony.owns(map.id_of(target).unwrap()));
    }

    #[test]
    fn occupied_tile_is_refused() {
        let mut map = flat_map();
        let mut colony = standard_colony(&mut map, money(100_000));
        let spice = colony.catalog().id_of("spice_farm").unwrap();
        assert!(!colony.add_building(&mut map, HexCoord::ORIGIN, spice));
        assert_eq!(colony.resources(), money(100_000));
    }

    #[test]
    fn infrastructure_is_bought_once() {
        let mut map = flat_map();
        let mut colony = standard_colony(&mut map, money(1000).with(Resource::Concrete, 100));
        let coords = HexCoord::new(-1, 0);
        let cost = colony.catalog().infra_cost(InfraKind::Tunnels);

        assert!(colony.add_infrastructure(&mut map, coords, InfraKind::Tunnels));
        let after = colony.resources();
        assert_eq!(after, money(1000).with(Resource::Concrete, 100) - cost);
        assert!(!colony.add_infrastructure(&mut map, coords, InfraKind::Tunnels));
        assert_eq!(colony.resources(), after);
        assert_eq!(colony.tiles().len(), 2);
    }

    #[test]
    fn unaffordable_infrastructure_is_refused() {
        let mut map = flat_map();
        let mut colony = standard_colony(&mut map, money(10));
        let coords = HexCoord::new(-1, 0);
        assert!(!colony.add_infrastructure(&mut map, coords, InfraKind::Pipes));
        assert!(!map.at(coords).unwrap().has_infra(InfraKind::Pipes));
        assert_eq!(colony.resources(), money(10));
    }

    fn scarce_catalog() -> BuildingCatalog {
        let land = vec![Terrain::Sand];
        BuildingCatalog::new([
            BuildingType::new(
                BASE_BUILDING,
                ResourceVector::ZERO,
                ResourceVector::of(&[(Resource::Energy, 30)]),
                ResourceVector::ZERO,
                0,
                land.clone(),
            ),
            BuildingType::new(
                "smelter",
                money(10),
                ResourceVector::of(&[(Resource::Money, 5)]),
                ResourceVector::of(&[(Resource::Energy, 20)]),
                0,
                land.clone(),
            ),
            BuildingType::new(
                "forge",
                money(10),
                ResourceVector::of(&[(Resource::Money, 7)]),
                ResourceVector::of(&[(Resource::Energy, 20)]),
                0,
                land,
            ),
        ])
        .with_infra_cost(InfraKind::Wires, ResourceVector::ZERO)
    }

    #[test]
    fn earlier_buildings_win_scarce_resources() {
        let mut map = flat_map();
        let catalog = Arc::new(scarce_catalog());
        let smelter = catalog.id_of("smelter").unwrap();
        let forge = catalog.id_of("forge").unwrap();
        let mut colony =
            Colony::found(ColonyId(1), catalog, &mut map, HexCoord::ORIGIN, money(100)).unwrap();

        assert!(colony.add_building(&mut map, HexCoord::new(1, 0), smelter));
        assert!(colony.add_building(&mut map, HexCoord::new(0, 1), forge));
        let report = colony.tick(&map);

        let states: Vec<bool> = colony.buildings().iter().map(|b| b.active).collect();
        assert_eq!(states, vec![true, true, false]);
        assert_eq!(
            report.balance,
            ResourceVector::of(&[(Resource::Energy, 10), (Resource::Money, 5)])
        );
        assert_eq!(report.inactive, 1);
    }

    #[test]
    fn missing_infrastructure_deactivates() {
        let mut map = flat_map();
        let catalog = Arc::new(scarce_catalog());
        let smelter = catalog.id_of("smelter").unwrap();
        let mut colony =
            Colony::found(ColonyId(1), catalog, &mut map, HexCoord::ORIGIN, money(100)).unwrap();
        let coords = HexCoord::new(1, 0);
        assert!(colony.add_building(&mut map, coords, smelter));
        map.at_mut(coords).unwrap().infrastructure.set(InfraKind::Wires, false);

        assert_eq!(
            colony.preview_balance(&map),
            ResourceVector::of(&[(Resource::Energy, 30)])
        );
        colony.recompute_balance(&map);
        assert!(!colony.buildings()[1].active);
    }

    #[test]
    fn preview_does_not_touch_resources() {
        let mut map = flat_map();
        let colony = standard_colony(&mut map, money(1000));
        let preview = colony.preview_balance(&map);
        assert_eq!(preview, colony.balance());
        assert_eq!(colony.resources(), money(1000));
    }

    #[test]
    fn founding_needs_a_base_type() {
        let mut map = flat_map();
        let catalog = Arc::new(BuildingCatalog::new([]));
        assert!(matches!(
            Colony::found(ColonyId(0), catalog, &mut map, HexCoord::ORIGIN, money(1)),
            Err(ColonyError::MissingBaseType(_))
        ));
    }

    #[test]
    fn snapshot_lists_buildings_by_name() {
        let mut map = flat_map();
        let colony = standard_colony(&mut map, money(1000));
        let snapshot = colony.snapshot();
        assert_eq!(snapshot.buildings.len(), 1);
        assert_eq!(snapshot.buildings[0].name, BASE_BUILDING);
        assert!(snapshot.buildings[0].active);
        assert_eq!(snapshot.housing, 10);
    }
}
