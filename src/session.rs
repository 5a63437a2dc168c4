//! A generated map plus the colonies living on it.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::BuildingCatalog;
use crate::colony::{Colony, ColonySnapshot, TickReport};
use crate::config::GeneratorConfig;
use crate::error::{ActionError, ColonyError, GenerationError};
use crate::generator::{GenerationReport, WorldGenerator};
use crate::hex::HexCoord;
use crate::map::TileMap;
use crate::placement;
use crate::resources::ResourceVector;
use crate::terraform::TerraformPattern;
use crate::terrain::Terrain;
use crate::tile::{ColonyId, InfraKind};

pub struct SessionBuilder {
    config: GeneratorConfig,
    seed: u64,
    catalog: Option<Arc<BuildingCatalog>>,
}

impl SessionBuilder {
    pub fn new(config: GeneratorConfig, seed: u64) -> Self {
        Self {
            config,
            seed,
            catalog: None,
        }
    }

    pub fn with_catalog(mut self, catalog: Arc<BuildingCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Runs the standard generator and wraps the resulting map.
    pub fn generate(self) -> Result<Session, GenerationError> {
        let mut generator = WorldGenerator::standard(self.config, self.seed);
        let (map, report) = generator.generate()?;
        let catalog = self
            .catalog
            .unwrap_or_else(|| Arc::new(BuildingCatalog::standard()));
        let mut session = Session::new(map, catalog);
        session.generation = Some(report);
        Ok(session)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ColonyTick {
    pub colony: ColonyId,
    pub report: TickReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct TickSummary {
    pub tick: u64,
    pub colonies: Vec<ColonyTick>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub tick: u64,
    pub tiles: usize,
    pub terrain: BTreeMap<Terrain, usize>,
    pub altitude_range: Option<(i32, i32)>,
    pub colonies: Vec<ColonySnapshot>,
}

pub struct Session {
    map: TileMap,
    catalog: Arc<BuildingCatalog>,
    colonies: Vec<Colony>,
    tick: u64,
    generation: Option<GenerationReport>,
}

impl Session {
    pub fn new(map: TileMap, catalog: Arc<BuildingCatalog>) -> Self {
        Self {
            map,
            catalog,
            colonies: Vec::new(),
            tick: 0,
            generation: None,
        }
    }

    pub fn builder(config: GeneratorConfig, seed: u64) -> SessionBuilder {
        SessionBuilder::new(config, seed)
    }

    pub fn map(&self) -> &TileMap {
        &self.map
    }

    pub fn catalog(&self) -> &Arc<BuildingCatalog> {
        &self.catalog
    }

    pub fn generation_report(&self) -> Option<&GenerationReport> {
        self.generation.as_ref()
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn colonies(&self) -> &[Colony] {
        &self.colonies
    }

    pub fn colony(&self, id: ColonyId) -> Option<&Colony> {
        self.colonies.get(id.0 as usize)
    }

    pub fn found_colony(
        &mut self,
        base: HexCoord,
        resources: ResourceVector,
    ) -> Result<ColonyId, ColonyError> {
        let id = ColonyId(self.colonies.len() as u32);
        let colony = Colony::found(id, Arc::clone(&self.catalog), &mut self.map, base, resources)?;
        self.colonies.push(colony);
        Ok(id)
    }

    fn colony_index(&self, id: ColonyId) -> Result<usize, ActionError> {
        let index = id.0 as usize;
        if index < self.colonies.len() {
            Ok(index)
        } else {
            Err(ActionError::UnknownColony(id))
        }
    }

    /// Validates the site, then asks the colony to pay for and place the building.
    pub fn place_building(
        &mut self,
        colony: ColonyId,
        coords: HexCoord,
        building: &str,
    ) -> Result<(), ActionError> {
        let index = self.colony_index(colony)?;
        let kind = self
            .catalog
            .id_of(building)
            .ok_or_else(|| ActionError::UnknownBuilding(building.to_string()))?;
        let result = match self.catalog.get(kind) {
            Some(building_type) => placement::validate_building(&self.map, coords, building_type)
                .and_then(|_| {
                    if self.colonies[index].add_building(&mut self.map, coords, kind) {
                        Ok(())
                    } else {
                        Err(ActionError::Infeasible)
                    }
                }),
            None => Err(ActionError::UnknownBuilding(building.to_string())),
        };
        match &result {
            Ok(()) => info!(
                target: "hexterra::session",
                colony = colony.0,
                building,
                coords = %coords,
                "session.building.placed"
            ),
            Err(err) => warn!(
                target: "hexterra::session",
                colony = colony.0,
                building,
                coords = %coords,
                error = %err,
                "session.building.refused"
            ),
        }
        result
    }

    /// Places a building on the closest valid site within `radius` of `origin`.
    pub fn place_building_near(
        &mut self,
        colony: ColonyId,
        origin: HexCoord,
        radius: u32,
        building: &str,
    ) -> Result<HexCoord, ActionError> {
        self.colony_index(colony)?;
        let building_type = self
            .catalog
            .by_name(building)
            .ok_or_else(|| ActionError::UnknownBuilding(building.to_string()))?;
        let Some(coords) = placement::nearest_site(&self.map, building_type, origin, radius) else {
            warn!(
                target: "hexterra::session",
                colony = colony.0,
                building,
                origin = %origin,
                radius,
                "session.building.no_site"
            );
            return Err(ActionError::NoSite {
                building: building.to_string(),
                origin,
                radius,
            });
        };
        self.place_building(colony, coords, building)?;
        Ok(coords)
    }

    pub fn add_infrastructure(
        &mut self,
        colony: ColonyId,
        coords: HexCoord,
        kind: InfraKind,
    ) -> Result<(), ActionError> {
        let index = self.colony_index(colony)?;
        let result = placement::validate_infrastructure(&self.map, coords, kind).and_then(|_| {
            if self.colonies[index].add_infrastructure(&mut self.map, coords, kind) {
                Ok(())
            } else {
                Err(ActionError::Infeasible)
            }
        });
        if let Err(err) = &result {
            warn!(
                target: "hexterra::session",
                colony = colony.0,
                coords = %coords,
                %kind,
                error = %err,
                "session.infrastructure.refused"
            );
        }
        result
    }

    /// Applies a terraforming pattern. Altitude gaps may exceed the generator's
    /// limit afterwards; colony balances are refreshed since terrain changed.
    pub fn terraform(&mut self, pattern: &TerraformPattern, centre: HexCoord) -> usize {
        let applied = pattern.apply(&mut self.map, centre);
        for colony in &mut self.colonies {
            colony.recompute_balance(&self.map);
        }
        applied
    }

    /// One tick for every colony, in founding order.
    pub fn step(&mut self) -> TickSummary {
        self.tick += 1;
        let colonies = self
            .colonies
            .iter_mut()
            .map(|colony| ColonyTick {
                colony: colony.id(),
                report: colony.tick(&self.map),
            })
            .collect();
        TickSummary {
            tick: self.tick,
            colonies,
        }
    }

    pub fn run(&mut self, ticks: u64) -> Vec<TickSummary> {
        self.run_with_hook(ticks, |_, _| {})
    }

    /// Runs `ticks` steps, calling `hook` after each one.
    pub fn run_with_hook<F>(&mut self, ticks: u64, mut hook: F) -> Vec<TickSummary>
    where
        F: FnMut(&mut Session, &TickSummary),
    {
        let mut summaries = Vec::with_capacity(ticks as usize);
        for _ in 0..ticks {
            let summary = self.step();
            hook(self, &summary);
            summaries.push(summary);
        }
        info!(
            target: "hexterra::session",
            ticks,
            tick = self.tick,
            colonies = self.colonies.len(),
            "session.run.done"
        );
        summaries
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            tick: self.tick,
            tiles: self.map.len(),
            terrain: self.map.terrain_counts(),
            altitude_range: self.map.altitude_range(),
            colonies: self.colonies.iter().map(Colony::snapshot).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::hexagonal_shape;
    use crate::resources::Resource;
    use crate::terraform::Operation;

    fn flat_session() -> Session {
        let map = hexagonal_shape(5, Terrain::Sand).unwrap();
        Session::new(map, Arc::new(BuildingCatalog::standard()))
    }

    fn rich() -> ResourceVector {
        ResourceVector::of(&[
            (Resource::Money, 10_000),
            (Resource::Steel, 500),
            (Resource::Concrete, 500),
            (Resource::Glass, 100),
        ])
    }

    #[test]
    fn actions_are_validated_before_paying() {
        let mut session = flat_session();
        let colony = session.found_colony(HexCoord::ORIGIN, rich()).unwrap();
        assert_eq!(
            session.place_building(colony, HexCoord::ORIGIN, "solar_array"),
            Err(ActionError::Occupied(HexCoord::ORIGIN))
        );
        assert!(matches!(
            session.place_building(colony, HexCoord::new(1, 0), "spice_farm"),
            Err(ActionError::TerrainNotAllowed { .. })
        ));
        assert_eq!(
            session.place_building(colony, HexCoord::new(1, 0), "space_elevator"),
            Err(ActionError::UnknownBuilding("space_elevator".into()))
        );
        assert_eq!(
            session.place_building(ColonyId(9), HexCoord::new(1, 0), "solar_array"),
            Err(ActionError::UnknownColony(ColonyId(9)))
        );
        assert_eq!(session.colony(colony).unwrap().resources(), rich());
    }

    #[test]
    fn poor_colony_gets_infeasible() {
        let mut session = flat_session();
        let colony = session
            .found_colony(HexCoord::ORIGIN, ResourceVector::of(&[(Resource::Money, 5)]))
            .unwrap();
        assert_eq!(
            session.place_building(colony, HexCoord::new(1, 0), "solar_array"),
            Err(ActionError::Infeasible)
        );
        assert_eq!(
            session.add_infrastructure(colony, HexCoord::new(1, 0), InfraKind::Wires),
            Err(ActionError::Infeasible)
        );
    }

    #[test]
    fn duplicate_infrastructure_is_reported() {
        let mut session = flat_session();
        let colony = session.found_colony(HexCoord::ORIGIN, rich()).unwrap();
        assert_eq!(
            session.add_infrastructure(colony, HexCoord::ORIGIN, InfraKind::Pipes),
            Err(ActionError::AlreadyPresent {
                coords: HexCoord::ORIGIN,
                kind: InfraKind::Pipes
            })
        );
    }

    #[test]
    fn run_ticks_every_colony_and_calls_hook() {
        let mut session = flat_session();
        session.found_colony(HexCoord::ORIGIN, rich()).unwrap();
        session.found_colony(HexCoord::new(3, 0), rich()).unwrap();
        let mut seen = Vec::new();
        let summaries = session.run_with_hook(3, |session, summary| {
            seen.push((summary.tick, session.current_tick()));
        });
        assert_eq!(summaries.len(), 3);
        assert_eq!(seen, vec![(1, 1), (2, 2), (3, 3)]);
        assert!(summaries.iter().all(|s| s.colonies.len() == 2));

        let base = session.catalog().by_name("base").unwrap().produces();
        let colony = session.colony(ColonyId(1)).unwrap();
        assert_eq!(colony.resources(), rich() + base + base + base);
    }

    #[test]
    fn place_near_finds_a_free_site() {
        let mut session = flat_session();
        let colony = session.found_colony(HexCoord::ORIGIN, rich()).unwrap();
        let coords = session
            .place_building_near(colony, HexCoord::ORIGIN, 3, "solar_array")
            .unwrap();
        assert_eq!(coords.distance(HexCoord::ORIGIN), 1);
        assert_eq!(session.colony(colony).unwrap().buildings().len(), 2);
    }

    #[test]
    fn place_near_without_a_site_names_the_search() {
        let mut session = flat_session();
        let colony = session.found_colony(HexCoord::ORIGIN, rich()).unwrap();
        assert_eq!(
            session.place_building_near(colony, HexCoord::ORIGIN, 3, "spice_farm"),
            Err(ActionError::NoSite {
                building: "spice_farm".into(),
                origin: HexCoord::ORIGIN,
                radius: 3,
            })
        );
        assert_eq!(session.colony(colony).unwrap().resources(), rich());
    }

    #[test]
    fn terraforming_changes_the_shared_map() {
        let mut session = flat_session();
        let pattern = TerraformPattern::new(Some(Operation::Comet), [None; 6]);
        assert_eq!(session.terraform(&pattern, HexCoord::new(2, 0)), 1);
        assert_eq!(
            session.map().at(HexCoord::new(2, 0)).unwrap().terrain,
            Terrain::Ice
        );
    }

    #[test]
    fn generated_session_reports_phases() {
        let config = GeneratorConfig::standard().with_radius(8);
        let session = Session::builder(config, 99).generate().unwrap();
        let report = session.generation_report().unwrap();
        assert_eq!(report.tile_count, session.map().len());
        assert_eq!(session.summary().tiles, session.map().len());
    }
}
