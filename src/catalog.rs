//! Building and infrastructure definitions.
//!
//! The catalog is built once at startup and shared read-only afterwards.

use std::collections::HashMap;

use serde::Deserialize;

use crate::resources::{Resource, ResourceVector};
use crate::terrain::Terrain;
use crate::tile::{Deposit, InfraKind};

/// Name of the building every colony is founded with.
pub const BASE_BUILDING: &str = "base";

const LAND: &[Terrain] = &[
    Terrain::Sand,
    Terrain::Soil,
    Terrain::Rough,
    Terrain::Rocky,
    Terrain::Mountain,
];

#[derive(Debug, Clone, Copy)]
struct BuildingDef {
    name: &'static str,
    cost: &'static [(Resource, i64)],
    produces: &'static [(Resource, i64)],
    consumes: &'static [(Resource, i64)],
    housing: u32,
    terrain: &'static [Terrain],
    deposit: Option<Deposit>,
}

const STANDARD_BUILDINGS: &[BuildingDef] = &[
    BuildingDef {
        name: BASE_BUILDING,
        cost: &[],
        produces: &[
            (Resource::Energy, 100),
            (Resource::Water, 10),
            (Resource::Food, 10),
            (Resource::Concrete, 5),
        ],
        consumes: &[],
        housing: 10,
        terrain: LAND,
        deposit: None,
    },
    BuildingDef {
        name: "solar_array",
        cost: &[(Resource::Money, 150), (Resource::Steel, 10)],
        produces: &[(Resource::Energy, 40)],
        consumes: &[],
        housing: 0,
        terrain: &[Terrain::Sand, Terrain::Soil, Terrain::Rough, Terrain::Rocky],
        deposit: None,
    },
    BuildingDef {
        name: "water_extractor",
        cost: &[(Resource::Money, 120), (Resource::Steel, 5)],
        produces: &[(Resource::Water, 30)],
        consumes: &[(Resource::Energy, 10)],
        housing: 0,
        terrain: &[Terrain::Ice, Terrain::Water, Terrain::Soil, Terrain::Sand],
        deposit: None,
    },
    BuildingDef {
        name: "greenhouse",
        cost: &[(Resource::Money, 200), (Resource::Glass, 10)],
        produces: &[(Resource::Food, 20)],
        consumes: &[(Resource::Water, 10), (Resource::Energy, 10)],
        housing: 0,
        terrain: &[Terrain::Soil, Terrain::Sand],
        deposit: None,
    },
    BuildingDef {
        name: "habitat",
        cost: &[(Resource::Money, 300), (Resource::Concrete, 40)],
        produces: &[],
        consumes: &[
            (Resource::Energy, 15),
            (Resource::Water, 10),
            (Resource::Food, 10),
        ],
        housing: 20,
        terrain: &[Terrain::Sand, Terrain::Soil, Terrain::Rough, Terrain::Rocky],
        deposit: None,
    },
    BuildingDef {
        name: "mine",
        cost: &[(Resource::Money, 250), (Resource::Steel, 20)],
        produces: &[(Resource::Minerals, 20)],
        consumes: &[(Resource::Energy, 20)],
        housing: 0,
        terrain: &[Terrain::Rocky, Terrain::Mountain, Terrain::Rough],
        deposit: Some(Deposit::Ore),
    },
    BuildingDef {
        name: "glassworks",
        cost: &[(Resource::Money, 200), (Resource::Concrete, 20)],
        produces: &[(Resource::Glass, 10)],
        consumes: &[(Resource::Energy, 25)],
        housing: 0,
        terrain: &[Terrain::Sand, Terrain::Soil],
        deposit: Some(Deposit::Silica),
    },
    BuildingDef {
        name: "concrete_plant",
        cost: &[(Resource::Money, 180)],
        produces: &[(Resource::Concrete, 20)],
        consumes: &[
            (Resource::Energy, 15),
            (Resource::Water, 5),
            (Resource::Minerals, 5),
        ],
        housing: 0,
        terrain: &[Terrain::Sand, Terrain::Rough, Terrain::Rocky],
        deposit: None,
    },
    BuildingDef {
        name: "steel_mill",
        cost: &[(Resource::Money, 350), (Resource::Concrete, 30)],
        produces: &[(Resource::Steel, 10)],
        consumes: &[(Resource::Energy, 30), (Resource::Minerals, 10)],
        housing: 0,
        terrain: &[Terrain::Rocky, Terrain::Rough],
        deposit: None,
    },
    BuildingDef {
        name: "electronics_fab",
        cost: &[
            (Resource::Money, 500),
            (Resource::Steel, 20),
            (Resource::Glass, 10),
        ],
        produces: &[(Resource::Electronics, 5)],
        consumes: &[
            (Resource::Energy, 25),
            (Resource::Glass, 2),
            (Resource::Steel, 2),
        ],
        housing: 0,
        terrain: &[Terrain::Sand, Terrain::Soil, Terrain::Rough],
        deposit: None,
    },
    BuildingDef {
        name: "spice_farm",
        cost: &[(Resource::Money, 150)],
        produces: &[(Resource::Spices, 5)],
        consumes: &[(Resource::Water, 10), (Resource::Energy, 5)],
        housing: 0,
        terrain: &[Terrain::Soil],
        deposit: None,
    },
    BuildingDef {
        name: "trade_post",
        cost: &[(Resource::Money, 250), (Resource::Concrete, 20)],
        produces: &[(Resource::Money, 50)],
        consumes: &[(Resource::Spices, 5), (Resource::Electronics, 2)],
        housing: 0,
        terrain: &[Terrain::Sand, Terrain::Soil, Terrain::Rough],
        deposit: None,
    },
];

fn standard_infra_cost(kind: InfraKind) -> ResourceVector {
    match kind {
        InfraKind::Tunnels => {
            ResourceVector::of(&[(Resource::Money, 50), (Resource::Concrete, 20)])
        }
        InfraKind::Wires => ResourceVector::of(&[(Resource::Money, 20), (Resource::Steel, 5)]),
        InfraKind::Pipes => ResourceVector::of(&[(Resource::Money, 30), (Resource::Steel, 10)]),
    }
}

/// Deserializable description of a building type.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildingSpec {
    pub name: String,
    #[serde(default)]
    pub cost: ResourceVector,
    #[serde(default)]
    pub produces: ResourceVector,
    #[serde(default)]
    pub consumes: ResourceVector,
    #[serde(default)]
    pub housing: u32,
    #[serde(default = "default_terrain_allowed")]
    pub terrain_allowed: Vec<Terrain>,
    #[serde(default)]
    pub requires_deposit: Option<Deposit>,
}

fn default_terrain_allowed() -> Vec<Terrain> {
    LAND.to_vec()
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildingType {
    name: String,
    cost: ResourceVector,
    produces: ResourceVector,
    consumes: ResourceVector,
    housing: u32,
    terrain_allowed: Vec<Terrain>,
    requires_deposit: Option<Deposit>,
    needs: [bool; 3],
}

impl BuildingType {
    pub fn new(
        name: impl Into<String>,
        cost: ResourceVector,
        produces: ResourceVector,
        consumes: ResourceVector,
        housing: u32,
        terrain_allowed: Vec<Terrain>,
    ) -> Self {
        let touches = |resource: Resource| produces.touches(resource) || consumes.touches(resource);
        let housed = housing > 0;
        let mut needs = [false; 3];
        needs[InfraKind::Wires.index()] = housed || touches(Resource::Energy);
        needs[InfraKind::Pipes.index()] = housed || touches(Resource::Water);
        needs[InfraKind::Tunnels.index()] =
            housed || Resource::BULK.into_iter().any(touches);
        Self {
            name: name.into(),
            cost,
            produces,
            consumes,
            housing,
            terrain_allowed,
            requires_deposit: None,
            needs,
        }
    }

    pub fn with_deposit(mut self, deposit: Deposit) -> Self {
        self.requires_deposit = Some(deposit);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cost(&self) -> ResourceVector {
        self.cost
    }

    pub fn produces(&self) -> ResourceVector {
        self.produces
    }

    pub fn consumes(&self) -> ResourceVector {
        self.consumes
    }

    /// Contribution to the balance while active.
    pub fn net(&self) -> ResourceVector {
        self.produces - self.consumes
    }

    pub fn housing(&self) -> u32 {
        self.housing
    }

    pub fn terrain_allowed(&self) -> &[Terrain] {
        &self.terrain_allowed
    }

    pub fn allows(&self, terrain: Terrain) -> bool {
        self.terrain_allowed.contains(&terrain)
    }

    pub fn requires_deposit(&self) -> Option<Deposit> {
        self.requires_deposit
    }

    pub fn needs(&self, kind: InfraKind) -> bool {
        self.needs[kind.index()]
    }

    pub fn needed_infrastructure(&self) -> impl Iterator<Item = InfraKind> + '_ {
        InfraKind::ALL.into_iter().filter(|kind| self.needs(*kind))
    }
}

impl From<BuildingSpec> for BuildingType {
    fn from(spec: BuildingSpec) -> Self {
        let building = BuildingType::new(
            spec.name,
            spec.cost,
            spec.produces,
            spec.consumes,
            spec.housing,
            spec.terrain_allowed,
        );
        match spec.requires_deposit {
            Some(deposit) => building.with_deposit(deposit),
            None => building,
        }
    }
}

impl BuildingDef {
    fn build(&self) -> BuildingType {
        let building = BuildingType::new(
            self.name,
            ResourceVector::of(self.cost),
            ResourceVector::of(self.produces),
            ResourceVector::of(self.consumes),
            self.housing,
            self.terrain.to_vec(),
        );
        match self.deposit {
            Some(deposit) => building.with_deposit(deposit),
            None => building,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BuildingTypeId(usize);

#[derive(Debug, Clone)]
pub struct BuildingCatalog {
    types: Vec<BuildingType>,
    by_name: HashMap<String, BuildingTypeId>,
    infra_costs: [ResourceVector; 3],
}

impl BuildingCatalog {
    /// Catalog over `types`; a later type replaces an earlier one with the same name.
    pub fn new(types: impl IntoIterator<Item = BuildingType>) -> Self {
        let mut catalog = Self {
            types: Vec::new(),
            by_name: HashMap::new(),
            infra_costs: InfraKind::ALL.map(standard_infra_cost),
        };
        for building in types {
            catalog.insert(building);
        }
        catalog
    }

    pub fn standard() -> Self {
        Self::new(STANDARD_BUILDINGS.iter().map(BuildingDef::build))
    }

    pub fn with_infra_cost(mut self, kind: InfraKind, cost: ResourceVector) -> Self {
        self.infra_costs[kind.index()] = cost;
        self
    }

    fn insert(&mut self, building: BuildingType) {
        match self.by_name.get(building.name()) {
            Some(id) => self.types[id.0] = building,
            None => {
                let id = BuildingTypeId(self.types.len());
                self.by_name.insert(building.name().to_string(), id);
                self.types.push(building);
            }
        }
    }

    pub fn id_of(&self, name: &str) -> Option<BuildingTypeId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: BuildingTypeId) -> Option<&BuildingType> {
        self.types.get(id.0)
    }

    pub fn by_name(&self, name: &str) -> Option<&BuildingType> {
        self.id_of(name).and_then(|id| self.get(id))
    }

    pub fn infra_cost(&self, kind: InfraKind) -> ResourceVector {
        self.infra_costs[kind.index()]
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BuildingTypeId, &BuildingType)> {
        self.types
            .iter()
            .enumerate()
            .map(|(index, building)| (BuildingTypeId(index), building))
    }
}

impl Default for BuildingCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
