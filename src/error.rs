use thiserror::Error;

use crate::hex::HexCoord;
use crate::terrain::Terrain;
use crate::tile::{ColonyId, Deposit, InfraKind};

/// Generator configuration rejected before generation starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("`{field}` must be at least {min}, got {value}")]
    TooSmall {
        field: &'static str,
        min: f64,
        value: f64,
    },
    #[error("`{field}` must lie in [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("ridge length range is empty: min {min} > max {max}")]
    EmptyRidgeRange { min: u32, max: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("tile at {0} already exists")]
    DuplicateCoordinate(HexCoord),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    #[error("invalid generator configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Map(#[from] MapError),
    #[error("phase `{phase}` needs a populated map")]
    EmptyMap { phase: String },
    #[error("altitude relaxation did not settle within {passes} passes")]
    RelaxationDidNotConverge { passes: u32 },
    #[error("ridge {ridge}: no feasible path found after {attempts} attempts")]
    RidgeEndpointNotFound { ridge: usize, attempts: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColonyError {
    #[error("catalog has no `{0}` building to found a colony with")]
    MissingBaseType(String),
    #[error("base tile {0} is not on the map")]
    UnknownTile(HexCoord),
    #[error("base tile {0} already holds a building")]
    Occupied(HexCoord),
}

/// Why a requested build action was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("no colony with id {0:?}")]
    UnknownColony(ColonyId),
    #[error("no tile at {0}")]
    UnknownTile(HexCoord),
    #[error("no building type named `{0}`")]
    UnknownBuilding(String),
    #[error("tile {0} already holds a building")]
    Occupied(HexCoord),
    #[error("`{building}` cannot be built on {terrain}")]
    TerrainNotAllowed { building: String, terrain: Terrain },
    #[error("`{building}` needs a {deposit:?} deposit")]
    MissingDeposit { building: String, deposit: Deposit },
    #[error("tile {coords} already has {kind}")]
    AlreadyPresent { coords: HexCoord, kind: InfraKind },
    #[error("no site for `{building}` within {radius} of {origin}")]
    NoSite {
        building: String,
        origin: HexCoord,
        radius: u32,
    },
    #[error("not enough resources")]
    Infeasible,
}
