use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hex::HexCoord;
use crate::terrain::Terrain;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColonyId(pub u32);

/// A building slot inside a colony, in placement order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildingId {
    pub colony: ColonyId,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfraKind {
    Tunnels,
    Wires,
    Pipes,
}

impl InfraKind {
    pub const ALL: [InfraKind; 3] = [InfraKind::Tunnels, InfraKind::Wires, InfraKind::Pipes];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            InfraKind::Tunnels => "tunnels",
            InfraKind::Wires => "wires",
            InfraKind::Pipes => "pipes",
        }
    }
}

impl fmt::Display for InfraKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-kind infrastructure flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Infrastructure([bool; 3]);

impl Infrastructure {
    pub fn has(&self, kind: InfraKind) -> bool {
        self.0[kind.index()]
    }

    pub fn set(&mut self, kind: InfraKind, present: bool) {
        self.0[kind.index()] = present;
    }

    pub fn kinds(&self) -> impl Iterator<Item = InfraKind> + '_ {
        InfraKind::ALL.into_iter().filter(|kind| self.has(*kind))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Deposit {
    Ore,
    Silica,
    Gold,
}

impl Deposit {
    pub const ALL: [Deposit; 3] = [Deposit::Ore, Deposit::Silica, Deposit::Gold];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Terrain kinds a deposit can form under.
    pub fn hosts(self) -> &'static [Terrain] {
        match self {
            Deposit::Ore => &[Terrain::Rocky, Terrain::Mountain, Terrain::Rough],
            Deposit::Silica => &[Terrain::Sand, Terrain::Soil],
            Deposit::Gold => &[Terrain::Mountain],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposits([bool; 3]);

impl Deposits {
    pub fn has(&self, deposit: Deposit) -> bool {
        self.0[deposit.index()]
    }

    pub fn set(&mut self, deposit: Deposit, present: bool) {
        self.0[deposit.index()] = present;
    }

    pub fn any(&self) -> bool {
        self.0.iter().any(|present| *present)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub coords: HexCoord,
    pub terrain: Terrain,
    pub altitude: i32,
    pub building: Option<BuildingId>,
    pub owner: Option<ColonyId>,
    pub infrastructure: Infrastructure,
    pub deposits: Deposits,
}

impl Tile {
    pub fn new(coords: HexCoord, terrain: Terrain, altitude: i32) -> Self {
        Self {
            coords,
            terrain,
            altitude,
            building: None,
            owner: None,
            infrastructure: Infrastructure::default(),
            deposits: Deposits::default(),
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.building.is_some()
    }

    pub fn has_infra(&self, kind: InfraKind) -> bool {
        self.infrastructure.has(kind)
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {} (alt {})", self.terrain, self.coords, self.altitude)?;
        for kind in self.infrastructure.kinds() {
            write!(f, " {kind}")?;
        }
        Ok(())
    }
}
