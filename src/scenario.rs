use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::warn;

use crate::catalog::{BuildingCatalog, BuildingSpec, BuildingType};
use crate::config::GeneratorConfig;
use crate::hex::HexCoord;
use crate::resources::ResourceVector;
use crate::session::{Session, TickSummary};
use crate::tile::{ColonyId, InfraKind};

fn default_ticks() -> u64 {
    24
}

fn default_search_radius() -> u32 {
    6
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub seed: u64,
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// Extra or replacement building types layered over the standard catalog.
    #[serde(default)]
    pub buildings: Vec<BuildingSpec>,
    pub colonies: Vec<ScenarioColony>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioColony {
    #[serde(default)]
    pub base: HexCoord,
    #[serde(default)]
    pub resources: ResourceVector,
    #[serde(default)]
    pub orders: Vec<BuildOrder>,
}

/// Something a colony does before the given tick.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum BuildOrder {
    /// Without `at`, the closest valid site to the colony base is used.
    Building {
        name: String,
        #[serde(default)]
        at: Option<HexCoord>,
        #[serde(default)]
        tick: u64,
    },
    Infrastructure {
        kind: InfraKind,
        at: HexCoord,
        #[serde(default)]
        tick: u64,
    },
}

impl BuildOrder {
    pub fn tick(&self) -> u64 {
        match self {
            BuildOrder::Building { tick, .. } | BuildOrder::Infrastructure { tick, .. } => *tick,
        }
    }
}

/// Outcome of playing a scenario through.
#[derive(Debug, Clone)]
pub struct ScenarioRun {
    pub summaries: Vec<TickSummary>,
    pub executed: usize,
    pub refused: usize,
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        scenario
            .validate()
            .with_context(|| format!("Invalid scenario {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    pub fn catalog(&self) -> BuildingCatalog {
        let standard = BuildingCatalog::standard();
        let extra = self.buildings.iter().cloned().map(BuildingType::from);
        BuildingCatalog::new(standard.iter().map(|(_, b)| b.clone()).chain(extra))
    }

    pub fn validate(&self) -> Result<()> {
        self.generator.validate()?;
        if self.colonies.is_empty() {
            bail!("scenario `{}` founds no colonies", self.name);
        }
        let catalog = self.catalog();
        for (index, colony) in self.colonies.iter().enumerate() {
            for order in &colony.orders {
                if let BuildOrder::Building { name, .. } = order {
                    if catalog.id_of(name).is_none() {
                        bail!("colony {index} orders unknown building `{name}`");
                    }
                }
            }
        }
        Ok(())
    }

    pub fn ticks(&self, override_ticks: Option<u64>) -> u64 {
        override_ticks.unwrap_or(self.ticks)
    }

    /// Generates the map and founds every colony.
    pub fn build_session(&self) -> Result<Session> {
        let mut session = Session::builder(self.generator.clone(), self.seed)
            .with_catalog(Arc::new(self.catalog()))
            .generate()
            .with_context(|| format!("Failed to generate map for `{}`", self.name))?;
        for colony in &self.colonies {
            session
                .found_colony(colony.base, colony.resources)
                .with_context(|| format!("Failed to found colony at {}", colony.base))?;
        }
        Ok(session)
    }

    /// Executes every order scheduled for `tick`; returns (executed, refused).
    pub fn issue_orders(&self, session: &mut Session, tick: u64) -> (usize, usize) {
        let mut executed = 0;
        let mut refused = 0;
        for (index, colony) in self.colonies.iter().enumerate() {
            let id = ColonyId(index as u32);
            for order in colony.orders.iter().filter(|order| order.tick() == tick) {
                let outcome = match order {
                    BuildOrder::Building { name, at: Some(at), .. } => {
                        session.place_building(id, *at, name)
                    }
                    BuildOrder::Building { name, at: None, .. } => session
                        .place_building_near(id, colony.base, default_search_radius(), name)
                        .map(|_| ()),
                    BuildOrder::Infrastructure { kind, at, .. } => {
                        session.add_infrastructure(id, *at, *kind)
                    }
                };
                match outcome {
                    Ok(()) => executed += 1,
                    Err(err) => {
                        warn!(
                            target: "hexterra::session",
                            colony = index,
                            tick,
                            error = %err,
                            "scenario.order.refused"
                        );
                        refused += 1;
                    }
                }
            }
        }
        (executed, refused)
    }

    /// Issues orders as their tick comes up while running `ticks` steps.
    pub fn play(&self, session: &mut Session, ticks: u64) -> ScenarioRun {
        let start = session.current_tick();
        let (mut executed, mut refused) = self.issue_orders(session, start);
        let summaries = session.run_with_hook(ticks, |session, summary| {
            let (ok, failed) = self.issue_orders(session, summary.tick);
            executed += ok;
            refused += failed;
        });
        ScenarioRun {
            summaries,
            executed,
            refused,
        }
    }
}
