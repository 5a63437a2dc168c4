use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::prelude::*;

use hexterra::{scenario::ScenarioLoader, session::SessionSummary};

#[derive(Debug, Parser)]
#[command(author, version, about = "Generate a hex world and run its colonies")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/standard.yaml")]
    scenario: PathBuf,

    /// Override the scenario seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override tick count (uses scenario default when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Override the map radius
    #[arg(long)]
    radius: Option<u32>,
}

#[derive(Serialize)]
struct RunOutput<'a> {
    scenario: &'a str,
    seed: u64,
    orders_executed: usize,
    orders_refused: usize,
    #[serde(flatten)]
    summary: SessionSummary,
}

fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let mut scenario = loader.load(&cli.scenario)?;
    if let Some(seed) = cli.seed {
        scenario.seed = seed;
    }
    if let Some(radius) = cli.radius {
        scenario.generator.radius = radius;
        scenario
            .validate()
            .context("Radius override makes the scenario invalid")?;
    }
    let ticks = scenario.ticks(cli.ticks);

    let mut session = scenario.build_session()?;
    let run = scenario.play(&mut session, ticks);
    info!(
        target: "hexterra::session",
        scenario = %scenario.name,
        ticks,
        executed = run.executed,
        refused = run.refused,
        "scenario.done"
    );

    let output = RunOutput {
        scenario: &scenario.name,
        seed: scenario.seed,
        orders_executed: run.executed,
        orders_refused: run.refused,
        summary: session.summary(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
