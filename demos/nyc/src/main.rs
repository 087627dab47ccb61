//! nyc: ride-hailing dispatch over the NYC road network.
//!
//! Reads `node_data.json`, `edges.csv`, `drivers.csv` and `passengers.csv`
//! from a data directory, anchors drivers and passengers to road nodes,
//! matches every request in time order and prints the run summary.
//!
//! ```text
//! cargo run --release -p nyc -- --data-dir ./data --algorithm astar
//! RUST_LOG=rh_dispatch=debug cargo run -p nyc -- --data-dir ./data --rides-out rides.csv
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use rh_dispatch::{
    DispatchBuilder, DispatchConfig, DropoutPolicy, NoopObserver, Driver, Passenger, run_batch,
    snap_drivers, snap_passengers,
};
use rh_io::{RideLogWriter, Summary, load_dataset};
use rh_spatial::{
    AStarRouter, DEFAULT_PARTITIONS, DijkstraRouter, ExactLocator, GridIndex, NodeLocator,
    RoadNetwork, Router,
};

// ── CLI definition ────────────────────────────────────────────────────────────

#[derive(Copy, Clone, ValueEnum)]
enum Algorithm {
    Dijkstra,
    Astar,
}

#[derive(Copy, Clone, ValueEnum)]
enum Locator {
    /// Bucket grid, nearest node in the first non-empty ring
    Grid,
    /// R-tree, true nearest node
    Exact,
}

#[derive(Parser)]
#[command(name = "nyc", about = "Simulate ride-hailing dispatch over a road network")]
struct Cli {
    /// Directory holding node_data.json, edges.csv, drivers.csv, passengers.csv
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// JSON file with a dispatch config (`{"seed": 42, "dropout": ...}`)
    #[arg(long)]
    config: Option<PathBuf>,

    /// RNG seed; overrides the config file
    #[arg(long)]
    seed: Option<u64>,

    /// Mean rides per driver before dropping out; 0 disables dropout
    #[arg(long)]
    expected_rides: Option<u32>,

    /// Spatial grid partition count
    #[arg(long, default_value_t = DEFAULT_PARTITIONS)]
    partitions: usize,

    #[arg(long, value_enum, default_value_t = Algorithm::Dijkstra)]
    algorithm: Algorithm,

    #[arg(long, value_enum, default_value_t = Locator::Grid)]
    locator: Locator,

    /// Independent runs with consecutive seeds; more than 1 skips the ride log
    #[arg(long, default_value_t = 1)]
    runs: u64,

    /// Write one CSV row per completed ride
    #[arg(long)]
    rides_out: Option<PathBuf>,
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = dispatch_config(&cli)?;
    let start = Instant::now();

    // 1. Load records.
    let data = load_dataset(&cli.data_dir)
        .with_context(|| format!("loading dataset from {}", cli.data_dir.display()))?;

    // 2. Build road network and locator.
    let t = Instant::now();
    let network = Arc::new(RoadNetwork::from_records(&data.nodes, &data.edges)?);
    let locator: Box<dyn NodeLocator> = match cli.locator {
        Locator::Grid => Box::new(GridIndex::build(&network, cli.partitions)?),
        Locator::Exact => Box::new(ExactLocator::build(&network)),
    };
    info!(
        nodes = network.node_count(),
        edges = network.edge_count(),
        elapsed_ms = t.elapsed().as_millis() as u64,
        "network ready"
    );

    // 3. Anchor drivers and passengers.
    let t = Instant::now();
    let drivers = snap_drivers(&data.drivers, &*locator)?;
    let passengers = snap_passengers(&data.passengers, &*locator)?;
    info!(
        drivers = drivers.len(),
        passengers = passengers.len(),
        elapsed_ms = t.elapsed().as_millis() as u64,
        "fleet snapped"
    );

    // 4. Dispatch.
    let run = Run { network, drivers, passengers, config, runs: cli.runs, rides_out: cli.rides_out.as_deref() };
    match cli.algorithm {
        Algorithm::Dijkstra => run.execute(DijkstraRouter)?,
        Algorithm::Astar => run.execute(AStarRouter)?,
    }

    info!(elapsed_s = start.elapsed().as_secs_f64(), "simulation runtime");
    Ok(())
}

fn dispatch_config(cli: &Cli) -> Result<DispatchConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => DispatchConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    match cli.expected_rides {
        Some(0) => config.dropout = DropoutPolicy::Never,
        Some(expected_rides) => config.dropout = DropoutPolicy::Geometric { expected_rides },
        None => {}
    }
    Ok(config)
}

// ── Dispatch runs ─────────────────────────────────────────────────────────────

struct Run<'a> {
    network:    Arc<RoadNetwork>,
    drivers:    Vec<Driver>,
    passengers: Vec<Passenger>,
    config:     DispatchConfig,
    runs:       u64,
    rides_out:  Option<&'a Path>,
}

impl Run<'_> {
    fn execute<R: Router + Clone>(self, router: R) -> Result<()> {
        if self.runs > 1 {
            return self.execute_batch(router);
        }

        let mut dispatcher = DispatchBuilder::new(Arc::clone(&self.network), router)
            .config(self.config)
            .drivers(self.drivers)
            .passengers(self.passengers)
            .build()?;

        let t = Instant::now();
        let outcome = match self.rides_out {
            Some(path) => {
                let mut log = RideLogWriter::create(path, self.network)
                    .with_context(|| format!("creating ride log {}", path.display()))?;
                let outcome = dispatcher.run(&mut log);
                if let Some(e) = log.take_error() {
                    eprintln!("ride log error: {e}");
                }
                outcome
            }
            None => dispatcher.run(&mut NoopObserver),
        };
        info!(elapsed_ms = t.elapsed().as_millis() as u64, "dispatch finished");

        println!("{}", Summary::from_outcome(&outcome));
        Ok(())
    }

    fn execute_batch<R: Router + Clone>(self, router: R) -> Result<()> {
        let seeds: Vec<u64> = (0..self.runs).map(|i| self.config.seed.wrapping_add(i)).collect();
        let t = Instant::now();
        let outcomes = run_batch(&self.network, &router, &self.drivers, &self.passengers, self.config, &seeds)?;
        info!(runs = outcomes.len(), elapsed_ms = t.elapsed().as_millis() as u64, "batch finished");

        println!("{:<10} {:>8} {:>12} {:>12} {:>12}", "Seed", "Rides", "Avg wait", "Avg idle", "Avg profit");
        println!("{}", "-".repeat(58));
        for (seed, outcome) in seeds.iter().zip(&outcomes) {
            let s = Summary::from_outcome(outcome);
            println!(
                "{:<10} {:>8} {:>12} {:>12} {:>12}",
                seed,
                s.rides,
                fmt_minutes(s.average_passenger_wait),
                fmt_minutes(s.average_driver_idle),
                fmt_minutes(s.average_driver_profit),
            );
        }
        Ok(())
    }
}

fn fmt_minutes(m: Option<f64>) -> String {
    m.map_or_else(|| "n/a".to_string(), |m| format!("{m:.2}"))
}
