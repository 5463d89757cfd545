mod config;

use anyhow::{bail, ensure, Context, Result};
use clap::{Parser, Subcommand};
use neurodrive::logging::Stats;
use neurodrive_nn::networks::NeuralNetwork;
use neurodrive_sim::states::{Driver, Mode};
use rayon::prelude::*;
use tracing::{debug, info};

use config::{load_network, save_network, TrainerConfig};

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "trainer")]
#[command(about = "Evolve neural-network drivers on tile tracks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evolve a driver, saving every improved network.
    Train {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 50)]
        generations: usize,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = 0)]
        track: usize,
        /// Stored network, replaces the configured network file.
        #[arg(long)]
        network: Option<PathBuf>,
        /// Start the population around the stored network.
        #[arg(long, default_value_t = false)]
        seed_population: bool,
        #[arg(long)]
        save_dir: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        no_save: bool,
    },
    /// Drive a stored network and report how far it gets.
    Replay {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        network: PathBuf,
        #[arg(long, default_value_t = 0)]
        track: usize,
        #[arg(long, default_value_t = 30_000)]
        steps: u64,
    },
    /// Run independently seeded trainings in parallel.
    Benchmark {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 8)]
        runs: u64,
        #[arg(long, default_value_t = 10)]
        generations: usize,
    },
    /// Print the default configuration as RON.
    DumpConfig,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "trainer=info,neurodrive_sim=info".to_owned()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            config,
            generations,
            seed,
            track,
            network,
            seed_population,
            save_dir,
            no_save,
        } => {
            let mut cfg = TrainerConfig::load(config.as_deref())?;
            if let Some(seed) = seed {
                cfg.driver.optim.optimizer.seed = seed;
            }
            if let Some(network) = network {
                cfg.network_file = network;
            }
            if let Some(dir) = save_dir {
                cfg.save_dir = dir;
            }
            if no_save {
                cfg.save_improvements = false;
            }
            train_command(cfg, generations, track, seed_population)
        }
        Commands::Replay {
            config,
            network,
            track,
            steps,
        } => replay_command(config, network, track, steps),
        Commands::Benchmark {
            config,
            runs,
            generations,
        } => benchmark_command(config, runs, generations),
        Commands::DumpConfig => {
            println!("{}", TrainerConfig::default().to_ron()?);
            Ok(())
        }
    }
}

fn train_command(
    cfg: TrainerConfig,
    generations: usize,
    track: usize,
    seed_population: bool,
) -> Result<()> {
    let tracks = cfg.build_tracks()?;
    let file_network = load_network(&cfg.network_file);
    let mut driver = Driver::new(cfg.driver.clone(), tracks, file_network)?;
    driver.set_track(track)?;

    if seed_population {
        let Some(network) = driver.file_network().cloned() else {
            bail!("no usable network in {}", cfg.network_file.display());
        };
        driver.optim_mut().seed_from(&network)?;
    }

    let start = Instant::now();
    let target = driver.generation() + generations;
    while driver.generation() < target {
        let Some(report) = driver.step()? else {
            continue;
        };
        debug!(?report, "episode");
        if report.improved {
            info!(
                fitness = report.fitness,
                generation = report.generation,
                design = report.design_index,
                "improved"
            );
            if cfg.save_improvements {
                let path = save_network(
                    &cfg.save_dir,
                    report.best_update_count,
                    driver.optim().best_network(),
                )?;
                info!("saved {}", path.display());
            }
        }
    }

    println!(
        "generations={} best_distance={:.2} best_generation={} updates={} elapsed_ms={}",
        driver.generation(),
        driver.best_fitness(),
        driver.optim().best_generation(),
        driver.optim().best_update_count(),
        start.elapsed().as_millis()
    );
    if let Some(log) = driver.optim().logger().last() {
        println!("{}", log);
    }
    Ok(())
}

fn replay_command(
    config: Option<PathBuf>,
    network: PathBuf,
    track: usize,
    steps: u64,
) -> Result<()> {
    let cfg = TrainerConfig::load(config.as_deref())?;
    let text = fs::read_to_string(&network)
        .with_context(|| format!("failed to read network {}", network.display()))?;
    let stored: NeuralNetwork = text
        .parse()
        .with_context(|| format!("malformed network {}", network.display()))?;

    let tracks = cfg.build_tracks()?;
    let mut driver = Driver::new(cfg.driver, tracks, Some(stored))?;
    driver.set_track(track)?;
    if !driver.set_mode(Mode::ReplayFile) {
        bail!("network {} does not fit the car", network.display());
    }

    for _ in 0..steps {
        driver.step()?;
        if driver.car().has_collided() {
            break;
        }
    }

    let car = driver.car();
    println!(
        "distance={:.2} steps={} collided={} average_speed={:.3}",
        car.distance(),
        car.step_count(),
        car.has_collided(),
        car.average_speed()
    );
    Ok(())
}

fn benchmark_command(config: Option<PathBuf>, runs: u64, generations: usize) -> Result<()> {
    ensure!(runs > 0, "at least one run is required");
    let cfg = TrainerConfig::load(config.as_deref())?;
    let tracks = cfg.build_tracks()?;
    let base_seed = cfg.driver.optim.optimizer.seed;

    let start = Instant::now();
    let distances = (0..runs)
        .into_par_iter()
        .map(|run| -> Result<f64> {
            let mut driver_cfg = cfg.driver.clone();
            driver_cfg.optim.optimizer.seed = base_seed.wrapping_add(run);
            let mut driver = Driver::new(driver_cfg, tracks.clone(), None)?;
            driver.run_generations(generations, |_| {})?;
            info!(run, best = driver.best_fitness(), "run finished");
            Ok(driver.best_fitness())
        })
        .collect::<Result<Vec<f64>>>()?;

    println!(
        "best distance over {} runs of {} generations: {} (elapsed_ms={})",
        runs,
        generations,
        Stats::from(distances.into_iter()),
        start.elapsed().as_millis()
    );
    Ok(())
}
