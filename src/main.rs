use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, error, info, trace};
use std::path::PathBuf;
use std::time::Instant;

use vicsek_engine::output::save_outputs;
use vicsek_engine::{SimulationConfig, VicsekSimulation};

/// Command-line arguments for the simulation engine
#[derive(Parser, Debug)]
#[command(author, version, about = "Vicsek model collective-motion simulator", long_about = None)]
struct Args {
    /// Path to the TOML run configuration
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the RNG seed from the config file
    #[arg(long)]
    seed: Option<u64>,

    /// Override the number of steps T
    #[arg(long)]
    steps: Option<i64>,

    /// Override the noise amplitude eta
    #[arg(long)]
    noise: Option<f64>,

    /// Override the output base filename
    #[arg(short, long)]
    output: Option<String>,
}

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::init();
    let args = Args::parse();

    info!("Starting Vicsek simulation engine...");
    info!("Using {} Rayon threads.", rayon::current_num_threads());

    // --- Load Configuration ---
    let mut config = SimulationConfig::load(&args.config)?;
    if let Some(seed) = args.seed {
        config.particles.seed = Some(seed);
    }
    if let Some(steps) = args.steps {
        config.timing.steps = steps;
    }
    if let Some(noise) = args.noise {
        config.dynamics.noise = noise;
    }
    if let Some(output) = args.output {
        config.output.base_filename = output;
    }
    let params = config.sim_params().context("invalid simulation parameters")?;
    debug!("Simulation Parameters: {:#?}", params);

    // --- Initialize Simulation ---
    let mut sim = VicsekSimulation::new(params.clone())?;
    info!(
        "Initialized {} particles (L = {}, eta = {}, R0 = {}); initial phi = {:.6}",
        params.num_particles,
        params.domain_size,
        params.noise,
        params.interaction_radius,
        sim.order_parameter()
    );

    // --- Simulation Loop ---
    let total_steps = params.steps;
    let log_interval = config.timing.log_interval_steps.max(1) as usize;
    info!("Starting simulation loop for {} steps...", total_steps);
    let start_time = Instant::now();

    for step in 0..total_steps {
        let step_start_time = Instant::now();
        if let Err(e) = sim.step() {
            error!("Error during simulation step {}: {}", step + 1, e);
            anyhow::bail!("Simulation step failed.");
        }
        let step_duration = step_start_time.elapsed();

        let is_last_step = step + 1 == total_steps;
        if (step + 1) % log_interval == 0 || is_last_step {
            info!(
                "Step [{}/{}] (t = {:.2}) | phi: {:.6} | Step Time: {:6.2} ms | Elapsed: {:.2} s",
                step + 1,
                total_steps,
                params.time_at(step + 1),
                sim.order_parameter(),
                step_duration.as_secs_f64() * 1000.0,
                start_time.elapsed().as_secs_f64()
            );
        } else {
            trace!(
                "Step [{}/{}] completed in {:.2} ms",
                step + 1,
                total_steps,
                step_duration.as_secs_f64() * 1000.0
            );
        }
    }

    let total_duration = start_time.elapsed();
    info!("Simulation finished in {:.3} seconds.", total_duration.as_secs_f64());

    let trajectory = sim.into_trajectory()?;
    if let Some(phi) = trajectory.final_order_parameter() {
        info!("Final order parameter: {:.6}", phi);
    }
    if let Some(mean_phi) = trajectory.mean_order_parameter(trajectory.len() / 2) {
        info!("Mean order parameter over second half: {:.6}", mean_phi);
    }

    // --- Save Recorded Data ---
    info!("Saving recorded data...");
    save_outputs(&trajectory, &config.output)?;

    info!("Simulation Complete.");
    Ok(())
}
