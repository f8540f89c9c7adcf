//! rirgen - generate a labeled dataset of simulated room recordings
//!
//! Thin driver around the library pipeline: picks a room recipe, runs the
//! built-in free-field engine over the assembled experiment table and
//! writes the artifacts and manifest.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rirgen::{DatasetConfig, FreeFieldEngine, SimulateConfig, generate_dataset};
use std::path::PathBuf;

/// Generate simulated room-acoustic recordings and their manifest
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the input waveforms ({name}.wav)
    #[arg(long, default_value = "Samples")]
    samples_dir: PathBuf,

    /// Directory the per-mic artifacts are written to
    #[arg(long, default_value = "Simulated")]
    output_dir: PathBuf,

    /// Manifest output path
    #[arg(long, default_value = "generations.json")]
    manifest: PathBuf,

    /// Seed for the room samplers (omit for a fresh draw)
    #[arg(long)]
    seed: Option<u64>,

    /// Replace the default fixed-room recipe with N fully randomized
    /// angled rooms plus N fully randomized parallel rooms
    #[arg(long)]
    uniform_rooms: Option<usize>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = match args.uniform_rooms {
        Some(count) => DatasetConfig::uniform(count),
        None => DatasetConfig::default(),
    };
    config.seed = args.seed;

    let simulate_config = SimulateConfig {
        samples_dir: args.samples_dir,
        output_dir: args.output_dir.clone(),
        ..SimulateConfig::default()
    };

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("failed to create output directory {:?}", args.output_dir))?;

    let table = generate_dataset(
        &config,
        &simulate_config,
        &FreeFieldEngine::default(),
        &args.manifest,
    )
    .context("dataset generation failed")?;

    let simulated = table
        .iter()
        .filter(|row| !row.simulated_audio.is_empty())
        .count();
    info!(
        "done: {} experiments, {} simulated, manifest at {}",
        table.len(),
        simulated,
        args.manifest.display()
    );
    Ok(())
}
