//! Dataset recipes and the end-to-end pipeline
//!
//! Ties the layers together: sample rooms from a recipe, validate them,
//! assemble the experiment table, simulate every row and write the
//! manifest. The default configuration reproduces the reference dataset:
//! thirty fixed rooms, one noise spec, one fidelity spec and two sweeps.

use crate::engine::EngineFactory;
use crate::error::Result;
use crate::experiment::{Experiment, NoiseSpec, SampleSpec, SimulationSpec, assemble};
use crate::geometry::RoomDescriptor;
use crate::manifest::write_manifest;
use crate::sampling;
use crate::simulate::{SimulateConfig, simulate_all};
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::Path;

/// One room-sampling instruction; a recipe is an ordered list of these.
/// Batch order is preserved in the room table.
#[derive(Debug, Clone)]
pub enum RoomRecipe {
    /// `count` copies of one angled room, varying only the mic.
    FixedAngle {
        room_arg: f64,
        source_arg: f64,
        source_amp: f64,
        count: usize,
    },
    /// `count` fully randomized angled rooms.
    UniformAngle { count: usize },
    /// `count` copies of one parallel room, varying only the mic.
    FixedParallel {
        width: f64,
        source_x: f64,
        count: usize,
    },
    /// `count` fully randomized parallel rooms.
    UniformParallel { count: usize },
}

/// Full description of a dataset to generate.
#[derive(Debug, Clone)]
pub struct DatasetConfig {
    /// Seed for the room samplers; `None` draws a fresh one per run.
    pub seed: Option<u64>,
    pub rooms: Vec<RoomRecipe>,
    pub noises: Vec<NoiseSpec>,
    pub simulations: Vec<SimulationSpec>,
    pub samples: Vec<SampleSpec>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            seed: None,
            rooms: vec![
                RoomRecipe::FixedAngle {
                    room_arg: 0.6,
                    source_arg: 0.2,
                    source_amp: 3.0,
                    count: 10,
                },
                RoomRecipe::FixedAngle {
                    room_arg: 0.3,
                    source_arg: 0.1,
                    source_amp: 3.0,
                    count: 10,
                },
                RoomRecipe::FixedParallel {
                    width: 10.0,
                    source_x: 3.0,
                    count: 10,
                },
            ],
            noises: vec![NoiseSpec::none()],
            simulations: vec![SimulationSpec {
                ray_tracing: true,
                air_absorption: true,
                max_order: 5,
            }],
            samples: vec![SampleSpec::new("2400Hz"), SampleSpec::new("6000Hz")],
        }
    }
}

impl DatasetConfig {
    /// A fully randomized recipe: `count` angled plus `count` parallel
    /// rooms, everything else as in the default dataset.
    pub fn uniform(count: usize) -> Self {
        Self {
            rooms: vec![
                RoomRecipe::UniformAngle { count },
                RoomRecipe::UniformParallel { count },
            ],
            ..Self::default()
        }
    }
}

/// Draw the master room table for a config and validate every room.
pub fn sample_rooms(config: &DatasetConfig) -> Result<Vec<RoomDescriptor>> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let mut rooms = Vec::new();
    for recipe in &config.rooms {
        let batch = match *recipe {
            RoomRecipe::FixedAngle {
                room_arg,
                source_arg,
                source_amp,
                count,
            } => sampling::fixed_uniform_angle_rooms(
                &mut rng, room_arg, source_arg, source_amp, count,
            ),
            RoomRecipe::UniformAngle { count } => sampling::uniform_angle_rooms(&mut rng, count),
            RoomRecipe::FixedParallel {
                width,
                source_x,
                count,
            } => sampling::fixed_uniform_parallel_rooms(&mut rng, width, source_x, count),
            RoomRecipe::UniformParallel { count } => {
                sampling::uniform_parallel_rooms(&mut rng, count)
            }
        };
        rooms.extend(batch);
    }
    for room in &rooms {
        room.validate()?;
    }
    Ok(rooms)
}

/// Run the whole pipeline and write the manifest.
///
/// Any row failure aborts the run before the manifest exists; artifacts
/// already written stay on disk, the manifest is the durability boundary.
pub fn generate_dataset(
    config: &DatasetConfig,
    simulate_config: &SimulateConfig,
    factory: &dyn EngineFactory,
    manifest_path: &Path,
) -> Result<Vec<Experiment>> {
    let rooms = sample_rooms(config)?;
    info!("sampled {} rooms", rooms.len());

    let mut table = assemble(&rooms, &config.noises, &config.simulations, &config.samples)?;
    info!("assembled {} experiments", table.len());

    simulate_all(&mut table, simulate_config, factory)?;

    write_manifest(&table, manifest_path)?;
    info!("wrote manifest to {}", manifest_path.display());
    Ok(table)
}
