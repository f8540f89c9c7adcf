#![doc = include_str!("../README.md")]

/// Error types for rirgen operations.
pub mod error;
pub use error::{Result, RirgenError};

/// Simulation engine interface and the built-in free-field backend
pub mod engine;
/// Experiment assembly: cross joins and identifier construction
pub mod experiment;
/// Room descriptors and the two geometry generators
pub mod geometry;
/// Manifest serialization
pub mod manifest;
/// Randomized room sampling policies
pub mod sampling;
/// Per-row simulation orchestration and audio post-processing
pub mod simulate;
/// Dataset recipes and the end-to-end pipeline
pub mod workflow;

// Re-export commonly used items
pub use engine::{EngineFactory, FreeFieldEngine, RoomSetup, SimulationEngine};
pub use experiment::{Experiment, NoiseSpec, SampleSpec, SimulationSpec, assemble};
pub use geometry::{Material, Point2, RoomDescriptor, RoomKind, angle_room, parallel_room};
pub use manifest::write_manifest;
pub use simulate::{SimulateConfig, simulate_all, simulate_experiment};
pub use workflow::{DatasetConfig, RoomRecipe, generate_dataset, sample_rooms};
