//! Experiment assembly
//!
//! An experiment is the cross product of a room descriptor with one
//! choice along each of three independent axes: measurement noise,
//! simulation fidelity and input sample. The assembler materializes the
//! full product with rooms as the slowest-varying axis, then assigns every
//! row its global ordinal and a descriptive identifier built from that
//! ordinal. Identifier uniqueness rests entirely on the ordinal; the
//! other fields only make the id readable.

use crate::error::{Result, RirgenError};
use crate::geometry::RoomDescriptor;
use serde::{Deserialize, Serialize};

/// Separator joining the fields of an experiment id.
pub const ID_SEPARATOR: char = '_';

/// Standard deviations (meters) of zero-mean Gaussian perturbations of
/// the mic and wall positions. Zero means no perturbation. Non-zero
/// values are recorded in the manifest but not simulated: the orchestrator
/// skips such rows (reserved for a future noise-injection step).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseSpec {
    pub noise_mics: f64,
    pub noise_walls: f64,
}

impl NoiseSpec {
    /// The only spec the orchestrator currently simulates.
    pub fn none() -> Self {
        Self {
            noise_mics: 0.0,
            noise_walls: 0.0,
        }
    }

    pub fn is_none(&self) -> bool {
        self.noise_mics == 0.0 && self.noise_walls == 0.0
    }
}

/// Fidelity controls passed opaquely to the simulation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationSpec {
    pub ray_tracing: bool,
    pub air_absorption: bool,
    pub max_order: u32,
}

impl SimulationSpec {
    /// Short tag naming the RIR computation strategy, used in ids.
    pub fn fidelity_tag(&self) -> &'static str {
        if self.ray_tracing { "rt" } else { "ism" }
    }

    /// Short tag naming the air absorption setting, used in ids.
    pub fn absorption_tag(&self) -> &'static str {
        if self.air_absorption { "aa" } else { "naa" }
    }
}

/// Names the waveform injected at the source, resolved to
/// `{samples_dir}/{sample}.wav` by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleSpec {
    pub sample: String,
}

impl SampleSpec {
    pub fn new(sample: impl Into<String>) -> Self {
        Self {
            sample: sample.into(),
        }
    }
}

/// One fully specified simulation case.
///
/// Created by [`assemble`]; immutable afterwards except for
/// `simulated_audio`, which the orchestrator fills in. Terminal once the
/// manifest is written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experiment {
    #[serde(flatten)]
    pub room: RoomDescriptor,
    #[serde(flatten)]
    pub noise: NoiseSpec,
    #[serde(flatten)]
    pub simulation: SimulationSpec,
    #[serde(flatten)]
    pub sample: SampleSpec,
    /// Global row ordinal, assigned after the full cross product is
    /// materialized.
    pub index: usize,
    /// Unique descriptive identifier; unique because `index` is.
    pub id: String,
    /// Filenames written by the orchestrator, empty if the row was
    /// skipped or not yet simulated.
    pub simulated_audio: Vec<String>,
}

/// Cross-join rooms with the three parameter axes and assign ids.
///
/// Join order is rooms (slowest) x noise x simulation x sample (fastest);
/// `index` is the row position in that fixed order, so re-running with
/// the same inputs yields the same table.
///
/// Fails with [`RirgenError::AmbiguousId`] if a sample name contains the
/// id separator; room ids contain it by construction and are exempt
/// (uniqueness never depends on parsing the id back apart).
pub fn assemble(
    rooms: &[RoomDescriptor],
    noises: &[NoiseSpec],
    simulations: &[SimulationSpec],
    samples: &[SampleSpec],
) -> Result<Vec<Experiment>> {
    for spec in samples {
        if spec.sample.contains(ID_SEPARATOR) {
            return Err(RirgenError::AmbiguousId {
                value: spec.sample.clone(),
                separator: ID_SEPARATOR,
            });
        }
    }

    let mut table =
        Vec::with_capacity(rooms.len() * noises.len() * simulations.len() * samples.len());
    for room in rooms {
        for noise in noises {
            for simulation in simulations {
                for sample in samples {
                    let index = table.len();
                    let id = build_id(room, noise, simulation, sample, index);
                    table.push(Experiment {
                        room: room.clone(),
                        noise: *noise,
                        simulation: *simulation,
                        sample: sample.clone(),
                        index,
                        id,
                        simulated_audio: Vec::new(),
                    });
                }
            }
        }
    }
    Ok(table)
}

fn build_id(
    room: &RoomDescriptor,
    noise: &NoiseSpec,
    simulation: &SimulationSpec,
    sample: &SampleSpec,
    index: usize,
) -> String {
    // Debug-formatted so zero reads "0.0", as in the reference dataset
    let noise_tag = format!("noise-{:?}-{:?}", noise.noise_mics, noise.noise_walls);
    let index_tag = index.to_string();
    [
        room.room_id.as_str(),
        noise_tag.as_str(),
        sample.sample.as_str(),
        simulation.fidelity_tag(),
        simulation.absorption_tag(),
        index_tag.as_str(),
    ]
    .join(&ID_SEPARATOR.to_string())
}
