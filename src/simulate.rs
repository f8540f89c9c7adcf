//! Simulation orchestration
//!
//! Turns one assembled [`Experiment`] into audio artifacts: resolve the
//! input sample, build the engine room, run the simulation, then trim,
//! peak-normalize and write one 32-bit-float mono WAV per microphone.
//!
//! Each row is a pure function of its inputs (plus the files it writes),
//! so rows run in parallel; the caller owns the ordering guarantee and
//! the manifest write.

use crate::engine::{EngineFactory, RoomSetup};
use crate::error::{Result, RirgenError};
use crate::experiment::Experiment;
use crate::geometry::RoomKind;
use log::{debug, info};
use ndarray::{Array1, Array2, ArrayView1};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Additive-noise variance handed to the engine for every simulated row.
/// Unrelated to [`crate::experiment::NoiseSpec`], which describes
/// geometric perturbations and is currently never simulated.
pub const DEFAULT_SIGMA2_AWGN: f64 = 32000.0;

/// Seconds of silence before the source starts emitting. The trim offset
/// removes exactly this much again, plus the engine's filter latency.
pub const DEFAULT_SOURCE_DELAY_SECS: f64 = 1.0;

/// Orchestrator configuration. The former hard-coded constants live here
/// so tests and callers can override them.
#[derive(Debug, Clone)]
pub struct SimulateConfig {
    pub sigma2_awgn: f64,
    pub source_delay_secs: f64,
    /// Directory holding `{sample}.wav` input waveforms.
    pub samples_dir: PathBuf,
    /// Directory artifact files are written to.
    pub output_dir: PathBuf,
}

impl Default for SimulateConfig {
    fn default() -> Self {
        Self {
            sigma2_awgn: DEFAULT_SIGMA2_AWGN,
            source_delay_secs: DEFAULT_SOURCE_DELAY_SECS,
            samples_dir: PathBuf::from("Samples"),
            output_dir: PathBuf::from("Simulated"),
        }
    }
}

/// Simulate one experiment row and write its artifacts.
///
/// Returns the written filenames in microphone order, or an empty list
/// when the row is a declared-unimplemented scenario (non-2D, or any
/// non-zero noise field). Input rows are not mutated; the caller stores
/// the result into `simulated_audio`.
pub fn simulate_experiment(
    experiment: &Experiment,
    config: &SimulateConfig,
    factory: &dyn EngineFactory,
) -> Result<Vec<String>> {
    info!("working on {}", experiment.id);

    if experiment.room.kind != RoomKind::TwoD || !experiment.noise.is_none() {
        debug!("skipping {}: unimplemented scenario", experiment.id);
        return Ok(Vec::new());
    }

    let sample_path = config
        .samples_dir
        .join(format!("{}.wav", experiment.sample.sample));
    let (fs, audio) = read_sample(&sample_path)?;

    let setup = RoomSetup {
        corners: points_to_columns(&experiment.room.polygon),
        mics: points_to_columns(&experiment.room.mics),
        absorption: experiment
            .room
            .materials
            .iter()
            .map(|m| m.absorption())
            .collect(),
        fs,
        max_order: experiment.simulation.max_order,
        ray_tracing: experiment.simulation.ray_tracing,
        air_absorption: experiment.simulation.air_absorption,
        sigma2_awgn: config.sigma2_awgn,
    };

    let mut room = factory.make_room(&setup)?;
    room.add_source(experiment.room.source, &audio, config.source_delay_secs)?;
    room.compute_rir()?;
    room.simulate()?;
    let signals = room.mic_signals()?;

    // Filter latency plus exactly the injected pre-delay
    let offset = room.frac_delay_length() / 2 + fs as usize;

    let mut filenames = Vec::with_capacity(experiment.room.mics.len());
    for mic in 0..experiment.room.mics.len() {
        let normalized = postprocess_channel(signals.row(mic), offset, &experiment.id, mic)?;
        let filename = format!("{}_mic-{}.wav", experiment.id, mic + 1);
        write_artifact(&config.output_dir.join(&filename), fs, &normalized)?;
        filenames.push(filename);
    }
    Ok(filenames)
}

/// Simulate every row of the table in parallel, preserving row order, and
/// store each row's artifact list. The first failing row aborts the run
/// before anything is recorded; artifact files already written by other
/// rows are left behind (the manifest is the durability boundary).
pub fn simulate_all(
    table: &mut [Experiment],
    config: &SimulateConfig,
    factory: &dyn EngineFactory,
) -> Result<()> {
    if table.iter().any(|e| e.room.kind == RoomKind::TwoD && e.noise.is_none()) {
        std::fs::create_dir_all(&config.output_dir)?;
    }
    let results: Vec<Result<Vec<String>>> = table
        .par_iter()
        .map(|experiment| simulate_experiment(experiment, config, factory))
        .collect();
    for (experiment, result) in table.iter_mut().zip(results) {
        experiment.simulated_audio = result?;
    }
    Ok(())
}

/// Discard the leading `offset` samples, cast to f32 and peak-normalize.
fn postprocess_channel(
    channel: ArrayView1<'_, f64>,
    offset: usize,
    id: &str,
    mic: usize,
) -> Result<Vec<f32>> {
    if channel.len() <= offset {
        return Err(RirgenError::SimulationFailed {
            message: format!(
                "engine returned {} samples for '{}', shorter than the {} sample trim offset",
                channel.len(),
                id,
                offset
            ),
        });
    }
    let mut trimmed: Vec<f32> = channel.iter().skip(offset).map(|&s| s as f32).collect();
    let peak = trimmed.iter().fold(0.0_f32, |acc, s| acc.max(s.abs()));
    if peak == 0.0 {
        return Err(RirgenError::DegenerateSignal {
            id: id.to_string(),
            mic,
        });
    }
    for s in &mut trimmed {
        *s /= peak;
    }
    Ok(trimmed)
}

/// Transpose a point list into the engine's 2 x n column-major layout.
fn points_to_columns(points: &[crate::geometry::Point2]) -> Array2<f64> {
    let mut out = Array2::zeros((2, points.len()));
    for (i, p) in points.iter().enumerate() {
        out[[0, i]] = p.x;
        out[[1, i]] = p.y;
    }
    out
}

/// Read a mono input waveform, returning its sample rate and samples
/// scaled to [-1, 1] for integer formats.
fn read_sample(path: &Path) -> Result<(u32, Array1<f64>)> {
    if !path.is_file() {
        return Err(RirgenError::ResourceNotFound {
            path: path.display().to_string(),
        });
    }
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    if spec.channels != 1 {
        return Err(RirgenError::SimulationFailed {
            message: format!(
                "input sample '{}' has {} channels, expected mono",
                path.display(),
                spec.channels
            ),
        });
    }
    let samples: Vec<f64> = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<std::result::Result<_, _>>()?,
        (hound::SampleFormat::Int, bits) => {
            let scale = f64::from(1u32 << (bits - 1));
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| f64::from(v) / scale))
                .collect::<std::result::Result<_, _>>()?
        }
        (format, bits) => {
            return Err(RirgenError::SimulationFailed {
                message: format!(
                    "unsupported sample format {:?}/{} bits in '{}'",
                    format,
                    bits,
                    path.display()
                ),
            });
        }
    };
    Ok((spec.sample_rate, Array1::from(samples)))
}

/// Write one peak-normalized channel as 32-bit-float mono WAV.
fn write_artifact(path: &Path, fs: u32, samples: &[f32]) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: fs,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}
