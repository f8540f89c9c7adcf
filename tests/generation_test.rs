//! End-to-end pipeline tests: sample rooms, assemble experiments, run the
//! free-field engine over them and check the artifacts and manifest.

use rirgen::{
    DatasetConfig, Experiment, FreeFieldEngine, NoiseSpec, RoomRecipe, SampleSpec, SimulateConfig,
    SimulationSpec, generate_dataset,
};
use std::collections::HashSet;
use std::f64::consts::PI;
use std::path::Path;
use tempfile::TempDir;

const FS: u32 = 8000;

/// Write a short mono sine sweep-stand-in at `freq` Hz as 16-bit PCM,
/// the format the reference input store uses.
fn write_sample(path: &Path, freq: f64) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: FS,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for t in 0..(FS / 4) {
        let x = (2.0 * PI * freq * t as f64 / FS as f64).sin();
        writer.write_sample((x * 20000.0) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

fn test_config(samples: &Path, output: &Path) -> (DatasetConfig, SimulateConfig) {
    let config = DatasetConfig {
        seed: Some(1234),
        rooms: vec![RoomRecipe::FixedAngle {
            room_arg: 0.6,
            source_arg: 0.2,
            source_amp: 3.0,
            count: 10,
        }],
        noises: vec![NoiseSpec::none()],
        simulations: vec![SimulationSpec {
            ray_tracing: true,
            air_absorption: true,
            max_order: 5,
        }],
        samples: vec![SampleSpec::new("2400Hz"), SampleSpec::new("6000Hz")],
    };
    let simulate_config = SimulateConfig {
        samples_dir: samples.to_path_buf(),
        output_dir: output.to_path_buf(),
        ..SimulateConfig::default()
    };
    (config, simulate_config)
}

#[test]
fn end_to_end_generates_twenty_experiments() {
    let dir = TempDir::new().unwrap();
    let samples_dir = dir.path().join("samples");
    let output_dir = dir.path().join("simulated");
    std::fs::create_dir_all(&samples_dir).unwrap();
    std::fs::create_dir_all(&output_dir).unwrap();
    write_sample(&samples_dir.join("2400Hz.wav"), 2400.0);
    write_sample(&samples_dir.join("6000Hz.wav"), 600.0);

    let (config, simulate_config) = test_config(&samples_dir, &output_dir);
    let manifest_path = dir.path().join("generations.json");
    let table = generate_dataset(
        &config,
        &simulate_config,
        &FreeFieldEngine::default(),
        &manifest_path,
    )
    .unwrap();

    // 10 rooms x 1 noise x 1 fidelity x 2 samples
    assert_eq!(table.len(), 20);
    let indices: Vec<usize> = table.iter().map(|r| r.index).collect();
    assert_eq!(indices, (0..20).collect::<Vec<_>>());
    let ids: HashSet<&str> = table.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids.len(), 20);

    // Every row simulated: one mic, one artifact, file on disk
    for row in &table {
        assert_eq!(row.simulated_audio.len(), 1);
        let filename = &row.simulated_audio[0];
        assert_eq!(filename, &format!("{}_mic-1.wav", row.id));
        assert!(output_dir.join(filename).is_file());
    }

    // Manifest parses back to the same table, in order
    let parsed: Vec<Experiment> =
        serde_json::from_reader(std::fs::File::open(&manifest_path).unwrap()).unwrap();
    assert_eq!(parsed.len(), 20);
    for (a, b) in parsed.iter().zip(&table) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.simulated_audio, b.simulated_audio);
    }
}

#[test]
fn artifacts_are_peak_normalized_float_mono() {
    let dir = TempDir::new().unwrap();
    let samples_dir = dir.path().join("samples");
    let output_dir = dir.path().join("simulated");
    std::fs::create_dir_all(&samples_dir).unwrap();
    std::fs::create_dir_all(&output_dir).unwrap();
    write_sample(&samples_dir.join("2400Hz.wav"), 2400.0);
    write_sample(&samples_dir.join("6000Hz.wav"), 600.0);

    let (config, simulate_config) = test_config(&samples_dir, &output_dir);
    let manifest_path = dir.path().join("generations.json");
    let table = generate_dataset(
        &config,
        &simulate_config,
        &FreeFieldEngine::default(),
        &manifest_path,
    )
    .unwrap();

    let path = output_dir.join(&table[0].simulated_audio[0]);
    let mut reader = hound::WavReader::open(&path).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, FS);
    assert_eq!(spec.sample_format, hound::SampleFormat::Float);
    assert_eq!(spec.bits_per_sample, 32);

    let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
    assert!(!samples.is_empty());
    let peak = samples.iter().fold(0.0_f32, |a, s| a.max(s.abs()));
    assert!((peak - 1.0).abs() < 1e-6, "peak was {peak}");
}

#[test]
fn missing_sample_aborts_before_manifest() {
    let dir = TempDir::new().unwrap();
    let samples_dir = dir.path().join("samples");
    let output_dir = dir.path().join("simulated");
    std::fs::create_dir_all(&samples_dir).unwrap();
    std::fs::create_dir_all(&output_dir).unwrap();
    // Only one of the two required samples exists
    write_sample(&samples_dir.join("2400Hz.wav"), 2400.0);

    let (config, simulate_config) = test_config(&samples_dir, &output_dir);
    let manifest_path = dir.path().join("generations.json");
    let err = generate_dataset(
        &config,
        &simulate_config,
        &FreeFieldEngine::default(),
        &manifest_path,
    )
    .unwrap_err();
    assert!(matches!(err, rirgen::RirgenError::ResourceNotFound { .. }));
    assert!(!manifest_path.exists());
}

#[test]
fn noisy_axis_rows_carry_empty_artifacts_into_the_manifest() {
    let dir = TempDir::new().unwrap();
    let samples_dir = dir.path().join("samples");
    let output_dir = dir.path().join("simulated");
    std::fs::create_dir_all(&samples_dir).unwrap();
    std::fs::create_dir_all(&output_dir).unwrap();
    write_sample(&samples_dir.join("2400Hz.wav"), 2400.0);
    write_sample(&samples_dir.join("6000Hz.wav"), 600.0);

    let (mut config, simulate_config) = test_config(&samples_dir, &output_dir);
    // Second noise spec is non-zero: those rows are declared
    // unimplemented and must pass through with no artifacts.
    config.noises.push(NoiseSpec {
        noise_mics: 0.02,
        noise_walls: 0.01,
    });

    let manifest_path = dir.path().join("generations.json");
    let table = generate_dataset(
        &config,
        &simulate_config,
        &FreeFieldEngine::default(),
        &manifest_path,
    )
    .unwrap();

    assert_eq!(table.len(), 40);
    let (clean, noisy): (Vec<&Experiment>, Vec<&Experiment>) =
        table.iter().partition(|r| r.noise == NoiseSpec::none());
    assert_eq!(clean.len(), 20);
    assert_eq!(noisy.len(), 20);
    assert!(clean.iter().all(|r| r.simulated_audio.len() == 1));
    assert!(noisy.iter().all(|r| r.simulated_audio.is_empty()));
}
