//! Simulation engine interface
//!
//! The acoustic solver is a collaborator, not part of this crate: the
//! orchestrator only depends on the [`EngineFactory`] / [`SimulationEngine`]
//! seam. One engine instance represents one configured room; the call
//! sequence is `add_source` -> `compute_rir` -> `simulate` ->
//! `mic_signals`, mirroring the usual RIR-simulator lifecycle.
//!
//! [`FreeFieldEngine`] is the built-in backend: pure direct-path
//! propagation (per-mic delay and spherical spreading loss), enough to
//! exercise the whole pipeline. Image-source and ray-tracing solvers are
//! external; the fidelity flags in [`RoomSetup`] are carried for them and
//! ignored here.

use crate::error::{Result, RirgenError};
use crate::geometry::Point2;
use ndarray::{Array1, Array2};

/// Everything an engine needs to build a room.
///
/// Coordinates are column-major: `corners` is `2 x n_vertices`,
/// `mics` is `2 x n_mics`, one point per column.
#[derive(Debug, Clone)]
pub struct RoomSetup {
    pub corners: Array2<f64>,
    pub mics: Array2<f64>,
    /// Energy absorption coefficient per polygon edge, in vertex order.
    pub absorption: Vec<f64>,
    /// Sample rate of the injected waveform (Hz).
    pub fs: u32,
    /// Maximum image-source reflection order.
    pub max_order: u32,
    pub ray_tracing: bool,
    pub air_absorption: bool,
    /// Variance of additive measurement noise applied by the engine.
    pub sigma2_awgn: f64,
}

/// One configured room, ready to run a simulation.
pub trait SimulationEngine {
    /// Length (samples) of the engine's fractional-delay filter; the
    /// orchestrator discards half of it from each output channel.
    fn frac_delay_length(&self) -> usize;

    /// Place a point source emitting `signal` after `delay_secs` seconds.
    fn add_source(&mut self, position: Point2, signal: &Array1<f64>, delay_secs: f64)
    -> Result<()>;

    /// Compute the room impulse responses for every source/mic pair.
    fn compute_rir(&mut self) -> Result<()>;

    /// Run the full time-domain simulation.
    fn simulate(&mut self) -> Result<()>;

    /// The simulated signals, one row per microphone.
    fn mic_signals(&self) -> Result<Array2<f64>>;
}

/// Builds engine instances from room setups. Factories are shared across
/// worker threads, hence the `Send + Sync` bound.
pub trait EngineFactory: Send + Sync {
    fn make_room(&self, setup: &RoomSetup) -> Result<Box<dyn SimulationEngine>>;
}

/// Direct-path propagation backend.
///
/// Each mic receives the source signal delayed by `distance / c` and
/// attenuated by `1 / max(distance, NEAR_FIELD)`. No reflections, no air
/// absorption, no additive noise; `sigma2_awgn` and the fidelity flags
/// are accepted and ignored.
#[derive(Debug, Clone)]
pub struct FreeFieldEngine {
    pub speed_of_sound: f64,
}

/// Minimum source/mic distance used for the spreading loss, so a mic on
/// top of the source cannot blow up the amplitude.
const NEAR_FIELD: f64 = 0.01;

/// Matches the fractional-delay filter length of common RIR simulators.
const FRAC_DELAY_LENGTH: usize = 81;

impl Default for FreeFieldEngine {
    fn default() -> Self {
        Self {
            speed_of_sound: 343.0,
        }
    }
}

impl EngineFactory for FreeFieldEngine {
    fn make_room(&self, setup: &RoomSetup) -> Result<Box<dyn SimulationEngine>> {
        if setup.mics.nrows() != 2 || setup.corners.nrows() != 2 {
            return Err(RirgenError::SimulationFailed {
                message: "room setup coordinates must be 2 x n matrices".to_string(),
            });
        }
        if setup.absorption.len() != setup.corners.ncols() {
            return Err(RirgenError::SimulationFailed {
                message: format!(
                    "{} absorption coefficients for {} edges",
                    setup.absorption.len(),
                    setup.corners.ncols()
                ),
            });
        }
        let mics = (0..setup.mics.ncols())
            .map(|i| Point2::new(setup.mics[[0, i]], setup.mics[[1, i]]))
            .collect();
        Ok(Box::new(FreeFieldRoom {
            fs: setup.fs,
            speed_of_sound: self.speed_of_sound,
            mics,
            source: None,
            rir: None,
            signals: None,
        }))
    }
}

struct FreeFieldRoom {
    fs: u32,
    speed_of_sound: f64,
    mics: Vec<Point2>,
    source: Option<(Point2, Array1<f64>, f64)>,
    /// Per-mic (delay in samples, attenuation) of the direct path.
    rir: Option<Vec<(usize, f64)>>,
    signals: Option<Array2<f64>>,
}

impl SimulationEngine for FreeFieldRoom {
    fn frac_delay_length(&self) -> usize {
        FRAC_DELAY_LENGTH
    }

    fn add_source(
        &mut self,
        position: Point2,
        signal: &Array1<f64>,
        delay_secs: f64,
    ) -> Result<()> {
        if signal.is_empty() {
            return Err(RirgenError::SimulationFailed {
                message: "source signal is empty".to_string(),
            });
        }
        if delay_secs < 0.0 {
            return Err(RirgenError::SimulationFailed {
                message: format!("negative source delay: {delay_secs}"),
            });
        }
        self.source = Some((position, signal.clone(), delay_secs));
        Ok(())
    }

    fn compute_rir(&mut self) -> Result<()> {
        let (source, _, _) = self.source.as_ref().ok_or_else(|| {
            RirgenError::SimulationFailed {
                message: "compute_rir called before add_source".to_string(),
            }
        })?;
        let fs = self.fs as f64;
        let rir = self
            .mics
            .iter()
            .map(|mic| {
                let dist = source.distance_to(mic);
                let delay = (dist / self.speed_of_sound * fs).round() as usize;
                (delay, 1.0 / dist.max(NEAR_FIELD))
            })
            .collect();
        self.rir = Some(rir);
        Ok(())
    }

    fn simulate(&mut self) -> Result<()> {
        let (_, signal, delay_secs) =
            self.source.as_ref().ok_or_else(|| RirgenError::SimulationFailed {
                message: "simulate called before add_source".to_string(),
            })?;
        let rir = self.rir.as_ref().ok_or_else(|| RirgenError::SimulationFailed {
            message: "simulate called before compute_rir".to_string(),
        })?;

        let base = (delay_secs * self.fs as f64).round() as usize;
        let max_path = rir.iter().map(|(d, _)| *d).max().unwrap_or(0);
        let len = base + max_path + signal.len() + FRAC_DELAY_LENGTH;

        let mut out = Array2::<f64>::zeros((self.mics.len(), len));
        for (m, &(path_delay, atten)) in rir.iter().enumerate() {
            let start = base + path_delay;
            for (t, &s) in signal.iter().enumerate() {
                out[[m, start + t]] += atten * s;
            }
        }
        self.signals = Some(out);
        Ok(())
    }

    fn mic_signals(&self) -> Result<Array2<f64>> {
        self.signals
            .clone()
            .ok_or_else(|| RirgenError::SimulationFailed {
                message: "mic_signals called before simulate".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn setup_one_mic(mic: Point2) -> RoomSetup {
        RoomSetup {
            corners: array![[0.0, 10.0, 10.0, 0.0], [0.0, 0.0, 10.0, 10.0]],
            mics: array![[mic.x], [mic.y]],
            absorption: vec![0.02, 1.0, 1.0, 0.02],
            fs: 8000,
            max_order: 5,
            ray_tracing: true,
            air_absorption: true,
            sigma2_awgn: 32000.0,
        }
    }

    #[test]
    fn free_field_delays_and_attenuates() {
        let factory = FreeFieldEngine::default();
        let mut room = factory.make_room(&setup_one_mic(Point2::new(4.43, 2.0))).unwrap();
        // 1-sample impulse, one second of pre-delay
        let signal = Array1::from(vec![1.0]);
        room.add_source(Point2::new(1.0, 2.0), &signal, 1.0).unwrap();
        room.compute_rir().unwrap();
        room.simulate().unwrap();
        let signals = room.mic_signals().unwrap();
        assert_eq!(signals.nrows(), 1);

        // distance 3.43 m at c = 343 -> 10 ms -> 80 samples after the
        // one-second base delay
        let expected_at = 8000 + 80;
        let peak = signals
            .row(0)
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.abs().partial_cmp(&b.1.abs()).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, expected_at);
        assert!((signals[[0, peak]] - 1.0 / 3.43).abs() < 1e-9);
    }

    #[test]
    fn lifecycle_order_is_enforced() {
        let factory = FreeFieldEngine::default();
        let mut room = factory.make_room(&setup_one_mic(Point2::new(2.0, 2.0))).unwrap();
        assert!(room.compute_rir().is_err());
        assert!(room.simulate().is_err());
        assert!(room.mic_signals().is_err());
        let signal = Array1::from(vec![0.5, -0.5]);
        room.add_source(Point2::new(1.0, 1.0), &signal, 0.0).unwrap();
        assert!(room.simulate().is_err());
        room.compute_rir().unwrap();
        room.simulate().unwrap();
        assert!(room.mic_signals().is_ok());
    }

    #[test]
    fn mismatched_absorption_is_rejected() {
        let factory = FreeFieldEngine::default();
        let mut setup = setup_one_mic(Point2::new(2.0, 2.0));
        setup.absorption.pop();
        assert!(factory.make_room(&setup).is_err());
    }
}
