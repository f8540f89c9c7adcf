//! Error types for the rirgen crate.
//!
//! This module provides a unified error type for dataset generation,
//! covering geometry validation, identifier construction, sample
//! resolution and simulation post-processing.

use thiserror::Error;

/// Error type for rirgen operations.
#[derive(Debug, Error)]
pub enum RirgenError {
    /// A room descriptor failed geometric validation.
    #[error("invalid geometry for room '{room_id}': {reason}")]
    GeometryInvalid {
        /// Identifier of the offending room.
        room_id: String,
        /// Description of the violated condition.
        reason: String,
    },

    /// An identifier field contains the join separator and would make
    /// the experiment id ambiguous.
    #[error("field value '{value}' contains the id separator '{separator}'")]
    AmbiguousId {
        /// The offending field value.
        value: String,
        /// The separator character used to join id fields.
        separator: char,
    },

    /// An input waveform file could not be found.
    #[error("input sample not found: '{path}'")]
    ResourceNotFound {
        /// Path that was probed.
        path: String,
    },

    /// A simulated channel is all-zero and cannot be peak-normalized.
    #[error("degenerate (all-zero) signal for experiment '{id}', mic {mic}")]
    DegenerateSignal {
        /// Experiment identifier.
        id: String,
        /// Zero-based microphone index.
        mic: usize,
    },

    /// The simulation engine failed or returned unusable output.
    #[error("simulation failed: {message}")]
    SimulationFailed {
        /// Error message describing the failure.
        message: String,
    },

    /// I/O error wrapper.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WAV read/write error.
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

/// Result type alias for rirgen operations.
pub type Result<T> = std::result::Result<T, RirgenError>;

impl RirgenError {
    /// Returns true if this error concerns input data rather than the
    /// simulation itself (geometry, ids, missing samples).
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            RirgenError::GeometryInvalid { .. }
                | RirgenError::AmbiguousId { .. }
                | RirgenError::ResourceNotFound { .. }
        )
    }

    /// Returns true if this error came out of the simulation step.
    pub fn is_simulation_error(&self) -> bool {
        matches!(
            self,
            RirgenError::DegenerateSignal { .. } | RirgenError::SimulationFailed { .. }
        )
    }
}
