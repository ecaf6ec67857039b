//! Error types for the backend crate.

use qforge_ir::IrError;
use thiserror::Error;

/// Errors that can occur while rendering or submitting a circuit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BackendError {
    /// The nested-tuple format needs at least one measured qubit.
    #[error("No qubit measured")]
    NoMeasurement,

    /// Unsupported backend or compiler selector.
    #[error("Unknown backend or compiler mode '{0}'")]
    UnknownBackend(String),

    /// The requested compiler mode cannot run with this configuration.
    #[error("Unsupported compiler mode: {0}")]
    UnsupportedMode(String),

    /// A program text or sequencer output could not be interpreted.
    #[error("Malformed program: {0}")]
    MalformedProgram(String),

    /// Error raised by the circuit layer.
    #[error("IR error: {0}")]
    Ir(#[source] IrError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The transport rejected the task.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<IrError> for BackendError {
    fn from(err: IrError) -> Self {
        match err {
            IrError::UnknownBackend(name) => BackendError::UnknownBackend(name),
            other => BackendError::Ir(other),
        }
    }
}

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;
