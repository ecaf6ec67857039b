//! Error types for the IR crate.

use crate::qubit::QubitId;
use thiserror::Error;

/// Errors that can occur while building gates and circuits.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Invalid gate or circuit construction (overlapping controls, bad ranges, ...).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// No registered variant exists for the requested derivation.
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// A gate name was registered twice.
    #[error("Gate name '{0}' is already registered")]
    DuplicateName(String),

    /// Gate name is not present in the registry.
    #[error("Unknown gate '{0}'")]
    UnknownGate(String),

    /// Materialized matrix does not match the gate arity.
    #[error("Matrix of gate '{gate_name}' must be {expected}x{expected}, got {rows}x{cols}")]
    DimensionMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected side length (2^arity).
        expected: usize,
        /// Actual number of rows.
        rows: usize,
        /// Actual number of columns.
        cols: usize,
    },

    /// Qubit not available in the circuit or embedding space.
    #[error("Qubit {qubit} not found{}", format_gate_context(.gate_name))]
    QubitNotFound {
        /// The qubit that was not found.
        qubit: QubitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Gate requires a different number of qubits.
    #[error("Gate '{gate_name}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of qubits.
        expected: usize,
        /// Actual number of qubits provided.
        got: usize,
    },

    /// Gate requires a different number of parameters.
    #[error("Gate '{gate_name}' takes {expected} parameters, got {got}")]
    ParameterCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of parameters.
        expected: usize,
        /// Actual number of parameters provided.
        got: usize,
    },

    /// Duplicate qubit in operation.
    #[error("Duplicate qubit {qubit} in operation{}", format_gate_context(.gate_name))]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Unsupported backend or compiler selector.
    #[error("Unknown backend or compiler mode '{0}'")]
    UnknownBackend(String),
}

/// Helper function to format optional gate context.
#[allow(clippy::ref_option)]
fn format_gate_context(gate_name: &Option<String>) -> String {
    match gate_name {
        Some(name) => format!(" (gate: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
