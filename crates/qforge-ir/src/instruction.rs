//! Circuit instructions: gates and barriers.

use std::fmt;

use crate::embed::embed;
use crate::error::{IrError, IrResult};
use crate::gate::Gate;
use crate::matrix::{Matrix, qubit_identity};
use crate::qubit::QubitId;

/// Synchronization marker over a contiguous qubit range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Barrier {
    qubits: Vec<QubitId>,
}

impl Barrier {
    /// Barrier over the inclusive range between the smallest and largest given qubit.
    pub fn spanning(qubits: &[QubitId]) -> IrResult<Self> {
        let (Some(low), Some(high)) = (qubits.iter().min(), qubits.iter().max()) else {
            return Err(IrError::Validation(
                "barrier must span at least one qubit".into(),
            ));
        };
        Ok(Self {
            qubits: (low.0..=high.0).map(QubitId).collect(),
        })
    }

    /// Get the covered positions, ascending.
    pub fn qubits(&self) -> &[QubitId] {
        &self.qubits
    }
}

/// A single circuit instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// A quantum gate.
    Gate(Gate),
    /// Barrier (synchronization point).
    Barrier(Barrier),
}

impl Instruction {
    /// Create a barrier instruction.
    pub fn barrier(qubits: &[QubitId]) -> IrResult<Self> {
        Barrier::spanning(qubits).map(Instruction::Barrier)
    }

    /// Positions this instruction occupies.
    pub fn qubits(&self) -> &[QubitId] {
        match self {
            Instruction::Gate(g) => g.qubits(),
            Instruction::Barrier(b) => b.qubits(),
        }
    }

    /// Get the name of the instruction.
    pub fn name(&self) -> &str {
        match self {
            Instruction::Gate(g) => g.name(),
            Instruction::Barrier(_) => "barrier",
        }
    }

    /// Check if this is a barrier.
    pub fn is_barrier(&self) -> bool {
        matches!(self, Instruction::Barrier(_))
    }

    /// Get the gate, if this is a gate instruction.
    pub fn as_gate(&self) -> Option<&Gate> {
        match self {
            Instruction::Gate(g) => Some(g),
            Instruction::Barrier(_) => None,
        }
    }

    /// Operator of this instruction over `used_qubits`; barriers are the identity.
    pub fn operator(&self, used_qubits: &[QubitId]) -> IrResult<Matrix> {
        match self {
            Instruction::Gate(g) => embed(g, used_qubits),
            Instruction::Barrier(_) => Ok(qubit_identity(used_qubits.len())),
        }
    }
}

impl From<Gate> for Instruction {
    fn from(gate: Gate) -> Self {
        Instruction::Gate(gate)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Gate(g) => write!(f, "{g}"),
            Instruction::Barrier(b) => {
                let qubits: Vec<String> = b.qubits().iter().map(ToString::to_string).collect();
                write!(f, "barrier {}", qubits.join(","))
            }
        }
    }
}
