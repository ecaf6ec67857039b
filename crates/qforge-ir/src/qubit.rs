//! Qubit identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a qubit within a circuit register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QubitId(pub u32);

impl QubitId {
    /// The position as a register index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

/// Build a list of qubit ids from raw indices.
pub fn qubits(indices: impl IntoIterator<Item = u32>) -> Vec<QubitId> {
    indices.into_iter().map(QubitId).collect()
}
