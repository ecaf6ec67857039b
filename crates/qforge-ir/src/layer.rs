//! Left-justified layering of a flat instruction sequence.
//!
//! Every qubit owns a track of slots. A slot is either empty or holds the
//! index of an instruction in the flat sequence. Multi-qubit instructions
//! record their entry on the track of their smallest position and reserve
//! an empty slot at the same layer on every other position, so that all
//! their positions share one layer index.

use std::iter;

use tracing::debug;

use crate::error::{IrError, IrResult};
use crate::instruction::Instruction;
use crate::qubit::QubitId;

/// One scheduling slot: empty or an instruction index.
pub type Slot = Option<usize>;

/// Instructions partitioned into synchronized time layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayeredCircuit {
    tracks: Vec<Vec<Slot>>,
    depth: usize,
}

impl LayeredCircuit {
    /// Layer `instructions` over `num_qubits` tracks.
    ///
    /// Fails with [`IrError::QubitNotFound`] if an instruction touches a
    /// qubit outside the register.
    pub fn build(instructions: &[Instruction], num_qubits: usize) -> IrResult<Self> {
        for inst in instructions {
            if let Some(q) = inst.qubits().iter().find(|q| q.index() >= num_qubits) {
                return Err(IrError::QubitNotFound {
                    qubit: *q,
                    gate_name: Some(inst.name().to_string()),
                });
            }
        }
        Ok(Self::from_positions(
            instructions.iter().map(Instruction::qubits),
            num_qubits,
        ))
    }

    /// Layer position sets that are known to lie inside the register.
    pub(crate) fn from_positions<'a>(
        positions: impl IntoIterator<Item = &'a [QubitId]>,
        num_qubits: usize,
    ) -> Self {
        let mut tracks: Vec<Vec<Slot>> = vec![Vec::new(); num_qubits];

        for (index, qubits) in positions.into_iter().enumerate() {
            let Some(anchor) = qubits.iter().min().map(|q| q.index()) else {
                continue;
            };
            if qubits.len() == 1 {
                tracks[anchor].push(Some(index));
                continue;
            }

            for q in qubits {
                let slot = if q.index() == anchor { Some(index) } else { None };
                tracks[q.index()].push(slot);
            }

            let layer_len = qubits
                .iter()
                .map(|q| tracks[q.index()].len())
                .max()
                .unwrap_or_default();
            for q in qubits {
                let track = &mut tracks[q.index()];
                let missing = layer_len - track.len();
                if missing > 0 {
                    let at = track.len() - 1;
                    track.splice(at..at, iter::repeat_n(None, missing));
                }
            }
        }

        let depth = tracks.iter().map(Vec::len).max().unwrap_or_default();
        for track in &mut tracks {
            track.resize(depth, None);
        }
        debug!("Layered {} qubits into depth {}", num_qubits, depth);

        Self { tracks, depth }
    }

    /// Number of layers.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of tracks.
    pub fn num_qubits(&self) -> usize {
        self.tracks.len()
    }

    /// The full track of `qubit`.
    pub fn track(&self, qubit: QubitId) -> Option<&[Slot]> {
        self.tracks.get(qubit.index()).map(Vec::as_slice)
    }

    /// Slot of `qubit` at `layer`.
    pub fn slot(&self, qubit: QubitId, layer: usize) -> Slot {
        self.tracks
            .get(qubit.index())
            .and_then(|t| t.get(layer))
            .copied()
            .flatten()
    }

    /// Instruction indices present in `layer`, in qubit order.
    pub fn layer(&self, layer: usize) -> Vec<usize> {
        let mut indices = Vec::new();
        for track in &self.tracks {
            if let Some(Some(index)) = track.get(layer) {
                if !indices.contains(index) {
                    indices.push(*index);
                }
            }
        }
        indices
    }

    /// All layers, in order.
    pub fn layers(&self) -> Vec<Vec<usize>> {
        (0..self.depth).map(|l| self.layer(l)).collect()
    }

    /// Layer index holding the entry of `instruction`, if any.
    pub fn layer_of(&self, instruction: usize) -> Option<usize> {
        self.tracks
            .iter()
            .find_map(|t| t.iter().position(|s| *s == Some(instruction)))
    }
}
