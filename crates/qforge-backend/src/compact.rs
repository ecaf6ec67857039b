//! Compact layered token stream.
//!
//! A program is a comma-joined sequence of JSON lists: one list per
//! non-empty layer, then the measured positions, then every register
//! position.
//!
//! ```text
//! [["h",0]],[["cnot",[0,1]]],[1],[0,1]
//! ```
//!
//! Each gate entry is `[name, position(s), parameters...]`. Single-qubit
//! gates carry a scalar position; multi-qubit gates carry the list of
//! positions in declared order.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use qforge_ir::settings::DEFAULT_SHOTS;
use qforge_ir::{Circuit, Gate, GateRegistry, Instruction, QubitId};

use crate::error::{BackendError, BackendResult};

/// Entry for a single gate.
pub fn gate_entry(gate: &Gate) -> Value {
    let mut entry = vec![Value::from(gate.name())];
    match gate.qubits() {
        [q] => entry.push(Value::from(q.0)),
        qubits => entry.push(Value::from(
            qubits.iter().map(|q| q.0).collect::<Vec<u32>>(),
        )),
    }
    entry.extend(gate.params().iter().map(|p| Value::from(*p)));
    Value::Array(entry)
}

/// Gates of each left-justified layer; barriers dropped.
pub fn layered_gates<'c>(circuit: &'c Circuit<'_>) -> Vec<Vec<&'c Gate>> {
    let instructions = circuit.instructions();
    circuit
        .layered()
        .layers()
        .iter()
        .map(|layer| {
            layer
                .iter()
                .filter_map(|&i| instructions.get(i).and_then(Instruction::as_gate))
                .collect()
        })
        .collect()
}

/// Render layers of gates followed by the measured and register lists.
///
/// Fails with [`BackendError::MalformedProgram`] if a parameter is NaN or
/// infinite, since JSON has no literal for it.
pub fn render(
    layers: &[Vec<&Gate>],
    measured: &[QubitId],
    num_qubits: usize,
) -> BackendResult<String> {
    let mut parts = Vec::with_capacity(layers.len() + 2);
    for layer in layers.iter().filter(|l| !l.is_empty()) {
        if let Some(gate) = layer.iter().find(|g| g.params().iter().any(|p| !p.is_finite())) {
            return Err(malformed(format!(
                "gate '{}' has a non-finite parameter {:?}",
                gate.name(),
                gate.params()
            )));
        }
        let entries: Vec<Value> = layer.iter().map(|g| gate_entry(g)).collect();
        parts.push(serde_json::to_string(&entries)?);
    }
    debug!("Rendered {} non-empty layers", parts.len());

    parts.push(serde_json::to_string(measured)?);
    let register: Vec<usize> = (0..num_qubits).collect();
    parts.push(serde_json::to_string(&register)?);
    Ok(parts.join(","))
}

/// One gate entry read back from a stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactGate {
    /// Canonical gate name.
    pub name: String,
    /// Positions in declared order.
    pub qubits: Vec<QubitId>,
    /// Trailing parameters, empty for fixed gates.
    pub params: Vec<f64>,
}

/// A parsed compact stream.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompactProgram {
    /// Non-empty gate layers in time order.
    pub layers: Vec<Vec<CompactGate>>,
    /// Measured positions.
    pub measured: Vec<QubitId>,
    /// Every register position.
    pub qubits: Vec<QubitId>,
}

impl CompactProgram {
    /// Total number of gate entries.
    pub fn num_gates(&self) -> usize {
        self.layers.iter().map(Vec::len).sum()
    }

    /// Rebuild a circuit, appending gates layer by layer.
    ///
    /// Shots are not part of the stream and fall back to the default.
    pub fn to_circuit<'r>(&self, registry: &'r GateRegistry) -> BackendResult<Circuit<'r>> {
        let num_qubits = u32::try_from(self.qubits.len()).map_err(|_| {
            BackendError::MalformedProgram("register does not fit a qubit index".into())
        })?;
        let mut circuit = Circuit::new(num_qubits, registry);
        for gate in self.layers.iter().flatten() {
            circuit.gate(&gate.name, &gate.qubits, &gate.params)?;
        }
        if !self.measured.is_empty() {
            circuit.measure(self.measured.iter().copied(), DEFAULT_SHOTS, false)?;
        }
        Ok(circuit)
    }
}

fn malformed(what: impl Into<String>) -> BackendError {
    BackendError::MalformedProgram(what.into())
}

fn position(value: &Value) -> BackendResult<QubitId> {
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .map(QubitId)
        .ok_or_else(|| malformed(format!("invalid qubit position {value}")))
}

fn positions(value: &Value) -> BackendResult<Vec<QubitId>> {
    value
        .as_array()
        .ok_or_else(|| malformed(format!("expected a position list, got {value}")))?
        .iter()
        .map(position)
        .collect()
}

fn parse_entry(value: &Value) -> BackendResult<CompactGate> {
    let Some([name, qubits, params @ ..]) = value.as_array().map(Vec::as_slice) else {
        return Err(malformed(format!("invalid gate entry {value}")));
    };
    let name = name
        .as_str()
        .ok_or_else(|| malformed(format!("gate name must be a string, got {name}")))?;
    let qubits = if qubits.is_array() {
        positions(qubits)?
    } else {
        vec![position(qubits)?]
    };
    let params = params
        .iter()
        .map(|p| {
            p.as_f64()
                .ok_or_else(|| malformed(format!("invalid parameter {p} for '{name}'")))
        })
        .collect::<BackendResult<Vec<f64>>>()?;

    Ok(CompactGate {
        name: name.to_string(),
        qubits,
        params,
    })
}

/// Parse a compact stream back into layers, measured and register lists.
pub fn parse_compact(stream: &str) -> BackendResult<CompactProgram> {
    let lists: Vec<Value> =
        serde_json::from_str(&format!("[{stream}]")).map_err(|e| malformed(e.to_string()))?;
    let [layers @ .., measured, qubits] = lists.as_slice() else {
        return Err(malformed("missing measured or register list"));
    };

    let layers = layers
        .iter()
        .map(|layer| {
            layer
                .as_array()
                .ok_or_else(|| malformed(format!("layer must be a list, got {layer}")))?
                .iter()
                .map(parse_entry)
                .collect::<BackendResult<Vec<_>>>()
        })
        .collect::<BackendResult<Vec<_>>>()?;

    Ok(CompactProgram {
        layers,
        measured: positions(measured)?,
        qubits: positions(qubits)?,
    })
}
