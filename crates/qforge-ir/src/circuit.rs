//! High-level circuit builder API.

use std::cell::OnceCell;

use crate::error::{IrError, IrResult};
use crate::gate::Gate;
use crate::instruction::Instruction;
use crate::layer::LayeredCircuit;
use crate::matrix::{Matrix, qubit_identity};
use crate::qubit::QubitId;
use crate::registry::GateRegistry;
use crate::settings::{BackendKind, CompilerMode, ExecutionSettings};

/// A quantum circuit over a fixed register.
///
/// Gates are instantiated through the registry the circuit was created
/// with. The layered view is computed on first use and dropped whenever
/// an instruction is appended.
#[derive(Debug, Clone)]
pub struct Circuit<'r> {
    num_qubits: u32,
    registry: &'r GateRegistry,
    instructions: Vec<Instruction>,
    settings: ExecutionSettings,
    layered: OnceCell<LayeredCircuit>,
}

impl<'r> Circuit<'r> {
    /// Create an empty circuit on `num_qubits` qubits.
    pub fn new(num_qubits: u32, registry: &'r GateRegistry) -> Self {
        Self {
            num_qubits,
            registry,
            instructions: Vec::new(),
            settings: ExecutionSettings::default(),
            layered: OnceCell::new(),
        }
    }

    fn check_qubit(&self, qubit: QubitId, context: Option<&str>) -> IrResult<()> {
        if qubit.0 >= self.num_qubits {
            return Err(IrError::QubitNotFound {
                qubit,
                gate_name: context.map(str::to_string),
            });
        }
        Ok(())
    }

    /// Append an instruction.
    pub fn append(&mut self, instruction: impl Into<Instruction>) -> IrResult<&mut Self> {
        let instruction = instruction.into();
        for q in instruction.qubits() {
            self.check_qubit(*q, Some(instruction.name()))?;
        }
        self.instructions.push(instruction);
        self.layered.take();
        Ok(self)
    }

    /// Instantiate a registered gate by name and append it.
    pub fn gate(&mut self, name: &str, qubits: &[QubitId], params: &[f64]) -> IrResult<&mut Self> {
        let gate = self.registry.create(name, qubits, params)?;
        self.append(gate)
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate("h", &[qubit], &[])
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate("x", &[qubit], &[])
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate("y", &[qubit], &[])
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate("z", &[qubit], &[])
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate("s", &[qubit], &[])
    }

    /// Apply S-dagger gate.
    pub fn sdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate("sdg", &[qubit], &[])
    }

    /// Apply T gate.
    pub fn t(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate("t", &[qubit], &[])
    }

    /// Apply T-dagger gate.
    pub fn tdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate("tdg", &[qubit], &[])
    }

    /// Apply √X gate.
    pub fn sx(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate("sx", &[qubit], &[])
    }

    /// Apply √Y gate.
    pub fn sy(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate("sy", &[qubit], &[])
    }

    /// Apply W = (X + Y)/√2 gate.
    pub fn w(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate("w", &[qubit], &[])
    }

    /// Apply Rx rotation.
    pub fn rx(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate("rx", &[qubit], &[theta])
    }

    /// Apply Ry rotation.
    pub fn ry(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate("ry", &[qubit], &[theta])
    }

    /// Apply Rz rotation.
    pub fn rz(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate("rz", &[qubit], &[theta])
    }

    /// Apply phase gate.
    pub fn p(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.gate("p", &[qubit], &[theta])
    }

    // =========================================================================
    // Two-qubit gates
    // =========================================================================

    /// Apply CNOT gate.
    pub fn cnot(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.gate("cnot", &[control, target], &[])
    }

    /// Apply CX gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.gate("cx", &[control, target], &[])
    }

    /// Apply CY gate.
    pub fn cy(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.gate("cy", &[control, target], &[])
    }

    /// Apply CZ gate.
    pub fn cz(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.gate("cz", &[control, target], &[])
    }

    /// Apply controlled phase gate.
    pub fn cp(&mut self, theta: f64, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.gate("cp", &[control, target], &[theta])
    }

    /// Apply SWAP gate.
    pub fn swap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.gate("swap", &[q1, q2], &[])
    }

    /// Apply iSWAP gate.
    pub fn iswap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.gate("iswap", &[q1, q2], &[])
    }

    /// Apply fSim(θ, φ) gate.
    pub fn fsim(&mut self, theta: f64, phi: f64, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.gate("fsim", &[q1, q2], &[theta, phi])
    }

    /// Apply XX Ising coupling.
    pub fn rxx(&mut self, theta: f64, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.gate("rxx", &[q1, q2], &[theta])
    }

    /// Apply YY Ising coupling.
    pub fn ryy(&mut self, theta: f64, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.gate("ryy", &[q1, q2], &[theta])
    }

    /// Apply ZZ Ising coupling.
    pub fn rzz(&mut self, theta: f64, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.gate("rzz", &[q1, q2], &[theta])
    }

    // =========================================================================
    // Multi-qubit gates and directives
    // =========================================================================

    /// Apply X on `target` controlled by every qubit in `controls`.
    pub fn mcx(&mut self, controls: &[QubitId], target: QubitId) -> IrResult<&mut Self> {
        let mut qubits = controls.to_vec();
        qubits.push(target);
        self.gate("mcx", &qubits, &[])
    }

    /// Add a barrier over the range spanned by `qubits`.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        let qubits: Vec<QubitId> = qubits.into_iter().collect();
        self.append(Instruction::barrier(&qubits)?)
    }

    /// Set the measured positions, shot count and tomography flag.
    pub fn measure(
        &mut self,
        positions: impl IntoIterator<Item = QubitId>,
        shots: u32,
        tomography: bool,
    ) -> IrResult<&mut Self> {
        let positions: Vec<QubitId> = positions.into_iter().collect();
        for (i, q) in positions.iter().enumerate() {
            self.check_qubit(*q, None)?;
            if positions[..i].contains(q) {
                return Err(IrError::DuplicateQubit {
                    qubit: *q,
                    gate_name: None,
                });
            }
        }
        self.settings.measured = positions;
        self.settings.shots = shots;
        self.settings.tomography = tomography;
        Ok(self)
    }

    /// Select the wire format.
    pub fn set_backend(&mut self, backend: BackendKind) -> &mut Self {
        self.settings.backend = backend;
        self
    }

    /// Select the layering mode.
    pub fn set_compiler(&mut self, compiler: CompilerMode) -> &mut Self {
        self.settings.compiler = compiler;
        self
    }

    /// Replace the parameters of the gate at `index`. `None` is a no-op.
    pub fn update_params(&mut self, index: usize, params: Option<Vec<f64>>) -> IrResult<()> {
        match self.instructions.get_mut(index) {
            Some(Instruction::Gate(gate)) => gate.update_params(params),
            Some(Instruction::Barrier(_)) => Err(IrError::Validation(format!(
                "instruction {index} is a barrier and has no parameters"
            ))),
            None => Err(IrError::Validation(format!(
                "no instruction at index {index}"
            ))),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits as usize
    }

    /// All register positions, ascending.
    pub fn qubits(&self) -> Vec<QubitId> {
        (0..self.num_qubits).map(QubitId).collect()
    }

    /// The flat instruction sequence.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Gates in sequence order, barriers skipped.
    pub fn gates(&self) -> impl Iterator<Item = &Gate> {
        self.instructions.iter().filter_map(Instruction::as_gate)
    }

    /// The registry gates are created from.
    pub fn registry(&self) -> &'r GateRegistry {
        self.registry
    }

    /// Execution settings.
    pub fn settings(&self) -> &ExecutionSettings {
        &self.settings
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Check if the circuit has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// The layered view, recomputed after every append.
    pub fn layered(&self) -> &LayeredCircuit {
        self.layered.get_or_init(|| {
            LayeredCircuit::from_positions(
                self.instructions.iter().map(Instruction::qubits),
                self.num_qubits(),
            )
        })
    }

    /// Circuit depth in layers.
    pub fn depth(&self) -> usize {
        self.layered().depth()
    }

    /// Full unitary of the circuit; later instructions multiply from the left.
    pub fn unitary(&self) -> IrResult<Matrix> {
        let used = self.qubits();
        self.instructions
            .iter()
            .try_fold(qubit_identity(used.len()), |acc, inst| {
                Ok(inst.operator(&used)?.dot(&acc))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{EPSILON, approx_eq, c64, is_unitary};
    use std::f64::consts::FRAC_1_SQRT_2;

    #[test]
    fn test_bell_unitary() {
        let registry = GateRegistry::standard();
        let mut circuit = Circuit::new(2, &registry);
        circuit.h(QubitId(0)).unwrap().cnot(QubitId(0), QubitId(1)).unwrap();

        let u = circuit.unitary().unwrap();
        assert!(is_unitary(&u));
        assert!((u[[0, 0]] - c64(FRAC_1_SQRT_2, 0.0)).norm() < EPSILON);
        assert!((u[[3, 0]] - c64(FRAC_1_SQRT_2, 0.0)).norm() < EPSILON);
        assert!(u[[1, 0]].norm() < EPSILON);
    }

    #[test]
    fn test_empty_unitary_is_identity() {
        let registry = GateRegistry::standard();
        let circuit = Circuit::new(3, &registry);
        assert!(approx_eq(&circuit.unitary().unwrap(), &qubit_identity(3), EPSILON));
        assert_eq!(circuit.depth(), 0);
    }

    #[test]
    fn test_layering_refreshed_after_append() {
        let registry = GateRegistry::standard();
        let mut circuit = Circuit::new(2, &registry);
        circuit.h(QubitId(0)).unwrap();
        assert_eq!(circuit.depth(), 1);

        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        assert_eq!(circuit.depth(), 2);
        assert_eq!(circuit.layered().layer(1), vec![1]);
    }

    #[test]
    fn test_out_of_range_qubit() {
        let registry = GateRegistry::standard();
        let mut circuit = Circuit::new(2, &registry);
        let err = circuit.x(QubitId(2)).unwrap_err();
        assert!(matches!(err, IrError::QubitNotFound { qubit: QubitId(2), .. }));
        assert!(circuit.is_empty());

        assert!(circuit.barrier([QubitId(0), QubitId(5)]).is_err());
    }

    #[test]
    fn test_measure_settings() {
        let registry = GateRegistry::standard();
        let mut circuit = Circuit::new(3, &registry);
        circuit.measure([QubitId(2), QubitId(0)], 200, true).unwrap();
        assert_eq!(circuit.settings().measured, vec![QubitId(2), QubitId(0)]);
        assert_eq!(circuit.settings().shots, 200);
        assert!(circuit.settings().tomography);

        assert!(circuit.measure([QubitId(1), QubitId(1)], 10, false).is_err());
        assert!(circuit.measure([QubitId(3)], 10, false).is_err());
    }

    #[test]
    fn test_update_params() {
        let registry = GateRegistry::standard();
        let mut circuit = Circuit::new(1, &registry);
        circuit.rx(0.1, QubitId(0)).unwrap().barrier([QubitId(0)]).unwrap();

        circuit.update_params(0, Some(vec![0.9])).unwrap();
        assert_eq!(circuit.instructions()[0].as_gate().unwrap().params(), &[0.9]);
        circuit.update_params(0, None).unwrap();
        assert_eq!(circuit.instructions()[0].as_gate().unwrap().params(), &[0.9]);

        assert!(matches!(
            circuit.update_params(0, Some(vec![])),
            Err(IrError::ParameterCountMismatch { expected: 1, got: 0, .. })
        ));
        assert_eq!(circuit.instructions()[0].as_gate().unwrap().params(), &[0.9]);
        assert!(circuit.unitary().is_ok());

        assert!(circuit.update_params(1, Some(vec![1.0])).is_err());
        assert!(circuit.update_params(7, None).is_err());
    }

    #[test]
    fn test_unknown_gate_name() {
        let registry = GateRegistry::standard();
        let mut circuit = Circuit::new(1, &registry);
        assert!(matches!(
            circuit.gate("toffoli", &[QubitId(0)], &[]),
            Err(IrError::UnknownGate(_))
        ));
    }
}
