//! Compilation of circuits into wire programs.

use std::fmt;

use serde_json::Value;
use tracing::{debug, info, instrument};

use qforge_ir::{BackendKind, Circuit, CompilerMode, Gate};

use crate::compact;
use crate::error::{BackendError, BackendResult};
use crate::nested;
use crate::task::{Task, Transport};

/// External scheduler for the optimized compiler mode.
pub trait Sequencer: Send + Sync {
    /// Group `gates` into layers of indices into `gates`.
    fn sequence(&self, num_qubits: usize, gates: &[&Gate]) -> BackendResult<Vec<Vec<usize>>>;
}

/// Renders circuits according to their execution settings.
#[derive(Default)]
pub struct Compiler {
    sequencer: Option<Box<dyn Sequencer>>,
}

impl Compiler {
    /// Create a compiler without a sequencer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a sequencer for [`CompilerMode::Optimized`].
    #[must_use]
    pub fn with_sequencer(mut self, sequencer: impl Sequencer + 'static) -> Self {
        self.sequencer = Some(Box::new(sequencer));
        self
    }

    /// Check if a sequencer is installed.
    pub fn has_sequencer(&self) -> bool {
        self.sequencer.is_some()
    }

    /// Render `circuit` into its program text.
    #[instrument(skip_all, fields(
        backend = %circuit.settings().backend,
        compiler = %circuit.settings().compiler
    ))]
    pub fn compile(&self, circuit: &Circuit<'_>) -> BackendResult<String> {
        let settings = circuit.settings();
        let program = match settings.backend {
            BackendKind::Compact => {
                let layers = match settings.compiler {
                    CompilerMode::Default => compact::layered_gates(circuit),
                    CompilerMode::Optimized => self.sequenced_gates(circuit)?,
                };
                compact::render(&layers, &settings.measured, circuit.num_qubits())?
            }
            BackendKind::Nested => nested::serialize(circuit)?.to_string(),
        };
        info!("Compiled {} instructions into {} bytes", circuit.len(), program.len());
        Ok(program)
    }

    fn sequenced_gates<'c>(&self, circuit: &'c Circuit<'_>) -> BackendResult<Vec<Vec<&'c Gate>>> {
        let Some(sequencer) = &self.sequencer else {
            return Err(BackendError::UnsupportedMode(
                "optimized compilation needs a sequencer".into(),
            ));
        };

        let gates: Vec<&Gate> = circuit.gates().collect();
        let layers = sequencer.sequence(circuit.num_qubits(), &gates)?;
        debug!("Sequencer grouped {} gates into {} layers", gates.len(), layers.len());

        layers
            .into_iter()
            .map(|layer| {
                layer
                    .into_iter()
                    .map(|i| {
                        gates.get(i).copied().ok_or_else(|| {
                            BackendError::MalformedProgram(format!(
                                "sequencer returned gate {i}, circuit has {}",
                                gates.len()
                            ))
                        })
                    })
                    .collect()
            })
            .collect()
    }

    /// Compile `circuit` and attach its execution settings.
    pub fn task(&self, circuit: &Circuit<'_>) -> BackendResult<Task> {
        let settings = circuit.settings();
        Ok(Task {
            program: self.compile(circuit)?,
            shots: settings.shots,
            tomography: settings.tomography,
            qubits: circuit.num_qubits(),
            backend: settings.backend,
        })
    }

    /// Compile `circuit` and hand the serialized task to `transport`.
    ///
    /// Nothing is sent if compilation or serialization fails.
    pub fn submit(&self, circuit: &Circuit<'_>, transport: &dyn Transport) -> BackendResult<Value> {
        let task = self.task(circuit)?;
        let payload = serde_json::to_value(&task)?;
        debug!("Submitting {} shots on {} qubits", task.shots, task.qubits);
        transport.send(&payload)
    }
}

impl fmt::Debug for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compiler")
            .field("has_sequencer", &self.has_sequencer())
            .finish()
    }
}

/// Compile with the default compiler and submit through `transport`.
pub fn submit(circuit: &Circuit<'_>, transport: &dyn Transport) -> BackendResult<Value> {
    Compiler::new().submit(circuit, transport)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qforge_ir::{GateRegistry, QubitId};

    /// Places every gate in its own layer, last gate first.
    struct Reverse;

    impl Sequencer for Reverse {
        fn sequence(&self, _num_qubits: usize, gates: &[&Gate]) -> BackendResult<Vec<Vec<usize>>> {
            Ok((0..gates.len()).rev().map(|i| vec![i]).collect())
        }
    }

    #[test]
    fn test_optimized_without_sequencer() {
        let registry = GateRegistry::standard();
        let mut circuit = Circuit::new(1, &registry);
        circuit.x(QubitId(0)).unwrap();
        circuit.set_compiler(CompilerMode::Optimized);

        let err = Compiler::new().compile(&circuit).unwrap_err();
        assert!(matches!(err, BackendError::UnsupportedMode(_)));
    }

    #[test]
    fn test_optimized_skips_barriers() {
        let registry = GateRegistry::standard();
        let mut circuit = Circuit::new(2, &registry);
        circuit
            .x(QubitId(0))
            .unwrap()
            .barrier([QubitId(0), QubitId(1)])
            .unwrap()
            .z(QubitId(1))
            .unwrap();
        circuit.set_compiler(CompilerMode::Optimized);

        let compiler = Compiler::new().with_sequencer(Reverse);
        let program = compiler.compile(&circuit).unwrap();
        assert_eq!(program, r#"[["z",1]],[["x",0]],[],[0,1]"#);
    }

    #[test]
    fn test_task_carries_settings() {
        let registry = GateRegistry::standard();
        let mut circuit = Circuit::new(3, &registry);
        circuit.h(QubitId(2)).unwrap();
        circuit.measure([QubitId(2)], 64, true).unwrap();
        circuit.set_backend(BackendKind::Nested);

        let task = Compiler::new().task(&circuit).unwrap();
        assert_eq!(task.program, r#"[("h", "Q2"), (("Measure", 2), "Q2")]"#);
        assert_eq!(task.shots, 64);
        assert!(task.tomography);
        assert_eq!(task.qubits, 3);
        assert_eq!(task.backend, BackendKind::Nested);
    }
}
