//! End-to-end compilation and submission scenarios.

use std::cell::RefCell;

use qforge_backend::{
    BackendError, BackendResult, Compiler, Sequencer, Transport, parse_compact, submit,
};
use qforge_ir::matrix::{EPSILON, approx_eq};
use qforge_ir::{BackendKind, Circuit, CompilerMode, Gate, GateRegistry, QubitId};
use serde_json::{Value, json};

/// Records every payload and answers with a fixed response.
#[derive(Default)]
struct RecordingTransport {
    sent: RefCell<Vec<Value>>,
}

impl Transport for RecordingTransport {
    fn send(&self, payload: &Value) -> BackendResult<Value> {
        self.sent.borrow_mut().push(payload.clone());
        Ok(json!({ "stat": 0, "task_id": "t-1" }))
    }
}

struct RejectingTransport;

impl Transport for RejectingTransport {
    fn send(&self, _payload: &Value) -> BackendResult<Value> {
        Err(BackendError::Transport("service rejected the circuit".into()))
    }
}

/// Greedy sequencer packing gates on disjoint qubits into one layer.
struct Greedy;

impl Sequencer for Greedy {
    fn sequence(&self, _num_qubits: usize, gates: &[&Gate]) -> BackendResult<Vec<Vec<usize>>> {
        let mut layers: Vec<Vec<usize>> = Vec::new();
        let mut busy: Vec<Vec<QubitId>> = Vec::new();
        for (i, gate) in gates.iter().enumerate() {
            let last_conflict = busy
                .iter()
                .rposition(|used| gate.qubits().iter().any(|q| used.contains(q)));
            let target = last_conflict.map_or(0, |l| l + 1);
            if target == layers.len() {
                layers.push(Vec::new());
                busy.push(Vec::new());
            }
            layers[target].push(i);
            busy[target].extend_from_slice(gate.qubits());
        }
        Ok(layers)
    }
}

struct OutOfRange;

impl Sequencer for OutOfRange {
    fn sequence(&self, _num_qubits: usize, gates: &[&Gate]) -> BackendResult<Vec<Vec<usize>>> {
        Ok(vec![vec![gates.len()]])
    }
}

fn bell(registry: &GateRegistry) -> Circuit<'_> {
    let mut circuit = Circuit::new(2, registry);
    circuit
        .h(QubitId(0))
        .unwrap()
        .cnot(QubitId(0), QubitId(1))
        .unwrap()
        .measure([QubitId(1)], 100, false)
        .unwrap();
    circuit
}

#[test]
fn test_bell_compact_stream() {
    let registry = GateRegistry::standard();
    let circuit = bell(&registry);
    let program = Compiler::new().compile(&circuit).unwrap();
    assert_eq!(program, r#"[["h",0]],[["cnot",[0,1]]],[1],[0,1]"#);
}

#[test]
fn test_barrier_only_layers_are_skipped() {
    let registry = GateRegistry::standard();
    let mut circuit = Circuit::new(3, &registry);
    circuit
        .barrier([QubitId(0), QubitId(2)])
        .unwrap()
        .x(QubitId(0))
        .unwrap()
        .rz(0.5, QubitId(2))
        .unwrap()
        .measure([QubitId(0), QubitId(2)], 10, false)
        .unwrap();

    let program = Compiler::new().compile(&circuit).unwrap();
    assert_eq!(program, r#"[["x",0],["rz",2,0.5]],[0,2],[0,1,2]"#);
}

#[test]
fn test_nested_program() {
    let registry = GateRegistry::standard();
    let mut circuit = Circuit::new(3, &registry);
    circuit
        .h(QubitId(0))
        .unwrap()
        .barrier([QubitId(0), QubitId(1)])
        .unwrap()
        .cz(QubitId(0), QubitId(2))
        .unwrap()
        .rx(0.5, QubitId(1))
        .unwrap()
        .measure([QubitId(0), QubitId(1)], 50, false)
        .unwrap();
    circuit.set_backend("B".parse().unwrap());

    let program = Compiler::new().compile(&circuit).unwrap();
    assert_eq!(
        program,
        concat!(
            r#"[("h", "Q0"), ("Barrier", ("Q0", "Q1")), ("cz", ("Q0", "Q2")), "#,
            r#"(("rx", 0.5), "Q1"), (("Measure", 0), "Q0"), (("Measure", 1), "Q1")]"#
        )
    );
}

#[test]
fn test_nested_requires_measurement() {
    let registry = GateRegistry::standard();
    let mut circuit = Circuit::new(1, &registry);
    circuit.h(QubitId(0)).unwrap();
    circuit.set_backend(BackendKind::Nested);

    let err = Compiler::new().compile(&circuit).unwrap_err();
    assert!(matches!(err, BackendError::NoMeasurement));
}

#[test]
fn test_t_power_serializes_as_rotation() {
    let registry = GateRegistry::standard();
    let t = registry.create("t", &[QubitId(0)], &[]).unwrap();
    let t2 = registry.power(&t, 2).unwrap();

    let mut circuit = Circuit::new(1, &registry);
    circuit.append(t2).unwrap();
    circuit.measure([QubitId(0)], 1, false).unwrap();

    let program = Compiler::new().compile(&circuit).unwrap();
    let parsed = parse_compact(&program).unwrap();
    assert_eq!(parsed.layers[0][0].name, "rz");
    assert!((parsed.layers[0][0].params[0] - std::f64::consts::FRAC_PI_2).abs() < EPSILON);
}

#[test]
fn test_optimized_mode_with_sequencer() {
    let registry = GateRegistry::standard();
    let mut circuit = Circuit::new(3, &registry);
    circuit
        .h(QubitId(0))
        .unwrap()
        .cx(QubitId(1), QubitId(2))
        .unwrap()
        .barrier([QubitId(0), QubitId(2)])
        .unwrap()
        .x(QubitId(2))
        .unwrap()
        .measure([QubitId(2)], 10, false)
        .unwrap();
    circuit.set_compiler("optseq".parse::<CompilerMode>().unwrap());

    let compiler = Compiler::new().with_sequencer(Greedy);
    let program = compiler.compile(&circuit).unwrap();
    assert_eq!(program, r#"[["h",0],["cx",[1,2]]],[["x",2]],[2],[0,1,2]"#);

    let err = Compiler::new()
        .with_sequencer(OutOfRange)
        .compile(&circuit)
        .unwrap_err();
    assert!(matches!(err, BackendError::MalformedProgram(_)));
}

#[test]
fn test_compact_stream_rebuilds_equivalent_circuit() {
    let registry = GateRegistry::standard();
    let mut circuit = Circuit::new(3, &registry);
    circuit
        .h(QubitId(0))
        .unwrap()
        .fsim(0.4, 0.2, QubitId(0), QubitId(2))
        .unwrap()
        .cp(0.7, QubitId(2), QubitId(1))
        .unwrap()
        .sx(QubitId(1))
        .unwrap()
        .measure([QubitId(0), QubitId(1)], 100, false)
        .unwrap();

    let program = Compiler::new().compile(&circuit).unwrap();
    let parsed = parse_compact(&program).unwrap();
    assert_eq!(parsed.num_gates(), 4);
    assert_eq!(parsed.measured, vec![QubitId(0), QubitId(1)]);

    let rebuilt = parsed.to_circuit(&registry).unwrap();
    assert_eq!(rebuilt.num_qubits(), 3);
    assert_eq!(rebuilt.settings().measured, circuit.settings().measured);
    assert!(approx_eq(
        &rebuilt.unitary().unwrap(),
        &circuit.unitary().unwrap(),
        1e-9
    ));
}

#[test]
fn test_rebuild_with_unknown_gate_fails() {
    let registry = GateRegistry::standard();
    let parsed = parse_compact(r#"[["toffoli",[0,1,2]]],[],[0,1,2]"#).unwrap();
    let err = parsed.to_circuit(&registry).unwrap_err();
    assert!(matches!(err, BackendError::Ir(_)));
}

#[test]
fn test_submit_sends_serialized_task() {
    let registry = GateRegistry::standard();
    let circuit = bell(&registry);
    let transport = RecordingTransport::default();

    let response = submit(&circuit, &transport).unwrap();
    assert_eq!(response["task_id"], "t-1");

    let sent = transport.sent.borrow();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["program"], r#"[["h",0]],[["cnot",[0,1]]],[1],[0,1]"#);
    assert_eq!(sent[0]["shots"], 100);
    assert_eq!(sent[0]["tomography"], false);
    assert_eq!(sent[0]["qubits"], 2);
}

#[test]
fn test_failed_compile_sends_nothing() {
    let registry = GateRegistry::standard();
    let mut circuit = Circuit::new(1, &registry);
    circuit.x(QubitId(0)).unwrap();
    circuit.set_backend(BackendKind::Nested);
    let transport = RecordingTransport::default();

    assert!(matches!(
        submit(&circuit, &transport),
        Err(BackendError::NoMeasurement)
    ));
    assert!(transport.sent.borrow().is_empty());
}

#[test]
fn test_non_finite_angle_is_not_sent() {
    let registry = GateRegistry::standard();
    let mut circuit = Circuit::new(1, &registry);
    circuit
        .rz(f64::NAN, QubitId(0))
        .unwrap()
        .measure([QubitId(0)], 10, false)
        .unwrap();
    let transport = RecordingTransport::default();

    assert!(matches!(
        submit(&circuit, &transport),
        Err(BackendError::MalformedProgram(_))
    ));
    assert!(transport.sent.borrow().is_empty());
}

#[test]
fn test_transport_errors_propagate() {
    let registry = GateRegistry::standard();
    let circuit = bell(&registry);
    let err = Compiler::new().submit(&circuit, &RejectingTransport).unwrap_err();
    assert!(matches!(err, BackendError::Transport(_)));
}

#[test]
fn test_unknown_selector() {
    let err: BackendError = "C".parse::<BackendKind>().unwrap_err().into();
    assert!(matches!(err, BackendError::UnknownBackend(name) if name == "C"));
}
