//! qforge Backend Serializers
//!
//! This crate turns a [`qforge_ir::Circuit`] into the program text expected
//! by a remote execution service and hands it to a caller-supplied
//! [`Transport`].
//!
//! # Wire formats
//!
//! | Backend | Module | Shape |
//! |---------|--------|-------|
//! | [`BackendKind::Compact`](qforge_ir::BackendKind::Compact) | [`compact`] | layered JSON lists, measured list, register list |
//! | [`BackendKind::Nested`](qforge_ir::BackendKind::Nested) | [`nested`] | flat tuples plus one measurement per measured qubit |
//!
//! # Example
//!
//! ```rust
//! use qforge_backend::Compiler;
//! use qforge_ir::{Circuit, GateRegistry, QubitId};
//!
//! let registry = GateRegistry::standard();
//! let mut circuit = Circuit::new(2, &registry);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cnot(QubitId(0), QubitId(1)).unwrap();
//! circuit.measure([QubitId(1)], 100, false).unwrap();
//!
//! let program = Compiler::new().compile(&circuit).unwrap();
//! assert_eq!(program, r#"[["h",0]],[["cnot",[0,1]]],[1],[0,1]"#);
//! ```

pub mod compact;
pub mod compiler;
pub mod error;
pub mod nested;
pub mod task;

pub use compact::{CompactGate, CompactProgram, parse_compact};
pub use compiler::{Compiler, Sequencer, submit};
pub use error::{BackendError, BackendResult};
pub use nested::{NestedProgram, Token};
pub use task::{Task, Transport};
