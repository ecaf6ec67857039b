//! qforge Gate Algebra and Circuit Representation
//!
//! This crate provides the gate model, gate algebra and scheduling core of
//! qforge. Circuits are flat instruction sequences built through a
//! [`GateRegistry`]; layering and operator embedding are derived from that
//! sequence on demand.
//!
//! # Core Components
//!
//! - **Gates**: [`Gate`] with its fixed, parametric and controlled variants,
//!   backed by a [`MatrixSource`]
//! - **Registry**: [`GateRegistry`] mapping canonical names to constructors,
//!   with the standard catalog from [`GateRegistry::standard`]
//! - **Algebra**: [`GateRegistry::power`], [`GateRegistry::dagger`] and
//!   [`GateRegistry::ctrl_by`]
//! - **Layering**: [`LayeredCircuit`] left-justified time layers
//! - **Embedding**: [`embed`] lifts a local matrix to a register
//! - **Circuit**: [`Circuit`] high-level builder API
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use qforge_ir::{Circuit, GateRegistry, QubitId};
//!
//! let registry = GateRegistry::standard();
//! let mut circuit = Circuit::new(2, &registry);
//!
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cnot(QubitId(0), QubitId(1)).unwrap();
//! circuit.measure([QubitId(0), QubitId(1)], 1000, false).unwrap();
//!
//! assert_eq!(circuit.depth(), 2);
//! assert_eq!(circuit.unitary().unwrap().dim(), (4, 4));
//! ```
//!
//! # Example: Gate Algebra
//!
//! ```rust
//! use qforge_ir::{GateRegistry, QubitId};
//!
//! let registry = GateRegistry::standard();
//! let sx = registry.create("sx", &[QubitId(0)], &[]).unwrap();
//!
//! assert_eq!(registry.power(&sx, 2).unwrap().name(), "x");
//! assert_eq!(registry.dagger(&sx).unwrap().name(), "sxdg");
//!
//! let x = registry.create("x", &[QubitId(2)], &[]).unwrap();
//! let toffoli = registry.ctrl_by(&x, &[QubitId(0), QubitId(1)]).unwrap();
//! assert_eq!(toffoli.name(), "mcx");
//! ```

pub mod algebra;
pub mod circuit;
pub mod embed;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod layer;
pub mod matrix;
pub mod qubit;
pub mod registry;
pub mod settings;
pub mod standard;

pub use algebra::GateFamily;
pub use circuit::Circuit;
pub use embed::embed;
pub use error::{IrError, IrResult};
pub use gate::{AxisOrder, ControlledGate, Gate, MatrixSource, QuantumGate};
pub use instruction::{Barrier, Instruction};
pub use layer::{LayeredCircuit, Slot};
pub use matrix::Matrix;
pub use qubit::QubitId;
pub use registry::{GateConstructor, GateRegistry};
pub use settings::{BackendKind, CompilerMode, ExecutionSettings};
