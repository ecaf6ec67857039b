//! Quantum gate values and their local matrices.

use std::fmt;
use std::sync::Arc;

use crate::error::{IrError, IrResult};
use crate::matrix::{self, Matrix};
use crate::qubit::QubitId;

/// Closure computing a gate matrix from its parameters.
pub type MatrixFn = dyn Fn(&[f64]) -> Matrix + Send + Sync;

/// Where a gate's unitary comes from.
#[derive(Clone)]
pub enum MatrixSource {
    /// A fixed matrix.
    Constant(Matrix),
    /// Identity over the given number of qubits, built only when materialized.
    Identity(usize),
    /// A matrix computed from the current parameters.
    Parametric(Arc<MatrixFn>),
}

impl MatrixSource {
    /// Wrap a parameter-driven matrix function.
    pub fn parametric(f: impl Fn(&[f64]) -> Matrix + Send + Sync + 'static) -> Self {
        MatrixSource::Parametric(Arc::new(f))
    }

    /// Check if the matrix depends on parameters.
    pub fn is_parametric(&self) -> bool {
        matches!(self, MatrixSource::Parametric(_))
    }

    /// Evaluate the matrix for the given parameters.
    pub fn resolve(&self, params: &[f64]) -> Matrix {
        match self {
            MatrixSource::Constant(m) => m.clone(),
            MatrixSource::Identity(n) => matrix::qubit_identity(*n),
            MatrixSource::Parametric(f) => f(params),
        }
    }

    /// The `n`-th matrix power: computed now for constants, composed lazily otherwise.
    #[must_use]
    pub fn powered(&self, n: u32) -> Self {
        match self {
            MatrixSource::Constant(m) => MatrixSource::Constant(matrix::matrix_power(m, n)),
            MatrixSource::Identity(k) => MatrixSource::Identity(*k),
            MatrixSource::Parametric(f) => {
                let f = Arc::clone(f);
                MatrixSource::parametric(move |params| matrix::matrix_power(&f(params), n))
            }
        }
    }

    /// The conjugate transpose.
    #[must_use]
    pub fn adjoint(&self) -> Self {
        match self {
            MatrixSource::Constant(m) => MatrixSource::Constant(matrix::dagger(m)),
            MatrixSource::Identity(k) => MatrixSource::Identity(*k),
            MatrixSource::Parametric(f) => {
                let f = Arc::clone(f);
                MatrixSource::parametric(move |params| matrix::dagger(&f(params)))
            }
        }
    }
}

impl fmt::Debug for MatrixSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixSource::Constant(m) => write!(f, "Constant({}x{})", m.nrows(), m.ncols()),
            MatrixSource::Identity(k) => write!(f, "Identity({k})"),
            MatrixSource::Parametric(_) => f.write_str("Parametric(..)"),
        }
    }
}

/// Tensor-axis convention for a materialized multi-qubit matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisOrder {
    /// Factors follow the declared position order.
    #[default]
    Declared,
    /// Factors follow the declared order reversed.
    Reversed,
    /// Factors follow ascending qubit index.
    Ascending,
}

impl AxisOrder {
    /// Factor permutation turning a declared-order matrix into this order.
    fn permutation(self, qubits: &[QubitId]) -> Vec<usize> {
        match self {
            AxisOrder::Declared => (0..qubits.len()).collect(),
            AxisOrder::Reversed => (0..qubits.len()).rev().collect(),
            AxisOrder::Ascending => matrix::argsort(qubits),
        }
    }

    fn apply(self, m: Matrix, qubits: &[QubitId]) -> Matrix {
        if self == AxisOrder::Declared || qubits.len() < 2 {
            return m;
        }
        matrix::permute_qubits(&m, &self.permutation(qubits))
    }
}

fn check_dimension(gate_name: &str, m: &Matrix, arity: usize) -> IrResult<()> {
    let expected = 1usize << arity;
    if m.nrows() != expected || m.ncols() != expected {
        return Err(IrError::DimensionMismatch {
            gate_name: gate_name.to_string(),
            expected,
            rows: m.nrows(),
            cols: m.ncols(),
        });
    }
    Ok(())
}

fn check_param_count(gate_name: &str, expected: usize, got: usize) -> IrResult<()> {
    if expected != got {
        return Err(IrError::ParameterCountMismatch {
            gate_name: gate_name.to_string(),
            expected,
            got,
        });
    }
    Ok(())
}

fn check_distinct(gate_name: &str, qubits: &[QubitId]) -> IrResult<()> {
    for (i, q) in qubits.iter().enumerate() {
        if qubits[..i].contains(q) {
            return Err(IrError::DuplicateQubit {
                qubit: *q,
                gate_name: Some(gate_name.to_string()),
            });
        }
    }
    Ok(())
}

/// A gate acting directly with its own matrix on its positions.
#[derive(Debug, Clone)]
pub struct QuantumGate {
    name: String,
    qubits: Vec<QubitId>,
    params: Vec<f64>,
    source: MatrixSource,
}

impl QuantumGate {
    /// Get the canonical name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the positions in declared order.
    pub fn qubits(&self) -> &[QubitId] {
        &self.qubits
    }

    /// Get the parameters.
    pub fn params(&self) -> &[f64] {
        &self.params
    }

    /// Get the matrix source.
    pub fn source(&self) -> &MatrixSource {
        &self.source
    }

    fn matrix(&self) -> IrResult<Matrix> {
        let m = self.source.resolve(&self.params);
        check_dimension(&self.name, &m, self.qubits.len())?;
        Ok(m)
    }
}

/// A gate applying a target unitary when every control qubit is 1.
///
/// Positions are stored controls first, then targets.
#[derive(Debug, Clone)]
pub struct ControlledGate {
    name: String,
    qubits: Vec<QubitId>,
    num_controls: usize,
    target_name: String,
    params: Vec<f64>,
    target_source: MatrixSource,
}

impl ControlledGate {
    /// Create a controlled gate.
    ///
    /// The name is `c<target>` for one control and `mc<target>` for several.
    pub fn new(
        target_name: impl Into<String>,
        controls: Vec<QubitId>,
        targets: Vec<QubitId>,
        params: Vec<f64>,
        target_source: MatrixSource,
    ) -> IrResult<Self> {
        let target_name = target_name.into().to_lowercase();
        let prefix = if controls.len() > 1 { "mc" } else { "c" };
        let name = format!("{prefix}{target_name}");

        if controls.is_empty() {
            return Err(IrError::Validation(format!(
                "controlled gate '{name}' needs at least one control qubit"
            )));
        }
        if targets.is_empty() {
            return Err(IrError::Validation(format!(
                "controlled gate '{name}' needs at least one target qubit"
            )));
        }
        if let Some(q) = controls.iter().find(|q| targets.contains(q)) {
            return Err(IrError::Validation(format!(
                "control qubit {q} overlaps the target qubits of '{name}'"
            )));
        }

        let num_controls = controls.len();
        let mut qubits = controls;
        qubits.extend(targets);
        check_distinct(&name, &qubits)?;

        if let MatrixSource::Constant(m) = &target_source {
            check_dimension(&target_name, m, qubits.len() - num_controls)?;
        }

        Ok(Self {
            name,
            qubits,
            num_controls,
            target_name,
            params,
            target_source,
        })
    }

    /// Override the derived name (registered variants such as `cx` or `cnot`).
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into().to_lowercase();
        self
    }

    /// Get the name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get all positions, controls first.
    pub fn qubits(&self) -> &[QubitId] {
        &self.qubits
    }

    /// Get the control positions.
    pub fn controls(&self) -> &[QubitId] {
        &self.qubits[..self.num_controls]
    }

    /// Get the target positions.
    pub fn targets(&self) -> &[QubitId] {
        &self.qubits[self.num_controls..]
    }

    /// Get the name of the target operation.
    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    /// Get the parameters (shared with the target).
    pub fn params(&self) -> &[f64] {
        &self.params
    }

    /// Get the target matrix source.
    pub fn target_source(&self) -> &MatrixSource {
        &self.target_source
    }

    /// Materialize the target block alone.
    pub fn target_matrix_in(&self, order: AxisOrder) -> IrResult<Matrix> {
        let m = self.target_source.resolve(&self.params);
        check_dimension(&self.target_name, &m, self.targets().len())?;
        Ok(order.apply(m, self.targets()))
    }

    /// Full block matrix: identity on every branch except all-controls-1.
    fn block_matrix(&self) -> IrResult<Matrix> {
        let target = self.target_matrix_in(AxisOrder::Declared)?;
        let dim = 1usize << self.qubits.len();
        let target_dim = target.nrows();
        let offset = dim - target_dim;

        let mut m = matrix::identity(dim);
        m.slice_mut(ndarray::s![offset.., offset..]).assign(&target);
        Ok(m)
    }
}

/// A quantum gate.
///
/// Fixed variants carry a constant matrix; parametric variants compute it
/// from their parameters.
#[derive(Debug, Clone)]
pub enum Gate {
    /// Single-qubit gate with a constant matrix.
    FixedSingle(QuantumGate),
    /// Single-qubit gate with a parameter-driven matrix.
    ParametricSingle(QuantumGate),
    /// Multi-qubit gate with a constant matrix.
    FixedMulti(QuantumGate),
    /// Multi-qubit gate with a parameter-driven matrix.
    ParametricMulti(QuantumGate),
    /// Controlled gate.
    Controlled(ControlledGate),
}

impl Gate {
    /// Create a gate, choosing the variant from arity and matrix source.
    pub fn new(
        name: impl Into<String>,
        qubits: Vec<QubitId>,
        params: Vec<f64>,
        source: MatrixSource,
    ) -> IrResult<Self> {
        let name = name.into().to_lowercase();
        if qubits.is_empty() {
            return Err(IrError::Validation(format!(
                "gate '{name}' must act on at least one qubit"
            )));
        }
        check_distinct(&name, &qubits)?;
        match &source {
            MatrixSource::Constant(m) => check_dimension(&name, m, qubits.len())?,
            MatrixSource::Identity(k) if *k != qubits.len() => {
                return Err(IrError::QubitCountMismatch {
                    gate_name: name,
                    expected: *k,
                    got: qubits.len(),
                });
            }
            MatrixSource::Identity(_) | MatrixSource::Parametric(_) => {}
        }

        let single = qubits.len() == 1;
        let parametric = source.is_parametric();
        let gate = QuantumGate {
            name,
            qubits,
            params,
            source,
        };
        Ok(match (single, parametric) {
            (true, false) => Gate::FixedSingle(gate),
            (true, true) => Gate::ParametricSingle(gate),
            (false, false) => Gate::FixedMulti(gate),
            (false, true) => Gate::ParametricMulti(gate),
        })
    }

    /// Identity gate over the given positions.
    ///
    /// The matrix is only built when materialized, so wide identities stay cheap.
    pub fn identity(qubits: Vec<QubitId>) -> IrResult<Self> {
        let source = MatrixSource::Identity(qubits.len());
        Self::new("id", qubits, vec![], source)
    }

    /// Get the canonical name.
    pub fn name(&self) -> &str {
        match self {
            Gate::FixedSingle(g)
            | Gate::ParametricSingle(g)
            | Gate::FixedMulti(g)
            | Gate::ParametricMulti(g) => g.name(),
            Gate::Controlled(c) => c.name(),
        }
    }

    /// Get the positions in declared order (controls before targets).
    pub fn qubits(&self) -> &[QubitId] {
        match self {
            Gate::FixedSingle(g)
            | Gate::ParametricSingle(g)
            | Gate::FixedMulti(g)
            | Gate::ParametricMulti(g) => g.qubits(),
            Gate::Controlled(c) => c.qubits(),
        }
    }

    /// Get the parameters.
    pub fn params(&self) -> &[f64] {
        match self {
            Gate::FixedSingle(g)
            | Gate::ParametricSingle(g)
            | Gate::FixedMulti(g)
            | Gate::ParametricMulti(g) => g.params(),
            Gate::Controlled(c) => c.params(),
        }
    }

    /// Number of qubits this gate acts on.
    #[inline]
    pub fn arity(&self) -> usize {
        self.qubits().len()
    }

    /// Check if the matrix depends on parameters.
    pub fn is_parametric(&self) -> bool {
        match self {
            Gate::ParametricSingle(_) | Gate::ParametricMulti(_) => true,
            Gate::FixedSingle(_) | Gate::FixedMulti(_) => false,
            Gate::Controlled(c) => c.target_source.is_parametric(),
        }
    }

    /// Get the controlled view of this gate.
    pub fn as_controlled(&self) -> Option<&ControlledGate> {
        match self {
            Gate::Controlled(c) => Some(c),
            _ => None,
        }
    }

    /// Replace the parameters wholesale. `None` leaves them untouched.
    ///
    /// The new sequence must have as many entries as the gate was built with.
    pub fn update_params(&mut self, params: Option<Vec<f64>>) -> IrResult<()> {
        let Some(params) = params else {
            return Ok(());
        };
        check_param_count(self.name(), self.params().len(), params.len())?;
        match self {
            Gate::FixedSingle(g)
            | Gate::ParametricSingle(g)
            | Gate::FixedMulti(g)
            | Gate::ParametricMulti(g) => g.params = params,
            Gate::Controlled(c) => c.params = params,
        }
        Ok(())
    }

    /// Materialize the local matrix in declared position order.
    pub fn matrix(&self) -> IrResult<Matrix> {
        self.matrix_in(AxisOrder::Declared)
    }

    /// Materialize the local matrix in the requested axis order.
    pub fn matrix_in(&self, order: AxisOrder) -> IrResult<Matrix> {
        let m = match self {
            Gate::FixedSingle(g)
            | Gate::ParametricSingle(g)
            | Gate::FixedMulti(g)
            | Gate::ParametricMulti(g) => g.matrix()?,
            Gate::Controlled(c) => c.block_matrix()?,
        };
        Ok(order.apply(m, self.qubits()))
    }

    /// One OpenQASM 2 statement without the trailing `;`, e.g. `rx(0.5) q[0]`.
    ///
    /// Controlled gates are written under their own name with controls first.
    pub fn to_qasm(&self) -> String {
        let mut line = self.name().to_string();
        if !self.params().is_empty() {
            let params: Vec<String> = self.params().iter().map(ToString::to_string).collect();
            line.push('(');
            line.push_str(&params.join(","));
            line.push(')');
        }
        let qubits: Vec<String> = self.qubits().iter().map(|q| format!("q[{}]", q.0)).collect();
        line.push(' ');
        line.push_str(&qubits.join(","));
        line
    }

    /// Text symbol, e.g. `rx(0.500)`.
    pub fn symbol(&self) -> String {
        let label = match self {
            Gate::Controlled(c) => c.target_name(),
            _ => self.name(),
        };
        if self.params().is_empty() {
            label.to_string()
        } else {
            let params: Vec<String> = self.params().iter().map(|p| format!("{p:.3}")).collect();
            format!("{label}({})", params.join(","))
        }
    }
}

/// Gates compare by variant, name, positions and parameters.
impl PartialEq for Gate {
    fn eq(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
            && self.name() == other.name()
            && self.qubits() == other.qubits()
            && self.params() == other.params()
    }
}

impl From<ControlledGate> for Gate {
    fn from(gate: ControlledGate) -> Self {
        Gate::Controlled(gate)
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let qubits: Vec<String> = self.qubits().iter().map(ToString::to_string).collect();
        write!(f, "{} {}", self.symbol(), qubits.join(","))
    }
}
