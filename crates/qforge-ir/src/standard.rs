//! The standard gate catalog.
//!
//! | Gate | Qubits | Params | Description |
//! |------|--------|--------|-------------|
//! | `id` | 1 | 0 | Identity |
//! | `x`, `y`, `z` | 1 | 0 | Pauli gates |
//! | `h` | 1 | 0 | Hadamard |
//! | `w` | 1 | 0 | (X + Y)/√2 |
//! | `s`, `sdg`, `t`, `tdg` | 1 | 0 | Phase gates |
//! | `sx`, `sxdg`, `sy`, `sydg`, `sw`, `swdg` | 1 | 0 | Square roots of X, Y, W |
//! | `rx`, `ry`, `rz`, `p` | 1 | 1 | Rotations and phase |
//! | `cx`, `cnot`, `cy`, `cz` | 2 | 0 | Singly-controlled Paulis |
//! | `cp` | 2 | 1 | Controlled phase |
//! | `swap`, `iswap` | 2 | 0 | Swaps |
//! | `rxx`, `ryy`, `rzz` | 2 | 1 | Ising couplings |
//! | `fsim` | 2 | 2 | fSim(θ, φ) |
//! | `mcx`, `mcy`, `mcz` | ≥2 | 0 | Multi-controlled Paulis, target last |

use crate::error::{IrError, IrResult};
use crate::gate::{ControlledGate, Gate, MatrixSource};
use crate::matrix::Matrix;
use crate::qubit::QubitId;
use crate::registry::GateRegistry;

/// Gate matrices in big-endian qubit order.
pub mod matrices {
    use ndarray::array;
    use num_complex::Complex64;
    use std::f64::consts::FRAC_1_SQRT_2;

    use crate::matrix::{Matrix, c64, dagger, identity};

    const ZERO: Complex64 = Complex64::new(0.0, 0.0);
    const ONE: Complex64 = Complex64::new(1.0, 0.0);

    /// Principal square root of a Hermitian unitary `P`: ((1+i)·I + (1-i)·P) / 2.
    fn sqrt_of(p: &Matrix) -> Matrix {
        let lhs = identity(2).mapv(|v| v * c64(1.0, 1.0));
        let rhs = p.mapv(|v| v * c64(1.0, -1.0));
        (lhs + rhs).mapv(|v| v * 0.5)
    }

    fn diag_phase(theta: f64) -> Matrix {
        array![[ONE, ZERO], [ZERO, Complex64::from_polar(1.0, theta)]]
    }

    pub fn id() -> Matrix {
        identity(2)
    }

    pub fn x() -> Matrix {
        array![[ZERO, ONE], [ONE, ZERO]]
    }

    pub fn y() -> Matrix {
        array![[ZERO, c64(0.0, -1.0)], [c64(0.0, 1.0), ZERO]]
    }

    pub fn z() -> Matrix {
        array![[ONE, ZERO], [ZERO, c64(-1.0, 0.0)]]
    }

    pub fn h() -> Matrix {
        let s = c64(FRAC_1_SQRT_2, 0.0);
        array![[s, s], [s, -s]]
    }

    pub fn w() -> Matrix {
        array![
            [ZERO, c64(FRAC_1_SQRT_2, -FRAC_1_SQRT_2)],
            [c64(FRAC_1_SQRT_2, FRAC_1_SQRT_2), ZERO]
        ]
    }

    pub fn s() -> Matrix {
        array![[ONE, ZERO], [ZERO, c64(0.0, 1.0)]]
    }

    pub fn sdg() -> Matrix {
        array![[ONE, ZERO], [ZERO, c64(0.0, -1.0)]]
    }

    pub fn t() -> Matrix {
        diag_phase(std::f64::consts::FRAC_PI_4)
    }

    pub fn tdg() -> Matrix {
        diag_phase(-std::f64::consts::FRAC_PI_4)
    }

    pub fn sx() -> Matrix {
        sqrt_of(&x())
    }

    pub fn sxdg() -> Matrix {
        dagger(&sx())
    }

    pub fn sy() -> Matrix {
        sqrt_of(&y())
    }

    pub fn sydg() -> Matrix {
        dagger(&sy())
    }

    pub fn sw() -> Matrix {
        sqrt_of(&w())
    }

    pub fn swdg() -> Matrix {
        dagger(&sw())
    }

    pub fn rx(params: &[f64]) -> Matrix {
        let (c, s) = ((params[0] / 2.0).cos(), (params[0] / 2.0).sin());
        array![[c64(c, 0.0), c64(0.0, -s)], [c64(0.0, -s), c64(c, 0.0)]]
    }

    pub fn ry(params: &[f64]) -> Matrix {
        let (c, s) = ((params[0] / 2.0).cos(), (params[0] / 2.0).sin());
        array![[c64(c, 0.0), c64(-s, 0.0)], [c64(s, 0.0), c64(c, 0.0)]]
    }

    pub fn rz(params: &[f64]) -> Matrix {
        let half = params[0] / 2.0;
        array![
            [Complex64::from_polar(1.0, -half), ZERO],
            [ZERO, Complex64::from_polar(1.0, half)]
        ]
    }

    pub fn p(params: &[f64]) -> Matrix {
        diag_phase(params[0])
    }

    pub fn swap() -> Matrix {
        array![
            [ONE, ZERO, ZERO, ZERO],
            [ZERO, ZERO, ONE, ZERO],
            [ZERO, ONE, ZERO, ZERO],
            [ZERO, ZERO, ZERO, ONE]
        ]
    }

    pub fn iswap() -> Matrix {
        let i = c64(0.0, 1.0);
        array![
            [ONE, ZERO, ZERO, ZERO],
            [ZERO, ZERO, i, ZERO],
            [ZERO, i, ZERO, ZERO],
            [ZERO, ZERO, ZERO, ONE]
        ]
    }

    pub fn rxx(params: &[f64]) -> Matrix {
        let c = c64((params[0] / 2.0).cos(), 0.0);
        let s = c64(0.0, -(params[0] / 2.0).sin());
        array![
            [c, ZERO, ZERO, s],
            [ZERO, c, s, ZERO],
            [ZERO, s, c, ZERO],
            [s, ZERO, ZERO, c]
        ]
    }

    pub fn ryy(params: &[f64]) -> Matrix {
        let c = c64((params[0] / 2.0).cos(), 0.0);
        let s = c64(0.0, (params[0] / 2.0).sin());
        array![
            [c, ZERO, ZERO, s],
            [ZERO, c, -s, ZERO],
            [ZERO, -s, c, ZERO],
            [s, ZERO, ZERO, c]
        ]
    }

    pub fn rzz(params: &[f64]) -> Matrix {
        let neg = Complex64::from_polar(1.0, -params[0] / 2.0);
        let pos = Complex64::from_polar(1.0, params[0] / 2.0);
        array![
            [neg, ZERO, ZERO, ZERO],
            [ZERO, pos, ZERO, ZERO],
            [ZERO, ZERO, pos, ZERO],
            [ZERO, ZERO, ZERO, neg]
        ]
    }

    pub fn fsim(params: &[f64]) -> Matrix {
        let (theta, phi) = (params[0], params[1]);
        let c = c64(theta.cos(), 0.0);
        let s = c64(0.0, -theta.sin());
        array![
            [ONE, ZERO, ZERO, ZERO],
            [ZERO, c, s, ZERO],
            [ZERO, s, c, ZERO],
            [ZERO, ZERO, ZERO, Complex64::from_polar(1.0, -phi)]
        ]
    }
}

fn check_arity(name: &str, expected: usize, qubits: &[QubitId]) -> IrResult<()> {
    if qubits.len() != expected {
        return Err(IrError::QubitCountMismatch {
            gate_name: name.to_string(),
            expected,
            got: qubits.len(),
        });
    }
    Ok(())
}

fn check_params(name: &str, expected: usize, params: &[f64]) -> IrResult<()> {
    if params.len() != expected {
        return Err(IrError::ParameterCountMismatch {
            gate_name: name.to_string(),
            expected,
            got: params.len(),
        });
    }
    Ok(())
}

fn fixed(registry: &mut GateRegistry, name: &'static str, arity: usize, matrix: fn() -> Matrix) {
    registry.insert_builtin(name, move |qubits: &[QubitId], params: &[f64]| {
        check_arity(name, arity, qubits)?;
        check_params(name, 0, params)?;
        Gate::new(name, qubits.to_vec(), vec![], MatrixSource::Constant(matrix()))
    });
}

fn parametric(
    registry: &mut GateRegistry,
    name: &'static str,
    arity: usize,
    num_params: usize,
    matrix: fn(&[f64]) -> Matrix,
) {
    registry.insert_builtin(name, move |qubits: &[QubitId], params: &[f64]| {
        check_arity(name, arity, qubits)?;
        check_params(name, num_params, params)?;
        Gate::new(
            name,
            qubits.to_vec(),
            params.to_vec(),
            MatrixSource::parametric(matrix),
        )
    });
}

/// One control (first position) and one target (second position).
fn controlled(
    registry: &mut GateRegistry,
    name: &'static str,
    target: &'static str,
    num_params: usize,
    source: fn() -> MatrixSource,
) {
    registry.insert_builtin(name, move |qubits: &[QubitId], params: &[f64]| {
        check_arity(name, 2, qubits)?;
        check_params(name, num_params, params)?;
        let gate = ControlledGate::new(
            target,
            vec![qubits[0]],
            vec![qubits[1]],
            params.to_vec(),
            source(),
        )?;
        Ok(Gate::Controlled(gate.with_name(name)))
    });
}

/// Any number of controls followed by a single target.
fn multi_controlled(
    registry: &mut GateRegistry,
    name: &'static str,
    target: &'static str,
    matrix: fn() -> Matrix,
) {
    registry.insert_builtin(name, move |qubits: &[QubitId], params: &[f64]| {
        if qubits.len() < 2 {
            return Err(IrError::QubitCountMismatch {
                gate_name: name.to_string(),
                expected: 2,
                got: qubits.len(),
            });
        }
        check_params(name, 0, params)?;
        let (controls, targets) = qubits.split_at(qubits.len() - 1);
        let gate = ControlledGate::new(
            target,
            controls.to_vec(),
            targets.to_vec(),
            vec![],
            MatrixSource::Constant(matrix()),
        )?;
        Ok(Gate::Controlled(gate.with_name(name)))
    });
}

/// Install the standard catalog.
pub(crate) fn install(registry: &mut GateRegistry) {
    use matrices as m;

    for (name, matrix) in [
        ("id", m::id as fn() -> Matrix),
        ("x", m::x),
        ("y", m::y),
        ("z", m::z),
        ("h", m::h),
        ("w", m::w),
        ("s", m::s),
        ("sdg", m::sdg),
        ("t", m::t),
        ("tdg", m::tdg),
        ("sx", m::sx),
        ("sxdg", m::sxdg),
        ("sy", m::sy),
        ("sydg", m::sydg),
        ("sw", m::sw),
        ("swdg", m::swdg),
    ] {
        fixed(registry, name, 1, matrix);
    }

    for (name, matrix) in [
        ("rx", m::rx as fn(&[f64]) -> Matrix),
        ("ry", m::ry),
        ("rz", m::rz),
        ("p", m::p),
    ] {
        parametric(registry, name, 1, 1, matrix);
    }

    fixed(registry, "swap", 2, m::swap);
    fixed(registry, "iswap", 2, m::iswap);
    parametric(registry, "rxx", 2, 1, m::rxx);
    parametric(registry, "ryy", 2, 1, m::ryy);
    parametric(registry, "rzz", 2, 1, m::rzz);
    parametric(registry, "fsim", 2, 2, m::fsim);

    controlled(registry, "cx", "x", 0, || MatrixSource::Constant(m::x()));
    controlled(registry, "cnot", "x", 0, || MatrixSource::Constant(m::x()));
    controlled(registry, "cy", "y", 0, || MatrixSource::Constant(m::y()));
    controlled(registry, "cz", "z", 0, || MatrixSource::Constant(m::z()));
    controlled(registry, "cp", "p", 1, || MatrixSource::parametric(m::p));

    multi_controlled(registry, "mcx", "x", m::x);
    multi_controlled(registry, "mcy", "y", m::y);
    multi_controlled(registry, "mcz", "z", m::z);
}
