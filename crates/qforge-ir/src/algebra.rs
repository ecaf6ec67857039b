//! Gate algebra: integer powers, adjoints and added controls.
//!
//! Derivations dispatch on the canonical name of a gate. Well-known
//! families are answered with registered gates so that the result stays
//! recognizable to backends; everything else is synthesized from the
//! matrix source of the gate itself.

use std::f64::consts::FRAC_PI_4;

use tracing::debug;

use crate::error::{IrError, IrResult};
use crate::gate::{ControlledGate, Gate, MatrixSource};
use crate::qubit::QubitId;
use crate::registry::GateRegistry;

/// Gates equal to their own inverse.
pub const HERMITIAN: &[&str] = &[
    "id", "x", "y", "z", "h", "w", "cx", "cy", "cz", "cnot", "swap", "mcx", "mcy", "mcz", "mxy",
];

/// Gates whose fourth power is the identity.
pub const ORDER4: &[&str] = &["s", "sdg", "sx", "sxdg", "sy", "sydg", "sw", "swdg"];

/// Gates whose eighth power is the identity.
pub const ORDER8: &[&str] = &["t", "tdg"];

/// Gates whose first parameter is a rotation angle.
pub const ROTATION: &[&str] = &["rx", "ry", "rz", "p", "rxx", "ryy", "rzz", "cp"];

/// Algebraic family of a canonical gate name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateFamily {
    /// Self-inverse gates: even powers are the identity.
    Hermitian,
    /// Square roots of Paulis and of `w`, plus their adjoints.
    Order4,
    /// `t` and `tdg`.
    Order8,
    /// Gates scaled through their first parameter.
    Rotation,
    /// Anything else; derived gates are synthesized from the matrix.
    Other,
}

impl GateFamily {
    /// Classify a canonical name.
    pub fn of(name: &str) -> Self {
        if HERMITIAN.contains(&name) {
            GateFamily::Hermitian
        } else if ORDER4.contains(&name) {
            GateFamily::Order4
        } else if ORDER8.contains(&name) {
            GateFamily::Order8
        } else if ROTATION.contains(&name) {
            GateFamily::Rotation
        } else {
            GateFamily::Other
        }
    }
}

/// The registered adjoint partner of a paired gate.
pub fn paired(name: &str) -> Option<&'static str> {
    let partner = match name {
        "s" => "sdg",
        "sdg" => "s",
        "sx" => "sxdg",
        "sxdg" => "sx",
        "sy" => "sydg",
        "sydg" => "sy",
        "sw" => "swdg",
        "swdg" => "sw",
        "t" => "tdg",
        "tdg" => "t",
        _ => return None,
    };
    Some(partner)
}

/// The registered gate equal to the square of an order-4 gate.
pub fn squared(name: &str) -> Option<&'static str> {
    let square = match name {
        "s" | "sdg" => "z",
        "sx" | "sxdg" => "x",
        "sy" | "sydg" => "y",
        "sw" | "swdg" => "w",
        _ => return None,
    };
    Some(square)
}

fn lookup(name: &str, derived: Option<&'static str>) -> IrResult<&'static str> {
    derived.ok_or_else(|| IrError::NotImplemented(format!("no registered derivation for '{name}'")))
}

/// Rebuild `gate` under a suffixed name with a transformed matrix source.
///
/// Controlled gates keep their structure; only the target is transformed.
fn synthesize(
    gate: &Gate,
    suffix: &str,
    transform: impl Fn(&MatrixSource) -> MatrixSource,
) -> IrResult<Gate> {
    let derived = match gate {
        Gate::Controlled(c) => Gate::Controlled(ControlledGate::new(
            format!("{}{suffix}", c.target_name()),
            c.controls().to_vec(),
            c.targets().to_vec(),
            c.params().to_vec(),
            transform(c.target_source()),
        )?),
        Gate::FixedSingle(g)
        | Gate::ParametricSingle(g)
        | Gate::FixedMulti(g)
        | Gate::ParametricMulti(g) => Gate::new(
            format!("{}{suffix}", g.name()),
            g.qubits().to_vec(),
            g.params().to_vec(),
            transform(g.source()),
        )?,
    };
    debug!("Synthesized gate {} from {}", derived.name(), gate.name());
    Ok(derived)
}

impl GateRegistry {
    /// Gate equivalent to applying `gate` `n` times.
    ///
    /// Negative exponents raise the adjoint. Powers of `t`/`tdg` come back
    /// as `rz` rotations.
    pub fn power(&self, gate: &Gate, n: i32) -> IrResult<Gate> {
        let name = gate.name();
        let qubits = gate.qubits();

        match GateFamily::of(name) {
            GateFamily::Hermitian => {
                if n % 2 == 0 {
                    Gate::identity(qubits.to_vec())
                } else {
                    Ok(gate.clone())
                }
            }
            GateFamily::Order4 => match n.rem_euclid(4) {
                0 => Gate::identity(qubits.to_vec()),
                1 => Ok(gate.clone()),
                2 => self.create(lookup(name, squared(name))?, qubits, &[]),
                _ => self.create(lookup(name, paired(name))?, qubits, &[]),
            },
            GateFamily::Order8 => {
                let quarter = if name == "tdg" { -FRAC_PI_4 } else { FRAC_PI_4 };
                self.create("rz", qubits, &[quarter * f64::from(n)])
            }
            GateFamily::Rotation => {
                let params = scaled_angle(gate, f64::from(n))?;
                self.create(name, qubits, &params)
            }
            GateFamily::Other => {
                let exp = n.unsigned_abs();
                synthesize(gate, &format!("^{n}"), |source| {
                    if n < 0 {
                        source.adjoint().powered(exp)
                    } else {
                        source.powered(exp)
                    }
                })
            }
        }
    }

    /// Conjugate-transpose of `gate` on the same positions.
    pub fn dagger(&self, gate: &Gate) -> IrResult<Gate> {
        let name = gate.name();
        match GateFamily::of(name) {
            GateFamily::Hermitian => Ok(gate.clone()),
            GateFamily::Rotation => {
                let params = scaled_angle(gate, -1.0)?;
                self.create(name, gate.qubits(), &params)
            }
            _ => match paired(name) {
                Some(partner) => self.create(partner, gate.qubits(), &[]),
                None => synthesize(gate, "^†", MatrixSource::adjoint),
            },
        }
    }

    /// Add control qubits to `gate`.
    ///
    /// Controls of an already-controlled gate are merged with the new ones
    /// (existing first, duplicates collapsed). A single control over a
    /// single-qubit target resolves to the registered `c<name>` variant;
    /// x, y and z targets under several controls resolve to `mcx`, `mcy`
    /// and `mcz`. Anything else becomes a generic [`ControlledGate`].
    pub fn ctrl_by(&self, gate: &Gate, controls: &[QubitId]) -> IrResult<Gate> {
        let (existing, targets, target_name) = match gate {
            Gate::Controlled(c) => (c.controls(), c.targets(), c.target_name()),
            _ => (&[][..], gate.qubits(), gate.name()),
        };

        if let Some(q) = controls.iter().find(|q| targets.contains(q)) {
            return Err(IrError::Validation(format!(
                "control qubit {q} overlaps the target qubits of '{}'",
                gate.name()
            )));
        }

        let mut merged: Vec<QubitId> = Vec::with_capacity(existing.len() + controls.len());
        for q in existing.iter().chain(controls) {
            if !merged.contains(q) {
                merged.push(*q);
            }
        }
        if merged.is_empty() {
            return Err(IrError::Validation(format!(
                "no control qubits given for '{}'",
                gate.name()
            )));
        }

        let mut qubits = merged.clone();
        qubits.extend_from_slice(targets);

        if merged.len() == 1 && targets.len() == 1 {
            let name = format!("c{target_name}");
            if !self.contains(&name) {
                return Err(IrError::NotImplemented(format!(
                    "no single-control variant registered for '{target_name}'"
                )));
            }
            return self.create(&name, &qubits, gate.params());
        }

        if targets.len() == 1 && matches!(target_name, "x" | "y" | "z") {
            return self.create(&format!("mc{target_name}"), &qubits, &[]);
        }

        let source = match gate {
            Gate::Controlled(c) => c.target_source().clone(),
            Gate::FixedSingle(g)
            | Gate::ParametricSingle(g)
            | Gate::FixedMulti(g)
            | Gate::ParametricMulti(g) => g.source().clone(),
        };
        let controlled = ControlledGate::new(
            target_name,
            merged,
            targets.to_vec(),
            gate.params().to_vec(),
            source,
        )?;
        debug!("Wrapped {} as {}", gate.name(), controlled.name());
        Ok(Gate::Controlled(controlled))
    }
}

/// Parameters with the leading angle multiplied by `factor`.
fn scaled_angle(gate: &Gate, factor: f64) -> IrResult<Vec<f64>> {
    let mut params = gate.params().to_vec();
    let Some(angle) = params.first_mut() else {
        return Err(IrError::ParameterCountMismatch {
            gate_name: gate.name().to_string(),
            expected: 1,
            got: 0,
        });
    };
    *angle *= factor;
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{EPSILON, approx_eq, dagger, qubit_identity};
    use crate::qubit::qubits;
    use std::f64::consts::PI;

    fn registry() -> GateRegistry {
        GateRegistry::standard()
    }

    #[test]
    fn test_families() {
        assert_eq!(GateFamily::of("cnot"), GateFamily::Hermitian);
        assert_eq!(GateFamily::of("swdg"), GateFamily::Order4);
        assert_eq!(GateFamily::of("t"), GateFamily::Order8);
        assert_eq!(GateFamily::of("cp"), GateFamily::Rotation);
        assert_eq!(GateFamily::of("iswap"), GateFamily::Other);
        for name in ORDER4 {
            assert!(paired(name).is_some());
            assert!(squared(name).is_some());
        }
    }

    #[test]
    fn test_hermitian_powers() {
        let reg = registry();
        let cx = reg.create("cx", &qubits([0, 1]), &[]).unwrap();
        assert_eq!(reg.power(&cx, 1).unwrap(), cx);
        assert_eq!(reg.power(&cx, -3).unwrap(), cx);

        let id = reg.power(&cx, 2).unwrap();
        assert_eq!(id.name(), "id");
        assert_eq!(id.qubits(), &qubits([0, 1])[..]);
        assert!(approx_eq(&id.matrix().unwrap(), &qubit_identity(2), EPSILON));
    }

    #[test]
    fn test_even_power_of_wide_gate_stays_symbolic() {
        let reg = registry();
        let positions: Vec<QubitId> = (0..24).map(QubitId).collect();
        let mcx = reg.create("mcx", &positions, &[]).unwrap();

        for gate in [reg.power(&mcx, 2).unwrap(), reg.power(&mcx, -4).unwrap()] {
            assert_eq!(gate.name(), "id");
            assert_eq!(gate.qubits(), &positions[..]);
            let Gate::FixedMulti(id) = &gate else {
                panic!("expected a fixed multi-qubit identity, got {gate:?}");
            };
            assert!(matches!(id.source(), MatrixSource::Identity(24)));
        }

        let sx = reg.create("sx", &qubits([5]), &[]).unwrap();
        assert!(matches!(reg.power(&sx, 8).unwrap(), Gate::FixedSingle(_)));
    }

    #[test]
    fn test_order4_powers() {
        let reg = registry();
        let sx = reg.create("sx", &qubits([3]), &[]).unwrap();
        assert_eq!(reg.power(&sx, 4).unwrap().name(), "id");
        assert_eq!(reg.power(&sx, 5).unwrap(), sx);
        assert_eq!(reg.power(&sx, 2).unwrap(), reg.create("x", &qubits([3]), &[]).unwrap());
        assert_eq!(reg.power(&sx, 3).unwrap(), reg.dagger(&sx).unwrap());
        assert_eq!(reg.power(&sx, -1).unwrap().name(), "sxdg");

        let sdg = reg.create("sdg", &qubits([0]), &[]).unwrap();
        assert_eq!(reg.power(&sdg, 2).unwrap().name(), "z");
    }

    #[test]
    fn test_t_power_becomes_rotation() {
        let reg = registry();
        let t = reg.create("t", &qubits([0]), &[]).unwrap();
        let t3 = reg.power(&t, 3).unwrap();
        assert_eq!(t3.name(), "rz");
        assert!((t3.params()[0] - 3.0 * PI / 4.0).abs() < EPSILON);

        let tdg = reg.create("tdg", &qubits([0]), &[]).unwrap();
        assert!((reg.power(&tdg, 2).unwrap().params()[0] + PI / 2.0).abs() < EPSILON);
    }

    #[test]
    fn test_rotation_laws() {
        let reg = registry();
        let rzz = reg.create("rzz", &qubits([0, 2]), &[0.4]).unwrap();
        assert!((reg.dagger(&rzz).unwrap().params()[0] + 0.4).abs() < EPSILON);
        assert!((reg.power(&rzz, 3).unwrap().params()[0] - 1.2).abs() < EPSILON);

        let cp = reg.create("cp", &qubits([1, 0]), &[0.25]).unwrap();
        let cp2 = reg.power(&cp, 2).unwrap();
        assert!(cp2.as_controlled().is_some());
        assert_eq!(cp2.params(), &[0.5]);
    }

    #[test]
    fn test_synthesized_power() {
        let reg = registry();
        let iswap = reg.create("iswap", &qubits([0, 1]), &[]).unwrap();
        let squared = reg.power(&iswap, 2).unwrap();
        assert_eq!(squared.name(), "iswap^2");
        let m = iswap.matrix().unwrap();
        assert!(approx_eq(&squared.matrix().unwrap(), &m.dot(&m), EPSILON));

        let inverse = reg.power(&iswap, -1).unwrap();
        assert_eq!(inverse.name(), "iswap^-1");
        assert!(approx_eq(&inverse.matrix().unwrap(), &dagger(&m), EPSILON));
    }

    #[test]
    fn test_synthesized_parametric_power_stays_parametric() {
        let reg = registry();
        let mut fsim = reg.create("fsim", &qubits([0, 1]), &[0.3, 0.2]).unwrap();
        let mut cubed = reg.power(&fsim, 3).unwrap();
        assert!(cubed.is_parametric());

        fsim.update_params(Some(vec![0.6, 0.4])).unwrap();
        cubed.update_params(Some(vec![0.6, 0.4])).unwrap();
        let m = fsim.matrix().unwrap();
        assert!(approx_eq(&cubed.matrix().unwrap(), &m.dot(&m).dot(&m), EPSILON));
    }

    #[test]
    fn test_dagger_synthesized_and_paired() {
        let reg = registry();
        let t = reg.create("t", &qubits([0]), &[]).unwrap();
        assert_eq!(reg.dagger(&t).unwrap().name(), "tdg");

        let iswap = reg.create("iswap", &qubits([1, 0]), &[]).unwrap();
        let adj = reg.dagger(&iswap).unwrap();
        assert_eq!(adj.name(), "iswap^†");
        let product = adj.matrix().unwrap().dot(&iswap.matrix().unwrap());
        assert!(approx_eq(&product, &qubit_identity(2), EPSILON));
    }

    #[test]
    fn test_ctrl_by_registered_variants() {
        let reg = registry();
        let x = reg.create("x", &qubits([1]), &[]).unwrap();
        let cx = reg.ctrl_by(&x, &qubits([0])).unwrap();
        assert_eq!(cx.name(), "cx");
        assert_eq!(cx.qubits(), &qubits([0, 1])[..]);

        let p = reg.create("p", &qubits([2]), &[0.7]).unwrap();
        let cp = reg.ctrl_by(&p, &qubits([0])).unwrap();
        assert_eq!(cp.name(), "cp");
        assert_eq!(cp.params(), &[0.7]);

        let mcx = reg.ctrl_by(&x, &qubits([0, 2])).unwrap();
        assert_eq!(mcx.name(), "mcx");
        assert_eq!(mcx.qubits(), &qubits([0, 2, 1])[..]);
    }

    #[test]
    fn test_ctrl_by_flattens_controls() {
        let reg = registry();
        let cz = reg.create("cz", &qubits([0, 3]), &[]).unwrap();
        let mcz = reg.ctrl_by(&cz, &qubits([1, 0])).unwrap();
        assert_eq!(mcz.name(), "mcz");
        assert_eq!(mcz.as_controlled().unwrap().controls(), &qubits([0, 1])[..]);
        assert_eq!(mcz.as_controlled().unwrap().targets(), &qubits([3])[..]);
    }

    #[test]
    fn test_ctrl_by_generic_wrapper() {
        let reg = registry();
        let swap = reg.create("swap", &qubits([1, 2]), &[]).unwrap();
        let cswap = reg.ctrl_by(&swap, &qubits([0])).unwrap();
        assert_eq!(cswap.name(), "cswap");
        let m = cswap.matrix().unwrap();
        // |101⟩ ↦ |110⟩
        assert_eq!(m[[6, 5]].re, 1.0);

        let ccswap = reg.ctrl_by(&cswap, &qubits([3])).unwrap();
        let c = ccswap.as_controlled().unwrap();
        assert_eq!(ccswap.name(), "mcswap");
        assert_eq!(c.controls(), &qubits([0, 3])[..]);
        assert_eq!(c.targets(), &qubits([1, 2])[..]);
    }

    #[test]
    fn test_ctrl_by_errors() {
        let reg = registry();
        let x = reg.create("x", &qubits([1]), &[]).unwrap();
        assert!(matches!(reg.ctrl_by(&x, &qubits([1])), Err(IrError::Validation(_))));
        assert!(matches!(reg.ctrl_by(&x, &[]), Err(IrError::Validation(_))));

        let cx = reg.create("cx", &qubits([0, 1]), &[]).unwrap();
        assert!(matches!(reg.ctrl_by(&cx, &qubits([1])), Err(IrError::Validation(_))));

        let h = reg.create("h", &qubits([0]), &[]).unwrap();
        assert!(matches!(
            reg.ctrl_by(&h, &qubits([1])),
            Err(IrError::NotImplemented(_))
        ));
    }
}
