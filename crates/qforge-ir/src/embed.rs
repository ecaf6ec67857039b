//! Lifting local gate matrices to the operator space of a qubit register.
//!
//! The embedding space is described by an ordered list of used qubits;
//! `used_qubits[0]` is the leftmost tensor factor. Local matrices are first
//! reordered so that their factors follow the embedding order, then padded
//! with identities.

use crate::error::{IrError, IrResult};
use crate::gate::Gate;
use crate::matrix::{Matrix, argsort, kron, permute_qubits, qubit_identity};
use crate::qubit::QubitId;

/// Embed the local matrix of `gate` into the space spanned by `used_qubits`.
///
/// Fails with [`IrError::QubitNotFound`] when a gate position is not part of
/// the space.
pub fn embed(gate: &Gate, used_qubits: &[QubitId]) -> IrResult<Matrix> {
    let slots = gate
        .qubits()
        .iter()
        .map(|q| {
            used_qubits
                .iter()
                .position(|u| u == q)
                .ok_or_else(|| IrError::QubitNotFound {
                    qubit: *q,
                    gate_name: Some(gate.name().to_string()),
                })
        })
        .collect::<IrResult<Vec<usize>>>()?;

    // Local factors reordered to follow the embedding order.
    let order = argsort(&slots);
    let local = gate.matrix()?;
    let local = if slots.len() > 1 {
        permute_qubits(&local, &order)
    } else {
        local
    };
    let sorted: Vec<usize> = order.iter().map(|&k| slots[k]).collect();

    let num = used_qubits.len();
    Ok(match sorted.as_slice() {
        [slot] => pad(&local, *slot, num - 1 - slot),
        [low, high] if high - low == 1 => pad(&local, *low, num - 1 - high),
        [low, high] => {
            let gap = high - low;
            let spread = spread_pair(&local, gap);
            pad(&spread, *low, num - 1 - high)
        }
        _ => scatter(&local, &sorted, num),
    })
}

/// `I_left ⊗ m ⊗ I_right`.
fn pad(m: &Matrix, left: usize, right: usize) -> Matrix {
    let mut out = m.clone();
    if left > 0 {
        out = kron(&qubit_identity(left), &out);
    }
    if right > 0 {
        out = kron(&out, &qubit_identity(right));
    }
    out
}

/// Two-qubit operator acting on the outer factors of a `gap + 1` factor block.
fn spread_pair(m: &Matrix, gap: usize) -> Matrix {
    let wide = kron(m, &qubit_identity(gap - 1));
    let mut perm: Vec<usize> = (0..=gap).collect();
    perm.swap(1, gap);
    permute_qubits(&wide, &perm)
}

/// General case: `m ⊗ I_rest` with local factor `j` moved to `slots[j]`.
fn scatter(m: &Matrix, slots: &[usize], num: usize) -> Matrix {
    let k = slots.len();
    let wide = if num > k {
        kron(m, &qubit_identity(num - k))
    } else {
        m.clone()
    };

    let mut perm = vec![usize::MAX; num];
    for (j, &slot) in slots.iter().enumerate() {
        perm[slot] = j;
    }
    let mut spare = k..;
    for entry in perm.iter_mut().filter(|e| **e == usize::MAX) {
        *entry = spare.next().unwrap_or_default();
    }
    permute_qubits(&wide, &perm)
}
