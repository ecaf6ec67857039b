//! Dense complex matrix utilities.
//!
//! Matrices use the big-endian qubit convention: the first qubit of a gate
//! (or of an embedding space) is the most significant bit of a basis index,
//! i.e. the leftmost tensor factor.

use ndarray::Array2;
use num_complex::Complex64;

/// A dense complex matrix.
pub type Matrix = Array2<Complex64>;

/// Tolerance for floating point comparisons.
pub const EPSILON: f64 = 1e-10;

/// Shorthand for a complex number.
#[inline]
pub fn c64(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

/// The `dim` x `dim` identity matrix.
pub fn identity(dim: usize) -> Matrix {
    Array2::eye(dim)
}

/// Identity acting on `num_qubits` qubits.
pub fn qubit_identity(num_qubits: usize) -> Matrix {
    identity(1 << num_qubits)
}

/// Kronecker product `a ⊗ b`.
pub fn kron(a: &Matrix, b: &Matrix) -> Matrix {
    ndarray::linalg::kron(a, b)
}

/// Conjugate transpose.
pub fn dagger(matrix: &Matrix) -> Matrix {
    matrix.t().mapv(|z| z.conj())
}

/// Raise a square matrix to a non-negative integer power by repeated squaring.
pub fn matrix_power(matrix: &Matrix, n: u32) -> Matrix {
    let mut result = identity(matrix.nrows());
    let mut base = matrix.clone();
    let mut exp = n;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result.dot(&base);
        }
        exp >>= 1;
        if exp > 0 {
            base = base.dot(&base);
        }
    }
    result
}

/// Permute the tensor factors of an operator on `perm.len()` qubits.
///
/// New factor `k` is old factor `perm[k]`. Equivalent to reshaping into a
/// `[2; 2k]` tensor and transposing row and column axes by `perm`.
pub fn permute_qubits(matrix: &Matrix, perm: &[usize]) -> Matrix {
    let num = perm.len();
    let dim = 1usize << num;
    debug_assert_eq!(matrix.nrows(), dim);
    debug_assert_eq!(matrix.ncols(), dim);

    let source: Vec<usize> = (0..dim)
        .map(|new_index| {
            perm.iter().enumerate().fold(0, |old_index, (k, &src)| {
                let bit = (new_index >> (num - 1 - k)) & 1;
                old_index | (bit << (num - 1 - src))
            })
        })
        .collect();

    Array2::from_shape_fn((dim, dim), |(i, j)| matrix[[source[i], source[j]]])
}

/// Permutation that sorts `keys` ascending: `result[k]` is the index of the
/// k-th smallest key.
pub fn argsort<T: Ord>(keys: &[T]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| keys[a].cmp(&keys[b]));
    order
}

/// Element-wise comparison within `tol`.
pub fn approx_eq(a: &Matrix, b: &Matrix, tol: f64) -> bool {
    a.dim() == b.dim() && a.iter().zip(b.iter()).all(|(x, y)| (x - y).norm() <= tol)
}

/// Check `U · U† = I` within [`EPSILON`].
pub fn is_unitary(matrix: &Matrix) -> bool {
    if matrix.nrows() != matrix.ncols() {
        return false;
    }
    let product = matrix.dot(&dagger(matrix));
    approx_eq(&product, &identity(matrix.nrows()), 1e-9)
}
