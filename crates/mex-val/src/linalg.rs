//! Matrix algebra on values.
//!
//! All element arithmetic routes through the scalar dispatcher, so exact
//! rationals survive matrix multiplication, determinants, and inversion
//! whenever the inputs are rational.

use mex_par::{BinOp, Matrix, Value};

use crate::arith;
use crate::error::ValueError;
use crate::ArithCx;

/// True matrix multiplication: `(m×k) @ (k×n)` is `m×n`.
pub fn matmul(a: &Matrix, b: &Matrix, cx: &ArithCx) -> Result<Matrix, ValueError> {
    if a.cols() != b.rows() {
        return Err(ValueError::type_error(format!(
            "matrix shapes {}x{} and {}x{} do not compose",
            a.rows(),
            a.cols(),
            b.rows(),
            b.cols()
        )));
    }
    let mut data = Vec::with_capacity(a.rows() * b.cols());
    for i in 0..a.rows() {
        for j in 0..b.cols() {
            let mut acc = arith::binary(BinOp::Mul, a.get(i, 0), b.get(0, j), cx)?;
            for p in 1..a.cols() {
                let term = arith::binary(BinOp::Mul, a.get(i, p), b.get(p, j), cx)?;
                acc = arith::binary(BinOp::Add, &acc, &term, cx)?;
            }
            data.push(acc);
        }
    }
    Ok(Matrix::from_flat(a.rows(), b.cols(), data))
}

/// The `n×n` identity matrix.
pub fn identity(n: usize) -> Matrix {
    let mut data = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            data.push(Value::integer(i64::from(i == j)));
        }
    }
    Matrix::from_flat(n, n, data)
}

/// Integer matrix power. `n = 0` is the identity; negative powers invert
/// first. The matrix must be square.
pub fn matrix_pow(m: &Matrix, exponent: i64, cx: &ArithCx) -> Result<Matrix, ValueError> {
    if m.rows() != m.cols() {
        return Err(ValueError::type_error(format!(
            "matrix power requires a square matrix, found {}x{}",
            m.rows(),
            m.cols()
        )));
    }
    if exponent == 0 {
        return Ok(identity(m.rows()));
    }
    let base = if exponent < 0 { inverse(m, cx)? } else { m.clone() };
    let mut acc = base.clone();
    for _ in 1..exponent.unsigned_abs() {
        acc = matmul(&acc, &base, cx)?;
    }
    Ok(acc)
}

/// Transpose.
pub fn transpose(m: &Matrix) -> Matrix {
    let mut data = Vec::with_capacity(m.rows() * m.cols());
    for j in 0..m.cols() {
        for i in 0..m.rows() {
            data.push(m.get(i, j).clone());
        }
    }
    Matrix::from_flat(m.cols(), m.rows(), data)
}

/// Determinant by Gaussian elimination with value arithmetic.
pub fn determinant(m: &Matrix, cx: &ArithCx) -> Result<Value, ValueError> {
    if m.rows() != m.cols() {
        return Err(ValueError::type_error(format!(
            "determinant requires a square matrix, found {}x{}",
            m.rows(),
            m.cols()
        )));
    }
    let n = m.rows();
    let mut work: Vec<Value> = m.as_slice().to_vec();
    let at = |data: &[Value], r: usize, c: usize| data[r * n + c].clone();

    let mut det = Value::integer(1);
    for col in 0..n {
        // Pivot selection: first nonzero entry at or below the diagonal.
        let pivot_row = (col..n)
            .find(|&r| !is_zero(&at(&work, r, col), cx));
        let pivot_row = match pivot_row {
            Some(r) => r,
            None => return Ok(Value::integer(0)),
        };
        if pivot_row != col {
            for c in 0..n {
                work.swap(col * n + c, pivot_row * n + c);
            }
            det = arith::unary(mex_par::UnaryOp::Neg, &det, cx)?;
        }
        let pivot = at(&work, col, col);
        det = arith::binary(BinOp::Mul, &det, &pivot, cx)?;
        for row in col + 1..n {
            let factor = arith::binary(BinOp::Div, &at(&work, row, col), &pivot, cx)?;
            for c in col..n {
                let scaled = arith::binary(BinOp::Mul, &factor, &at(&work, col, c), cx)?;
                let updated = arith::binary(BinOp::Sub, &at(&work, row, c), &scaled, cx)?;
                work[row * n + c] = updated;
            }
        }
    }
    Ok(det)
}

/// Matrix inverse by Gauss-Jordan elimination. Singular input is a
/// domain error.
pub fn inverse(m: &Matrix, cx: &ArithCx) -> Result<Matrix, ValueError> {
    if m.rows() != m.cols() {
        return Err(ValueError::type_error(format!(
            "inverse requires a square matrix, found {}x{}",
            m.rows(),
            m.cols()
        )));
    }
    let n = m.rows();
    // Augmented [m | I], eliminated in place.
    let width = 2 * n;
    let mut work: Vec<Value> = Vec::with_capacity(n * width);
    for i in 0..n {
        for j in 0..n {
            work.push(m.get(i, j).clone());
        }
        for j in 0..n {
            work.push(Value::integer(i64::from(i == j)));
        }
    }
    let at = |data: &[Value], r: usize, c: usize| data[r * width + c].clone();

    for col in 0..n {
        let pivot_row = (col..n)
            .find(|&r| !is_zero(&at(&work, r, col), cx))
            .ok_or_else(|| ValueError::domain("matrix is singular"))?;
        if pivot_row != col {
            for c in 0..width {
                work.swap(col * width + c, pivot_row * width + c);
            }
        }
        let pivot = at(&work, col, col);
        for c in 0..width {
            work[col * width + c] =
                arith::binary(BinOp::Div, &at(&work, col, c), &pivot, cx)?;
        }
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = at(&work, row, col);
            if is_zero(&factor, cx) {
                continue;
            }
            for c in 0..width {
                let scaled = arith::binary(BinOp::Mul, &factor, &at(&work, col, c), cx)?;
                work[row * width + c] =
                    arith::binary(BinOp::Sub, &at(&work, row, c), &scaled, cx)?;
            }
        }
    }

    let mut data = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            data.push(at(&work, i, j + n));
        }
    }
    Ok(Matrix::from_flat(n, n, data))
}

fn is_zero(value: &Value, cx: &ArithCx) -> bool {
    arith::values_equal(value, &Value::integer(0), cx)
}
