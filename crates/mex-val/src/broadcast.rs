//! The broadcasting engine.
//!
//! Element-wise lifting of the scalar operations over vectors and
//! matrices, implemented once and parameterized by the scalar dispatch.
//! Shape checks happen here; numeric semantics stay in [`crate::arith`].
//!
//! Shape rules for a binary operation:
//!
//! - scalar op scalar, scalar op container: element-wise map
//! - vector(n) op vector(m): paired when `n == m`, single-element vectors
//!   broadcast, otherwise the shorter side is conceptually zero-extended
//! - vector(c) op matrix(r×c): applied across each row, symmetric
//! - matrix op matrix: same shape, element-wise
//! - `@` is true matrix multiplication, `^` with an integer exponent on a
//!   square matrix is repeated `@`
//!
//! Ranges materialize before broadcasting. All results are fresh
//! containers; inputs are never mutated.

use mex_par::{BinOp, Matrix, UnaryOp, Value};

use crate::arith;
use crate::error::ValueError;
use crate::linalg;
use crate::range;
use crate::ArithCx;

/// Apply a binary operation with broadcasting.
pub fn binary(op: BinOp, lhs: &Value, rhs: &Value, cx: &ArithCx) -> Result<Value, ValueError> {
    // Lazy ranges join arithmetic as vectors.
    if let Value::Range(r) = lhs {
        let items = range::materialize(r, cx)?;
        return binary(op, &Value::Vector(items), rhs, cx);
    }
    if let Value::Range(r) = rhs {
        let items = range::materialize(r, cx)?;
        return binary(op, lhs, &Value::Vector(items), cx);
    }

    if op == BinOp::MatMul {
        return matmul_values(lhs, rhs, cx);
    }

    match (lhs, rhs) {
        // Integer matrix power is repeated multiplication; any other
        // exponent lifts element-wise.
        (Value::Matrix(m), _) if op == BinOp::Pow => {
            if let Some(exponent) = rhs.as_index() {
                Ok(Value::Matrix(linalg::matrix_pow(m, exponent, cx)?))
            } else {
                map_matrix(m, |item| binary(op, item, rhs, cx))
            }
        }

        (Value::Vector(a), Value::Vector(b)) => vector_vector(op, a, b, cx),

        (Value::Vector(v), Value::Matrix(m)) => {
            rowwise(op, m, v, cx, |op, row_item, vec_item, cx| {
                binary(op, vec_item, row_item, cx)
            })
        }
        (Value::Matrix(m), Value::Vector(v)) => {
            rowwise(op, m, v, cx, |op, row_item, vec_item, cx| {
                binary(op, row_item, vec_item, cx)
            })
        }

        (Value::Matrix(a), Value::Matrix(b)) => {
            if a.rows() != b.rows() || a.cols() != b.cols() {
                return Err(ValueError::type_error(format!(
                    "matrix shapes {}x{} and {}x{} do not match",
                    a.rows(),
                    a.cols(),
                    b.rows(),
                    b.cols()
                )));
            }
            let data = a
                .as_slice()
                .iter()
                .zip(b.as_slice().iter())
                .map(|(x, y)| binary(op, x, y, cx))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Matrix(Matrix::from_flat(a.rows(), a.cols(), data)))
        }

        (Value::Vector(items), _) => Ok(Value::Vector(
            items
                .iter()
                .map(|item| binary(op, item, rhs, cx))
                .collect::<Result<Vec<_>, _>>()?,
        )),
        (_, Value::Vector(items)) => Ok(Value::Vector(
            items
                .iter()
                .map(|item| binary(op, lhs, item, cx))
                .collect::<Result<Vec<_>, _>>()?,
        )),

        (Value::Matrix(m), _) => map_matrix(m, |item| binary(op, item, rhs, cx)),
        (_, Value::Matrix(m)) => map_matrix(m, |item| binary(op, lhs, item, cx)),

        _ => arith::binary(op, lhs, rhs, cx),
    }
}

/// Apply a unary operation, lifting element-wise over containers.
pub fn unary(op: UnaryOp, value: &Value, cx: &ArithCx) -> Result<Value, ValueError> {
    match value {
        Value::Range(r) => {
            let items = range::materialize(r, cx)?;
            unary(op, &Value::Vector(items), cx)
        }
        Value::Vector(items) => Ok(Value::Vector(
            items
                .iter()
                .map(|item| unary(op, item, cx))
                .collect::<Result<Vec<_>, _>>()?,
        )),
        Value::Matrix(m) => map_matrix(m, |item| unary(op, item, cx)),
        scalar => arith::unary(op, scalar, cx),
    }
}

/// Vector-vector element-wise with the documented length rules: equal
/// lengths pair, a one-element side broadcasts, and otherwise the shorter
/// side is conceptually zero-extended to the longer length.
fn vector_vector(
    op: BinOp,
    a: &[Value],
    b: &[Value],
    cx: &ArithCx,
) -> Result<Value, ValueError> {
    if a.len() == 1 && b.len() != 1 {
        return Ok(Value::Vector(
            b.iter()
                .map(|item| binary(op, &a[0], item, cx))
                .collect::<Result<Vec<_>, _>>()?,
        ));
    }
    if b.len() == 1 && a.len() != 1 {
        return Ok(Value::Vector(
            a.iter()
                .map(|item| binary(op, item, &b[0], cx))
                .collect::<Result<Vec<_>, _>>()?,
        ));
    }

    let len = a.len().max(b.len());
    let zero = Value::integer(0);
    let mut items = Vec::with_capacity(len);
    for i in 0..len {
        let x = a.get(i).unwrap_or(&zero);
        let y = b.get(i).unwrap_or(&zero);
        items.push(binary(op, x, y, cx)?);
    }
    Ok(Value::Vector(items))
}

/// Vector-matrix row-wise application. The vector length must match the
/// row width.
fn rowwise(
    op: BinOp,
    m: &Matrix,
    v: &[Value],
    cx: &ArithCx,
    apply: impl Fn(BinOp, &Value, &Value, &ArithCx) -> Result<Value, ValueError>,
) -> Result<Value, ValueError> {
    if v.len() != m.cols() {
        return Err(ValueError::type_error(format!(
            "vector of length {} does not fit matrix rows of width {}",
            v.len(),
            m.cols()
        )));
    }
    let mut data = Vec::with_capacity(m.rows() * m.cols());
    for row in m.iter_rows() {
        for (row_item, vec_item) in row.iter().zip(v.iter()) {
            data.push(apply(op, row_item, vec_item, cx)?);
        }
    }
    Ok(Value::Matrix(Matrix::from_flat(m.rows(), m.cols(), data)))
}

fn map_matrix(
    m: &Matrix,
    f: impl Fn(&Value) -> Result<Value, ValueError>,
) -> Result<Value, ValueError> {
    let data = m
        .as_slice()
        .iter()
        .map(f)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::Matrix(Matrix::from_flat(m.rows(), m.cols(), data)))
}

fn matmul_values(lhs: &Value, rhs: &Value, cx: &ArithCx) -> Result<Value, ValueError> {
    match (lhs, rhs) {
        (Value::Matrix(a), Value::Matrix(b)) => {
            Ok(Value::Matrix(linalg::matmul(a, b, cx)?))
        }
        _ => Err(ValueError::type_error(format!(
            "'@' requires matrices, found {} and {}",
            lhs.kind_name(),
            rhs.kind_name()
        ))),
    }
}
