//! Runtime value model.
//!
//! A closed sum of value kinds. Values are immutable; every operation
//! produces a new value. The arithmetic over these kinds lives in the
//! `mex-val` crate; this module owns the shapes, the container invariants,
//! and the canonical display forms.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::ast::Expr;
use mex_util::{Rational, Symbol};

/// Variable bindings, keyed by interned name.
pub type Bindings = FxHashMap<Symbol, Value>;

/// Runtime value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Exact integer or ratio
    Rational(Rational),
    /// IEEE-754 double
    Double(f64),
    /// Percentage, stored as the decimal fraction (`50%` stores 0.5)
    Percent(f64),
    Bool(bool),
    Str(String),
    /// Numeric magnitude tagged with a unit name
    Unit(UnitValue),
    /// Ordered values, heterogeneous allowed
    Vector(Vec<Value>),
    /// Rectangular 2-D grid
    Matrix(Matrix),
    /// Lazy arithmetic progression
    Range(RangeValue),
    Lambda(Rc<LambdaValue>),
    Function(Rc<FunctionValue>),
}

impl Value {
    /// Kind name for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Rational(_) => "rational",
            Value::Double(_) => "double",
            Value::Percent(_) => "percent",
            Value::Bool(_) => "boolean",
            Value::Str(_) => "string",
            Value::Unit(_) => "unit",
            Value::Vector(_) => "vector",
            Value::Matrix(_) => "matrix",
            Value::Range(_) => "range",
            Value::Lambda(_) => "lambda",
            Value::Function(_) => "function",
        }
    }

    /// Convenience constructor for integer values.
    pub fn integer(n: i64) -> Value {
        Value::Rational(Rational::from(n))
    }

    /// True for the scalar numeric kinds (rational, double, percent).
    pub fn is_scalar_numeric(&self) -> bool {
        matches!(
            self,
            Value::Rational(_) | Value::Double(_) | Value::Percent(_)
        )
    }

    /// True for containers that broadcasting lifts over.
    pub fn is_container(&self) -> bool {
        matches!(self, Value::Vector(_) | Value::Matrix(_) | Value::Range(_))
    }

    /// The boolean content, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The closest double approximation of a scalar numeric value.
    ///
    /// Percents contribute their decimal fraction; units their magnitude.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Rational(r) => Some(r.to_f64()),
            Value::Double(d) => Some(*d),
            Value::Percent(p) => Some(*p),
            Value::Unit(u) => u.magnitude.as_f64(),
            _ => None,
        }
    }

    /// The value as an exact integer index, if it is one.
    pub fn as_index(&self) -> Option<i64> {
        match self {
            Value::Rational(r) => r.to_i64(),
            Value::Double(d) if d.fract() == 0.0 && d.is_finite() => Some(*d as i64),
            _ => None,
        }
    }
}

/// A numeric magnitude tagged with a unit name.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitValue {
    pub magnitude: Box<Value>,
    pub unit: Symbol,
}

impl UnitValue {
    pub fn new(magnitude: Value, unit: Symbol) -> Self {
        Self {
            magnitude: Box::new(magnitude),
            unit,
        }
    }
}

/// Rectangular 2-D grid of values, stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<Value>,
}

impl Matrix {
    /// Build from rows. Returns `None` when the rows are ragged or empty.
    pub fn from_rows(rows: Vec<Vec<Value>>) -> Option<Matrix> {
        let row_count = rows.len();
        let cols = rows.first()?.len();
        if cols == 0 || rows.iter().any(|row| row.len() != cols) {
            return None;
        }
        let mut data = Vec::with_capacity(row_count * cols);
        for row in rows {
            data.extend(row);
        }
        Some(Matrix {
            rows: row_count,
            cols,
            data,
        })
    }

    /// Build from a flat row-major buffer. `data.len()` must be
    /// `rows * cols`.
    pub fn from_flat(rows: usize, cols: usize, data: Vec<Value>) -> Matrix {
        debug_assert_eq!(rows * cols, data.len());
        Matrix { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> &Value {
        &self.data[row * self.cols + col]
    }

    /// The `row`-th row as a fresh vector of values.
    pub fn row(&self, row: usize) -> Vec<Value> {
        self.data[row * self.cols..(row + 1) * self.cols].to_vec()
    }

    /// The `col`-th column as a fresh vector of values.
    pub fn col(&self, col: usize) -> Vec<Value> {
        (0..self.rows).map(|r| self.get(r, col).clone()).collect()
    }

    /// Iterate over rows as slices.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Value]> {
        self.data.chunks(self.cols)
    }

    /// The flat row-major buffer.
    pub fn as_slice(&self) -> &[Value] {
        &self.data
    }
}

/// Lazy arithmetic progression. Never materializes until iterated; the
/// element count is `max(0, floor((end - start) / step) + 1)`.
#[derive(Clone, Debug, PartialEq)]
pub struct RangeValue {
    pub start: Box<Value>,
    pub end: Box<Value>,
    pub step: Box<Value>,
}

impl RangeValue {
    pub fn new(start: Value, end: Value, step: Value) -> Self {
        Self {
            start: Box::new(start),
            end: Box::new(end),
            step: Box::new(step),
        }
    }
}

/// An anonymous function with its captured environment snapshot.
#[derive(Debug, PartialEq)]
pub struct LambdaValue {
    pub params: Vec<Symbol>,
    pub body: Expr,
    pub captured: Bindings,
}

/// A named user definition. Free variables resolve against the globals at
/// call time, so recursive definitions need no self-pointer.
#[derive(Debug, PartialEq)]
pub struct FunctionValue {
    pub name: Symbol,
    pub params: Vec<Symbol>,
    pub body: Expr,
}

/// Escape a string for canonical double-quoted display.
fn escape_into(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "\"")?;
    for c in s.chars() {
        match c {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            '\r' => write!(f, "\\r")?,
            other => write!(f, "{}", other)?,
        }
    }
    write!(f, "\"")
}

fn join_params(params: &[Symbol]) -> String {
    params
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Value {
    /// Canonical string forms: rationals as `n/d`, vectors as `{a, b, c}`,
    /// matrices in nested form, percents with a trailing `%`, units as
    /// `value unit`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Rational(r) => write!(f, "{}", r),
            Value::Double(d) => write!(f, "{}", d),
            Value::Percent(p) => write!(f, "{}%", p * 100.0),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Str(s) => escape_into(f, s),
            Value::Unit(u) => write!(f, "{} {}", u.magnitude, u.unit),
            Value::Vector(items) => {
                write!(f, "{{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "}}")
            }
            Value::Matrix(m) => {
                write!(f, "[")?;
                for (r, row) in m.iter_rows().enumerate() {
                    if r > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "[")?;
                    for (c, item) in row.iter().enumerate() {
                        if c > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", item)?;
                    }
                    write!(f, "]")?;
                }
                write!(f, "]")
            }
            Value::Range(range) => {
                write!(f, "{}..{}", range.start, range.end)?;
                if *range.step != Value::integer(1) {
                    write!(f, " step {}", range.step)?;
                }
                Ok(())
            }
            Value::Lambda(lambda) => {
                write!(f, "<lambda({})>", join_params(&lambda.params))
            }
            Value::Function(function) => write!(
                f,
                "<function {}({})>",
                function.name,
                join_params(&function.params)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_from_rows_rectangular() {
        let m = Matrix::from_rows(vec![
            vec![Value::integer(1), Value::integer(2)],
            vec![Value::integer(3), Value::integer(4)],
        ])
        .unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 2);
        assert_eq!(m.get(1, 0), &Value::integer(3));
    }

    #[test]
    fn test_matrix_ragged_rejected() {
        assert!(Matrix::from_rows(vec![
            vec![Value::integer(1), Value::integer(2)],
            vec![Value::integer(3)],
        ])
        .is_none());
        assert!(Matrix::from_rows(vec![]).is_none());
        assert!(Matrix::from_rows(vec![vec![]]).is_none());
    }

    #[test]
    fn test_matrix_row_col() {
        let m = Matrix::from_rows(vec![
            vec![Value::integer(1), Value::integer(2)],
            vec![Value::integer(3), Value::integer(4)],
        ])
        .unwrap();
        assert_eq!(m.row(0), vec![Value::integer(1), Value::integer(2)]);
        assert_eq!(m.col(1), vec![Value::integer(2), Value::integer(4)]);
    }

    #[test]
    fn test_display_scalars() {
        assert_eq!(Value::integer(42).to_string(), "42");
        assert_eq!(
            Value::Rational(Rational::new(3.into(), 2.into()).unwrap()).to_string(),
            "3/2"
        );
        assert_eq!(Value::Double(2.5).to_string(), "2.5");
        assert_eq!(Value::Percent(0.5).to_string(), "50%");
        assert_eq!(Value::Bool(true).to_string(), "true");
    }

    #[test]
    fn test_display_string_reescapes() {
        assert_eq!(
            Value::Str("a\"b\\c\nd".to_string()).to_string(),
            "\"a\\\"b\\\\c\\nd\""
        );
    }

    #[test]
    fn test_display_containers() {
        let v = Value::Vector(vec![Value::integer(1), Value::integer(2)]);
        assert_eq!(v.to_string(), "{1, 2}");
        let m = Value::Matrix(
            Matrix::from_rows(vec![
                vec![Value::integer(1), Value::integer(2)],
                vec![Value::integer(3), Value::integer(4)],
            ])
            .unwrap(),
        );
        assert_eq!(m.to_string(), "[[1, 2], [3, 4]]");
    }

    #[test]
    fn test_display_unit_and_range() {
        let unit = Value::Unit(UnitValue::new(Value::integer(5), Symbol::intern("meters")));
        assert_eq!(unit.to_string(), "5 meters");

        let range = Value::Range(RangeValue::new(
            Value::integer(1),
            Value::integer(5),
            Value::integer(1),
        ));
        assert_eq!(range.to_string(), "1..5");

        let stepped = Value::Range(RangeValue::new(
            Value::integer(0),
            Value::integer(10),
            Value::integer(2),
        ));
        assert_eq!(stepped.to_string(), "0..10 step 2");
    }

    #[test]
    fn test_as_index() {
        assert_eq!(Value::integer(-2).as_index(), Some(-2));
        assert_eq!(Value::Double(3.0).as_index(), Some(3));
        assert_eq!(Value::Double(3.5).as_index(), None);
        assert_eq!(Value::Bool(true).as_index(), None);
    }
}
