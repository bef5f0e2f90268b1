//! mex-val - Value semantics for the Mex expression engine.
//!
//! This crate owns the numeric behavior of the language:
//!
//! - [`arith`] - the universal scalar dispatch with the full
//!   type-preservation table (rationals, doubles, percents, units,
//!   strings, booleans)
//! - [`broadcast`] - element-wise lifting over vectors and matrices
//! - [`linalg`] - matrix multiplication, powers, determinant, inverse
//! - [`range`] - lazy range materialization
//!
//! The evaluator calls [`broadcast::binary`] / [`broadcast::unary`] for
//! every operator; scalar-only callers can reach [`arith`] directly.

pub mod arith;
pub mod broadcast;
pub mod error;
pub mod linalg;
pub mod range;

pub use error::ValueError;

use mex_reg::UnitRegistry;

/// Context the arithmetic layer consults: the double-arithmetic mode flag
/// and the unit registry for unit-tagged operands.
#[derive(Clone, Copy)]
pub struct ArithCx<'a> {
    pub force_double: bool,
    pub units: &'a UnitRegistry,
}

impl<'a> ArithCx<'a> {
    pub fn new(force_double: bool, units: &'a UnitRegistry) -> Self {
        Self {
            force_double,
            units,
        }
    }
}
