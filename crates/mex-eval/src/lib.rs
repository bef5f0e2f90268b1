//! mex-eval - Evaluator for the Mex expression engine.
//!
//! [`Evaluator`] walks the AST produced by `mex-par`, resolving names
//! through an [`EvalContext`] (scope stack, call-stack accounting,
//! evaluation modes) and dispatching operators through the `mex-val`
//! broadcasting engine. Built-in functions live in [`builtins`], bound by
//! name to the catalog metadata in `mex-reg`.

pub mod builtins;
pub mod context;
pub mod error;
pub mod interp;
mod subscript;

pub use context::{EvalContext, Frame};
pub use error::{EvalError, EvalErrorKind};
pub use interp::Evaluator;

use mex_par::{Expr, Value};
use mex_reg::Registries;

/// Evaluate an AST against a context.
pub fn evaluate(
    ast: &Expr,
    registries: &Registries,
    ctx: &mut EvalContext,
) -> Result<Value, EvalError> {
    Evaluator::new(registries).eval(ast, ctx)
}
