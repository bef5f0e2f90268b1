//! Built-in function implementations.
//!
//! The catalog metadata (names, aliases, arity, flags) lives in
//! `mex-reg`; this module binds an invocation handler to each canonical
//! name. A unit test checks the two tables cover each other exactly.
//!
//! Handlers come in two shapes: eager handlers receive evaluated values,
//! lazy handlers (only `if`) receive the argument expressions and choose
//! what to evaluate.

mod agg;
mod higher;
mod ints;
mod math;
mod matrix;

use mex_par::{Expr, Value};
use mex_util::Span;

use crate::context::EvalContext;
use crate::error::{EvalError, EvalErrorKind};
use crate::interp::Evaluator;

/// Eager handler: arguments are already evaluated.
pub type EagerFn = fn(&Evaluator, &mut EvalContext, &[Value], Span) -> Result<Value, EvalError>;

/// Lazy handler: receives the raw argument expressions.
pub type LazyFn = fn(&Evaluator, &mut EvalContext, &[Expr], Span) -> Result<Value, EvalError>;

/// The invocation attached to a catalog entry.
#[derive(Clone, Copy)]
pub enum Handler {
    Eager(EagerFn),
    Lazy(LazyFn),
}

/// The handler bound to a canonical built-in name.
pub fn handler_for(name: &str) -> Option<Handler> {
    use Handler::{Eager, Lazy};
    Some(match name {
        // Trigonometry
        "sin" => Eager(math::sin),
        "cos" => Eager(math::cos),
        "tan" => Eager(math::tan),
        "asin" => Eager(math::asin),
        "acos" => Eager(math::acos),
        "atan" => Eager(math::atan),
        "sinh" => Eager(math::sinh),
        "cosh" => Eager(math::cosh),
        "tanh" => Eager(math::tanh),

        // Exponentials and logarithms
        "sqrt" => Eager(math::sqrt),
        "cbrt" => Eager(math::cbrt),
        "exp" => Eager(math::exp),
        "ln" => Eager(math::ln),
        "log" => Eager(math::log),
        "log2" => Eager(math::log2),
        "log10" => Eager(math::log10),

        // Rounding and sign
        "abs" => Eager(math::abs),
        "sign" => Eager(math::sign),
        "floor" => Eager(math::floor),
        "ceil" => Eager(math::ceil),
        "round" => Eager(math::round),
        "trunc" => Eager(math::trunc),

        // Aggregation
        "sum" => Eager(agg::sum),
        "prod" => Eager(agg::prod),
        "min" => Eager(agg::min),
        "max" => Eager(agg::max),
        "mean" => Eager(agg::mean),
        "median" => Eager(agg::median),
        "count" => Eager(agg::count),

        // Higher-order
        "map" => Eager(higher::map),
        "filter" => Eager(higher::filter),
        "reduce" => Eager(higher::reduce),

        // Lazy control flow
        "if" => Lazy(higher::lazy_if),

        // Integer math
        "gcd" => Eager(ints::gcd),
        "lcm" => Eager(ints::lcm),
        "fact" => Eager(ints::fact),

        // Vectors and matrices
        "det" => Eager(matrix::det),
        "transpose" => Eager(matrix::transpose),
        "identity" => Eager(matrix::identity),
        "inv" => Eager(matrix::inv),
        "dot" => Eager(matrix::dot),

        // Sequences
        "sort" => Eager(agg::sort),
        "reverse" => Eager(agg::reverse),
        "first" => Eager(agg::first),
        "last" => Eager(agg::last),

        _ => return None,
    })
}

/// The double content of a scalar argument; angle-tagged units are fine
/// for the caller to handle, so plain extraction rejects non-numerics.
pub(crate) fn f64_arg(value: &Value, span: Span) -> Result<f64, EvalError> {
    value.as_f64().ok_or_else(|| {
        EvalError::new(
            EvalErrorKind::Type(format!("expected a number, found {}", value.kind_name())),
            span,
        )
    })
}

pub(crate) fn domain(message: impl Into<String>, span: Span) -> EvalError {
    EvalError::new(EvalErrorKind::Domain(message.into()), span)
}

pub(crate) fn type_error(message: impl Into<String>, span: Span) -> EvalError {
    EvalError::new(EvalErrorKind::Type(message.into()), span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mex_reg::FunctionRegistry;

    #[test]
    fn test_every_catalog_entry_has_a_handler() {
        let registry = FunctionRegistry::default();
        for descriptor in registry.iter() {
            assert!(
                handler_for(descriptor.name).is_some(),
                "no handler bound for built-in '{}'",
                descriptor.name
            );
        }
    }

    #[test]
    fn test_lazy_flag_matches_handler_shape() {
        let registry = FunctionRegistry::default();
        for descriptor in registry.iter() {
            let lazy_handler = matches!(handler_for(descriptor.name), Some(Handler::Lazy(_)));
            assert_eq!(
                descriptor.lazy, lazy_handler,
                "laziness mismatch for built-in '{}'",
                descriptor.name
            );
        }
    }
}
