//! The tree-walking evaluator.
//!
//! [`Evaluator::eval`] does exhaustive case analysis over the AST node
//! kinds. Operator semantics are delegated to the value layer through the
//! broadcasting engine; name resolution walks the context's scope chain
//! and falls back to the registries.
//!
//! Resolution priority for a bare name: local scopes, then call-scope
//! parameters, then globals, then the constant registry. Explicit
//! references (`$v`, `#c`, `@u`) skip that order and resolve in exactly
//! one namespace, bypassing shadows.

use std::rc::Rc;

use mex_par::{
    BinOp, Bindings, Expr, FunctionValue, LambdaValue, Literal, RangeValue, RefKind,
    UnitValue, Value,
};
use mex_reg::{FunctionDescriptor, Registries, VARIADIC};
use mex_util::{Span, Symbol};
use mex_val::{arith, broadcast, ArithCx};

use crate::builtins::{self, Handler};
use crate::context::{EvalContext, Frame};
use crate::error::{EvalError, EvalErrorKind};

/// AST walker. Holds the registries; all mutable state lives in the
/// [`EvalContext`] passed to each call.
pub struct Evaluator<'a> {
    registries: &'a Registries,
}

impl<'a> Evaluator<'a> {
    pub fn new(registries: &'a Registries) -> Self {
        Self { registries }
    }

    pub fn registries(&self) -> &Registries {
        self.registries
    }

    /// The arithmetic context for the current evaluation modes.
    pub(crate) fn arith_cx(&self, ctx: &EvalContext) -> ArithCx<'a> {
        ArithCx::new(ctx.config.force_double_arithmetic, &self.registries.units)
    }

    /// Evaluate one expression.
    pub fn eval(&self, expr: &Expr, ctx: &mut EvalContext) -> Result<Value, EvalError> {
        match expr {
            Expr::Literal { value, span: _ } => Ok(self.literal(value, ctx)),

            Expr::Variable { name, span } => self.resolve_variable(*name, *span, ctx),

            Expr::Ref { kind, name, span } => self.resolve_ref(*kind, *name, *span, ctx),

            Expr::Unary { op, operand, span } => {
                let value = self.eval(operand, ctx)?;
                broadcast::unary(*op, &value, &self.arith_cx(ctx))
                    .map_err(|e| EvalError::from_value(e, *span))
            }

            Expr::Binary { op, lhs, rhs, span } => self.binary(*op, lhs, rhs, *span, ctx),

            Expr::Call { callee, args, span } => self.call(callee, args, *span, ctx),

            Expr::Subscript { target, args, span } => {
                let value = self.eval(target, ctx)?;
                self.subscript(value, args, *span, ctx)
            }

            Expr::Range {
                start,
                end,
                step,
                span,
            } => {
                let start = self.eval(start, ctx)?;
                let end = self.eval(end, ctx)?;
                let step = match step {
                    Some(step) => self.eval(step, ctx)?,
                    None => Value::integer(1),
                };
                for bound in [&start, &end, &step] {
                    if !bound.is_scalar_numeric() {
                        return Err(EvalError::new(
                            EvalErrorKind::Type(format!(
                                "range bounds must be numbers, found {}",
                                bound.kind_name()
                            )),
                            *span,
                        ));
                    }
                }
                Ok(Value::Range(RangeValue::new(start, end, step)))
            }

            Expr::Convert { value, unit, span } => self.convert(value, *unit, *span, ctx),

            Expr::Assign { name, value, span: _ } => {
                let value = self.eval(value, ctx)?;
                ctx.bind(*name, value.clone());
                Ok(value)
            }

            Expr::FunctionDef {
                name,
                params,
                body,
                span: _,
            } => {
                let function = Value::Function(Rc::new(FunctionValue {
                    name: *name,
                    params: params.clone(),
                    body: (**body).clone(),
                }));
                ctx.bind(*name, function.clone());
                Ok(function)
            }

            Expr::Lambda { params, body, span: _ } => {
                Ok(Value::Lambda(Rc::new(LambdaValue {
                    params: params.clone(),
                    body: (**body).clone(),
                    captured: ctx.flatten_locals(),
                })))
            }

            Expr::Vector { items, span: _ } => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval(item, ctx)?);
                }
                Ok(Value::Vector(values))
            }

            Expr::Matrix { rows, span } => {
                let mut value_rows = Vec::with_capacity(rows.len());
                for row in rows {
                    let mut values = Vec::with_capacity(row.len());
                    for item in row {
                        values.push(self.eval(item, ctx)?);
                    }
                    value_rows.push(values);
                }
                mex_par::Matrix::from_rows(value_rows)
                    .map(Value::Matrix)
                    .ok_or_else(|| {
                        EvalError::new(
                            EvalErrorKind::Type("matrix rows must have equal length".to_string()),
                            *span,
                        )
                    })
            }

            Expr::Comprehension {
                expr,
                iterators,
                predicate,
                span: _,
            } => {
                let mut out = Vec::new();
                self.comprehend(expr, iterators, predicate.as_deref(), 0, &mut out, ctx)?;
                Ok(Value::Vector(out))
            }

            Expr::Sequence {
                statements,
                span: _,
            } => {
                let mut last = None;
                for statement in statements {
                    last = Some(self.eval(statement, ctx)?);
                }
                last.ok_or_else(|| {
                    EvalError::new(
                        EvalErrorKind::Type("empty statement sequence".to_string()),
                        expr.span(),
                    )
                })
            }
        }
    }

    fn literal(&self, literal: &Literal, ctx: &EvalContext) -> Value {
        match literal {
            Literal::Integer(r) => Value::Rational(r.clone()),
            Literal::Rational(r) => {
                if ctx.config.force_double_arithmetic {
                    Value::Double(r.to_f64())
                } else {
                    Value::Rational(r.clone())
                }
            }
            Literal::Double(d) => Value::Double(*d),
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Str(s) => Value::Str(s.clone()),
        }
    }

    fn resolve_variable(
        &self,
        name: Symbol,
        span: Span,
        ctx: &EvalContext,
    ) -> Result<Value, EvalError> {
        if let Some(value) = ctx.lookup(name) {
            return Ok(value.clone());
        }
        if let Some(constant) = self.registries.constants.value_of(name.as_str()) {
            return Ok(Value::Double(constant));
        }
        Err(EvalError::new(
            EvalErrorKind::UndefinedVariable(name),
            span,
        ))
    }

    fn resolve_ref(
        &self,
        kind: RefKind,
        name: Symbol,
        span: Span,
        ctx: &EvalContext,
    ) -> Result<Value, EvalError> {
        match kind {
            RefKind::Var => ctx
                .lookup(name)
                .cloned()
                .ok_or_else(|| EvalError::new(EvalErrorKind::UndefinedVariable(name), span)),
            RefKind::Const => self
                .registries
                .constants
                .value_of(name.as_str())
                .map(Value::Double)
                .ok_or_else(|| EvalError::new(EvalErrorKind::UndefinedVariable(name), span)),
            RefKind::Unit => {
                if self.registries.units.is_unit(name.as_str()) {
                    Ok(Value::Unit(UnitValue::new(Value::integer(1), name)))
                } else {
                    Err(EvalError::new(
                        EvalErrorKind::UnknownUnit(name.as_str().to_string()),
                        span,
                    ))
                }
            }
        }
    }

    fn binary(
        &self,
        op: BinOp,
        lhs: &Expr,
        rhs: &Expr,
        span: Span,
        ctx: &mut EvalContext,
    ) -> Result<Value, EvalError> {
        // Short-circuit logic never evaluates the discarded side.
        if matches!(op, BinOp::And | BinOp::Or) {
            let left = self.eval(lhs, ctx)?;
            let left = left.as_bool().ok_or_else(|| {
                EvalError::new(
                    EvalErrorKind::Type(format!(
                        "'{}' requires booleans, found {}",
                        op.as_str(),
                        left.kind_name()
                    )),
                    lhs.span(),
                )
            })?;
            if op == BinOp::And && !left {
                return Ok(Value::Bool(false));
            }
            if op == BinOp::Or && left {
                return Ok(Value::Bool(true));
            }
            let right = self.eval(rhs, ctx)?;
            return right.as_bool().map(Value::Bool).ok_or_else(|| {
                EvalError::new(
                    EvalErrorKind::Type(format!(
                        "'{}' requires booleans, found {}",
                        op.as_str(),
                        right.kind_name()
                    )),
                    rhs.span(),
                )
            });
        }

        let left = self.eval(lhs, ctx)?;
        let right = self.eval(rhs, ctx)?;
        broadcast::binary(op, &left, &right, &self.arith_cx(ctx))
            .map_err(|e| EvalError::from_value(e, span))
    }

    fn convert(
        &self,
        value: &Expr,
        unit: Symbol,
        span: Span,
        ctx: &mut EvalContext,
    ) -> Result<Value, EvalError> {
        if !self.registries.units.is_unit(unit.as_str()) {
            return Err(EvalError::new(
                EvalErrorKind::UnknownUnit(unit.as_str().to_string()),
                span,
            ));
        }
        let value = self.eval(value, ctx)?;
        match value {
            Value::Unit(u) => {
                let magnitude = u.magnitude.as_f64().ok_or_else(|| {
                    EvalError::new(
                        EvalErrorKind::Type(format!(
                            "unit magnitude must be numeric, found {}",
                            u.magnitude.kind_name()
                        )),
                        span,
                    )
                })?;
                let converted = self
                    .registries
                    .units
                    .convert(magnitude, u.unit.as_str(), unit.as_str())
                    .map_err(|e| EvalError::from_value(e.into(), span))?;
                Ok(Value::Unit(UnitValue::new(Value::Double(converted), unit)))
            }
            // A plain number is taken to already be in the target unit.
            scalar if scalar.is_scalar_numeric() => {
                Ok(Value::Unit(UnitValue::new(scalar, unit)))
            }
            other => Err(EvalError::new(
                EvalErrorKind::Type(format!("cannot convert {} to a unit", other.kind_name())),
                span,
            )),
        }
    }

    // =========================================================================
    // Calls
    // =========================================================================

    fn call(
        &self,
        callee: &Expr,
        args: &[Expr],
        span: Span,
        ctx: &mut EvalContext,
    ) -> Result<Value, EvalError> {
        if let Expr::Variable { name, span: name_span } = callee {
            // User definitions shadow built-ins.
            if let Some(value) = ctx.lookup(*name) {
                let value = value.clone();
                let values = self.eval_args(args, ctx)?;
                return self.call_value(&value, values, span, ctx);
            }
            if let Some(descriptor) = self.registries.functions.lookup(name.as_str()) {
                return self.call_builtin(descriptor, args, span, ctx);
            }
            return Err(EvalError::new(
                EvalErrorKind::UndefinedVariable(*name),
                *name_span,
            ));
        }
        let value = self.eval(callee, ctx)?;
        let values = self.eval_args(args, ctx)?;
        self.call_value(&value, values, span, ctx)
    }

    fn eval_args(&self, args: &[Expr], ctx: &mut EvalContext) -> Result<Vec<Value>, EvalError> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval(arg, ctx)?);
        }
        Ok(values)
    }

    /// Invoke an already-evaluated callable with evaluated arguments.
    pub(crate) fn call_value(
        &self,
        callee: &Value,
        args: Vec<Value>,
        span: Span,
        ctx: &mut EvalContext,
    ) -> Result<Value, EvalError> {
        match callee {
            Value::Lambda(lambda) => {
                check_arity("<lambda>", lambda.params.len(), args.len(), span)?;
                let mut bindings = lambda.captured.clone();
                bind_params(&mut bindings, &lambda.params, args.iter());
                self.enter_frame("<lambda>", &args, span, ctx)?;
                ctx.push_call_scope(bindings);
                let result = self.eval(&lambda.body, ctx);
                ctx.pop_scope();
                ctx.exit_call();
                result
            }
            Value::Function(function) => {
                check_arity(
                    function.name.as_str(),
                    function.params.len(),
                    args.len(),
                    span,
                )?;
                let mut bindings = Bindings::default();
                bind_params(&mut bindings, &function.params, args.iter());
                self.enter_frame(function.name.as_str(), &args, span, ctx)?;
                ctx.push_call_scope(bindings);
                let result = self.eval(&function.body, ctx);
                ctx.pop_scope();
                ctx.exit_call();
                result
            }
            other => Err(EvalError::new(
                EvalErrorKind::Type(format!("{} is not callable", other.kind_name())),
                span,
            )),
        }
    }

    fn enter_frame(
        &self,
        name: &str,
        args: &[Value],
        span: Span,
        ctx: &mut EvalContext,
    ) -> Result<(), EvalError> {
        ctx.enter_call(
            Frame {
                name: name.to_string(),
                args: summarize_args(args),
            },
            span,
        )
    }

    fn call_builtin(
        &self,
        descriptor: &FunctionDescriptor,
        args: &[Expr],
        span: Span,
        ctx: &mut EvalContext,
    ) -> Result<Value, EvalError> {
        if args.len() < descriptor.min_arity
            || (descriptor.max_arity != VARIADIC && args.len() > descriptor.max_arity)
        {
            return Err(EvalError::new(
                EvalErrorKind::Arity {
                    name: descriptor.name.to_string(),
                    expected: descriptor.arity_text(),
                    actual: args.len(),
                },
                span,
            ));
        }
        let handler = builtins::handler_for(descriptor.name).ok_or_else(|| {
            EvalError::new(
                EvalErrorKind::Type(format!(
                    "built-in '{}' has no implementation",
                    descriptor.name
                )),
                span,
            )
        })?;
        match handler {
            Handler::Lazy(f) => f(self, ctx, args, span),
            Handler::Eager(f) => {
                let values = self.eval_args(args, ctx)?;
                if descriptor.broadcasts && values.first().is_some_and(Value::is_container) {
                    self.broadcast_builtin(f, &values, span, ctx)
                } else {
                    f(self, ctx, &values, span)
                }
            }
        }
    }

    /// Lift a broadcast-supporting built-in element-wise over a container
    /// in first-argument position.
    fn broadcast_builtin(
        &self,
        f: builtins::EagerFn,
        values: &[Value],
        span: Span,
        ctx: &mut EvalContext,
    ) -> Result<Value, EvalError> {
        let call_one = |element: &Value, ctx: &mut EvalContext| {
            let mut call_args = values.to_vec();
            call_args[0] = element.clone();
            if call_args[0].is_container() {
                self.broadcast_builtin(f, &call_args, span, ctx)
            } else {
                f(self, ctx, &call_args, span)
            }
        };
        match &values[0] {
            Value::Vector(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(call_one(item, ctx)?);
                }
                Ok(Value::Vector(out))
            }
            Value::Range(range) => {
                let items = mex_val::range::materialize(range, &self.arith_cx(ctx))
                    .map_err(|e| EvalError::from_value(e, span))?;
                self.broadcast_builtin(
                    f,
                    &replace_first(values, Value::Vector(items)),
                    span,
                    ctx,
                )
            }
            Value::Matrix(m) => {
                let mut data = Vec::with_capacity(m.rows() * m.cols());
                for item in m.as_slice() {
                    data.push(call_one(item, ctx)?);
                }
                Ok(Value::Matrix(mex_par::Matrix::from_flat(
                    m.rows(),
                    m.cols(),
                    data,
                )))
            }
            _ => unreachable!("broadcast_builtin called without a container"),
        }
    }

    // =========================================================================
    // Comprehension
    // =========================================================================

    fn comprehend(
        &self,
        element: &Expr,
        iterators: &[(Symbol, Expr)],
        predicate: Option<&Expr>,
        level: usize,
        out: &mut Vec<Value>,
        ctx: &mut EvalContext,
    ) -> Result<(), EvalError> {
        if level == iterators.len() {
            if let Some(pred) = predicate {
                let cond = self.eval(pred, ctx)?;
                match cond.as_bool() {
                    Some(true) => {}
                    Some(false) => return Ok(()),
                    None => {
                        return Err(EvalError::new(
                            EvalErrorKind::Type(format!(
                                "comprehension predicate must be a boolean, found {}",
                                cond.kind_name()
                            )),
                            pred.span(),
                        ))
                    }
                }
            }
            out.push(self.eval(element, ctx)?);
            return Ok(());
        }

        let (name, iterable_expr) = &iterators[level];
        let iterable = self.eval(iterable_expr, ctx)?;
        let items = self.iterate(iterable, iterable_expr.span(), ctx)?;
        ctx.push_scope();
        let mut result = Ok(());
        for item in items {
            ctx.bind(*name, item);
            result = self.comprehend(element, iterators, predicate, level + 1, out, ctx);
            if result.is_err() {
                break;
            }
        }
        ctx.pop_scope();
        result
    }

    /// The items a value yields under iteration.
    pub(crate) fn iterate(
        &self,
        value: Value,
        span: Span,
        ctx: &EvalContext,
    ) -> Result<Vec<Value>, EvalError> {
        match value {
            Value::Vector(items) => Ok(items),
            Value::Range(range) => mex_val::range::materialize(&range, &self.arith_cx(ctx))
                .map_err(|e| EvalError::from_value(e, span)),
            Value::Matrix(m) => Ok((0..m.rows()).map(|r| Value::Vector(m.row(r))).collect()),
            other => Err(EvalError::new(
                EvalErrorKind::Type(format!("cannot iterate over {}", other.kind_name())),
                span,
            )),
        }
    }
}

fn bind_params<'v>(
    bindings: &mut Bindings,
    params: &[Symbol],
    args: impl Iterator<Item = &'v Value>,
) {
    for (param, arg) in params.iter().zip(args) {
        bindings.insert(*param, arg.clone());
    }
}

fn check_arity(name: &str, expected: usize, actual: usize, span: Span) -> Result<(), EvalError> {
    if expected != actual {
        return Err(EvalError::new(
            EvalErrorKind::Arity {
                name: name.to_string(),
                expected: expected.to_string(),
                actual,
            },
            span,
        ));
    }
    Ok(())
}

fn replace_first(values: &[Value], first: Value) -> Vec<Value> {
    let mut out = values.to_vec();
    out[0] = first;
    out
}

/// Compact argument list for call-stack diagnostics.
fn summarize_args(args: &[Value]) -> String {
    const MAX_LEN: usize = 32;
    let mut text = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            text.push_str(", ");
        }
        text.push_str(&arith::stringify(arg));
        if text.len() > MAX_LEN {
            text.truncate(MAX_LEN);
            text.push_str("...");
            break;
        }
    }
    text
}
