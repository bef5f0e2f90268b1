//! Evaluation context: scope stack, call-stack accounting, and modes.
//!
//! Scopes form a stack. Only the innermost scope accepts new bindings;
//! reading walks outward. Function and lambda bodies push a *barrier*
//! scope: lookups check the barrier scope itself, then jump straight to
//! the globals, so callee bodies never see caller locals. User functions
//! therefore read free variables from the then-current globals at call
//! time (late binding).
//!
//! Recursion depth is tracked explicitly here rather than inferred from
//! the host stack, so the bound is portable and the overflow diagnostic
//! can carry the offending call frames.

use mex_par::{Bindings, Value};
use mex_util::{EngineConfig, Span, Symbol};

use crate::error::{EvalError, EvalErrorKind};

/// Frames kept in a stack-overflow diagnostic.
const TRACE_FRAMES: usize = 16;

/// One scope frame.
#[derive(Debug, Default)]
struct Scope {
    bindings: Bindings,
    /// Lookups stop here and fall through to the globals.
    barrier: bool,
}

/// One user-function or lambda invocation, for diagnostics.
#[derive(Debug, Clone)]
pub struct Frame {
    pub name: String,
    pub args: String,
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.args)
    }
}

/// Lexically stacked variable bindings plus evaluation modes.
#[derive(Debug)]
pub struct EvalContext {
    scopes: Vec<Scope>,
    call_stack: Vec<Frame>,
    pub config: EngineConfig,
}

impl EvalContext {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            scopes: vec![Scope::default()],
            call_stack: Vec::new(),
            config,
        }
    }

    /// Look up `name`, innermost scope first. A barrier scope falls
    /// through directly to the globals.
    pub fn lookup(&self, name: Symbol) -> Option<&Value> {
        for scope in self.scopes.iter().skip(1).rev() {
            if let Some(value) = scope.bindings.get(&name) {
                return Some(value);
            }
            if scope.barrier {
                break;
            }
        }
        self.scopes[0].bindings.get(&name)
    }

    /// Look up `name` in the globals only, bypassing local shadows.
    pub fn lookup_global(&self, name: Symbol) -> Option<&Value> {
        self.scopes[0].bindings.get(&name)
    }

    /// Bind `name` in the current scope.
    pub fn bind(&mut self, name: Symbol, value: Value) {
        self.scopes
            .last_mut()
            .expect("scope stack is never empty")
            .bindings
            .insert(name, value);
    }

    /// Push a plain nested scope (comprehension iteration variables,
    /// parenthesized sequences do not need one).
    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Push a call scope: pre-seeded bindings behind a barrier.
    pub fn push_call_scope(&mut self, bindings: Bindings) {
        self.scopes.push(Scope {
            bindings,
            barrier: true,
        });
    }

    pub fn pop_scope(&mut self) {
        debug_assert!(self.scopes.len() > 1, "cannot pop the global scope");
        self.scopes.pop();
    }

    /// Local (non-global) bindings flattened outermost-first, so inner
    /// frames win. Used to snapshot a lambda's environment.
    pub fn flatten_locals(&self) -> Bindings {
        let mut merged = Bindings::default();
        for scope in self.scopes.iter().skip(1) {
            for (name, value) in &scope.bindings {
                merged.insert(*name, value.clone());
            }
        }
        merged
    }

    /// Record one user-function or lambda invocation; errors when the
    /// recursion bound is hit, carrying the most recent frames.
    pub fn enter_call(&mut self, frame: Frame, at: Span) -> Result<(), EvalError> {
        if self.call_stack.len() >= self.config.max_recursion_depth {
            let mut trace: Vec<String> = self
                .call_stack
                .iter()
                .rev()
                .take(TRACE_FRAMES)
                .map(Frame::to_string)
                .collect();
            trace.reverse();
            return Err(EvalError::new(
                EvalErrorKind::StackOverflow {
                    limit: self.config.max_recursion_depth,
                    trace,
                },
                at,
            ));
        }
        self.call_stack.push(frame);
        Ok(())
    }

    pub fn exit_call(&mut self) {
        self.call_stack.pop();
    }

    /// Current user-call depth.
    pub fn call_depth(&self) -> usize {
        self.call_stack.len()
    }
}
