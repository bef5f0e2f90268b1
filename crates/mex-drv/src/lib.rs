//! mex-drv - Engine facade and command-line driver.
//!
//! [`Engine`] wires the pipeline together:
//!
//! ```text
//! source text --[mex-lex]--> tokens --[mex-par]--> AST --[mex-eval]--> value
//! ```
//!
//! Registries are initialized once per engine and treated as read-only
//! afterwards; evaluation sessions ([`EvalContext`]) are created per
//! conversation and carry the variable bindings between statements.

use std::io::{self, BufRead, Write};

use thiserror::Error;

use mex_eval::{EvalContext, EvalError, EvalErrorKind, Evaluator};
use mex_lex::LexError;
use mex_par::{ParseError, Value};
use mex_reg::Registries;
use mex_util::{EngineConfig, SourceSnippet, Span};

/// Any pipeline-stage failure, unified for embedders.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl EngineError {
    /// The source location of the failure.
    pub fn span(&self) -> Span {
        match self {
            EngineError::Lex(e) => e.span,
            EngineError::Parse(e) => e.span,
            EngineError::Eval(e) => e.span,
        }
    }

    /// The source excerpt with a caret under the failing range.
    pub fn snippet(&self, source: &str) -> SourceSnippet {
        SourceSnippet::from_source(source, self.span())
    }

    /// Multi-line rendering: message, excerpt, and the stack trace for
    /// recursion overflows.
    pub fn render(&self, source: &str) -> String {
        let mut out = format!("error: {}\n{}", self, self.snippet(source));
        if let EngineError::Eval(e) = self {
            if let EvalErrorKind::StackOverflow { trace, .. } = &e.kind {
                out.push_str("\nstack trace (most recent call last):");
                for frame in trace {
                    out.push_str("\n  ");
                    out.push_str(frame);
                }
            }
        }
        out
    }
}

/// The assembled expression engine.
pub struct Engine {
    registries: Registries,
    config: EngineConfig,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Engine with the default registries and configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            registries: Registries::default(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    /// Mutable registry access for overlay definitions (custom units and
    /// constants) before evaluation starts.
    pub fn registries_mut(&mut self) -> &mut Registries {
        &mut self.registries
    }

    /// A fresh evaluation session. Bindings persist across `evaluate`
    /// calls sharing the session.
    pub fn new_session(&self) -> EvalContext {
        EvalContext::new(self.config.clone())
    }

    /// Run the full pipeline on `source` against a session.
    pub fn evaluate(&self, source: &str, ctx: &mut EvalContext) -> Result<Value, EngineError> {
        let tokens = mex_lex::tokenize(source, &self.registries, &self.config)?;
        let ast = mex_par::parse(tokens, &self.config)?;
        let value = Evaluator::new(&self.registries).eval(&ast, ctx)?;
        Ok(value)
    }

    /// Evaluate one expression in a throwaway session.
    pub fn evaluate_once(&self, source: &str) -> Result<Value, EngineError> {
        let mut ctx = self.new_session();
        self.evaluate(source, &mut ctx)
    }
}

/// CLI entry point. With arguments, evaluates them as one expression;
/// without, reads statements line by line from stdin sharing one session.
pub fn run() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let engine = Engine::new();

    if !args.is_empty() {
        let source = args.join(" ");
        match engine.evaluate_once(&source) {
            Ok(value) => {
                println!("{}", value);
                Ok(())
            }
            Err(err) => {
                eprintln!("{}", err.render(&source));
                std::process::exit(1);
            }
        }
    } else {
        repl(&engine)
    }
}

/// Line-oriented session over stdin/stdout.
fn repl(engine: &Engine) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut ctx = engine.new_session();

    for line in stdin.lock().lines() {
        let line = line?;
        let source = line.trim();
        if source.is_empty() {
            continue;
        }
        match engine.evaluate(source, &mut ctx) {
            Ok(value) => writeln!(stdout, "{}", value)?,
            Err(err) => eprintln!("{}", err.render(source)),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_end_to_end() {
        let engine = Engine::new();
        assert_eq!(engine.evaluate_once("2 + 2").unwrap().to_string(), "4");
    }

    #[test]
    fn test_session_keeps_bindings() {
        let engine = Engine::new();
        let mut ctx = engine.new_session();
        engine.evaluate("x := 7", &mut ctx).unwrap();
        assert_eq!(engine.evaluate("x * 6", &mut ctx).unwrap().to_string(), "42");
    }

    #[test]
    fn test_error_render_has_caret() {
        let engine = Engine::new();
        let source = "2 +";
        let err = engine.evaluate_once(source).unwrap_err();
        let rendered = err.render(source);
        assert!(rendered.contains("error:"));
        assert!(rendered.contains('^'));
    }

    #[test]
    fn test_error_render_stack_trace() {
        let mut config = EngineConfig::default();
        config.max_recursion_depth = 8;
        let engine = Engine::with_config(config);
        let source = "f(n) := f(n); f(1)";
        let err = engine.evaluate_once(source).unwrap_err();
        let rendered = err.render(source);
        assert!(rendered.contains("stack trace"));
        assert!(rendered.contains("f(1)"));
    }

    #[test]
    fn test_each_stage_error_converts() {
        let engine = Engine::new();
        assert!(matches!(
            engine.evaluate_once("\"open"),
            Err(EngineError::Lex(_))
        ));
        assert!(matches!(
            engine.evaluate_once("(1"),
            Err(EngineError::Parse(_))
        ));
        assert!(matches!(
            engine.evaluate_once("nope"),
            Err(EngineError::Eval(_))
        ));
    }

    #[test]
    fn test_custom_unit_overlay() {
        let mut engine = Engine::new();
        engine
            .registries_mut()
            .units
            .define("smoot", mex_reg::Dimension::Length, 1.7018, 0.0);
        let value = engine.evaluate_once("1 smoot in cm").unwrap();
        match value {
            Value::Unit(u) => {
                assert!((u.magnitude.as_f64().unwrap() - 170.18).abs() < 1e-9);
            }
            other => panic!("expected unit, got {:?}", other),
        }
    }
}
