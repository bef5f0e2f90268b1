//! AST node definitions.
//!
//! The expression language parses into a closed set of node kinds; the
//! evaluator does exhaustive case analysis over this enum, so adding a
//! variant is a compile-time visible change everywhere it matters. Nodes
//! are immutable after parsing.

use mex_util::{Rational, Span, Symbol};

/// Literal constants as they appear in source.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    /// Integer literal (exact)
    Integer(Rational),
    /// Decimal, scientific, or ratio literal (exact, non-integer spelling)
    Rational(Rational),
    /// `d`-suffixed literal, or a ratio with zero denominator
    Double(f64),
    Bool(bool),
    Str(String),
}

/// Binary operator kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    /// `of`: percentage application (`10% of 50`)
    Of,
    Pow,
    /// `@` matrix multiplication
    MatMul,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Xor,
}

impl BinOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "mod",
            BinOp::Of => "of",
            BinOp::Pow => "^",
            BinOp::MatMul => "@",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Xor => "xor",
        }
    }
}

/// Unary operator kinds, prefix and postfix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    /// Prefix `-`
    Neg,
    /// Prefix `not`
    Not,
    /// Postfix `!`
    Factorial,
    /// Postfix `!!`
    DoubleFactorial,
    /// Postfix `%`
    Percent,
}

/// The namespace an explicit reference resolves in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefKind {
    /// `@name`
    Unit,
    /// `$name`
    Var,
    /// `#name`
    Const,
}

/// One argument of a subscript.
#[derive(Clone, Debug, PartialEq)]
pub enum SliceArg {
    /// A single index expression
    Index(Expr),
    /// `start? : end? : step?`, any part omitted
    Slice {
        start: Option<Expr>,
        end: Option<Expr>,
        step: Option<Expr>,
    },
}

/// Expression node.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal {
        value: Literal,
        span: Span,
    },
    Variable {
        name: Symbol,
        span: Span,
    },
    /// Sigil-forced resolution: `@unit`, `$var`, `#const`
    Ref {
        kind: RefKind,
        name: Symbol,
        span: Span,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        span: Span,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        span: Span,
    },
    Subscript {
        target: Box<Expr>,
        args: Vec<SliceArg>,
        span: Span,
    },
    Range {
        start: Box<Expr>,
        end: Box<Expr>,
        step: Option<Box<Expr>>,
        span: Span,
    },
    /// `expr in|to|as unit`
    Convert {
        value: Box<Expr>,
        unit: Symbol,
        span: Span,
    },
    Assign {
        name: Symbol,
        value: Box<Expr>,
        span: Span,
    },
    FunctionDef {
        name: Symbol,
        params: Vec<Symbol>,
        body: Box<Expr>,
        span: Span,
    },
    Lambda {
        params: Vec<Symbol>,
        body: Box<Expr>,
        span: Span,
    },
    /// `{a, b, c}`
    Vector {
        items: Vec<Expr>,
        span: Span,
    },
    /// `[1, 2; 3, 4]`, rectangular by construction
    Matrix {
        rows: Vec<Vec<Expr>>,
        span: Span,
    },
    /// `{e for v in iter (for ...)* (if pred)?}`
    Comprehension {
        expr: Box<Expr>,
        iterators: Vec<(Symbol, Expr)>,
        predicate: Option<Box<Expr>>,
        span: Span,
    },
    /// Semicolon-separated statements; the value is the last one
    Sequence {
        statements: Vec<Expr>,
        span: Span,
    },
}

impl Expr {
    /// The source span of this node.
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal { span, .. }
            | Expr::Variable { span, .. }
            | Expr::Ref { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Call { span, .. }
            | Expr::Subscript { span, .. }
            | Expr::Range { span, .. }
            | Expr::Convert { span, .. }
            | Expr::Assign { span, .. }
            | Expr::FunctionDef { span, .. }
            | Expr::Lambda { span, .. }
            | Expr::Vector { span, .. }
            | Expr::Matrix { span, .. }
            | Expr::Comprehension { span, .. }
            | Expr::Sequence { span, .. } => *span,
        }
    }

    /// True for nodes whose evaluation cannot bind or mutate anything.
    ///
    /// Used by tests to check idempotent re-evaluation.
    pub fn is_pure(&self) -> bool {
        match self {
            Expr::Assign { .. } | Expr::FunctionDef { .. } => false,
            Expr::Literal { .. } | Expr::Variable { .. } | Expr::Ref { .. } => true,
            Expr::Unary { operand, .. } => operand.is_pure(),
            Expr::Binary { lhs, rhs, .. } => lhs.is_pure() && rhs.is_pure(),
            Expr::Call { callee, args, .. } => {
                callee.is_pure() && args.iter().all(Expr::is_pure)
            }
            Expr::Subscript { target, args, .. } => {
                target.is_pure()
                    && args.iter().all(|arg| match arg {
                        SliceArg::Index(e) => e.is_pure(),
                        SliceArg::Slice { start, end, step } => [start, end, step]
                            .into_iter()
                            .flatten()
                            .all(|e| e.is_pure()),
                    })
            }
            Expr::Range { start, end, step, .. } => {
                start.is_pure()
                    && end.is_pure()
                    && step.as_deref().is_none_or(Expr::is_pure)
            }
            Expr::Convert { value, .. } => value.is_pure(),
            Expr::Lambda { .. } => true,
            Expr::Vector { items, .. } => items.iter().all(Expr::is_pure),
            Expr::Matrix { rows, .. } => {
                rows.iter().all(|row| row.iter().all(Expr::is_pure))
            }
            Expr::Comprehension {
                expr,
                iterators,
                predicate,
                ..
            } => {
                expr.is_pure()
                    && iterators.iter().all(|(_, e)| e.is_pure())
                    && predicate.as_deref().is_none_or(Expr::is_pure)
            }
            Expr::Sequence { statements, .. } => statements.iter().all(Expr::is_pure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(n: i64) -> Expr {
        Expr::Literal {
            value: Literal::Integer(Rational::from(n)),
            span: Span::DUMMY,
        }
    }

    #[test]
    fn test_span_accessor() {
        let span = Span::new(1, 4, 1, 2);
        let expr = Expr::Variable {
            name: Symbol::intern("x"),
            span,
        };
        assert_eq!(expr.span(), span);
    }

    #[test]
    fn test_is_pure() {
        assert!(lit(1).is_pure());
        let assign = Expr::Assign {
            name: Symbol::intern("x"),
            value: Box::new(lit(1)),
            span: Span::DUMMY,
        };
        assert!(!assign.is_pure());
        let nested = Expr::Binary {
            op: BinOp::Add,
            lhs: Box::new(lit(1)),
            rhs: Box::new(assign),
            span: Span::DUMMY,
        };
        assert!(!nested.is_pure());
    }
}
