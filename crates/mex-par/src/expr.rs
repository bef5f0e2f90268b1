//! The expression precedence chain.
//!
//! Precedence, low to high:
//!
//! | Level | Form |
//! |-------|------|
//! | 1  | assignment `:=`, function definition (right) |
//! | 2  | lambda `->` (right) |
//! | 3  | `\|\|` |
//! | 4  | `xor` |
//! | 5  | `&&` |
//! | 6  | `==` `!=` |
//! | 7  | `..` (`step`) |
//! | 8  | `<` `>` `<=` `>=` |
//! | 9  | `+` `-` |
//! | 10 | unit conversion `in` `to` `as` |
//! | 11 | `*` `/` `mod` `of` `@` |
//! | 12 | unary prefix `-` `not` (right) |
//! | 13 | `^` (right) |
//! | 14 | postfix `!` `!!` `%` |
//! | 15 | calls `f(...)` and subscripts `v[...]` |
//! | 16 | primary |
//!
//! Unit conversion binds between additive and multiplicative so that
//! `100m in feet` groups as `(100 * m) in feet`; the trailing identifier of
//! the implicit product is rewritten into an explicit unit reference so the
//! evaluator resolves it as a unit rather than a variable.

use mex_lex::{LexLiteral, Op, TokenKind};
use mex_reg::Keyword;
use mex_util::Symbol;

use crate::ast::{BinOp, Expr, Literal, RefKind, UnaryOp};
use crate::error::{ParseError, ParseErrorKind};
use crate::Parser;

impl<'a> Parser<'a> {
    /// Entry point of the chain.
    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_assignment()
    }

    /// `name := expr` and `name(params) := body`, detected by lookahead.
    fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        if matches!(
            self.peek().kind,
            TokenKind::Identifier | TokenKind::Function
        ) {
            if self.peek_at(1).kind == TokenKind::Op(Op::Assign) {
                let name_token = self.advance();
                self.advance(); // :=
                let value = self.parse_assignment()?;
                let span = name_token.span.merge(value.span());
                return Ok(Expr::Assign {
                    name: name_token.lexeme,
                    value: Box::new(value),
                    span,
                });
            }
            if self.peek_at(1).kind == TokenKind::LParen {
                if let Some(close) = self.find_matched_paren(self.savepoint() + 1) {
                    if self.peek_at(close + 1 - self.savepoint()).kind
                        == TokenKind::Op(Op::Assign)
                    {
                        return self.parse_function_def();
                    }
                }
            }
        }
        self.parse_lambda()
    }

    fn parse_function_def(&mut self) -> Result<Expr, ParseError> {
        let name_token = self.advance();
        self.expect(TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            params.push(self.name_token("a parameter name")?);
            while self.match_kind(TokenKind::Comma) {
                params.push(self.name_token("a parameter name")?);
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        self.expect(TokenKind::Op(Op::Assign), "':='")?;
        let body = self.parse_assignment()?;
        let span = name_token.span.merge(body.span());
        Ok(Expr::FunctionDef {
            name: name_token.lexeme,
            params,
            body: Box::new(body),
            span,
        })
    }

    /// `x -> body` and `(a, b) -> body`, the latter by savepoint lookahead.
    fn parse_lambda(&mut self) -> Result<Expr, ParseError> {
        if matches!(
            self.peek().kind,
            TokenKind::Identifier | TokenKind::Function
        ) && self.peek_at(1).kind == TokenKind::Op(Op::Arrow)
        {
            let param = self.advance();
            self.advance(); // ->
            let body = self.parse_lambda()?;
            let span = param.span.merge(body.span());
            return Ok(Expr::Lambda {
                params: vec![param.lexeme],
                body: Box::new(body),
                span,
            });
        }

        if self.check(TokenKind::LParen) {
            let open_span = self.peek().span;
            let save = self.savepoint();
            if let Some(params) = self.try_lambda_params() {
                let body = self.parse_lambda()?;
                let span = open_span.merge(body.span());
                return Ok(Expr::Lambda {
                    params,
                    body: Box::new(body),
                    span,
                });
            }
            self.restore(save);
        }

        self.parse_or()
    }

    /// Try to consume `( ident (, ident)* ) ->`; `None` rewinds nothing
    /// (the caller restores the savepoint).
    fn try_lambda_params(&mut self) -> Option<Vec<Symbol>> {
        self.advance(); // (
        let mut params = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::Identifier | TokenKind::Function => {
                    params.push(self.advance().lexeme);
                }
                _ => return None,
            }
            if self.match_kind(TokenKind::Comma) {
                continue;
            }
            break;
        }
        if !self.match_kind(TokenKind::RParen) {
            return None;
        }
        if !self.match_op(Op::Arrow) {
            return None;
        }
        Some(params)
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_xor()?;
        while self.match_op(Op::Or) {
            let rhs = self.parse_xor()?;
            lhs = binary(BinOp::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_xor(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_and()?;
        while self.match_op(Op::Xor) {
            let rhs = self.parse_and()?;
            lhs = binary(BinOp::Xor, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_equality()?;
        while self.match_op(Op::And) {
            let rhs = self.parse_equality()?;
            lhs = binary(BinOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_range()?;
        loop {
            let op = if self.match_op(Op::Eq) {
                BinOp::Eq
            } else if self.match_op(Op::Ne) {
                BinOp::Ne
            } else {
                return Ok(lhs);
            };
            let rhs = self.parse_range()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    /// `start .. end (step s)?`
    fn parse_range(&mut self) -> Result<Expr, ParseError> {
        let start = self.parse_relational()?;
        if !self.match_op(Op::Range) {
            return Ok(start);
        }
        let end = self.parse_relational()?;
        let step = if self.match_keyword(Keyword::Step) {
            Some(Box::new(self.parse_relational()?))
        } else {
            None
        };
        let span = start.span().merge(
            step.as_deref()
                .map(Expr::span)
                .unwrap_or_else(|| end.span()),
        );
        Ok(Expr::Range {
            start: Box::new(start),
            end: Box::new(end),
            step,
            span,
        })
    }

    fn parse_relational(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = if self.match_op(Op::Lt) {
                BinOp::Lt
            } else if self.match_op(Op::Le) {
                BinOp::Le
            } else if self.match_op(Op::Gt) {
                BinOp::Gt
            } else if self.match_op(Op::Ge) {
                BinOp::Ge
            } else {
                return Ok(lhs);
            };
            let rhs = self.parse_additive()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_conversion()?;
        loop {
            let op = if self.match_op(Op::Plus) {
                BinOp::Add
            } else if self.match_op(Op::Minus) {
                BinOp::Sub
            } else {
                return Ok(lhs);
            };
            let rhs = self.parse_conversion()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    /// `expr (in|to|as) unit`, chaining allowed.
    fn parse_conversion(&mut self) -> Result<Expr, ParseError> {
        let mut value = self.parse_multiplicative()?;
        while self.check_keyword(Keyword::In)
            || self.check_keyword(Keyword::To)
            || self.check_keyword(Keyword::As)
        {
            self.advance();
            let unit_token = match self.peek().kind {
                TokenKind::Identifier | TokenKind::Function | TokenKind::UnitRef => {
                    self.advance()
                }
                _ => return Err(self.unexpected("a unit name")),
            };
            let span = value.span().merge(unit_token.span);
            value = Expr::Convert {
                value: Box::new(rewrite_trailing_unit(value)),
                unit: unit_token.lexeme,
                span,
            };
        }
        Ok(value)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = if self.match_op(Op::Star) {
                BinOp::Mul
            } else if self.match_op(Op::Slash) {
                BinOp::Div
            } else if self.match_op(Op::Mod) {
                BinOp::Mod
            } else if self.match_op(Op::Of) {
                BinOp::Of
            } else if self.match_op(Op::MatMul) {
                BinOp::MatMul
            } else {
                return Ok(lhs);
            };
            let rhs = self.parse_unary()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek().clone();
        let op = if self.match_op(Op::Minus) {
            UnaryOp::Neg
        } else if self.match_op(Op::Not) {
            UnaryOp::Not
        } else {
            return self.parse_power();
        };
        let operand = self.parse_unary()?;
        let span = token.span.merge(operand.span());
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
            span,
        })
    }

    /// Right-associative power: `2^3^2` is `2^(3^2)`.
    fn parse_power(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_postfix()?;
        if !self.match_op(Op::Caret) {
            return Ok(base);
        }
        // The exponent re-enters at unary so `2^-3` and `2^3^2` both work.
        let exponent = self.parse_unary()?;
        Ok(binary(BinOp::Pow, base, exponent))
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_call_and_subscript()?;
        loop {
            let op = if self.check_op(Op::Factorial) {
                UnaryOp::Factorial
            } else if self.check_op(Op::DoubleFactorial) {
                UnaryOp::DoubleFactorial
            } else if self.check_op(Op::Percent) {
                UnaryOp::Percent
            } else {
                return Ok(expr);
            };
            let token = self.advance();
            let span = expr.span().merge(token.span);
            expr = Expr::Unary {
                op,
                operand: Box::new(expr),
                span,
            };
        }
    }

    /// After a primary, consume call and subscript chains.
    fn parse_call_and_subscript(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.check(TokenKind::LParen) {
                expr = self.parse_call(expr)?;
                continue;
            }
            if self.check(TokenKind::LBracket) {
                expr = self.parse_subscript(expr)?;
                continue;
            }
            // A call result or lambda followed by `* (` is a call: the
            // implicit-multiplication pass inserts `*` between `)` and `(`,
            // which would otherwise mask the second call.
            if matches!(expr, Expr::Call { .. } | Expr::Lambda { .. })
                && self.check_op(Op::Star)
                && self.peek_at(1).kind == TokenKind::LParen
            {
                self.advance(); // *
                continue;
            }
            return Ok(expr);
        }
    }

    fn parse_call(&mut self, callee: Expr) -> Result<Expr, ParseError> {
        let open = self.peek().span;
        self.enter_nesting(open)?;
        self.advance(); // (
        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            args.push(self.parse_expression()?);
            while self.match_kind(TokenKind::Comma) {
                args.push(self.parse_expression()?);
            }
        }
        let close = self.close_bracket(TokenKind::RParen, '(')?;
        self.exit_nesting();
        let span = callee.span().merge(close);
        Ok(Expr::Call {
            callee: Box::new(callee),
            args,
            span,
        })
    }

    fn parse_subscript(&mut self, target: Expr) -> Result<Expr, ParseError> {
        let open = self.peek().span;
        self.enter_nesting(open)?;
        self.advance(); // [
        let (args, close) = self.parse_slice_args()?;
        self.exit_nesting();
        let span = target.span().merge(close);
        Ok(Expr::Subscript {
            target: Box::new(target),
            args,
            span,
        })
    }

    /// Consume a closing bracket, distinguishing an unmatched bracket at
    /// end of input from a plain unexpected token.
    pub(crate) fn close_bracket(
        &mut self,
        kind: TokenKind,
        open: char,
    ) -> Result<mex_util::Span, ParseError> {
        if self.check(kind) {
            return Ok(self.advance().span);
        }
        if self.check(TokenKind::Eof) {
            return Err(ParseError::new(
                ParseErrorKind::UnmatchedBracket { open },
                self.peek().span,
            ));
        }
        Err(self.unexpected(match kind {
            TokenKind::RParen => "')'",
            TokenKind::RBracket => "']'",
            TokenKind::RBrace => "'}'",
            _ => "a closing bracket",
        }))
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek().clone();
        match token.kind {
            kind if kind.is_numeric_literal() => {
                self.advance();
                let value = match (kind, token.literal) {
                    (TokenKind::Integer, Some(LexLiteral::Number(r))) => Literal::Integer(r),
                    (_, Some(LexLiteral::Number(r))) => Literal::Rational(r),
                    (_, Some(LexLiteral::Double(d))) => Literal::Double(d),
                    (_, other) => {
                        unreachable!("numeric token without numeric literal: {:?}", other)
                    }
                };
                Ok(Expr::Literal {
                    value,
                    span: token.span,
                })
            }
            TokenKind::Str => {
                self.advance();
                let value = match token.literal {
                    Some(LexLiteral::Str(s)) => Literal::Str(s),
                    other => unreachable!("string token without string literal: {:?}", other),
                };
                Ok(Expr::Literal {
                    value,
                    span: token.span,
                })
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                Ok(Expr::Literal {
                    value: Literal::Bool(true),
                    span: token.span,
                })
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                Ok(Expr::Literal {
                    value: Literal::Bool(false),
                    span: token.span,
                })
            }
            // `if` is a reserved word but callable as the lazy built-in.
            TokenKind::Keyword(Keyword::If) if self.peek_at(1).kind == TokenKind::LParen => {
                self.advance();
                Ok(Expr::Variable {
                    name: token.lexeme,
                    span: token.span,
                })
            }
            TokenKind::Identifier | TokenKind::Function => {
                self.advance();
                Ok(Expr::Variable {
                    name: token.lexeme,
                    span: token.span,
                })
            }
            TokenKind::UnitRef => {
                self.advance();
                Ok(Expr::Ref {
                    kind: RefKind::Unit,
                    name: token.lexeme,
                    span: token.span,
                })
            }
            TokenKind::VarRef => {
                self.advance();
                Ok(Expr::Ref {
                    kind: RefKind::Var,
                    name: token.lexeme,
                    span: token.span,
                })
            }
            TokenKind::ConstRef => {
                self.advance();
                Ok(Expr::Ref {
                    kind: RefKind::Const,
                    name: token.lexeme,
                    span: token.span,
                })
            }
            TokenKind::LParen => self.parse_paren_group(),
            TokenKind::LBrace => self.parse_brace_literal(),
            TokenKind::LBracket => self.parse_bracket_literal(),
            _ => Err(self.unexpected("an expression")),
        }
    }

    /// `( expr )`, or `( stmt; stmt; ... )` when semicolons appear.
    fn parse_paren_group(&mut self) -> Result<Expr, ParseError> {
        let open = self.peek().span;
        self.enter_nesting(open)?;
        self.advance(); // (
        if self.check(TokenKind::RParen) {
            return Err(ParseError::new(ParseErrorKind::EmptyParens, open));
        }
        let first = self.parse_expression()?;
        let expr = if self.check(TokenKind::Semicolon) {
            let mut statements = vec![first];
            while self.match_kind(TokenKind::Semicolon) {
                if self.check(TokenKind::RParen) {
                    break;
                }
                statements.push(self.parse_expression()?);
            }
            let close = self.close_bracket(TokenKind::RParen, '(')?;
            Expr::Sequence {
                statements,
                span: open.merge(close),
            }
        } else {
            self.close_bracket(TokenKind::RParen, '(')?;
            first
        };
        self.exit_nesting();
        Ok(expr)
    }
}

/// Combine two operands into a binary node with a merged span.
fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    let span = lhs.span().merge(rhs.span());
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
        span,
    }
}

/// Rewrite the trailing identifier of an implicit product into an explicit
/// unit reference, so `100m in feet` resolves `m` as a unit.
fn rewrite_trailing_unit(expr: Expr) -> Expr {
    match expr {
        Expr::Variable { name, span } => Expr::Ref {
            kind: RefKind::Unit,
            name,
            span,
        },
        Expr::Binary {
            op: BinOp::Mul,
            lhs,
            rhs,
            span,
        } => Expr::Binary {
            op: BinOp::Mul,
            lhs,
            rhs: Box::new(rewrite_trailing_unit(*rhs)),
            span,
        },
        other => other,
    }
}
