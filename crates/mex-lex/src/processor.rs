//! Pass 2 - token processing.
//!
//! A single deterministic pass over the raw token stream combining three
//! concerns:
//!
//! 1. **Splitting** compound identifiers (`pi2e` becomes `pi`, `2`, `e`;
//!    `xsin` becomes `x`, `sin`),
//! 2. **Classification** of identifiers into keyword operators, keywords,
//!    and known functions,
//! 3. **Implicit multiplication**, inserting synthetic `*` tokens where
//!    juxtaposition is mathematically conventional.
//!
//! Identifiers that are assignment or function-definition targets are
//! guarded: they are neither split nor classified, so user definitions can
//! shadow built-in names. Unit-ness is deliberately not decided here;
//! units resolve at evaluation time, in unit position only.
//!
//! The pass is idempotent: running it over its own output changes nothing.

use mex_reg::{KeywordOp, Registries};
use mex_util::{EngineConfig, Rational, Span, Symbol};

use crate::token::{LexLiteral, Op, Token, TokenKind};

/// Pass-2 processor.
pub struct TokenProcessor<'a> {
    registries: &'a Registries,
    config: &'a EngineConfig,
}

/// A fragment produced by identifier splitting.
enum Piece<'n> {
    Name(&'n str),
    Digits(&'n str),
}

impl<'a> TokenProcessor<'a> {
    pub fn new(registries: &'a Registries, config: &'a EngineConfig) -> Self {
        Self { registries, config }
    }

    /// Process a raw token stream into the final stream.
    pub fn process(&self, raw: Vec<Token>) -> Vec<Token> {
        let classified = self.split_and_classify(&raw);
        if self.config.implicit_multiplication {
            self.insert_implicit_multiplication(classified)
        } else {
            classified
        }
    }

    fn split_and_classify(&self, raw: &[Token]) -> Vec<Token> {
        let mut out = Vec::with_capacity(raw.len());
        for (i, token) in raw.iter().enumerate() {
            if token.kind != TokenKind::Identifier {
                out.push(token.clone());
                continue;
            }
            if self.is_definition_target(raw, i) {
                // Left untouched so the definition can shadow built-ins.
                out.push(token.clone());
                continue;
            }
            let name = token.lexeme.as_str();
            let mut pieces = Vec::new();
            self.split_name(name, &mut pieces);
            for piece in pieces {
                out.push(self.realize(token, piece));
            }
        }
        out
    }

    /// True when the identifier at `i` is the target of `:=`, directly or
    /// through a parenthesized parameter list.
    fn is_definition_target(&self, tokens: &[Token], i: usize) -> bool {
        match tokens.get(i + 1).map(|t| t.kind) {
            Some(TokenKind::Op(Op::Assign)) => true,
            Some(TokenKind::LParen) => {
                let mut depth = 0usize;
                for (j, token) in tokens.iter().enumerate().skip(i + 1) {
                    match token.kind {
                        TokenKind::LParen => depth += 1,
                        TokenKind::RParen => {
                            depth -= 1;
                            if depth == 0 {
                                return matches!(
                                    tokens.get(j + 1).map(|t| t.kind),
                                    Some(TokenKind::Op(Op::Assign))
                                );
                            }
                        }
                        _ => {}
                    }
                }
                false
            }
            _ => false,
        }
    }

    /// Apply the splitting rules to `name`, first match wins.
    fn split_name<'n>(&self, name: &'n str, out: &mut Vec<Piece<'n>>) {
        // Rule 1: known as-is.
        if self.is_known(name) {
            out.push(Piece::Name(name));
            return;
        }

        // Rule 2: digit-boundary split with a known prefix.
        if let Some(first_digit) = name.find(|c: char| c.is_ascii_digit()) {
            let prefix = &name[..first_digit];
            if !prefix.is_empty() && self.is_known(prefix) {
                let digits_end = name[first_digit..]
                    .find(|c: char| !c.is_ascii_digit())
                    .map_or(name.len(), |o| first_digit + o);
                out.push(Piece::Name(prefix));
                out.push(Piece::Digits(&name[first_digit..digits_end]));
                let rest = &name[digits_end..];
                if !rest.is_empty() {
                    self.split_name(rest, out);
                }
                return;
            }
        }

        // Rule 3: function-suffix split. The prefix must itself be
        // plausible (a single character, a constant, or a unit) so that
        // ordinary identifiers whose tail spells a function survive.
        for k in 1..name.len() {
            if !name.is_char_boundary(k) {
                continue;
            }
            let (prefix, suffix) = name.split_at(k);
            if self.registries.functions.is_function(suffix)
                && (prefix.chars().count() == 1
                    || self.registries.constants.is_constant(prefix)
                    || self.registries.units.is_unit(prefix))
            {
                out.push(Piece::Name(prefix));
                out.push(Piece::Name(suffix));
                return;
            }
        }

        // Rule 4: leave unchanged.
        out.push(Piece::Name(name));
    }

    fn is_known(&self, name: &str) -> bool {
        self.registries.functions.is_function(name)
            || self.registries.units.is_unit(name)
            || self.registries.constants.is_constant(name)
    }

    /// Build the token for a split piece, classifying names.
    fn realize(&self, origin: &Token, piece: Piece<'_>) -> Token {
        match piece {
            Piece::Digits(digits) => {
                let value: Rational = digits.parse().unwrap_or_else(|_| Rational::from(0));
                Token::with_literal(
                    TokenKind::Integer,
                    Symbol::intern(digits),
                    LexLiteral::Number(value),
                    origin.span,
                )
            }
            Piece::Name(name) => {
                let kind = self.classify(name);
                Token::new(kind, Symbol::intern(name), origin.span)
            }
        }
    }

    /// Classification order: keyword operator, reserved keyword, known
    /// function, plain identifier.
    fn classify(&self, name: &str) -> TokenKind {
        if let Some(op) = self.registries.keywords.operator_for(name) {
            return TokenKind::Op(match op {
                KeywordOp::And => Op::And,
                KeywordOp::Or => Op::Or,
                KeywordOp::Xor => Op::Xor,
                KeywordOp::Not => Op::Not,
                KeywordOp::Mod => Op::Mod,
                KeywordOp::Of => Op::Of,
            });
        }
        if let Some(keyword) = self.registries.keywords.keyword_for(name) {
            return TokenKind::Keyword(keyword);
        }
        if self.registries.functions.is_function(name) {
            return TokenKind::Function;
        }
        TokenKind::Identifier
    }

    fn insert_implicit_multiplication(&self, tokens: Vec<Token>) -> Vec<Token> {
        let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
        for token in tokens {
            if let Some(prev) = out.last() {
                if prev.span.line == token.span.line && needs_multiply(prev, &token) {
                    out.push(synthetic_star(&token));
                }
            }
            out.push(token);
        }
        out
    }
}

/// Decide whether a `*` belongs between two adjacent tokens.
fn needs_multiply(prev: &Token, next: &Token) -> bool {
    use TokenKind::*;

    let next_is_name = matches!(
        next.kind,
        Identifier | Function | UnitRef | VarRef | ConstRef
    );
    let next_is_numeric = next.kind.is_numeric_literal();

    match prev.kind {
        // `2x`, `2(`, `2sin(`, `3@m`
        kind if kind.is_numeric_literal() => next.kind == LParen || next_is_name,

        // `)(`, `)2`, `)x`
        RParen | RBrace => next.kind == LParen || next_is_numeric || next_is_name,

        // `]2`, `]x`, but never `](` (a call) and never `][` (a subscript)
        RBracket => next_is_numeric || next_is_name || next.kind == LBrace,

        // `x 2`, `x y`, `x sin` - but not `x(`, which is a call
        Identifier | UnitRef | VarRef | ConstRef => next_is_numeric || next_is_name,

        // `3! 2`, `50% x`
        Op(op) if op.is_postfix() => {
            next_is_numeric || next_is_name || next.kind == LParen || next.kind == LBrace
        }

        _ => false,
    }
}

/// A `*` token synthesized at the position of the following token.
fn synthetic_star(next: &Token) -> Token {
    Token::new(
        TokenKind::Op(Op::Star),
        Symbol::intern("*"),
        Span::point(next.span.start, next.span.line, next.span.column),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Scanner;
    use mex_reg::Keyword;

    fn process(source: &str) -> Vec<Token> {
        let config = EngineConfig::default();
        let registries = Registries::default();
        let raw = Scanner::new(source, &config).tokenize().unwrap();
        TokenProcessor::new(&registries, &config).process(raw)
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        process(source).into_iter().map(|t| t.kind).collect()
    }

    fn lexemes(source: &str) -> Vec<String> {
        process(source)
            .into_iter()
            .map(|t| t.lexeme.as_str().to_string())
            .collect()
    }

    #[test]
    fn test_classify_function_and_keyword() {
        assert_eq!(
            kinds("sin for true mod"),
            vec![
                TokenKind::Function,
                TokenKind::Keyword(Keyword::For),
                TokenKind::Keyword(Keyword::True),
                TokenKind::Op(Op::Mod),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_digit_boundary_split() {
        // pi2e -> pi * 2 * e
        assert_eq!(lexemes("pi2e"), vec!["pi", "*", "2", "*", "e", ""]);
    }

    #[test]
    fn test_function_suffix_split_single_char_prefix() {
        // xsin -> x * sin
        let tokens = process("xsin");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert!(tokens[0].lexeme.eq_str("x"));
        assert_eq!(tokens[1].kind, TokenKind::Op(Op::Star));
        assert_eq!(tokens[2].kind, TokenKind::Function);
        assert!(tokens[2].lexeme.eq_str("sin"));
    }

    #[test]
    fn test_function_suffix_requires_plausible_prefix() {
        // `arcsine` is not split into `arcsin * e`-like pieces; the prefix
        // `arcsin...` checks run but `resin`-style identifiers survive.
        let tokens = process("resin");
        // prefix "r" is a single character, suffix "esin" is not a
        // function; prefix "re" is unknown; prefix "res" unknown... but
        // k=1 gives suffix "esin" (not a function), so the first match is
        // k=2 "re"/"sin" which fails the prefix test, leaving the
        // identifier whole.
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert!(tokens[0].lexeme.eq_str("resin"));
    }

    #[test]
    fn test_known_name_never_split() {
        // `asin` ends in the function `sin` but is itself a function.
        let tokens = process("asin");
        assert_eq!(tokens[0].kind, TokenKind::Function);
        assert!(tokens[0].lexeme.eq_str("asin"));
    }

    #[test]
    fn test_definition_target_guard_variable() {
        // `pi := 100` keeps pi an identifier so it can shadow the constant.
        let tokens = process("pi := 100");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert!(tokens[0].lexeme.eq_str("pi"));
    }

    #[test]
    fn test_definition_target_guard_function() {
        // `fact(n) := ...` keeps fact an identifier even though the
        // registry knows a builtin of the same name.
        let tokens = process("fact(n) := n");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert!(tokens[0].lexeme.eq_str("fact"));
    }

    #[test]
    fn test_guard_does_not_apply_to_calls() {
        let tokens = process("fact(5)");
        assert_eq!(tokens[0].kind, TokenKind::Function);
    }

    #[test]
    fn test_implicit_multiplication_number_identifier() {
        assert_eq!(lexemes("2x"), vec!["2", "*", "x", ""]);
        assert_eq!(lexemes("2(3)"), vec!["2", "*", "(", "3", ")", ""]);
        assert_eq!(lexemes("3sin(1)"), vec!["3", "*", "sin", "(", "1", ")", ""]);
    }

    #[test]
    fn test_implicit_multiplication_parens() {
        assert_eq!(
            lexemes("(1)(2)"),
            vec!["(", "1", ")", "*", "(", "2", ")", ""]
        );
        assert_eq!(lexemes("(1)2"), vec!["(", "1", ")", "*", "2", ""]);
    }

    #[test]
    fn test_implicit_multiplication_postfix() {
        assert_eq!(lexemes("3! 2"), vec!["3", "!", "*", "2", ""]);
        assert_eq!(lexemes("50% x"), vec!["50", "%", "*", "x", ""]);
    }

    #[test]
    fn test_no_multiplication_before_call_parens() {
        // A function token directly followed by `(` is a call.
        assert_eq!(lexemes("sin(1)"), vec!["sin", "(", "1", ")", ""]);
        // A user identifier followed by `(` is also a call.
        assert_eq!(lexemes("f(1)"), vec!["f", "(", "1", ")", ""]);
    }

    #[test]
    fn test_no_multiplication_for_subscript() {
        assert_eq!(lexemes("v[1]"), vec!["v", "[", "1", "]", ""]);
        assert_eq!(lexemes("m[1][2]"), vec!["m", "[", "1", "]", "[", "2", "]", ""]);
    }

    #[test]
    fn test_no_multiplication_across_lines() {
        assert_eq!(lexemes("2\nx"), vec!["2", "x", ""]);
    }

    #[test]
    fn test_disabled_implicit_multiplication() {
        let mut config = EngineConfig::default();
        config.implicit_multiplication = false;
        let registries = Registries::default();
        let raw = Scanner::new("2x", &config).tokenize().unwrap();
        let tokens = TokenProcessor::new(&registries, &config).process(raw);
        let lexemes: Vec<_> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes, vec!["2", "x", ""]);
    }

    #[test]
    fn test_idempotent() {
        let config = EngineConfig::default();
        let registries = Registries::default();
        let processor = TokenProcessor::new(&registries, &config);
        let raw = Scanner::new("2pi sin(x) + fact(n) := 1", &config)
            .tokenize()
            .unwrap();
        let once = processor.process(raw);
        let twice = processor.process(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_unit_identifier_left_alone() {
        // Units stay identifiers; resolution happens at evaluation time.
        let tokens = process("100 meters");
        assert_eq!(tokens[0].kind, TokenKind::Integer);
        assert_eq!(tokens[1].kind, TokenKind::Op(Op::Star));
        assert_eq!(tokens[2].kind, TokenKind::Identifier);
        assert!(tokens[2].lexeme.eq_str("meters"));
    }
}
