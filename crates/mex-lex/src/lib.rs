//! mex-lex - Lexical analysis for the Mex expression engine.
//!
//! Lexing runs in two passes:
//!
//! 1. **Scanning** ([`Scanner`]): text to raw tokens. Handles the greedy
//!    operator table, numeric literal disambiguation (`1.5` vs `1..5` vs
//!    `1/3`), strings, identifiers, and the explicit-reference sigils
//!    `@` `$` `#`.
//! 2. **Processing** ([`TokenProcessor`]): splits compound identifiers,
//!    classifies names against the registries, and inserts implicit
//!    multiplication tokens.
//!
//! [`tokenize`] runs both passes.

pub mod cursor;
pub mod error;
pub mod processor;
pub mod scanner;
pub mod token;

#[cfg(test)]
mod edge_cases;

pub use error::{LexError, LexErrorKind};
pub use processor::TokenProcessor;
pub use scanner::Scanner;
pub use token::{LexLiteral, Op, Token, TokenKind};

use mex_reg::Registries;
use mex_util::EngineConfig;

/// Lex `source` into the final token stream.
///
/// The stream ends with an `Eof` token. The first lexical error aborts.
pub fn tokenize(
    source: &str,
    registries: &Registries,
    config: &EngineConfig,
) -> Result<Vec<Token>, LexError> {
    let raw = Scanner::new(source, config).tokenize()?;
    Ok(TokenProcessor::new(registries, config).process(raw))
}
