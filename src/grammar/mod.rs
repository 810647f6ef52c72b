// SPDX-FileCopyrightText: 2026 edgram contributors
// SPDX-License-Identifier: MIT

//! Grammar compiler: tokenizer and precedence-climbing parser.
//!
//! Precedence, tightest to loosest: grouping `()`/`{}` → classification `:` →
//! nesting `>` → crossing `×`/`◊` → batch effect `==` → confounding `≈≈`.

pub mod parser;
pub mod token;

use std::fmt;

pub use parser::{parse_design, SyntaxError};
pub use token::{tokenize, LexError, Token, TokenKind};

/// Error produced by the compiler stage. Both variants abort parsing with no
/// partial model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    Lex(LexError),
    Syntax(SyntaxError),
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex(err) => write!(f, "lexical error: {err}"),
            Self::Syntax(err) => write!(f, "syntax error: {err}"),
        }
    }
}

impl std::error::Error for GrammarError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Lex(err) => Some(err),
            Self::Syntax(err) => Some(err),
        }
    }
}

impl From<LexError> for GrammarError {
    fn from(value: LexError) -> Self {
        Self::Lex(value)
    }
}

impl From<SyntaxError> for GrammarError {
    fn from(value: SyntaxError) -> Self {
        Self::Syntax(value)
    }
}
