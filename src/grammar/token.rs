// SPDX-FileCopyrightText: 2026 edgram contributors
// SPDX-License-Identifier: MIT

use std::fmt;

/// Token kinds of the design grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    BraceOpen,
    BraceClose,
    ParenOpen,
    ParenClose,
    BracketOpen,
    BracketClose,
    Confounded,
    Batch,
    PartialCross,
    Cross,
    Nests,
    Classifies,
    Pipe,
    Tilde,
    Number,
    Ident,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BraceOpen => "'{'",
            Self::BraceClose => "'}'",
            Self::ParenOpen => "'('",
            Self::ParenClose => "')'",
            Self::BracketOpen => "'['",
            Self::BracketClose => "']'",
            Self::Confounded => "'≈≈'",
            Self::Batch => "'=='",
            Self::PartialCross => "'◊'",
            Self::Cross => "'×'",
            Self::Nests => "'>'",
            Self::Classifies => "':'",
            Self::Pipe => "'|'",
            Self::Tilde => "'~'",
            Self::Number => "number",
            Self::Ident => "identifier",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token with its literal text and char offset into the grammar string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub position: usize,
    pub character: char,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unrecognized character {:?} at position {}",
            self.character, self.position
        )
    }
}

impl std::error::Error for LexError {}

/// Tokenizes grammar text. `#` comments and whitespace are consumed but never
/// emitted. Patterns are tried in a fixed priority order; the two-codepoint
/// operators `≈≈` and `==` are matched before anything that could claim their
/// first character.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let chars = input.chars().collect::<Vec<_>>();
    let mut tokens = Vec::new();
    let mut pos = 0usize;

    while pos < chars.len() {
        let ch = chars[pos];

        if ch == '#' {
            while pos < chars.len() && chars[pos] != '\n' {
                pos += 1;
            }
            continue;
        }

        if ch.is_whitespace() {
            pos += 1;
            continue;
        }

        if ch == '≈' {
            if chars.get(pos + 1) == Some(&'≈') {
                tokens.push(Token { kind: TokenKind::Confounded, text: "≈≈".to_owned(), position: pos });
                pos += 2;
                continue;
            }
            return Err(LexError { position: pos, character: ch });
        }

        if ch == '=' {
            if chars.get(pos + 1) == Some(&'=') {
                tokens.push(Token { kind: TokenKind::Batch, text: "==".to_owned(), position: pos });
                pos += 2;
                continue;
            }
            return Err(LexError { position: pos, character: ch });
        }

        let single = match ch {
            '{' => Some(TokenKind::BraceOpen),
            '}' => Some(TokenKind::BraceClose),
            '(' => Some(TokenKind::ParenOpen),
            ')' => Some(TokenKind::ParenClose),
            '[' => Some(TokenKind::BracketOpen),
            ']' => Some(TokenKind::BracketClose),
            '◊' => Some(TokenKind::PartialCross),
            '×' => Some(TokenKind::Cross),
            '>' => Some(TokenKind::Nests),
            ':' => Some(TokenKind::Classifies),
            '|' => Some(TokenKind::Pipe),
            '~' => Some(TokenKind::Tilde),
            _ => None,
        };
        if let Some(kind) = single {
            tokens.push(Token { kind, text: ch.to_string(), position: pos });
            pos += 1;
            continue;
        }

        if ch.is_ascii_digit() {
            let start = pos;
            while pos < chars.len() && chars[pos].is_ascii_digit() {
                pos += 1;
            }
            if chars.get(pos) == Some(&'k') {
                pos += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Number,
                text: chars[start..pos].iter().collect(),
                position: start,
            });
            continue;
        }

        if ch.is_ascii_alphabetic() || ch == '_' {
            let start = pos;
            pos += 1;
            while pos < chars.len() && (chars[pos].is_ascii_alphanumeric() || chars[pos] == '_') {
                pos += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Ident,
                text: chars[start..pos].iter().collect(),
                position: start,
            });
            continue;
        }

        return Err(LexError { position: pos, character: ch });
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::{tokenize, LexError, TokenKind};

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).expect("tokenize").iter().map(|token| token.kind).collect()
    }

    #[test]
    fn comments_and_whitespace_are_never_emitted() {
        let tokens = tokenize("# design grammar\nSite(3)  > Patient(20) # trailing\n").expect("tokenize");
        assert_eq!(
            tokens.iter().map(|token| token.text.as_str()).collect::<Vec<_>>(),
            vec!["Site", "(", "3", ")", ">", "Patient", "(", "20", ")"]
        );
    }

    #[test]
    fn operator_tokens_match_in_priority_order() {
        assert_eq!(
            kinds("{A(1) ≈≈ B(2)} == C(3) × D(4) ◊ E(5)"),
            vec![
                TokenKind::BraceOpen,
                TokenKind::Ident,
                TokenKind::ParenOpen,
                TokenKind::Number,
                TokenKind::ParenClose,
                TokenKind::Confounded,
                TokenKind::Ident,
                TokenKind::ParenOpen,
                TokenKind::Number,
                TokenKind::ParenClose,
                TokenKind::BraceClose,
                TokenKind::Batch,
                TokenKind::Ident,
                TokenKind::ParenOpen,
                TokenKind::Number,
                TokenKind::ParenClose,
                TokenKind::Cross,
                TokenKind::Ident,
                TokenKind::ParenOpen,
                TokenKind::Number,
                TokenKind::ParenClose,
                TokenKind::PartialCross,
                TokenKind::Ident,
                TokenKind::ParenOpen,
                TokenKind::Number,
                TokenKind::ParenClose,
            ]
        );
    }

    #[test]
    fn numbers_take_an_optional_k_suffix() {
        let tokens = tokenize("5k 500 12k").expect("tokenize");
        assert_eq!(
            tokens.iter().map(|token| token.text.as_str()).collect::<Vec<_>>(),
            vec!["5k", "500", "12k"]
        );
        assert!(tokens.iter().all(|token| token.kind == TokenKind::Number));
    }

    #[test]
    fn identifiers_start_with_letter_or_underscore() {
        let tokens = tokenize("_private Cell_2").expect("tokenize");
        assert_eq!(tokens[0].text, "_private");
        assert_eq!(tokens[1].text, "Cell_2");
    }

    #[test]
    fn lone_operator_halves_are_lexical_errors() {
        assert_eq!(tokenize("A(1) = B(2)"), Err(LexError { position: 5, character: '=' }));
        assert_eq!(tokenize("A(1) ≈ B(2)"), Err(LexError { position: 5, character: '≈' }));
    }

    #[test]
    fn unrecognized_character_reports_char_offset() {
        // The offset counts chars, not bytes: `×` is one position.
        assert_eq!(tokenize("A(1) × !"), Err(LexError { position: 7, character: '!' }));
    }

    #[test]
    fn tokenization_is_deterministic() {
        let input = "Hospital(3) > Patient[10|12] × Treatment(~2k)";
        assert_eq!(tokenize(input), tokenize(input));
    }

    #[test]
    fn positions_point_at_token_starts() {
        let tokens = tokenize("Site(3)").expect("tokenize");
        assert_eq!(tokens[0].position, 0);
        assert_eq!(tokens[1].position, 4);
        assert_eq!(tokens[2].position, 5);
        assert_eq!(tokens[3].position, 6);
    }
}
