// SPDX-FileCopyrightText: 2026 edgram contributors
// SPDX-License-Identifier: MIT

use std::collections::BTreeSet;
use std::fmt;

use super::token::{tokenize, Token, TokenKind};
use super::GrammarError;
use crate::model::{DesignModel, Factor, FactorCategory, LevelCount, RelationKind, Relationship};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    UnexpectedEnd {
        expected: Option<TokenKind>,
    },
    UnexpectedToken {
        position: usize,
        expected: TokenKind,
        found: TokenKind,
    },
    /// A position where a factor, `{...}` group, or `(...)` expression was
    /// required held something else.
    UnexpectedPrimary {
        position: usize,
        found: TokenKind,
    },
    MissingSizeSpec {
        position: usize,
        name: String,
    },
    NumberTooLarge {
        position: usize,
    },
    TrailingInput {
        position: usize,
        found: TokenKind,
        text: String,
    },
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEnd { expected: Some(kind) } => {
                write!(f, "unexpected end of input, expected {kind}")
            }
            Self::UnexpectedEnd { expected: None } => f.write_str("unexpected end of input"),
            Self::UnexpectedToken { position, expected, found } => {
                write!(f, "expected {expected} but found {found} at position {position}")
            }
            Self::UnexpectedPrimary { position, found } => write!(
                f,
                "expected a factor, group, or parenthesized expression but found {found} at position {position}"
            ),
            Self::MissingSizeSpec { position, name } => write!(
                f,
                "factor '{name}' at position {position} is missing a size specification"
            ),
            Self::NumberTooLarge { position } => {
                write!(f, "number at position {position} is too large")
            }
            Self::TrailingInput { position, found, text } => {
                write!(
                    f,
                    "unexpected {found} '{text}' after a complete expression at position {position}"
                )
            }
        }
    }
}

impl std::error::Error for SyntaxError {}

/// Parses grammar text into a structural model.
///
/// No partial model is ever returned: any lexical or syntax error aborts the
/// whole parse. Empty input (or input that is all comments and whitespace)
/// yields an empty model.
pub fn parse_design(input: &str) -> Result<DesignModel, GrammarError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Ok(DesignModel::new());
    }

    let mut parser = Parser::new(&tokens);
    parser.parse_confounding()?;

    if let Some(token) = parser.peek() {
        return Err(SyntaxError::TrailingInput {
            position: token.position,
            found: token.kind,
            text: token.text.clone(),
        }
        .into());
    }

    Ok(parser.into_model())
}

/// Per-parse state: the token slice, a cursor, and the model under
/// construction. Each call to [`parse_design`] owns a fresh value.
struct Parser<'a> {
    tokens: &'a [Token],
    cursor: usize,
    model: DesignModel,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            cursor: 0,
            model: DesignModel::new(),
        }
    }

    fn into_model(self) -> DesignModel {
        self.model
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.cursor)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|token| token.kind)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.cursor)?;
        self.cursor += 1;
        Some(token)
    }

    fn expect(&mut self, expected: TokenKind) -> Result<&'a Token, SyntaxError> {
        let Some(token) = self.peek() else {
            return Err(SyntaxError::UnexpectedEnd { expected: Some(expected) });
        };
        if token.kind != expected {
            return Err(SyntaxError::UnexpectedToken {
                position: token.position,
                expected,
                found: token.kind,
            });
        }
        self.cursor += 1;
        Ok(token)
    }

    /// Confounding `≈≈`, the loosest level. Cross-products the working set
    /// against each right-hand operand, then unions the operand in.
    fn parse_confounding(&mut self) -> Result<Vec<String>, SyntaxError> {
        let mut working = self.parse_batch()?;

        while self.peek_kind() == Some(TokenKind::Confounded) {
            self.advance();
            let right = self.parse_batch()?;
            for left in &working {
                for name in &right {
                    self.model
                        .push_relationship(Relationship::new(left, name, RelationKind::Confounded));
                }
            }
            working.extend(right);
        }

        Ok(working)
    }

    /// Batch effect `==`. Cross-product then union, like crossing; the left
    /// working set is retagged as batch so the layout banner picks it up.
    fn parse_batch(&mut self) -> Result<Vec<String>, SyntaxError> {
        let mut working = self.parse_crossing()?;

        while self.peek_kind() == Some(TokenKind::Batch) {
            self.advance();
            let right = self.parse_crossing()?;
            for left in &working {
                if let Some(factor) = self.model.factor_mut(left) {
                    factor.set_category(FactorCategory::Batch);
                }
                for name in &right {
                    self.model.push_relationship(Relationship::new(
                        left,
                        name,
                        RelationKind::BatchEffect,
                    ));
                }
            }
            working.extend(right);
        }

        Ok(working)
    }

    /// Crossing `×` / partial crossing `◊`, one shared level. A chain
    /// `A × B × C` emits all three pairwise edges because the working set
    /// keeps growing.
    fn parse_crossing(&mut self) -> Result<Vec<String>, SyntaxError> {
        let mut working = self.parse_nesting()?;

        while let Some(kind @ (TokenKind::Cross | TokenKind::PartialCross)) = self.peek_kind() {
            self.advance();
            let relation = if kind == TokenKind::Cross {
                RelationKind::Crosses
            } else {
                RelationKind::PartialCrosses
            };

            let right = self.parse_nesting()?;
            for left in &working {
                for name in &right {
                    self.model.push_relationship(Relationship::new(left, name, relation));
                }
            }
            working.extend(right);
        }

        Ok(working)
    }

    /// Nesting `>`. Unlike the cross-producting levels the working set is
    /// REPLACED by the right-hand set, so `A > B > C` yields A–B and B–C but
    /// never A–C.
    fn parse_nesting(&mut self) -> Result<Vec<String>, SyntaxError> {
        let mut working = self.parse_classification()?;

        while self.peek_kind() == Some(TokenKind::Nests) {
            self.advance();
            let right = self.parse_classification()?;
            for left in &working {
                for name in &right {
                    self.model
                        .push_relationship(Relationship::new(left, name, RelationKind::Nests));
                }
            }
            working = right;
        }

        Ok(working)
    }

    /// Classification `:`, at most one per primary. Retags each classifier.
    fn parse_classification(&mut self) -> Result<Vec<String>, SyntaxError> {
        let working = self.parse_primary()?;

        if self.peek_kind() == Some(TokenKind::Classifies) {
            self.advance();
            let classifiers = self.parse_primary()?;
            for factor in &working {
                for classifier in &classifiers {
                    self.model.push_relationship(Relationship::new(
                        factor,
                        classifier,
                        RelationKind::Classifies,
                    ));
                    if let Some(classifier) = self.model.factor_mut(classifier) {
                        classifier.set_category(FactorCategory::Classification);
                    }
                }
            }
        }

        Ok(working)
    }

    fn parse_primary(&mut self) -> Result<Vec<String>, SyntaxError> {
        match self.peek() {
            Some(token) if token.kind == TokenKind::BraceOpen => self.parse_group(),
            Some(token) if token.kind == TokenKind::ParenOpen => {
                self.advance();
                let working = self.parse_confounding()?;
                self.expect(TokenKind::ParenClose)?;
                Ok(working)
            }
            Some(token) if token.kind == TokenKind::Ident => Ok(vec![self.parse_factor()?]),
            Some(token) => Err(SyntaxError::UnexpectedPrimary {
                position: token.position,
                found: token.kind,
            }),
            None => Err(SyntaxError::UnexpectedEnd { expected: None }),
        }
    }

    /// Confound-group sugar `{A ≈≈ B ≈≈ C}`: each new member is confounded
    /// against every previously-seen member, and the full name set is recorded
    /// as group metadata for side-by-side layout.
    fn parse_group(&mut self) -> Result<Vec<String>, SyntaxError> {
        self.expect(TokenKind::BraceOpen)?;

        let mut members = vec![self.parse_factor()?];
        while self.peek_kind() == Some(TokenKind::Confounded) {
            self.advance();
            let name = self.parse_factor()?;
            for seen in &members {
                self.model
                    .push_relationship(Relationship::new(seen, &name, RelationKind::Confounded));
            }
            members.push(name);
        }

        self.expect(TokenKind::BraceClose)?;

        self.model
            .push_confound_group(members.iter().cloned().collect::<BTreeSet<_>>());
        Ok(members)
    }

    /// A factor declaration: identifier plus exactly one size-spec form,
    /// `(n)`, `(~n)`, or `[n1|n2|...]`.
    fn parse_factor(&mut self) -> Result<String, SyntaxError> {
        let name_token = self.expect(TokenKind::Ident)?;
        let name = name_token.text.clone();

        let levels = match self.peek_kind() {
            Some(TokenKind::ParenOpen) => {
                self.advance();
                let levels = if self.peek_kind() == Some(TokenKind::Tilde) {
                    self.advance();
                    LevelCount::Approximate(self.parse_number()?)
                } else {
                    LevelCount::Fixed(self.parse_number()?)
                };
                self.expect(TokenKind::ParenClose)?;
                levels
            }
            Some(TokenKind::BracketOpen) => {
                self.advance();
                let mut counts = vec![self.parse_number()?];
                while self.peek_kind() == Some(TokenKind::Pipe) {
                    self.advance();
                    counts.push(self.parse_number()?);
                }
                self.expect(TokenKind::BracketClose)?;
                LevelCount::Unbalanced(counts)
            }
            _ => {
                return Err(SyntaxError::MissingSizeSpec {
                    position: name_token.position,
                    name,
                })
            }
        };

        // The grammar path does not reject redeclared names; that is the
        // validator's report to make.
        self.model.push_factor(Factor::new(&name, levels));
        Ok(name)
    }

    /// A number literal; a trailing `k` multiplies by 1000 (integer-only).
    fn parse_number(&mut self) -> Result<u64, SyntaxError> {
        let token = self.expect(TokenKind::Number)?;
        let (digits, thousands) = match token.text.strip_suffix('k') {
            Some(digits) => (digits, true),
            None => (token.text.as_str(), false),
        };

        let value = digits
            .parse::<u64>()
            .map_err(|_| SyntaxError::NumberTooLarge { position: token.position })?;
        if thousands {
            value
                .checked_mul(1000)
                .ok_or(SyntaxError::NumberTooLarge { position: token.position })
        } else {
            Ok(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_design, SyntaxError};
    use crate::grammar::{GrammarError, TokenKind};
    use crate::model::{FactorCategory, LevelCount, RelationKind};
    use rstest::rstest;

    fn relation_pairs(input: &str, kind: RelationKind) -> Vec<(String, String)> {
        parse_design(input)
            .expect("parse")
            .relationships()
            .iter()
            .filter(|rel| rel.kind() == kind)
            .map(|rel| (rel.source().to_owned(), rel.target().to_owned()))
            .collect()
    }

    #[test]
    fn empty_input_yields_an_empty_model() {
        let model = parse_design("  # only a comment\n").expect("parse");
        assert!(model.factors().is_empty());
        assert!(model.relationships().is_empty());
    }

    #[test]
    fn nesting_chain_replaces_the_working_set() {
        let model = parse_design("A(2) > B(3) > C(4)").expect("parse");
        assert_eq!(model.factors().len(), 3);
        assert_eq!(
            relation_pairs("A(2) > B(3) > C(4)", RelationKind::Nests),
            vec![("A".to_owned(), "B".to_owned()), ("B".to_owned(), "C".to_owned())]
        );
    }

    #[test]
    fn crossing_chain_cross_products_the_working_set() {
        assert_eq!(
            relation_pairs("A(1) × B(2) × C(3)", RelationKind::Crosses),
            vec![
                ("A".to_owned(), "B".to_owned()),
                ("A".to_owned(), "C".to_owned()),
                ("B".to_owned(), "C".to_owned()),
            ]
        );
    }

    #[test]
    fn partial_cross_keeps_its_own_kind() {
        let pairs = relation_pairs("Sample(3) ◊ Treatment(2)", RelationKind::PartialCrosses);
        assert_eq!(pairs, vec![("Sample".to_owned(), "Treatment".to_owned())]);
    }

    #[rstest]
    #[case("Cell(5000)", LevelCount::Fixed(5000))]
    #[case("Cell(5k)", LevelCount::Fixed(5000))]
    #[case("Cell(~5000)", LevelCount::Approximate(5000))]
    #[case("Cell(~12k)", LevelCount::Approximate(12000))]
    #[case("P[30|25|18]", LevelCount::Unbalanced(vec![30, 25, 18]))]
    #[case("P[7]", LevelCount::Unbalanced(vec![7]))]
    fn size_specs_parse_to_level_counts(#[case] input: &str, #[case] expected: LevelCount) {
        let model = parse_design(input).expect("parse");
        assert_eq!(model.factors().len(), 1);
        assert_eq!(model.factors()[0].levels(), &expected);
    }

    #[test]
    fn confound_group_emits_pairwise_edges_and_metadata() {
        let model = parse_design("{X(1) ≈≈ Y(2)}").expect("parse");
        let confounds = model
            .relationships()
            .iter()
            .filter(|rel| rel.kind() == RelationKind::Confounded)
            .count();
        assert_eq!(confounds, 1);
        assert_eq!(model.confound_groups().len(), 1);
        assert!(model.confound_groups()[0].contains("X"));
        assert!(model.confound_groups()[0].contains("Y"));
    }

    #[test]
    fn three_member_group_confounds_all_earlier_members() {
        assert_eq!(
            relation_pairs("{X(1) ≈≈ Y(2) ≈≈ Z(3)}", RelationKind::Confounded),
            vec![
                ("X".to_owned(), "Y".to_owned()),
                ("X".to_owned(), "Z".to_owned()),
                ("Y".to_owned(), "Z".to_owned()),
            ]
        );
    }

    #[test]
    fn classification_retags_the_classifier() {
        let model = parse_design("Cell(5000) : CellType(35)").expect("parse");
        assert_eq!(
            relation_pairs("Cell(5000) : CellType(35)", RelationKind::Classifies),
            vec![("Cell".to_owned(), "CellType".to_owned())]
        );
        assert_eq!(
            model.factor("CellType").expect("classifier").category(),
            FactorCategory::Classification
        );
    }

    #[test]
    fn batch_operator_retags_the_left_working_set() {
        let model = parse_design("ProcessBatch(4) == Sample(10) × Treatment(2)").expect("parse");
        assert_eq!(model.factor("ProcessBatch").expect("batch").category(), FactorCategory::Batch);
        assert_eq!(model.factor("Sample").expect("sample").category(), FactorCategory::Factor);
        assert_eq!(
            relation_pairs("ProcessBatch(4) == Sample(10) × Treatment(2)", RelationKind::BatchEffect),
            vec![
                ("ProcessBatch".to_owned(), "Sample".to_owned()),
                ("ProcessBatch".to_owned(), "Treatment".to_owned()),
            ]
        );
    }

    #[test]
    fn parentheses_re_enter_the_full_precedence_chain() {
        // Without parens, `>` binds tighter than `×`; the parens force the
        // crossing to happen against the B > C result set.
        let model = parse_design("A(1) × (B(2) > C(3))").expect("parse");
        let crosses = model
            .relationships()
            .iter()
            .filter(|rel| rel.kind() == RelationKind::Crosses)
            .map(|rel| (rel.source().to_owned(), rel.target().to_owned()))
            .collect::<Vec<_>>();
        // The parenthesized nesting chain leaves {C} as its working set.
        assert_eq!(crosses, vec![("A".to_owned(), "C".to_owned())]);
    }

    #[test]
    fn trailing_operator_is_a_syntax_error_with_no_partial_model() {
        let err = parse_design("Site(3) > ").expect_err("trailing operator");
        assert_eq!(err, GrammarError::Syntax(SyntaxError::UnexpectedEnd { expected: None }));
    }

    #[test]
    fn missing_size_spec_is_a_syntax_error() {
        let err = parse_design("Site > Patient(20)").expect_err("missing size");
        assert_eq!(
            err,
            GrammarError::Syntax(SyntaxError::MissingSizeSpec {
                position: 0,
                name: "Site".to_owned(),
            })
        );
    }

    #[test]
    fn unterminated_bracket_reports_expected_kind() {
        let err = parse_design("P[30|25").expect_err("unterminated");
        assert_eq!(
            err,
            GrammarError::Syntax(SyntaxError::UnexpectedEnd {
                expected: Some(TokenKind::BracketClose),
            })
        );
    }

    #[test]
    fn leftover_tokens_after_a_complete_parse_are_rejected() {
        let err = parse_design("Site(3) )").expect_err("leftover");
        assert_eq!(
            err,
            GrammarError::Syntax(SyntaxError::TrailingInput {
                position: 8,
                found: TokenKind::ParenClose,
                text: ")".to_owned(),
            })
        );
    }

    #[test]
    fn trailing_input_error_names_the_offending_token() {
        let err = parse_design("Site(3) > Patient(20) Extra(7)").expect_err("leftover");
        assert_eq!(
            err.to_string(),
            "syntax error: unexpected identifier 'Extra' after a complete expression at position 22"
        );
    }

    #[test]
    fn empty_group_is_rejected_at_the_first_member() {
        let err = parse_design("{}").expect_err("empty group");
        assert_eq!(
            err,
            GrammarError::Syntax(SyntaxError::UnexpectedToken {
                position: 1,
                expected: TokenKind::Ident,
                found: TokenKind::BraceClose,
            })
        );
    }

    #[test]
    fn factor_order_follows_encounter_order() {
        let model = parse_design("B(1) × A(2) > C(3)").expect("parse");
        let names = model.factors().iter().map(|factor| factor.name().to_owned()).collect::<Vec<_>>();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[test]
    fn redeclared_factor_names_are_kept_for_the_validator() {
        let model = parse_design("A(1) > A(2)").expect("parse");
        assert_eq!(model.factors().len(), 2);
    }
}
