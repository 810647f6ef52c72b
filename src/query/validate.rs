// SPDX-FileCopyrightText: 2026 edgram contributors
// SPDX-License-Identifier: MIT

use std::collections::BTreeSet;
use std::fmt;

use crate::model::{DesignModel, LevelCount, RelationKind};

/// A single semantic problem found in a design.
///
/// These are reports, not errors: a design with issues still lays out and
/// renders. Each variant formats as the message users see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyDesign,
    DuplicateFactor {
        name: String,
    },
    UnknownFactor {
        name: String,
    },
    NestingCycle {
        /// The cycle's members in traversal order, first factor repeated at
        /// the end.
        path: Vec<String>,
    },
    NonTerminalClassification {
        factor: String,
        kind: RelationKind,
    },
    DuplicateRelationship {
        source: String,
        target: String,
        kind: RelationKind,
    },
    EmptyLevelList {
        factor: String,
    },
    NonPositiveLevelCount {
        factor: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDesign => f.write_str("Design has no factors"),
            Self::DuplicateFactor { name } => {
                write!(f, "Factor {name} is declared more than once")
            }
            Self::UnknownFactor { name } => {
                write!(f, "Relationship references unknown factor: {name}")
            }
            Self::NestingCycle { path } => {
                write!(f, "Cycle detected in nesting: {}", path.join(" > "))
            }
            Self::NonTerminalClassification { factor, kind } => write!(
                f,
                "Factor {factor} has classification and should be terminal, but also has {kind} relationship"
            ),
            Self::DuplicateRelationship { source, target, kind } => {
                write!(f, "Duplicate relationship: {source} {kind} {target}")
            }
            Self::EmptyLevelList { factor } => {
                write!(f, "Factor {factor} has empty size list")
            }
            Self::NonPositiveLevelCount { factor } => {
                write!(f, "Factor {factor} has non-positive size")
            }
        }
    }
}

/// Runs every semantic check and returns all issues found, empty when the
/// design is clean. An empty design short-circuits.
pub fn validate_design(model: &DesignModel) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if model.factors().is_empty() {
        issues.push(ValidationIssue::EmptyDesign);
        return issues;
    }

    check_duplicate_factors(model, &mut issues);
    check_references(model, &mut issues);
    check_nesting_cycles(model, &mut issues);
    check_classification_terminal(model, &mut issues);
    check_duplicate_relationships(model, &mut issues);
    check_level_counts(model, &mut issues);

    issues
}

fn check_duplicate_factors(model: &DesignModel, issues: &mut Vec<ValidationIssue>) {
    let mut seen = BTreeSet::new();
    for factor in model.factors() {
        if !seen.insert(factor.name()) {
            issues.push(ValidationIssue::DuplicateFactor {
                name: factor.name().to_owned(),
            });
        }
    }
}

fn check_references(model: &DesignModel, issues: &mut Vec<ValidationIssue>) {
    for rel in model.relationships() {
        for name in [rel.source(), rel.target()] {
            if !model.has_factor(name) {
                issues.push(ValidationIssue::UnknownFactor { name: name.to_owned() });
            }
        }
    }
}

/// DFS over the nesting adjacency with an explicit stack. Each back edge
/// into the current path reports one cycle; factors already fully explored
/// are not revisited, so a given cycle is reported once per entry point.
fn check_nesting_cycles(model: &DesignModel, issues: &mut Vec<ValidationIssue>) {
    let mut explored: BTreeSet<&str> = BTreeSet::new();

    for start in model.factors().iter().map(|factor| factor.name()) {
        if explored.contains(start) {
            continue;
        }
        // stack entries are (factor, next child edge offset)
        let mut stack: Vec<(&str, usize)> = vec![(start, 0)];
        let mut path: Vec<&str> = vec![start];

        while let Some((current, offset)) = stack.pop() {
            let child = model
                .relationships()
                .iter()
                .filter(|rel| rel.kind() == RelationKind::Nests && rel.source() == current)
                .map(|rel| rel.target())
                .nth(offset);

            let Some(child) = child else {
                explored.insert(current);
                path.pop();
                continue;
            };
            stack.push((current, offset + 1));

            if let Some(at) = path.iter().position(|name| *name == child) {
                let mut cycle: Vec<String> =
                    path[at..].iter().map(|name| (*name).to_owned()).collect();
                cycle.push(child.to_owned());
                issues.push(ValidationIssue::NestingCycle { path: cycle });
            } else if !explored.contains(child) {
                stack.push((child, 0));
                path.push(child);
            }
        }
    }
}

fn check_classification_terminal(model: &DesignModel, issues: &mut Vec<ValidationIssue>) {
    let classified: BTreeSet<&str> = model
        .relationships()
        .iter()
        .filter(|rel| rel.kind() == RelationKind::Classifies)
        .map(|rel| rel.source())
        .collect();

    for rel in model.relationships() {
        if rel.kind() != RelationKind::Classifies && classified.contains(rel.source()) {
            issues.push(ValidationIssue::NonTerminalClassification {
                factor: rel.source().to_owned(),
                kind: rel.kind(),
            });
        }
    }
}

fn check_duplicate_relationships(model: &DesignModel, issues: &mut Vec<ValidationIssue>) {
    let mut seen = BTreeSet::new();
    for rel in model.relationships() {
        if !seen.insert((rel.source(), rel.target(), rel.kind())) {
            issues.push(ValidationIssue::DuplicateRelationship {
                source: rel.source().to_owned(),
                target: rel.target().to_owned(),
                kind: rel.kind(),
            });
        }
    }
}

fn check_level_counts(model: &DesignModel, issues: &mut Vec<ValidationIssue>) {
    for factor in model.factors() {
        match factor.levels() {
            LevelCount::Fixed(n) | LevelCount::Approximate(n) => {
                if *n == 0 {
                    issues.push(ValidationIssue::NonPositiveLevelCount {
                        factor: factor.name().to_owned(),
                    });
                }
            }
            LevelCount::Unbalanced(counts) => {
                if counts.is_empty() {
                    issues.push(ValidationIssue::EmptyLevelList {
                        factor: factor.name().to_owned(),
                    });
                } else if counts.iter().any(|count| *count == 0) {
                    issues.push(ValidationIssue::NonPositiveLevelCount {
                        factor: factor.name().to_owned(),
                    });
                }
            }
        }
    }
}
