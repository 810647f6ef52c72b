// SPDX-FileCopyrightText: 2026 edgram contributors
// SPDX-License-Identifier: MIT

use std::collections::BTreeSet;
use std::fmt;

use super::factor::{Factor, FactorCategory, LevelCount};
use super::relationship::{RelationKind, Relationship};

/// A structural model of an experimental design.
///
/// Factors and relationships keep their insertion order; the layout engine
/// depends on left-to-right grammar encounter order. Confound groups recorded
/// via the `{...}` sugar are the only model metadata.
///
/// The checked builder methods (`add_*`) enforce unique factor names, positive
/// level counts, and referential integrity. The grammar parser bypasses these
/// checks on purpose: semantic issues in parsed text are the validator's to
/// report, not the compiler's.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DesignModel {
    factors: Vec<Factor>,
    relationships: Vec<Relationship>,
    confound_groups: Vec<BTreeSet<String>>,
}

impl DesignModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn factors(&self) -> &[Factor] {
        &self.factors
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn confound_groups(&self) -> &[BTreeSet<String>] {
        &self.confound_groups
    }

    /// First factor with the given name, if any.
    pub fn factor(&self, name: &str) -> Option<&Factor> {
        self.factors.iter().find(|factor| factor.name() == name)
    }

    pub fn has_factor(&self, name: &str) -> bool {
        self.factor(name).is_some()
    }

    /// Declaration index of a factor, used for deterministic tie-breaking.
    pub fn factor_index(&self, name: &str) -> Option<usize> {
        self.factors.iter().position(|factor| factor.name() == name)
    }

    pub(crate) fn factor_mut(&mut self, name: &str) -> Option<&mut Factor> {
        self.factors.iter_mut().find(|factor| factor.name() == name)
    }

    pub(crate) fn push_factor(&mut self, factor: Factor) {
        self.factors.push(factor);
    }

    pub(crate) fn push_relationship(&mut self, relationship: Relationship) {
        self.relationships.push(relationship);
    }

    pub(crate) fn push_confound_group(&mut self, group: BTreeSet<String>) {
        self.confound_groups.push(group);
    }

    /// Adds a factor with a plain category, rejecting duplicates and
    /// degenerate level counts.
    pub fn add_factor(
        &mut self,
        name: impl Into<String>,
        levels: LevelCount,
    ) -> Result<(), ModelError> {
        self.add_factor_with(name, levels, FactorCategory::Factor)
    }

    pub fn add_factor_with(
        &mut self,
        name: impl Into<String>,
        levels: LevelCount,
        category: FactorCategory,
    ) -> Result<(), ModelError> {
        let name = name.into();
        if self.has_factor(&name) {
            return Err(ModelError::DuplicateFactor { name });
        }

        match &levels {
            LevelCount::Fixed(n) | LevelCount::Approximate(n) => {
                if *n == 0 {
                    return Err(ModelError::NonPositiveLevelCount { name });
                }
            }
            LevelCount::Unbalanced(counts) => {
                if counts.is_empty() {
                    return Err(ModelError::EmptyLevelList { name });
                }
                if counts.iter().any(|count| *count == 0) {
                    return Err(ModelError::NonPositiveLevelCount { name });
                }
            }
        }

        self.factors.push(Factor::new_with(name, levels, category));
        Ok(())
    }

    /// Adds `parent > child`.
    pub fn add_nesting(&mut self, parent: &str, child: &str) -> Result<(), ModelError> {
        self.require_factor(parent)?;
        self.require_factor(child)?;
        self.relationships.push(Relationship::new(parent, child, RelationKind::Nests));
        Ok(())
    }

    /// Adds `a × b`, or `a ◊ b` when `partial` is set.
    pub fn add_crossing(&mut self, a: &str, b: &str, partial: bool) -> Result<(), ModelError> {
        self.require_factor(a)?;
        self.require_factor(b)?;
        let kind = if partial { RelationKind::PartialCrosses } else { RelationKind::Crosses };
        self.relationships.push(Relationship::new(a, b, kind));
        Ok(())
    }

    /// Adds `factor : classifier` and retags the classifier's category.
    pub fn add_classification(&mut self, factor: &str, classifier: &str) -> Result<(), ModelError> {
        self.require_factor(factor)?;
        self.require_factor(classifier)?;
        self.relationships.push(Relationship::new(factor, classifier, RelationKind::Classifies));
        if let Some(classifier) = self.factor_mut(classifier) {
            classifier.set_category(FactorCategory::Classification);
        }
        Ok(())
    }

    /// Adds `batch == affected...` and retags the batch factor's category.
    pub fn add_batch_effect(&mut self, batch: &str, affected: &[&str]) -> Result<(), ModelError> {
        self.require_factor(batch)?;
        for name in affected {
            self.require_factor(name)?;
        }

        if let Some(batch) = self.factor_mut(batch) {
            batch.set_category(FactorCategory::Batch);
        }
        for name in affected {
            self.relationships.push(Relationship::new(batch, *name, RelationKind::BatchEffect));
        }
        Ok(())
    }

    /// Adds `a ≈≈ b`.
    pub fn add_confound(&mut self, a: &str, b: &str) -> Result<(), ModelError> {
        self.require_factor(a)?;
        self.require_factor(b)?;
        self.relationships.push(Relationship::new(a, b, RelationKind::Confounded));
        Ok(())
    }

    /// Records a confound group and the pairwise edges between its members,
    /// mirroring the `{...}` grammar sugar.
    pub fn add_confound_group(&mut self, members: &[&str]) -> Result<(), ModelError> {
        for name in members {
            self.require_factor(name)?;
        }

        for (idx, member) in members.iter().enumerate() {
            for other in &members[idx + 1..] {
                self.relationships.push(Relationship::new(
                    *member,
                    *other,
                    RelationKind::Confounded,
                ));
            }
        }
        self.confound_groups
            .push(members.iter().map(|name| (*name).to_owned()).collect());
        Ok(())
    }

    fn require_factor(&self, name: &str) -> Result<(), ModelError> {
        if self.has_factor(name) {
            Ok(())
        } else {
            Err(ModelError::UnknownFactor { name: name.to_owned() })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    DuplicateFactor { name: String },
    UnknownFactor { name: String },
    EmptyLevelList { name: String },
    NonPositiveLevelCount { name: String },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateFactor { name } => write!(f, "factor '{name}' already exists"),
            Self::UnknownFactor { name } => write!(f, "factor '{name}' does not exist"),
            Self::EmptyLevelList { name } => {
                write!(f, "factor '{name}' has an empty level-count list")
            }
            Self::NonPositiveLevelCount { name } => {
                write!(f, "factor '{name}' has a non-positive level count")
            }
        }
    }
}

impl std::error::Error for ModelError {}
