// SPDX-FileCopyrightText: 2026 edgram contributors
// SPDX-License-Identifier: MIT

use std::fmt;
use std::str::FromStr;

/// Level-count specification of a factor.
///
/// `Unbalanced` carries one count per branch, in declaration order; its
/// effective size is the sum. `Approximate` means "about n" and is rendered
/// with a leading `~` marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelCount {
    Fixed(u64),
    Unbalanced(Vec<u64>),
    Approximate(u64),
}

impl LevelCount {
    /// The effective number of levels.
    pub fn effective(&self) -> u64 {
        match self {
            Self::Fixed(n) | Self::Approximate(n) => *n,
            Self::Unbalanced(counts) => counts.iter().copied().sum(),
        }
    }

    pub fn is_approximate(&self) -> bool {
        matches!(self, Self::Approximate(_))
    }
}

impl fmt::Display for LevelCount {
    /// Plain count, `~n` for approximate, `[a | b | c]` for unbalanced.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(n) => write!(f, "{n}"),
            Self::Approximate(n) => write!(f, "~{n}"),
            Self::Unbalanced(counts) => {
                f.write_str("[")?;
                for (i, count) in counts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{count}")?;
                }
                f.write_str("]")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FactorCategory {
    Factor,
    Observation,
    Classification,
    Batch,
}

impl FactorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Factor => "factor",
            Self::Observation => "observation",
            Self::Classification => "classification",
            Self::Batch => "batch",
        }
    }
}

impl fmt::Display for FactorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFactorCategoryError {
    pub value: String,
}

impl fmt::Display for ParseFactorCategoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown factor category: {:?}", self.value)
    }
}

impl std::error::Error for ParseFactorCategoryError {}

impl FromStr for FactorCategory {
    type Err = ParseFactorCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "factor" => Ok(Self::Factor),
            "observation" => Ok(Self::Observation),
            "classification" => Ok(Self::Classification),
            "batch" => Ok(Self::Batch),
            other => Err(ParseFactorCategoryError { value: other.to_owned() }),
        }
    }
}

/// A named factor with its level-count specification and category tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Factor {
    name: String,
    levels: LevelCount,
    category: FactorCategory,
}

impl Factor {
    pub fn new(name: impl Into<String>, levels: LevelCount) -> Self {
        Self {
            name: name.into(),
            levels,
            category: FactorCategory::Factor,
        }
    }

    pub fn new_with(
        name: impl Into<String>,
        levels: LevelCount,
        category: FactorCategory,
    ) -> Self {
        Self {
            name: name.into(),
            levels,
            category,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn levels(&self) -> &LevelCount {
        &self.levels
    }

    pub fn category(&self) -> FactorCategory {
        self.category
    }

    pub fn set_category(&mut self, category: FactorCategory) {
        self.category = category;
    }
}
