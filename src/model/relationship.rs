// SPDX-FileCopyrightText: 2026 edgram contributors
// SPDX-License-Identifier: MIT

use std::fmt;
use std::str::FromStr;

/// Kind of a typed relationship between two factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RelationKind {
    Nests,
    Crosses,
    PartialCrosses,
    Classifies,
    BatchEffect,
    Confounded,
}

impl RelationKind {
    /// Stable spelling shared by every exporter.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nests => "nests",
            Self::Crosses => "crosses",
            Self::PartialCrosses => "partial_crosses",
            Self::Classifies => "classifies",
            Self::BatchEffect => "batch_effect",
            Self::Confounded => "confounded",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRelationKindError {
    pub value: String,
}

impl fmt::Display for ParseRelationKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown relationship kind: {:?}", self.value)
    }
}

impl std::error::Error for ParseRelationKindError {}

impl FromStr for RelationKind {
    type Err = ParseRelationKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nests" => Ok(Self::Nests),
            "crosses" => Ok(Self::Crosses),
            "partial_crosses" => Ok(Self::PartialCrosses),
            "classifies" => Ok(Self::Classifies),
            "batch_effect" => Ok(Self::BatchEffect),
            "confounded" => Ok(Self::Confounded),
            other => Err(ParseRelationKindError { value: other.to_owned() }),
        }
    }
}

/// An ordered (source, target) pair of factor names plus a kind.
///
/// For `Classifies`, the source is the classified factor and the target is the
/// classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    source: String,
    target: String,
    kind: RelationKind,
}

impl Relationship {
    pub fn new(source: impl Into<String>, target: impl Into<String>, kind: RelationKind) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn kind(&self) -> RelationKind {
        self.kind
    }
}
