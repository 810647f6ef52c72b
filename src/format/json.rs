// SPDX-FileCopyrightText: 2026 edgram contributors
// SPDX-License-Identifier: MIT

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::{
    DesignModel, FactorCategory, LevelCount, ModelError, RelationKind, Relationship,
};

const SCHEMA_VERSION: &str = "1.0";

#[derive(Debug, Serialize, Deserialize)]
struct DesignDto {
    schema_version: String,
    factors: Vec<FactorDto>,
    relationships: Vec<RelationshipDto>,
    metadata: MetadataDto,
}

#[derive(Debug, Serialize, Deserialize)]
struct FactorDto {
    name: String,
    n: LevelDto,
    #[serde(rename = "type")]
    category: String,
}

/// Wire shape of a level count: a bare integer, an integer list, or a
/// `"~n"` string for approximate counts.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum LevelDto {
    Fixed(u64),
    Unbalanced(Vec<u64>),
    Approximate(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct RelationshipDto {
    from: String,
    to: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct MetadataDto {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    confound_groups: Vec<Vec<String>>,
}

#[derive(Debug)]
pub enum FormatError {
    Json(serde_json::Error),
    UnsupportedSchema { version: String },
    InvalidLevel { factor: String, value: String },
    UnknownCategory { factor: String, value: String },
    UnknownRelationKind { value: String },
    Model(ModelError),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "JSON error: {err}"),
            Self::UnsupportedSchema { version } => {
                write!(f, "unsupported schema version: {version}")
            }
            Self::InvalidLevel { factor, value } => {
                write!(f, "factor '{factor}' has an invalid level count: {value:?}")
            }
            Self::UnknownCategory { factor, value } => {
                write!(f, "factor '{factor}' has an unknown category: {value:?}")
            }
            Self::UnknownRelationKind { value } => {
                write!(f, "unknown relationship type: {value:?}")
            }
            Self::Model(err) => write!(f, "invalid design: {err}"),
        }
    }
}

impl std::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Model(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for FormatError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<ModelError> for FormatError {
    fn from(err: ModelError) -> Self {
        Self::Model(err)
    }
}

/// Serializes a model to the versioned JSON interchange document.
pub fn to_json(model: &DesignModel) -> Result<String, FormatError> {
    let dto = DesignDto {
        schema_version: SCHEMA_VERSION.to_owned(),
        factors: model
            .factors()
            .iter()
            .map(|factor| FactorDto {
                name: factor.name().to_owned(),
                n: level_to_dto(factor.levels()),
                category: factor.category().as_str().to_owned(),
            })
            .collect(),
        relationships: model
            .relationships()
            .iter()
            .map(|rel| RelationshipDto {
                from: rel.source().to_owned(),
                to: rel.target().to_owned(),
                kind: rel.kind().as_str().to_owned(),
            })
            .collect(),
        metadata: MetadataDto {
            confound_groups: model
                .confound_groups()
                .iter()
                .map(|group| group.iter().cloned().collect())
                .collect(),
        },
    };
    Ok(serde_json::to_string_pretty(&dto)?)
}

/// Deserializes a JSON interchange document back into a model.
pub fn from_json(input: &str) -> Result<DesignModel, FormatError> {
    let dto: DesignDto = serde_json::from_str(input)?;
    if dto.schema_version != SCHEMA_VERSION {
        return Err(FormatError::UnsupportedSchema { version: dto.schema_version });
    }

    let mut model = DesignModel::new();
    for factor in dto.factors {
        let levels = level_from_dto(&factor.name, factor.n)?;
        let category =
            FactorCategory::from_str(&factor.category).map_err(|_| FormatError::UnknownCategory {
                factor: factor.name.clone(),
                value: factor.category.clone(),
            })?;
        model.add_factor_with(factor.name, levels, category)?;
    }
    for rel in dto.relationships {
        let kind = RelationKind::from_str(&rel.kind)
            .map_err(|_| FormatError::UnknownRelationKind { value: rel.kind.clone() })?;
        model.push_relationship(Relationship::new(rel.from, rel.to, kind));
    }
    for group in dto.metadata.confound_groups {
        model.push_confound_group(group.into_iter().collect());
    }
    Ok(model)
}

fn level_to_dto(levels: &LevelCount) -> LevelDto {
    match levels {
        LevelCount::Fixed(n) => LevelDto::Fixed(*n),
        LevelCount::Unbalanced(counts) => LevelDto::Unbalanced(counts.clone()),
        LevelCount::Approximate(n) => LevelDto::Approximate(format!("~{n}")),
    }
}

fn level_from_dto(factor: &str, dto: LevelDto) -> Result<LevelCount, FormatError> {
    match dto {
        LevelDto::Fixed(n) => Ok(LevelCount::Fixed(n)),
        LevelDto::Unbalanced(counts) => Ok(LevelCount::Unbalanced(counts)),
        LevelDto::Approximate(value) => {
            let parsed = value
                .strip_prefix('~')
                .and_then(|digits| digits.parse::<u64>().ok());
            match parsed {
                Some(n) => Ok(LevelCount::Approximate(n)),
                None => Err(FormatError::InvalidLevel {
                    factor: factor.to_owned(),
                    value,
                }),
            }
        }
    }
}
