// SPDX-FileCopyrightText: 2026 edgram contributors
// SPDX-License-Identifier: MIT

//! Core data model: factors, relationships, and the design they form.
//!
//! A [`DesignModel`] is built once, by the grammar parser or through the
//! checked builder API, and is read-only input for every downstream stage.

pub mod design;
pub mod factor;
pub mod relationship;

pub use design::{DesignModel, ModelError};
pub use factor::{Factor, FactorCategory, LevelCount, ParseFactorCategoryError};
pub use relationship::{ParseRelationKindError, RelationKind, Relationship};
