// SPDX-FileCopyrightText: 2026 edgram contributors
// SPDX-License-Identifier: MIT

//! edgram: experimental-design grammar compiler and character-diagram renderer.
//!
//! The pipeline runs leaves-first: grammar text is tokenized and parsed into a
//! [`DesignModel`](model::DesignModel), the [`query`] layer derives structural
//! indices from it, [`layout`] assigns grid coordinates, and [`render`] paints
//! the design onto a layered character canvas. [`format`] serializes models to
//! JSON, DOT, and GraphML for external tooling.

pub mod format;
pub mod grammar;
pub mod layout;
pub mod model;
pub mod query;
pub mod render;

pub use grammar::{parse_design, GrammarError};
pub use model::{DesignModel, Factor, FactorCategory, LevelCount, RelationKind, Relationship};
pub use query::{count_observations, describe, validate_design, ObservationCount};
pub use render::render_design;
