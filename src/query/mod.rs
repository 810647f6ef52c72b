// SPDX-FileCopyrightText: 2026 edgram contributors
// SPDX-License-Identifier: MIT

//! Read-only queries over a finished [`DesignModel`]: the structure index the
//! layout engine consumes, observation counting, the text summary, and the
//! semantic validator.
//!
//! Nothing in this module mutates the model, and nothing here rejects a
//! degenerate one. Cycles and dangling endpoints are reported by
//! [`validate_design`] but tolerated everywhere else.
//!
//! [`DesignModel`]: crate::model::DesignModel

mod observations;
mod structure;
mod validate;

pub use observations::{count_observations, describe, ObservationCount};
pub use structure::{CrossingKind, StructureIndex};
pub use validate::{validate_design, ValidationIssue};
