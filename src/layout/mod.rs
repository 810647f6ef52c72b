// SPDX-FileCopyrightText: 2026 edgram contributors
// SPDX-License-Identifier: MIT

//! Grid placement for design diagrams.
//!
//! The layout engine assigns every drawable factor a (column, row) cell and
//! computes the canvas height. It is a pure function of the model and its
//! [`StructureIndex`]; drawing happens later, in [`crate::render`].
//!
//! [`StructureIndex`]: crate::query::StructureIndex

mod hierarchy;

pub use hierarchy::{layout_design, DesignLayout, Placement};
