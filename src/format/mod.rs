// SPDX-FileCopyrightText: 2026 edgram contributors
// SPDX-License-Identifier: MIT

//! Interchange formats: JSON (round-tripping), Graphviz DOT, and GraphML.
//!
//! Serde stays confined to this module; the core model knows nothing about
//! serialization.

mod dot;
mod graphml;
mod json;

pub use dot::to_dot;
pub use graphml::to_graphml;
pub use json::{from_json, to_json, FormatError};
