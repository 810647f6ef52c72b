// SPDX-FileCopyrightText: 2026 edgram contributors
// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::model::{DesignModel, Factor, RelationKind};

/// Total observation count for a design. Any approximate level count makes
/// the whole total approximate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservationCount {
    Exact(u64),
    Approximate(u64),
}

impl ObservationCount {
    pub fn value(self) -> u64 {
        match self {
            Self::Exact(n) | Self::Approximate(n) => n,
        }
    }

    pub fn is_approximate(self) -> bool {
        matches!(self, Self::Approximate(_))
    }
}

impl fmt::Display for ObservationCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "{n}"),
            Self::Approximate(n) => write!(f, "~{n}"),
        }
    }
}

/// Multiplies each nesting root's subtree product into a grand total.
///
/// A root's subtree product is its own effective size times the product of
/// its nested children's subtree products. Roots are the nesting sources
/// that are never nesting targets; if there are none, factors with no
/// incoming relationship at all stand in, and failing that the first
/// declared factor alone. Cyclic nesting is cut by the visited set, and all
/// multiplication saturates.
pub fn count_observations(model: &DesignModel) -> ObservationCount {
    if model.factors().is_empty() {
        return ObservationCount::Exact(0);
    }

    let mut children: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    let mut sources = BTreeSet::new();
    let mut targets = BTreeSet::new();
    let mut incoming = BTreeSet::new();
    for rel in model.relationships() {
        incoming.insert(rel.target());
        if rel.kind() == RelationKind::Nests {
            children.entry(rel.source()).or_default().push(rel.target());
            sources.insert(rel.source());
            targets.insert(rel.target());
        }
    }

    let mut roots: Vec<&str> = model
        .factors()
        .iter()
        .map(Factor::name)
        .filter(|name| sources.contains(name) && !targets.contains(name))
        .collect();
    if roots.is_empty() {
        roots = model
            .factors()
            .iter()
            .map(Factor::name)
            .filter(|name| !incoming.contains(name))
            .collect();
    }
    if roots.is_empty() {
        roots = vec![model.factors()[0].name()];
    }

    let mut total: u64 = 1;
    let mut approximate = false;
    let mut visited = BTreeSet::new();
    for root in roots {
        total = total.saturating_mul(subtree_count(
            model,
            &children,
            root,
            &mut visited,
            &mut approximate,
        ));
    }

    if approximate {
        ObservationCount::Approximate(total)
    } else {
        ObservationCount::Exact(total)
    }
}

fn subtree_count(
    model: &DesignModel,
    children: &BTreeMap<&str, Vec<&str>>,
    name: &str,
    visited: &mut BTreeSet<String>,
    approximate: &mut bool,
) -> u64 {
    if !visited.insert(name.to_owned()) {
        return 1;
    }
    let Some(factor) = model.factor(name) else {
        return 1;
    };

    if factor.levels().is_approximate() {
        *approximate = true;
    }

    let mut product = factor.levels().effective();
    if let Some(nested) = children.get(name) {
        for child in nested {
            product =
                product.saturating_mul(subtree_count(model, children, child, visited, approximate));
        }
    }
    product
}

/// Human-readable summary of a design: factors, relationships grouped by
/// kind, and the observation total.
pub fn describe(model: &DesignModel) -> String {
    let mut lines = Vec::new();
    lines.push("Experimental Design Description".to_owned());
    lines.push("=".repeat(40));
    lines.push(String::new());

    lines.push(format!("Factors ({}):", model.factors().len()));
    for factor in model.factors() {
        lines.push(format!(
            "  - {} ({}): {}",
            factor.name(),
            factor.levels(),
            factor.category()
        ));
    }
    lines.push(String::new());

    lines.push(format!("Relationships ({}):", model.relationships().len()));
    let mut seen_kinds = Vec::new();
    for rel in model.relationships() {
        if !seen_kinds.contains(&rel.kind()) {
            seen_kinds.push(rel.kind());
        }
    }
    for kind in seen_kinds {
        lines.push(format!("  {kind}:"));
        for rel in model.relationships().iter().filter(|rel| rel.kind() == kind) {
            lines.push(format!("    - {} → {}", rel.source(), rel.target()));
        }
    }
    lines.push(String::new());

    lines.push(format!("Total observations: {}", count_observations(model)));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::{count_observations, describe, ObservationCount};
    use crate::grammar::parse_design;
    use crate::model::{DesignModel, RelationKind, Relationship};

    #[test]
    fn nested_chain_multiplies_down_the_hierarchy() {
        let model = parse_design("Site(3) > Patient(20) > Sample(2)").expect("parse");
        assert_eq!(count_observations(&model), ObservationCount::Exact(120));
    }

    #[test]
    fn unbalanced_counts_sum_before_multiplying() {
        let model = parse_design("Group[30|25|18] > Measurement(2)").expect("parse");
        assert_eq!(count_observations(&model), ObservationCount::Exact(146));
    }

    #[test]
    fn approximate_level_marks_the_total() {
        let model = parse_design("Patient(20) > Cell(~5000)").expect("parse");
        assert_eq!(count_observations(&model), ObservationCount::Approximate(100_000));
        assert_eq!(count_observations(&model).to_string(), "~100000");
    }

    #[test]
    fn no_nesting_falls_back_to_factors_without_incoming_edges() {
        let model = parse_design("A(4) × B(5)").expect("parse");
        // the crossing edge targets B, leaving A as the only fallback root
        assert_eq!(count_observations(&model), ObservationCount::Exact(4));
    }

    #[test]
    fn empty_model_counts_zero() {
        assert_eq!(count_observations(&DesignModel::new()), ObservationCount::Exact(0));
    }

    #[test]
    fn cyclic_nesting_terminates() {
        let mut model = parse_design("A(2) > B(3)").expect("parse");
        model.push_relationship(Relationship::new("B", "A", RelationKind::Nests));
        // the cycle collapses both factors into one subtree rooted anywhere
        let count = count_observations(&model);
        assert!(!count.is_approximate());
    }

    #[test]
    fn describe_lists_factors_relationships_and_total() {
        let model = parse_design("Site(3) > Patient(20)").expect("parse");
        let text = describe(&model);
        assert!(text.contains("Factors (2):"));
        assert!(text.contains("  - Site (3): factor"));
        assert!(text.contains("  nests:"));
        assert!(text.contains("    - Site → Patient"));
        assert!(text.contains("Total observations: 60"));
    }
}
