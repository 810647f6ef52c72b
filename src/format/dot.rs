// SPDX-FileCopyrightText: 2026 edgram contributors
// SPDX-License-Identifier: MIT

use crate::model::{DesignModel, FactorCategory, RelationKind};

fn fill_color(category: FactorCategory) -> &'static str {
    match category {
        FactorCategory::Factor => "#E8F4F8",
        FactorCategory::Observation => "#FFF4E6",
        FactorCategory::Classification => "#F0E6FF",
        FactorCategory::Batch => "#FFE6E6",
    }
}

fn edge_symbol(kind: RelationKind) -> &'static str {
    match kind {
        RelationKind::Nests => "↓",
        RelationKind::Crosses => "×",
        RelationKind::PartialCrosses => "◊",
        RelationKind::Classifies => ":",
        RelationKind::BatchEffect => "══",
        RelationKind::Confounded => "≈≈",
    }
}

fn edge_attrs(kind: RelationKind) -> &'static str {
    match kind {
        RelationKind::Nests => "",
        RelationKind::Crosses | RelationKind::PartialCrosses => ", style=dashed, dir=none",
        RelationKind::Classifies => ", style=dotted",
        RelationKind::BatchEffect => ", color=red, style=bold",
        RelationKind::Confounded => ", color=orange, style=dashed, dir=none",
    }
}

/// Non-alphanumeric characters become underscores so every node name is a
/// bare DOT identifier.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|ch| if ch.is_alphanumeric() { ch } else { '_' })
        .collect()
}

/// Exports a design as a Graphviz digraph with per-kind edge styling and
/// dashed clusters around confound groups.
pub fn to_dot(model: &DesignModel) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push("digraph ExperimentalDesign {".to_owned());
    lines.push("  rankdir=TB;".to_owned());
    lines.push("  node [shape=box, style=\"rounded,filled\"];".to_owned());
    lines.push(String::new());

    lines.push("  // Factors".to_owned());
    for factor in model.factors() {
        lines.push(format!(
            "  {} [label=\"{}({})\", fillcolor=\"{}\"];",
            sanitize(factor.name()),
            factor.name(),
            factor.levels(),
            fill_color(factor.category())
        ));
    }
    lines.push(String::new());

    lines.push("  // Relationships".to_owned());
    for rel in model.relationships() {
        lines.push(format!(
            "  {} -> {} [label=\"{}\"{}];",
            sanitize(rel.source()),
            sanitize(rel.target()),
            edge_symbol(rel.kind()),
            edge_attrs(rel.kind())
        ));
    }

    if !model.confound_groups().is_empty() {
        lines.push(String::new());
        lines.push("  // Confound groups".to_owned());
        for (i, group) in model.confound_groups().iter().enumerate() {
            lines.push(format!("  subgraph cluster_{i} {{"));
            lines.push("    style=dashed;".to_owned());
            lines.push("    color=orange;".to_owned());
            lines.push("    label=\"Confounded\";".to_owned());
            for name in group {
                lines.push(format!("    {};", sanitize(name)));
            }
            lines.push("  }".to_owned());
        }
    }

    lines.push("}".to_owned());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::to_dot;
    use crate::grammar::parse_design;

    #[test]
    fn digraph_contains_every_factor_and_relationship() {
        let model = parse_design("Site(3) > Patient(20) × Treatment(2)").expect("parse");
        let dot = to_dot(&model);
        assert!(dot.starts_with("digraph ExperimentalDesign {"));
        assert!(dot.contains("Site [label=\"Site(3)\", fillcolor=\"#E8F4F8\"];"));
        assert!(dot.contains("Patient [label=\"Patient(20)\""));
        assert!(dot.contains("Site -> Patient [label=\"↓\"];"));
        assert!(dot.contains("Patient -> Treatment [label=\"×\", style=dashed, dir=none];"));
        assert!(dot.ends_with('}'));
    }

    #[test]
    fn batch_edges_are_bold_red() {
        let model = parse_design("Run(4) == Sample(10)").expect("parse");
        let dot = to_dot(&model);
        assert!(dot.contains("Run -> Sample [label=\"══\", color=red, style=bold];"));
        assert!(dot.contains("fillcolor=\"#FFE6E6\""));
    }

    #[test]
    fn confound_groups_become_dashed_clusters() {
        let model = parse_design("{Lane(2) ≈≈ Day(2)}").expect("parse");
        let dot = to_dot(&model);
        assert!(dot.contains("subgraph cluster_0 {"));
        assert!(dot.contains("label=\"Confounded\";"));
        assert!(dot.contains("    Lane;"));
        assert!(dot.contains("    Day;"));
    }

    #[test]
    fn unbalanced_labels_are_not_shortened() {
        let model = parse_design("Group[30|25|18]").expect("parse");
        let dot = to_dot(&model);
        assert!(dot.contains("label=\"Group([30 | 25 | 18])\""));
    }
}
