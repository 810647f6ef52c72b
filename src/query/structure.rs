// SPDX-FileCopyrightText: 2026 edgram contributors
// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{DesignModel, FactorCategory, RelationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossingKind {
    Full,
    Partial,
}

/// Derived adjacency views over a model, computed once per layout/render pass.
///
/// The index never rejects a malformed model. Edges whose endpoints are
/// unknown are dropped, and a cyclic nesting adjacency is kept as-is; the
/// traversals downstream carry their own visited sets.
#[derive(Debug, Clone)]
pub struct StructureIndex {
    nesting_children: BTreeMap<String, Vec<String>>,
    nesting_targets: BTreeSet<String>,
    crossings: BTreeMap<String, Vec<(String, CrossingKind)>>,
    classifiers: BTreeMap<String, String>,
    batch_effects: Vec<(String, Vec<String>)>,
    confound_groups: Vec<BTreeSet<String>>,
    crossing_only: BTreeSet<String>,
}

impl StructureIndex {
    pub fn build(model: &DesignModel) -> Self {
        let mut nesting_children: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut nesting_targets = BTreeSet::new();
        let mut crossings: BTreeMap<String, Vec<(String, CrossingKind)>> = BTreeMap::new();
        let mut classifiers: BTreeMap<String, String> = BTreeMap::new();
        let mut batch_effects: Vec<(String, Vec<String>)> = Vec::new();

        for rel in model.relationships() {
            if !model.has_factor(rel.source()) || !model.has_factor(rel.target()) {
                continue;
            }
            match rel.kind() {
                RelationKind::Nests => {
                    let children = nesting_children.entry(rel.source().to_owned()).or_default();
                    if !children.iter().any(|child| child == rel.target()) {
                        children.push(rel.target().to_owned());
                    }
                    nesting_targets.insert(rel.target().to_owned());
                }
                RelationKind::Crosses | RelationKind::PartialCrosses => {
                    let kind = if rel.kind() == RelationKind::Crosses {
                        CrossingKind::Full
                    } else {
                        CrossingKind::Partial
                    };
                    record_crossing(&mut crossings, rel.source(), rel.target(), kind);
                    record_crossing(&mut crossings, rel.target(), rel.source(), kind);
                }
                RelationKind::Classifies => {
                    classifiers
                        .entry(rel.source().to_owned())
                        .or_insert_with(|| rel.target().to_owned());
                }
                RelationKind::BatchEffect => {
                    let slot = match batch_effects
                        .iter()
                        .position(|(source, _)| source == rel.source())
                    {
                        Some(slot) => slot,
                        None => {
                            batch_effects.push((rel.source().to_owned(), Vec::new()));
                            batch_effects.len() - 1
                        }
                    };
                    let affected = &mut batch_effects[slot].1;
                    if !affected.iter().any(|name| name == rel.target()) {
                        affected.push(rel.target().to_owned());
                    }
                }
                RelationKind::Confounded => {}
            }
        }

        let confound_groups = model.confound_groups().to_vec();
        let mut index = Self {
            nesting_children,
            nesting_targets,
            crossings,
            classifiers,
            batch_effects,
            confound_groups,
            crossing_only: BTreeSet::new(),
        };
        index.crossing_only = index.compute_crossing_only(model);
        index
    }

    /// Factors that exist in the diagram only as inline crossing extensions
    /// of a partner's row. A factor qualifies when it has crossing partners,
    /// no nesting edges in either direction, no special category or confound
    /// membership, and at least one partner that either anchors a nesting
    /// subtree or was declared before it.
    fn compute_crossing_only(&self, model: &DesignModel) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for (position, factor) in model.factors().iter().enumerate() {
            let name = factor.name();
            let Some(partners) = self.crossings.get(name) else {
                continue;
            };
            if self.has_nesting_edges(name)
                || factor.category() != FactorCategory::Factor
                || self.classifiers.contains_key(name)
                || self.is_confound_member(name)
                || self.is_batch_endpoint(name)
            {
                continue;
            }
            let anchored = partners.iter().any(|(partner, _)| {
                self.has_nesting_edges(partner)
                    || model.factor_index(partner).is_some_and(|i| i < position)
            });
            if anchored {
                out.insert(name.to_owned());
            }
        }
        out
    }

    fn has_nesting_edges(&self, name: &str) -> bool {
        self.nesting_children.contains_key(name) || self.nesting_targets.contains(name)
    }

    fn is_batch_endpoint(&self, name: &str) -> bool {
        self.batch_effects
            .iter()
            .any(|(source, affected)| source == name || affected.iter().any(|a| a == name))
    }

    pub fn nesting_children(&self, name: &str) -> &[String] {
        self.nesting_children.get(name).map_or(&[], Vec::as_slice)
    }

    /// Non-batch factors with no incoming nesting edge, in declaration order.
    pub fn nesting_roots<'a>(&'a self, model: &'a DesignModel) -> Vec<&'a str> {
        model
            .factors()
            .iter()
            .filter(|factor| factor.category() != FactorCategory::Batch)
            .map(|factor| factor.name())
            .filter(|name| !self.nesting_targets.contains(*name))
            .collect()
    }

    pub fn crossing_partners(&self, name: &str) -> &[(String, CrossingKind)] {
        self.crossings.get(name).map_or(&[], Vec::as_slice)
    }

    pub fn classifier_of(&self, name: &str) -> Option<&str> {
        self.classifiers.get(name).map(String::as_str)
    }

    pub fn batch_effects(&self) -> &[(String, Vec<String>)] {
        &self.batch_effects
    }

    pub fn confound_groups(&self) -> &[BTreeSet<String>] {
        &self.confound_groups
    }

    pub fn is_confound_member(&self, name: &str) -> bool {
        self.confound_groups.iter().any(|group| group.contains(name))
    }

    pub fn is_crossing_only(&self, name: &str) -> bool {
        self.crossing_only.contains(name)
    }
}

fn record_crossing(
    crossings: &mut BTreeMap<String, Vec<(String, CrossingKind)>>,
    from: &str,
    to: &str,
    kind: CrossingKind,
) {
    let partners = crossings.entry(from.to_owned()).or_default();
    match partners.iter_mut().find(|(partner, _)| partner == to) {
        Some(entry) => entry.1 = kind,
        None => partners.push((to.to_owned(), kind)),
    }
}

#[cfg(test)]
mod tests {
    use super::{CrossingKind, StructureIndex};
    use crate::grammar::parse_design;
    use crate::model::{DesignModel, LevelCount, RelationKind, Relationship};

    #[test]
    fn nesting_children_keep_encounter_order_and_dedup() {
        let mut model = parse_design("Site(3) > (Patient(20) × Visit(4))").expect("parse");
        model.push_relationship(Relationship::new("Site", "Patient", RelationKind::Nests));
        let index = StructureIndex::build(&model);
        assert_eq!(index.nesting_children("Site"), ["Patient", "Visit"]);
    }

    #[test]
    fn crossing_adjacency_is_undirected() {
        let model = parse_design("A(2) × B(3)").expect("parse");
        let index = StructureIndex::build(&model);
        assert_eq!(index.crossing_partners("A"), [("B".to_owned(), CrossingKind::Full)]);
        assert_eq!(index.crossing_partners("B"), [("A".to_owned(), CrossingKind::Full)]);
    }

    #[test]
    fn restated_crossing_updates_kind_in_place() {
        let mut model = DesignModel::new();
        model.add_factor("A", LevelCount::Fixed(2)).expect("factor");
        model.add_factor("B", LevelCount::Fixed(3)).expect("factor");
        model.add_crossing("A", "B", false).expect("crossing");
        model.add_crossing("A", "B", true).expect("crossing");
        let index = StructureIndex::build(&model);
        assert_eq!(index.crossing_partners("A"), [("B".to_owned(), CrossingKind::Partial)]);
    }

    #[test]
    fn nesting_roots_skip_batch_factors_and_nested_targets() {
        let model = parse_design("Run(4) == Site(3) > Patient(20)").expect("parse");
        let index = StructureIndex::build(&model);
        assert_eq!(index.nesting_roots(&model), ["Site"]);
    }

    #[test]
    fn batch_effects_dedup_affected_factors() {
        let mut model = DesignModel::new();
        model.add_factor("Run", LevelCount::Fixed(4)).expect("factor");
        model.add_factor("Sample", LevelCount::Fixed(10)).expect("factor");
        model.add_batch_effect("Run", &["Sample"]).expect("batch");
        model.add_batch_effect("Run", &["Sample"]).expect("batch");
        let index = StructureIndex::build(&model);
        assert_eq!(index.batch_effects(), [("Run".to_owned(), vec!["Sample".to_owned()])]);
    }

    #[test]
    fn crossing_target_with_anchored_partner_is_inline_only() {
        let model = parse_design("Site(3) > Patient(20) × Treatment(2)").expect("parse");
        let index = StructureIndex::build(&model);
        assert!(index.is_crossing_only("Treatment"));
        assert!(!index.is_crossing_only("Patient"));
    }

    #[test]
    fn mutual_crossing_without_anchors_keeps_only_the_later_factor_inline() {
        let model = parse_design("A(2) × B(3)").expect("parse");
        let index = StructureIndex::build(&model);
        assert!(!index.is_crossing_only("A"));
        assert!(index.is_crossing_only("B"));
    }

    #[test]
    fn confound_members_are_never_crossing_only() {
        let model = parse_design("{Lane(2) ≈≈ Day(2)} × Operator(3)").expect("parse");
        let index = StructureIndex::build(&model);
        assert!(!index.is_crossing_only("Lane"));
        assert!(!index.is_crossing_only("Day"));
        assert!(index.is_crossing_only("Operator"));
    }

    #[test]
    fn dangling_relationship_endpoints_are_dropped() {
        let mut model = DesignModel::new();
        model.add_factor("A", LevelCount::Fixed(2)).expect("factor");
        model.push_relationship(Relationship::new("A", "Ghost", RelationKind::Nests));
        let index = StructureIndex::build(&model);
        assert!(index.nesting_children("A").is_empty());
    }
}
