// SPDX-FileCopyrightText: 2026 edgram contributors
// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{DesignModel, FactorCategory};
use crate::query::StructureIndex;
use crate::render::text::label_width;

const LEFT_MARGIN: usize = 2;
const TOP_START: usize = 2;
const BRANCH_PITCH: usize = 15;
const CONFOUND_GAP: usize = 8;
const BOTTOM_MARGIN: usize = 8;
const EMPTY_HEIGHT: usize = 10;

/// Grid cell assigned to one factor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub col: usize,
    pub row: usize,
    /// Label width in chars, cached for connector positioning.
    pub width: usize,
    /// True when the factor sits on a side-by-side branch under `parent`.
    pub branched: bool,
    pub parent: Option<String>,
}

/// All placements of one layout pass, in placement order, plus the canvas
/// height that fits them and the bottom annotation block.
#[derive(Debug, Clone)]
pub struct DesignLayout {
    order: Vec<String>,
    placements: BTreeMap<String, Placement>,
    height: usize,
}

impl DesignLayout {
    pub fn placement(&self, name: &str) -> Option<&Placement> {
        self.placements.get(name)
    }

    /// Placed factor names in the order they were assigned rows.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn max_row(&self) -> usize {
        self.placements.values().map(|p| p.row).max().unwrap_or(0)
    }

    fn place(&mut self, name: &str, placement: Placement) {
        if self.placements.insert(name.to_owned(), placement).is_none() {
            self.order.push(name.to_owned());
        }
    }
}

/// Runs the fixed top-to-bottom placement pass: batch banner, confound
/// groups, nesting subtrees, orphans.
///
/// Crossing-only factors never receive a cell; they are drawn inline on
/// their partner's row. The placed set doubles as the cycle guard, so a
/// cyclic nesting adjacency terminates with each factor placed once.
pub fn layout_design(model: &DesignModel, index: &StructureIndex) -> DesignLayout {
    let mut layout = DesignLayout {
        order: Vec::new(),
        placements: BTreeMap::new(),
        height: EMPTY_HEIGHT,
    };
    let mut row = TOP_START;

    row = place_batch_banner(model, index, &mut layout, row);
    row = place_confound_groups(model, index, &mut layout, row);

    for root in index.nesting_roots(model) {
        if layout.placement(root).is_none() && !index.is_crossing_only(root) {
            row = place_subtree(model, index, &mut layout, root, LEFT_MARGIN, row);
        }
    }

    place_orphans(model, index, &mut layout, row);

    if !layout.placements.is_empty() {
        layout.height = layout.max_row() + BOTTOM_MARGIN;
    }
    layout
}

fn place_batch_banner(
    model: &DesignModel,
    index: &StructureIndex,
    layout: &mut DesignLayout,
    mut row: usize,
) -> usize {
    let mut any = false;
    for factor in model.factors() {
        if factor.category() != FactorCategory::Batch {
            continue;
        }
        any = true;
        layout.place(
            factor.name(),
            Placement {
                col: LEFT_MARGIN,
                row,
                width: label_width(factor),
                branched: false,
                parent: None,
            },
        );
        row += 1;
        // flow lines start beneath the batch factor's own row
        if index
            .batch_effects()
            .iter()
            .any(|(source, _)| source == factor.name())
        {
            row += 1;
        }
    }
    if any {
        row += 1;
    }
    row
}

fn place_confound_groups(
    model: &DesignModel,
    index: &StructureIndex,
    layout: &mut DesignLayout,
    mut row: usize,
) -> usize {
    for group in index.confound_groups() {
        if group.len() < 2 {
            continue;
        }

        let mut col = LEFT_MARGIN;
        let mut placed_any = false;
        for name in group {
            if layout.placement(name).is_some() {
                continue;
            }
            let Some(factor) = model.factor(name) else {
                continue;
            };
            let width = label_width(factor);
            layout.place(
                name,
                Placement {
                    col,
                    row,
                    width,
                    branched: false,
                    parent: None,
                },
            );
            col += width + CONFOUND_GAP;
            placed_any = true;
        }
        if !placed_any {
            continue;
        }
        row += 2;

        for child in common_children(index, group) {
            if layout.placement(&child).is_none() {
                row = place_subtree(model, index, layout, &child, LEFT_MARGIN, row);
                row += 1;
            }
        }
    }
    row
}

/// Nesting children shared by every member of a confound group, in the
/// first member's child order.
fn common_children(index: &StructureIndex, group: &BTreeSet<String>) -> Vec<String> {
    let Some(first) = group.iter().next() else {
        return Vec::new();
    };
    index
        .nesting_children(first)
        .iter()
        .filter(|child| {
            group
                .iter()
                .skip(1)
                .all(|member| index.nesting_children(member).contains(child))
        })
        .cloned()
        .collect()
}

fn place_subtree(
    model: &DesignModel,
    index: &StructureIndex,
    layout: &mut DesignLayout,
    name: &str,
    col: usize,
    row: usize,
) -> usize {
    if layout.placement(name).is_some() || index.is_crossing_only(name) {
        return row;
    }
    let Some(factor) = model.factor(name) else {
        return row;
    };

    layout.place(
        name,
        Placement {
            col,
            row,
            width: label_width(factor),
            branched: false,
            parent: None,
        },
    );
    let mut current = row + 1;

    // inline crossing partners past the first spill onto their own rows
    current += index.crossing_partners(name).len().saturating_sub(1);
    // nesting arrow / classify symbol row
    current += 1;

    if let Some(classifier) = index.classifier_of(name) {
        if layout.placement(classifier).is_none() {
            if let Some(class_factor) = model.factor(classifier) {
                layout.place(
                    classifier,
                    Placement {
                        col,
                        row: current,
                        width: label_width(class_factor),
                        branched: false,
                        parent: None,
                    },
                );
                current += 1;
            }
        }
        // classification is terminal, nothing expands beneath it
        return current + 1;
    }

    let children = index.nesting_children(name).to_vec();
    if children.len() > 1 {
        let mut child_col = col;
        let mut max_row = current;
        for child in &children {
            let end = place_subtree(model, index, layout, child, child_col, current);
            max_row = max_row.max(end);
            if let Some(placement) = layout.placements.get_mut(child) {
                placement.branched = true;
                placement.parent = Some(name.to_owned());
            }
            child_col += BRANCH_PITCH;
        }
        current = max_row;
    } else if let Some(child) = children.first() {
        current = place_subtree(model, index, layout, child, col, current);
    }

    current
}

fn place_orphans(
    model: &DesignModel,
    index: &StructureIndex,
    layout: &mut DesignLayout,
    mut row: usize,
) {
    for factor in model.factors() {
        if factor.category() == FactorCategory::Batch
            || layout.placement(factor.name()).is_some()
            || index.is_crossing_only(factor.name())
        {
            continue;
        }
        layout.place(
            factor.name(),
            Placement {
                col: LEFT_MARGIN,
                row,
                width: label_width(factor),
                branched: false,
                parent: None,
            },
        );
        row += 2;
    }
}
