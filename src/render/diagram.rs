// SPDX-FileCopyrightText: 2026 edgram contributors
// SPDX-License-Identifier: MIT

use std::collections::BTreeSet;

use crate::layout::{layout_design, DesignLayout, Placement};
use crate::model::{DesignModel, FactorCategory};
use crate::query::{CrossingKind, StructureIndex};
use crate::render::text::factor_label;
use crate::render::{
    Canvas, Corner, Layer, LineStyle, CLASSIFY_SYMBOL, CONFOUND_SYMBOL, CROSS_SYMBOL, NEST_ARROW,
    PARTIAL_CROSS_SYMBOL,
};

// batch flow lines turn down this many columns before the right border
const FLOW_MARGIN: usize = 5;

/// Renders a design as a boxed Unicode diagram of `width` columns.
///
/// The output is a pure function of `(model, width)`. A model without
/// factors renders as the degenerate `"Empty design"` string. Semantically
/// questionable models (cycles, dangling endpoints) still render; quality
/// reporting lives in [`crate::query::validate_design`].
pub fn render_design(model: &DesignModel, width: usize) -> String {
    if model.factors().is_empty() {
        return "Empty design".to_owned();
    }

    let index = StructureIndex::build(model);
    let layout = layout_design(model, &index);
    let mut canvas = Canvas::new(width, layout.height());

    canvas.draw_box(0, 0, width, layout.height(), LineStyle::Single, Some("Design Structure"));
    draw_batch_flows(&mut canvas, &index, &layout);
    draw_hierarchy(&mut canvas, model, &index, &layout);
    draw_crossings(&mut canvas, model, &index, &layout);
    draw_confounds(&mut canvas, &index, &layout);
    draw_annotations(&mut canvas, &index, &layout);

    canvas.to_text()
}

/// Double-line strokes from each batch factor out to the flow column and
/// back in to each affected factor. Corners go last at annotation priority
/// so they overwrite the straight segments at every turn.
fn draw_batch_flows(canvas: &mut Canvas, index: &StructureIndex, layout: &DesignLayout) {
    if canvas.width() <= FLOW_MARGIN {
        return;
    }
    let flow_x = canvas.width() - FLOW_MARGIN;
    let mut corners: Vec<(usize, usize, Corner)> = Vec::new();
    let mut connected: BTreeSet<&str> = BTreeSet::new();

    for (batch_name, affected) in index.batch_effects() {
        let Some(batch) = layout.placement(batch_name) else {
            continue;
        };

        canvas.draw_hline(batch.col + batch.width, flow_x - 1, batch.row, LineStyle::Double, Layer::Lines);
        corners.push((flow_x, batch.row, Corner::TopRight));

        for name in affected {
            if !connected.insert(name) {
                continue;
            }
            let Some(target) = layout.placement(name) else {
                continue;
            };

            canvas.draw_vline(flow_x, batch.row + 1, target.row.saturating_sub(1), LineStyle::Double, Layer::Lines);
            canvas.draw_hline(target.col + target.width + 1, flow_x - 1, target.row, LineStyle::Double, Layer::Lines);
            corners.push((flow_x, target.row, Corner::BottomRight));
        }
    }

    for (x, y, corner) in corners {
        canvas.draw_corner(x, y, corner, LineStyle::Double, Layer::Annotation);
    }
}

/// Factor labels plus the nesting arrows and classify symbols beneath them,
/// in placement order.
fn draw_hierarchy(
    canvas: &mut Canvas,
    model: &DesignModel,
    index: &StructureIndex,
    layout: &DesignLayout,
) {
    for name in layout.order() {
        let Some(placement) = layout.placement(name) else {
            continue;
        };
        let Some(factor) = model.factor(name) else {
            continue;
        };
        canvas.write_str(placement.col, placement.row, &factor_label(factor), Layer::Text);

        if factor.category() == FactorCategory::Batch {
            continue;
        }

        if index.classifier_of(name).is_some() {
            canvas.put(placement.col + 3, placement.row + 1, CLASSIFY_SYMBOL, Layer::Text);
            continue;
        }

        let children = index.nesting_children(name);
        let placed: Vec<&Placement> =
            children.iter().filter_map(|child| layout.placement(child)).collect();
        if placed.len() > 1 {
            for child in placed {
                canvas.put(child.col + 1, placement.row + 1, NEST_ARROW, Layer::Text);
            }
        } else if placed.len() == 1 {
            canvas.put(placement.col + 3, placement.row + 1, NEST_ARROW, Layer::Text);
        }
    }
}

/// Inline crossing connectors to the right of each placed factor's label.
///
/// A partner without its own cell is always drawn from the placed side; a
/// placed pair is drawn once, from the earlier-declared side. The first
/// partner shares the factor's row, later partners stack beneath it.
fn draw_crossings(
    canvas: &mut Canvas,
    model: &DesignModel,
    index: &StructureIndex,
    layout: &DesignLayout,
) {
    for name in layout.order() {
        let Some(placement) = layout.placement(name) else {
            continue;
        };
        let Some(position) = model.factor_index(name) else {
            continue;
        };

        let partners: Vec<(&str, CrossingKind)> = index
            .crossing_partners(name)
            .iter()
            .filter(|(partner, _)| {
                if index.is_crossing_only(partner) {
                    return true;
                }
                layout.placement(partner).is_some()
                    && model.factor_index(partner).is_some_and(|other| position < other)
            })
            .map(|(partner, kind)| (partner.as_str(), *kind))
            .collect();

        let cross_x = placement.col + placement.width + 1;
        for (i, (partner, kind)) in partners.iter().enumerate() {
            let Some(factor) = model.factor(partner) else {
                continue;
            };
            let symbol = match kind {
                CrossingKind::Full => CROSS_SYMBOL,
                CrossingKind::Partial => PARTIAL_CROSS_SYMBOL,
            };
            let label = factor_label(factor);

            if i == 0 {
                canvas.write_str(cross_x, placement.row, " ────", Layer::Lines);
                canvas.put(cross_x + 5, placement.row, symbol, Layer::Text);
                canvas.write_str(cross_x + 6, placement.row, "──── ", Layer::Lines);
                canvas.write_str(cross_x + 11, placement.row, &label, Layer::Text);
            } else {
                let row = placement.row + i;
                canvas.put(cross_x + 5, row, symbol, Layer::Text);
                canvas.write_str(cross_x + 11, row, &label, Layer::Text);
            }
        }
    }
}

/// Confound bridges between consecutive same-row group members; members that
/// ended up on different rows fall back to a vertical symbol run.
fn draw_confounds(canvas: &mut Canvas, index: &StructureIndex, layout: &DesignLayout) {
    let bridge: String = format!(" {} ", CONFOUND_SYMBOL.to_string().repeat(4));

    for group in index.confound_groups() {
        let placed: Vec<(&str, &Placement)> = group
            .iter()
            .filter_map(|name| layout.placement(name).map(|p| (name.as_str(), p)))
            .collect();

        for pair in placed.windows(2) {
            let (_, left) = pair[0];
            let (_, right) = pair[1];
            if left.row == right.row {
                canvas.write_str(left.col + left.width + 1, left.row, &bridge, Layer::Text);
            } else {
                let mid = (left.col + right.col) / 2;
                let (top, bottom) = if left.row <= right.row {
                    (left.row, right.row)
                } else {
                    (right.row, left.row)
                };
                for row in (top + 1)..bottom {
                    canvas.put(mid, row, CONFOUND_SYMBOL, Layer::Text);
                }
            }
        }
    }
}

/// Bottom annotation block: one line per confound group, then one per batch
/// factor, separated by a blank line when both are present.
fn draw_annotations(canvas: &mut Canvas, index: &StructureIndex, layout: &DesignLayout) {
    if layout.order().is_empty() {
        return;
    }
    let mut row = layout.max_row() + 2;

    for group in index.confound_groups() {
        let members: Vec<&str> = group.iter().map(String::as_str).collect();
        let line = format!("  Confounded: {}", members.join(" ≈≈ "));
        canvas.write_str(2, row, &line, Layer::Text);
        row += 1;
    }

    if !index.batch_effects().is_empty() {
        if !index.confound_groups().is_empty() {
            row += 1;
        }
        for (batch_name, affected) in index.batch_effects() {
            let line = format!("  Batch: {} ══ {}", batch_name, affected.join(", "));
            canvas.write_str(2, row, &line, Layer::Text);
            row += 1;
        }
    }
}
