// SPDX-FileCopyrightText: 2026 edgram contributors
// SPDX-License-Identifier: MIT

//! Diagram rendering.
//!
//! The canvas is a fixed-size character grid where every cell remembers the
//! priority layer that wrote it. A write lands only when its layer is at
//! least the cell's current layer; everything else is dropped without an
//! error, as are out-of-bounds writes. Every drawing primitive funnels
//! through [`Canvas::put`] so the rule cannot diverge between text, lines,
//! and boxes.

mod diagram;
pub(crate) mod text;

pub use diagram::render_design;

pub const BOX_HORIZONTAL: char = '─';
pub const BOX_VERTICAL: char = '│';
pub const BOX_TOP_LEFT: char = '┌';
pub const BOX_TOP_RIGHT: char = '┐';
pub const BOX_BOTTOM_LEFT: char = '└';
pub const BOX_BOTTOM_RIGHT: char = '┘';
pub const DOUBLE_HORIZONTAL: char = '═';
pub const DOUBLE_VERTICAL: char = '║';
pub const DOUBLE_TOP_LEFT: char = '╔';
pub const DOUBLE_TOP_RIGHT: char = '╗';
pub const DOUBLE_BOTTOM_LEFT: char = '╚';
pub const DOUBLE_BOTTOM_RIGHT: char = '╝';

pub const NEST_ARROW: char = '↓';
pub const CROSS_SYMBOL: char = '×';
pub const PARTIAL_CROSS_SYMBOL: char = '◊';
pub const CLASSIFY_SYMBOL: char = ':';
pub const CONFOUND_SYMBOL: char = '≈';

/// Write priority, lowest first. Equal priority overwrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Background,
    Lines,
    Text,
    Annotation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Single,
    Double,
}

impl LineStyle {
    fn horizontal(self) -> char {
        match self {
            Self::Single => BOX_HORIZONTAL,
            Self::Double => DOUBLE_HORIZONTAL,
        }
    }

    fn vertical(self) -> char {
        match self {
            Self::Single => BOX_VERTICAL,
            Self::Double => DOUBLE_VERTICAL,
        }
    }

    fn corner(self, corner: Corner) -> char {
        match (self, corner) {
            (Self::Single, Corner::TopLeft) => BOX_TOP_LEFT,
            (Self::Single, Corner::TopRight) => BOX_TOP_RIGHT,
            (Self::Single, Corner::BottomLeft) => BOX_BOTTOM_LEFT,
            (Self::Single, Corner::BottomRight) => BOX_BOTTOM_RIGHT,
            (Self::Double, Corner::TopLeft) => DOUBLE_TOP_LEFT,
            (Self::Double, Corner::TopRight) => DOUBLE_TOP_RIGHT,
            (Self::Double, Corner::BottomLeft) => DOUBLE_BOTTOM_LEFT,
            (Self::Double, Corner::BottomRight) => DOUBLE_BOTTOM_RIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// A fixed-size character grid with layered writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: usize,
    height: usize,
    cells: Vec<char>,
    layers: Vec<Layer>,
}

impl Canvas {
    /// Creates a new canvas filled with spaces at background priority.
    pub fn new(width: usize, height: usize) -> Self {
        let len = width.saturating_mul(height);
        Self {
            width,
            height,
            cells: vec![' '; len],
            layers: vec![Layer::Background; len],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The single write gate. Out-of-bounds cells and writes below the
    /// cell's current layer are dropped silently.
    pub fn put(&mut self, x: usize, y: usize, ch: char, layer: Layer) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = y * self.width + x;
        if layer >= self.layers[idx] {
            self.cells[idx] = ch;
            self.layers[idx] = layer;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<char> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.cells[y * self.width + x])
    }

    /// Writes `text` left to right starting at `(x, y)`, clipping at the
    /// right edge.
    pub fn write_str(&mut self, x: usize, y: usize, text: &str, layer: Layer) {
        for (i, ch) in text.chars().enumerate() {
            self.put(x + i, y, ch, layer);
        }
    }

    /// Horizontal line over `x0..=x1` at `y`; endpoint order is irrelevant.
    pub fn draw_hline(&mut self, x0: usize, x1: usize, y: usize, style: LineStyle, layer: Layer) {
        let (min_x, max_x) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        for x in min_x..=max_x {
            self.put(x, y, style.horizontal(), layer);
        }
    }

    /// Vertical line over `y0..=y1` at `x`; endpoint order is irrelevant.
    pub fn draw_vline(&mut self, x: usize, y0: usize, y1: usize, style: LineStyle, layer: Layer) {
        let (min_y, max_y) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        for y in min_y..=max_y {
            self.put(x, y, style.vertical(), layer);
        }
    }

    pub fn draw_corner(&mut self, x: usize, y: usize, corner: Corner, style: LineStyle, layer: Layer) {
        self.put(x, y, style.corner(corner), layer);
    }

    /// A box spanning `width` by `height` cells from `(x, y)`, with an
    /// optional centered title written into the top border at text priority.
    pub fn draw_box(
        &mut self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        style: LineStyle,
        title: Option<&str>,
    ) {
        if width < 2 || height < 2 {
            return;
        }
        let right = x + width - 1;
        let bottom = y + height - 1;

        self.draw_hline(x + 1, right - 1, y, style, Layer::Lines);
        self.draw_hline(x + 1, right - 1, bottom, style, Layer::Lines);
        self.draw_vline(x, y + 1, bottom - 1, style, Layer::Lines);
        self.draw_vline(right, y + 1, bottom - 1, style, Layer::Lines);

        self.draw_corner(x, y, Corner::TopLeft, style, Layer::Lines);
        self.draw_corner(right, y, Corner::TopRight, style, Layer::Lines);
        self.draw_corner(x, bottom, Corner::BottomLeft, style, Layer::Lines);
        self.draw_corner(right, bottom, Corner::BottomRight, style, Layer::Lines);

        if let Some(title) = title {
            let padded = format!(" {title} ");
            let len = padded.chars().count();
            if len < width {
                let start = x + (width - len) / 2;
                self.write_str(start, y, &padded, Layer::Text);
            }
        }
    }

    /// Copies the grid into `height` newline-joined rows of exactly `width`
    /// characters.
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for y in 0..self.height {
            if y > 0 {
                out.push('\n');
            }
            for x in 0..self.width {
                out.push(self.cells[y * self.width + x]);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::{Canvas, Corner, Layer, LineStyle};

    #[test]
    fn put_and_get_round_trip() {
        let mut canvas = Canvas::new(3, 2);
        canvas.put(1, 0, 'X', Layer::Text);
        assert_eq!(canvas.get(1, 0), Some('X'));
        assert_eq!(canvas.to_text(), " X \n   ");
    }

    #[test]
    fn lower_layer_cannot_overwrite_text() {
        let mut canvas = Canvas::new(3, 1);
        canvas.put(1, 0, 'A', Layer::Text);
        canvas.put(1, 0, '─', Layer::Lines);
        assert_eq!(canvas.get(1, 0), Some('A'));
    }

    #[test]
    fn annotation_layer_overwrites_text() {
        let mut canvas = Canvas::new(3, 1);
        canvas.put(1, 0, 'A', Layer::Text);
        canvas.put(1, 0, '╗', Layer::Annotation);
        assert_eq!(canvas.get(1, 0), Some('╗'));
    }

    #[test]
    fn equal_layer_overwrites() {
        let mut canvas = Canvas::new(3, 1);
        canvas.put(1, 0, 'A', Layer::Text);
        canvas.put(1, 0, 'B', Layer::Text);
        assert_eq!(canvas.get(1, 0), Some('B'));
    }

    #[test]
    fn out_of_bounds_writes_are_dropped() {
        let mut canvas = Canvas::new(2, 2);
        canvas.put(5, 5, 'X', Layer::Annotation);
        canvas.write_str(1, 0, "abc", Layer::Text);
        assert_eq!(canvas.to_text(), " a\n  ");
    }

    #[test]
    fn hline_and_vline_use_the_style_glyphs() {
        let mut canvas = Canvas::new(5, 3);
        canvas.draw_hline(3, 1, 0, LineStyle::Single, Layer::Lines);
        canvas.draw_vline(0, 0, 2, LineStyle::Double, Layer::Lines);
        assert_eq!(canvas.to_text(), "║─── \n║    \n║    ");
    }

    #[test]
    fn box_carries_its_centered_title() {
        let mut canvas = Canvas::new(12, 3);
        canvas.draw_box(0, 0, 12, 3, LineStyle::Single, Some("Hi"));
        let text = canvas.to_text();
        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines[0], "┌─── Hi ───┐");
        assert_eq!(lines[1], "│          │");
        assert_eq!(lines[2], "└──────────┘");
    }

    #[test]
    fn corner_glyphs_match_style() {
        let mut canvas = Canvas::new(2, 2);
        canvas.draw_corner(0, 0, Corner::TopRight, LineStyle::Double, Layer::Annotation);
        canvas.draw_corner(1, 1, Corner::BottomRight, LineStyle::Double, Layer::Annotation);
        assert_eq!(canvas.get(0, 0), Some('╗'));
        assert_eq!(canvas.get(1, 1), Some('╝'));
    }

    #[test]
    fn rows_are_equal_length() {
        let canvas = Canvas::new(7, 4);
        let text = canvas.to_text();
        assert_eq!(text.split('\n').count(), 4);
        assert!(text.split('\n').all(|line| line.chars().count() == 7));
    }
}
