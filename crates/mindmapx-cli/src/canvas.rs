//! Terminal drawing surface: the mind map as an indented, coloured outline.

use mindmapx_engine::{Node, RenderOptions, Renderer};
use ratatui::style::Color;

const PALETTE: [Color; 6] = [
    Color::Cyan,
    Color::Green,
    Color::Yellow,
    Color::Magenta,
    Color::Blue,
    Color::Red,
];

/// Surface units per terminal cell, used for edit anchors and wrap width
pub const CELL_WIDTH: f64 = 8.0;
pub const CELL_HEIGHT: f64 = 16.0;

const BASE_INDENT: f64 = 2.0;
const MIN_WRAP: usize = 8;
const BULLET: &str = "• ";

/// One node, flattened in pre-order
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub depth: usize,
    pub text: String,
    pub color: Color,
}

/// One terminal line of a laid-out row
#[derive(Debug, Clone, PartialEq)]
pub struct Placed {
    pub row: usize,
    pub column: usize,
    pub text: String,
    pub first: bool,
}

/// Handle of a terminal render: the flattened tree plus the camera.
#[derive(Debug, Clone)]
pub struct Canvas {
    rows: Vec<Row>,
    scale: f64,
    scroll: usize,
    max_width: u32,
}

impl Canvas {
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// First visible line
    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn indent(&self) -> usize {
        (BASE_INDENT * self.scale).round() as usize
    }

    pub fn wrap_width(&self) -> usize {
        let columns = (f64::from(self.max_width) / CELL_WIDTH * self.scale).round() as usize;
        columns.max(MIN_WRAP)
    }

    pub fn lay_out(&self) -> Vec<Placed> {
        let indent = self.indent();
        let width = self.wrap_width();
        let mut placed = Vec::new();
        for (i, row) in self.rows.iter().enumerate() {
            for (n, chunk) in wrap(&row.text, width).into_iter().enumerate() {
                let text = if n == 0 {
                    format!("{BULLET}{chunk}")
                } else {
                    format!("{}{chunk}", " ".repeat(BULLET.chars().count()))
                };
                placed.push(Placed {
                    row: i,
                    column: indent * row.depth,
                    text,
                    first: n == 0,
                });
            }
        }
        placed
    }

    /// Scroll the least amount that brings all lines of `row` into a window of `height` lines
    pub fn reveal(&mut self, row: usize, height: usize) {
        let placed = self.lay_out();
        let Some(first) = placed.iter().position(|p| p.row == row) else {
            return;
        };
        let last = placed.iter().rposition(|p| p.row == row).unwrap_or(first);
        if first < self.scroll {
            self.scroll = first;
        } else if height > 0 && last >= self.scroll + height {
            self.scroll = last + 1 - height;
        }
    }
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn collect_rows(tree: &Node, options: &RenderOptions) -> Vec<Row> {
    let mut rows = Vec::new();
    let mut next_color = 0;
    // A synthetic root only groups top-level nodes
    if tree.content.is_empty() {
        for child in &tree.children {
            push_branch(child, 0, None, options.color_freeze_level, &mut next_color, &mut rows);
        }
    } else {
        push_branch(tree, 0, None, options.color_freeze_level, &mut next_color, &mut rows);
    }
    rows
}

fn push_branch(
    node: &Node,
    depth: usize,
    inherited: Option<Color>,
    freeze_level: usize,
    next_color: &mut usize,
    rows: &mut Vec<Row>,
) {
    let color = match inherited {
        Some(color) if depth > freeze_level => color,
        _ => {
            let color = PALETTE[*next_color % PALETTE.len()];
            *next_color += 1;
            color
        }
    };
    rows.push(Row {
        depth,
        text: node.content.clone(),
        color,
    });
    for child in &node.children {
        push_branch(child, depth + 1, Some(color), freeze_level, next_color, rows);
    }
}

/// Draws into a [`Canvas`]; ratatui paints the canvas each frame.
#[derive(Debug, Default)]
pub struct TerminalRenderer;

impl TerminalRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for TerminalRenderer {
    type Handle = Canvas;

    fn render(&mut self, tree: &Node, options: &RenderOptions) -> Canvas {
        Canvas {
            rows: collect_rows(tree, options),
            scale: 1.0,
            scroll: 0,
            max_width: options.max_width,
        }
    }

    fn update(&mut self, canvas: &mut Canvas, tree: &Node, options: &RenderOptions) {
        canvas.rows = collect_rows(tree, options);
        canvas.max_width = options.max_width;
        let lines = canvas.lay_out().len();
        canvas.scroll = canvas.scroll.min(lines.saturating_sub(1));
    }

    fn rescale(&mut self, canvas: &mut Canvas, factor: f64) {
        canvas.scale *= factor;
    }

    fn fit_to_view(&mut self, canvas: &mut Canvas) {
        canvas.scroll = 0;
    }
}
