use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::app::{App, Hit};
use crate::canvas::{CELL_HEIGHT, CELL_WIDTH, Canvas};

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    let block = Block::default().borders(Borders::ALL).title(app.title());
    let inner = block.inner(chunks[0]);
    f.render_widget(block, chunks[0]);
    app.body_height = usize::from(inner.height);

    let (lines, hits) = match app.canvas() {
        Some(canvas) => lay_out_lines(canvas, app.selected, inner),
        None => (vec![Line::from("Nothing to show yet")], Vec::new()),
    };
    app.hits = hits;
    f.render_widget(Paragraph::new(lines), inner);

    f.render_widget(
        Paragraph::new(app.status.as_str()).style(Style::default().fg(Color::Gray)),
        chunks[1],
    );
    let help = Line::from(vec![
        Span::raw("q: Quit | "),
        Span::raw("+/-: Zoom | f: Fit | r: Refresh | "),
        Span::raw("↑/↓: Select | Enter: Edit"),
    ]);
    f.render_widget(Paragraph::new(help), chunks[2]);

    draw_editor(f, app);
}

fn lay_out_lines(canvas: &Canvas, selected: usize, area: Rect) -> (Vec<Line<'static>>, Vec<Hit>) {
    let mut lines = Vec::new();
    let mut hits = Vec::new();
    let visible = canvas
        .lay_out()
        .into_iter()
        .skip(canvas.scroll())
        .take(usize::from(area.height));

    for (i, placed) in visible.enumerate() {
        let row = &canvas.rows()[placed.row];
        let mut style = Style::default().fg(row.color);
        if row.depth == 0 {
            style = style.add_modifier(Modifier::BOLD);
        }
        if placed.row == selected {
            style = style.add_modifier(Modifier::REVERSED);
        }
        hits.push(Hit {
            x: area.x + placed.column as u16,
            y: area.y + i as u16,
            width: placed.text.chars().count() as u16,
            row: placed.row,
        });
        lines.push(Line::from(vec![
            Span::raw(" ".repeat(placed.column)),
            Span::styled(placed.text, style),
        ]));
    }
    (lines, hits)
}

fn draw_editor(f: &mut Frame, app: &App) {
    let Some(session) = app.view().and_then(|v| v.edit_session()) else {
        return;
    };
    let anchor = session.anchor();
    let x = (anchor.x / CELL_WIDTH) as u16;
    let y = (anchor.y / CELL_HEIGHT) as u16;
    let width = (anchor.editor_width() / CELL_WIDTH).ceil() as u16 + 2;
    let rect = Rect {
        x,
        y: y.saturating_sub(1),
        width,
        height: 3,
    }
    .intersection(f.area());

    f.render_widget(Clear, rect);
    f.render_widget(
        Paragraph::new(session.draft()).block(Block::default().borders(Borders::ALL).title("Edit")),
        rect,
    );
    let cursor = rect.x + 1 + session.draft().chars().count() as u16;
    f.set_cursor_position((cursor.min(rect.right().saturating_sub(2)), rect.y + 1));
}
