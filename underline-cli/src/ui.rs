//! Terminal rendering: document pane, annotation sidebar, cite-box popup.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use underline_core::PanelState;

use crate::app::{App, Mode};

pub fn draw(f: &mut Frame, app: &App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(outer[0]);

    draw_document(f, app, content[0]);
    draw_sidebar(f, app, content[1]);
    draw_status(f, app, outer[1]);
    draw_cite_box(f, app, content[0]);
}

fn draw_document(f: &mut Frame, app: &App, area: Rect) {
    let inner_height = area.height.saturating_sub(2) as usize;
    let (cursor_row, _) = app.cursor.pos();
    let scroll = cursor_row.saturating_sub(inner_height.saturating_sub(1).max(1)) as u16;

    let paragraph = Paragraph::new(document_lines(app))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", app.title)),
        )
        .scroll((scroll, 0));
    f.render_widget(paragraph, area);
}

fn document_lines(app: &App) -> Vec<Line<'static>> {
    let selection = app.selection();
    let underlines = app.underline_ranges();
    let (cursor_row, cursor_col) = app.cursor.pos();

    let mut lines = Vec::new();
    let mut offset = 0;
    for (row, raw) in app.text.split('\n').enumerate() {
        let chars: Vec<char> = raw.chars().collect();
        let mut spans = Vec::new();
        for (col, &ch) in chars.iter().enumerate() {
            let at_cursor = row == cursor_row && col == cursor_col;
            let style = style_at(app, offset + col, at_cursor, &selection, &underlines);
            spans.push(Span::styled(ch.to_string(), style));
        }
        // The cursor may sit one column past the last character.
        if row == cursor_row && cursor_col == chars.len() {
            spans.push(Span::styled(
                " ",
                Style::default().add_modifier(Modifier::REVERSED),
            ));
        }
        lines.push(Line::from(spans));
        offset += chars.len() + 1;
    }
    lines
}

fn style_at(
    app: &App,
    global: usize,
    at_cursor: bool,
    selection: &Option<(usize, usize)>,
    underlines: &[(usize, usize)],
) -> Style {
    let contains = |range: &(usize, usize)| global >= range.0 && global < range.1;

    let mut style = Style::default();
    if underlines.iter().any(|r| contains(r)) {
        style = style.add_modifier(Modifier::UNDERLINED);
    }
    if let Some(range) = app.active_range {
        if contains(&range) {
            style = style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
        }
    }
    if let Some(range) = selection {
        if contains(range) {
            style = style.add_modifier(Modifier::REVERSED);
        }
    }
    if at_cursor {
        style = style.add_modifier(Modifier::REVERSED);
    }
    style
}

fn draw_sidebar(f: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    for ann in app.annotations.sorted() {
        lines.push(Line::from(Span::styled(
            format!("{}-{}", ann.start, ann.end),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        if ann.comment.is_empty() {
            lines.push(Line::from("  (no comment)"));
        } else {
            lines.push(Line::from(format!("  {}", ann.comment)));
        }
    }
    if lines.is_empty() {
        lines.push(Line::from("No underlines yet"));
        lines.push(Line::from("v to select, u to underline"));
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Underlines ({}) ", app.annotations.len())),
    );
    f.render_widget(paragraph, area);
}

fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    let mode = match app.mode {
        Mode::Normal => "NORMAL",
        Mode::Visual => "VISUAL",
    };
    let dirty = if app.dirty { " [+]" } else { "" };
    let message = app.status_message.as_deref().unwrap_or("");
    let status = Line::from(vec![
        Span::styled(
            format!(" {}{} ", mode, dirty),
            Style::default().add_modifier(Modifier::REVERSED),
        ),
        Span::raw(" "),
        Span::raw(message),
    ]);
    f.render_widget(Paragraph::new(status), area);
}

fn draw_cite_box(f: &mut Frame, app: &App, area: Rect) {
    if !app.panel.is_visible() {
        return;
    }
    let Some(cap) = app.panel.anchor() else {
        return;
    };

    let width = area.width.saturating_sub(6).min(46).max(20);
    let height = 5;
    let (cursor_row, _) = app.cursor.pos();
    let y = (area.y + 2 + cursor_row as u16).min(area.bottom().saturating_sub(height));
    let x = area.x + 2;
    let popup = Rect::new(x, y, width, height.min(area.height));

    let excerpt: String = cap.text.chars().take(width as usize - 6).collect();
    let lines = match app.panel.state() {
        PanelState::QuickForm => vec![
            Line::from(format!("\u{ab}{}\u{bb}", excerpt)),
            Line::from(format!("chars {}-{}", cap.start, cap.end)),
            Line::from(Span::styled(
                "Enter underline · Esc cancel",
                Style::default().fg(Color::DarkGray),
            )),
        ],
        PanelState::CommentForm => vec![
            Line::from(format!("\u{ab}{}\u{bb}", excerpt)),
            Line::from(format!("comment: {}_", app.input_buffer)),
            Line::from(Span::styled(
                "Enter save · Esc skip",
                Style::default().fg(Color::DarkGray),
            )),
        ],
        PanelState::Hidden => return,
    };

    f.render_widget(Clear, popup);
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Underline "),
    );
    f.render_widget(paragraph, popup);
}
