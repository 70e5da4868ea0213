use crate::app::App;
use deckdraw_core::DrawMode;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::{Color, Line, Modifier, Span, Style, Stylize};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

pub fn draw(frame: &mut Frame, app: &App) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Min(8),
            Constraint::Length(8),
        ])
        .split(frame.area());

    draw_header(frame, root[0], app);
    draw_cards(frame, root[1], app);
    draw_events(frame, root[2], app);

    if app.show_help {
        draw_help_popup(frame);
    }
    if let Some(message) = app.alert() {
        draw_alert(frame, message);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let snapshot = app.snapshot();
    let deck = match snapshot.deck.as_ref() {
        Some(deck) => format!("{} ({} left)", deck.id, deck.remaining),
        None => "-".to_string(),
    };
    let title = format!(
        "deckdraw | mode: {} | phase: {}{}",
        app.mode.label(),
        app.phase_label(snapshot.phase),
        if app.is_working() { " ..." } else { "" }
    );
    let enabled = snapshot.controls_enabled();
    let lines = vec![
        Line::from(title.bold()),
        Line::from(format!("Deck: {deck}  Drawn: {}", snapshot.drawn.len())),
        Line::from(vec![
            control_span("Enter", app.primary_label(), enabled),
            Span::raw("  "),
            control_span("s", "SHUFFLE DECK", enabled),
            Span::raw("  "),
            Span::raw("? help  q quit"),
        ]),
        Line::from(format!("Status: {}", app.status_line)),
    ];
    let block = Block::default().borders(Borders::ALL).title("Deck");
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true }).block(block);
    frame.render_widget(paragraph, area);
}

fn control_span(key: &str, label: &str, enabled: bool) -> Span<'static> {
    let text = format!("[{key}] {label}");
    if enabled {
        Span::styled(text, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    } else {
        Span::styled(text, Style::default().fg(Color::DarkGray))
    }
}

fn draw_cards(frame: &mut Frame, area: Rect, app: &App) {
    let rows = app.card_rows();
    let items: Vec<ListItem<'_>> = if rows.is_empty() {
        let hint = match app.mode {
            DrawMode::Manual => "no cards yet, press Enter to draw",
            DrawMode::Auto => "no cards yet, press Enter to keep drawing",
        };
        vec![ListItem::new(hint)]
    } else {
        rows.into_iter().map(ListItem::new).collect()
    };
    let len = items.len();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Cards"))
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");
    let mut state = ListState::default();
    if !app.snapshot().drawn.is_empty() {
        state.select(Some(app.card_cursor.min(len - 1)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_events(frame: &mut Frame, area: Rect, app: &App) {
    let capacity = area.height.saturating_sub(2) as usize;
    let start = app.event_log.len().saturating_sub(capacity);
    let lines: Vec<Line<'_>> = app
        .event_log
        .iter()
        .skip(start)
        .map(|line| Line::from(line.clone()))
        .collect();
    let block = Block::default().borders(Borders::ALL).title("Events");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_help_popup(frame: &mut Frame) {
    let area = centered_rect(60, 40, frame.area());
    frame.render_widget(Clear, area);
    let lines = vec![
        Line::from("Enter / space / d  draw (manual) or keep/stop drawing (auto)"),
        Line::from("s  shuffle deck and clear the drawn cards"),
        Line::from("up/down or j/k  scroll cards"),
        Line::from("Esc  close popups | q quit"),
    ];
    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn draw_alert(frame: &mut Frame, message: &str) {
    let area = centered_rect(50, 25, frame.area());
    frame.render_widget(Clear, area);
    let lines = vec![
        Line::from(message.to_string().bold()),
        Line::from(""),
        Line::from("Enter/Esc=ok"),
    ];
    let block = Block::default()
        .title("Alert")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::centered_rect;
    use ratatui::layout::Rect;

    #[test]
    fn centered_rect_stays_inside_the_area() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = centered_rect(50, 25, area);
        assert!(popup.x >= area.x && popup.right() <= area.right());
        assert!(popup.y >= area.y && popup.bottom() <= area.bottom());
        assert_eq!(popup.width, 50);
    }
}
