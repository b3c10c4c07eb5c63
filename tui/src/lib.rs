//! TUI rendering for awaitprobe using ratatui.

mod input;
mod theme;

pub use input::{InputPump, apply_key, handle_events};
pub use theme::{Palette, spinner_frame, styles};

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Padding, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

use probe_engine::{App, Pattern};
use probe_types::sanitize_terminal_text;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let palette = Palette::standard();
    let bg_block = Block::default().style(Style::default().bg(palette.bg_dark));
    frame.render_widget(bg_block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1), // Target
            Constraint::Length(3), // Buttons
            Constraint::Length(1), // Summary
            Constraint::Length(6), // Outcomes
            Constraint::Min(3),    // Log
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0], &palette);
    draw_buttons(frame, app, chunks[1], &palette);
    draw_summary(frame, app, chunks[2], &palette);
    draw_outcomes(frame, app, chunks[3], &palette);
    draw_log(frame, app, chunks[4], &palette);
    draw_status_bar(frame, app, chunks[5], &palette);
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let probe = app.probe();
    let line = Line::from(vec![
        Span::styled(
            " awaitprobe ",
            Style::default()
                .fg(palette.primary)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("│ ", styles::border(palette)),
        Span::styled(
            sanitize_terminal_text(probe.url().as_str()).into_owned(),
            Style::default().fg(palette.accent),
        ),
        Span::styled(
            format!("  blocking {}ms", probe.blocking_delay().as_millis()),
            Style::default().fg(palette.text_muted),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_buttons(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let widths: Vec<Constraint> = Pattern::ALL
        .iter()
        .map(|p| {
            let caption = button_caption(*p);
            Constraint::Length(u16::try_from(caption.width() + 2).unwrap_or(u16::MAX))
        })
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .spacing(1)
        .constraints(widths)
        .split(area);

    for (pattern, cell) in Pattern::ALL.into_iter().zip(cells.iter()) {
        let focused = app.focus() == pattern;
        let border_style = if focused {
            Style::default().fg(palette.primary)
        } else {
            styles::border(palette)
        };
        let button = Paragraph::new(Line::from(Span::styled(
            button_caption(pattern),
            styles::button(palette, focused),
        )))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(border_style),
        );
        frame.render_widget(button, *cell);
    }
}

fn button_caption(pattern: Pattern) -> String {
    format!(" {} {} ", pattern.hotkey(), pattern.label())
}

fn draw_summary(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let pattern = app.focus();
    let line = Line::from(vec![
        Span::styled(
            format!(" {}: ", pattern.label()),
            Style::default().fg(palette.text_secondary),
        ),
        Span::styled(pattern.summary(), Style::default().fg(palette.text_muted)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_outcomes(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let lines: Vec<Line> = Pattern::ALL
        .into_iter()
        .map(|pattern| {
            let label = Span::styled(
                format!("{:<11}", pattern.label()),
                Style::default().fg(palette.text_secondary),
            );
            let Some(outcome) = app.last_outcome(pattern) else {
                return Line::from(vec![
                    label,
                    Span::styled("-", Style::default().fg(palette.text_muted)),
                ]);
            };
            let elapsed = Span::styled(
                format!("{:>6}ms  ", outcome.elapsed.as_millis()),
                styles::timestamp(palette),
            );
            let body = match &outcome.result {
                Ok(text) => Span::styled(
                    sanitize_terminal_text(text).into_owned(),
                    Style::default().fg(palette.success),
                ),
                Err(err) => Span::styled(
                    sanitize_terminal_text(err).into_owned(),
                    Style::default().fg(palette.error),
                ),
            };
            Line::from(vec![label, elapsed, body])
        })
        .collect();

    let block = Block::default()
        .title(" Last result ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(styles::border(palette))
        .padding(Padding::horizontal(1))
        .style(Style::default().bg(palette.bg_panel));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_log(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let visible = usize::from(area.height.saturating_sub(2));
    let skip = app.log().len().saturating_sub(visible);

    let lines: Vec<Line> = app
        .log_lines()
        .skip(skip)
        .map(|line| {
            Line::from(Span::styled(
                sanitize_terminal_text(&line).into_owned(),
                Style::default().fg(palette.text_primary),
            ))
        })
        .collect();

    let title = format!(" Log ({}) ", app.log().len());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(styles::border(palette))
        .padding(Padding::horizontal(1))
        .style(Style::default().bg(palette.bg_panel));
    let log = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(log, area);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let (status_text, status_style) = match app.in_flight() {
        0 => ("Ready".to_string(), Style::default().fg(palette.success)),
        n => (
            format!("{} {n} running", spinner_frame(app.tick_count())),
            Style::default().fg(palette.warning),
        ),
    };

    let status = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled(status_text, status_style),
        Span::styled(
            " │ 1-4 run · ←/→ focus · Enter run · c clear · q quit",
            Style::default().fg(palette.text_muted),
        ),
    ]));
    frame.render_widget(status, area);
}
