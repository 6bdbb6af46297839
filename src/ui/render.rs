//! Drawing the UI with ratatui
//!
//! Rendering is a pure function of [`App`].

use super::app::{App, UiPhase};
use crate::state_machine::state::{Message, Sender};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

const ACCENT: Color = Color::Rgb(255, 61, 0);
const DIM: Color = Color::Rgb(130, 130, 130);
const BOT_TEXT: Color = Color::Rgb(241, 241, 241);

pub fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let area = frame.area();
    match app.phase() {
        UiPhase::Intro => draw_intro(frame, app, area),
        UiPhase::LoginForm => draw_login(frame, app, area),
        UiPhase::ChatPanel => draw_chat(frame, app, area),
    }

    if let Some(message) = app.alert() {
        draw_alert(frame, message, area);
    }
}

fn accent_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ))
}

fn draw_intro(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let text = Text::from(vec![
        Line::from(Span::styled(
            app.title().to_string(),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("Press any key to skip", Style::default().fg(DIM))),
    ]);
    let rect = centered(area, 60, 3);
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), rect);
}

fn draw_login(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let form = centered(area, 44, 8);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(form);

    let heading = Paragraph::new(Span::styled(
        app.title().to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center);
    frame.render_widget(heading, rows[0]);

    let input = if app.account_input().is_empty() {
        Span::styled("Enter Account Number", Style::default().fg(DIM))
    } else {
        Span::raw(app.account_input().to_string())
    };
    frame.render_widget(
        Paragraph::new(input).block(accent_block("Account")),
        rows[1],
    );

    let button_style = if app.verify_pending() {
        Style::default().fg(DIM)
    } else {
        Style::default()
            .fg(Color::White)
            .bg(ACCENT)
            .add_modifier(Modifier::BOLD)
    };
    let button = Paragraph::new(Span::styled(
        format!(" {} [Enter] ", app.verify_label()),
        button_style,
    ))
    .alignment(Alignment::Center);
    frame.render_widget(button, rows[2]);
}

fn draw_chat(frame: &mut Frame<'_>, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    let heading = match (app.session().verified_user(), app.session().account_number()) {
        (Some(user), Some(account)) => format!("{} · {} ({account})", app.title(), user.name),
        _ => app.title().to_string(),
    };
    let block = accent_block(&heading);
    let inner = block.inner(chunks[0]);
    let lines = transcript_lines(app.session().transcript(), inner.width);

    // Scroll is counted back from the newest line
    let total = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let max_scroll = total.saturating_sub(inner.height);
    app.clamp_scroll(max_scroll);
    let offset = max_scroll - app.scroll();

    let transcript = Paragraph::new(Text::from(lines))
        .block(block)
        .scroll((offset, 0));
    frame.render_widget(transcript, chunks[0]);

    let speaker = if app.voice_enabled() { "🔊" } else { "🔇" };
    let input = if app.message_input().is_empty() {
        Span::styled("Type a message...", Style::default().fg(DIM))
    } else {
        Span::raw(app.message_input().to_string())
    };
    let input_block = accent_block("Message").title_bottom(Line::from(vec![
        Span::styled(" Enter ", Style::default().fg(ACCENT)),
        Span::styled("send  ", Style::default().fg(DIM)),
        Span::styled(format!("{speaker} Ctrl+V "), Style::default().fg(ACCENT)),
        Span::styled(format!("{}  ", app.voice_hint()), Style::default().fg(DIM)),
        Span::styled("Ctrl+C ", Style::default().fg(ACCENT)),
        Span::styled("quit ", Style::default().fg(DIM)),
    ]));
    frame.render_widget(Paragraph::new(input).block(input_block), chunks[1]);
}

/// Bot messages on the left, the user's on the right
fn transcript_lines(transcript: &[Message], width: u16) -> Vec<Line<'static>> {
    let width = usize::from(width.max(8));
    let bubble = (width * 7 / 10).max(4);
    let mut lines = Vec::new();

    for message in transcript {
        let (style, alignment, prefix) = match message.sender {
            Sender::Bot => (Style::default().fg(BOT_TEXT), Alignment::Left, "● "),
            Sender::User => (
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
                Alignment::Right,
                "",
            ),
        };
        let text = format!("{prefix}{}", message.text);
        for row in wrap(&text, bubble) {
            lines.push(Line::from(Span::styled(row, style)).alignment(alignment));
        }
        lines.push(Line::from(""));
    }

    lines
}

/// Greedy word wrap on character counts; overlong words are split
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut rows = Vec::new();
    for paragraph in text.split('\n') {
        let mut row = String::new();
        let mut row_len = 0;
        for word in paragraph.split(' ') {
            let mut word: Vec<char> = word.chars().collect();
            if row_len > 0 && row_len + 1 + word.len() > width {
                rows.push(std::mem::take(&mut row));
                row_len = 0;
            }
            while word.len() > width {
                let rest = word.split_off(width);
                if row_len > 0 {
                    rows.push(std::mem::take(&mut row));
                }
                rows.push(word.into_iter().collect());
                row_len = 0;
                word = rest;
            }
            if row_len > 0 {
                row.push(' ');
                row_len += 1;
            }
            row_len += word.len();
            row.extend(word);
        }
        rows.push(row);
    }
    rows
}

fn draw_alert(frame: &mut Frame<'_>, message: &str, area: Rect) {
    let rect = centered(area, 50, 5);
    let text = Text::from(vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled("[Enter] OK", Style::default().fg(DIM))),
    ]);
    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(accent_block("Notice")),
        rect,
    );
}

/// A `width` x `height` rectangle centered in `area`, shrunk to fit
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
