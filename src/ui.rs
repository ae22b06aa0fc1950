use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};

use crate::app::App;
use crate::client::Backend;
use crate::controller::{Focus, Phase};
use crate::state::Sender;

const SEND_BUTTON_WIDTH: u16 = 10;

pub fn render<B: Backend>(app: &mut App<B>, frame: &mut Frame) {
    let area = frame.area();

    let input_width = area.width.saturating_sub(SEND_BUTTON_WIDTH + 2);
    let input_height = app.chat.input.height(input_width) + 2;

    // Main layout: header, messages, prompt, footer
    let [header_area, messages_area, prompt_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(input_height),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_messages(app, frame, messages_area);
    render_prompt(app, frame, prompt_area);
    render_footer(app, frame, footer_area);
}

fn render_header<B: Backend>(app: &App<B>, frame: &mut Frame, area: Rect) {
    let conversation = if app.chat.chat_id().is_empty() {
        Span::styled(" new conversation", Style::default().fg(Color::Gray))
    } else {
        Span::styled(
            format!(" chat {}", app.chat.chat_id().as_str()),
            Style::default().fg(Color::Gray),
        )
    };

    let title = Line::from(vec![
        Span::styled(" Chat ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(app.endpoint.clone(), Style::default().fg(Color::Gray)),
        conversation,
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

/// Three dots with one lit, cycling with the animation frame
fn loading_dots(frame: u8) -> Line<'static> {
    let spans: Vec<Span> = (0..3u8)
        .flat_map(|i| {
            let style = if i == frame {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            [Span::styled("●", style), Span::raw(" ")]
        })
        .collect();
    Line::from(spans)
}

fn render_messages<B: Backend>(app: &mut App<B>, frame: &mut Frame, area: Rect) {
    app.messages_area = Some(area);

    let focused = app.chat.focus == Focus::Messages;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Messages ");

    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2);

    // Rows are wrapped here, not by the Paragraph, so the scroll math counts what is drawn
    let text = if app.chat.messages.is_empty() {
        Text::from(Span::styled(
            "Type a message and press Enter...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for message in app.chat.messages.messages() {
            match message.sender {
                Sender::User => lines.push(Line::from(Span::styled(
                    "You:",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ))),
                Sender::Assistant => lines.push(Line::from(Span::styled(
                    "Assistant:",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ))),
            }

            if message.is_loading() {
                lines.push(loading_dots(app.animation_frame));
            } else {
                let style = if message.is_error() {
                    Style::default().fg(Color::Red)
                } else {
                    Style::default()
                };
                for row in message.body_rows(inner_width) {
                    lines.push(Line::styled(row, style));
                }
            }
            lines.push(Line::default());
        }

        Text::from(lines)
    };

    // Deferred scroll: settle against the size we are about to draw
    let total_lines = u16::try_from(text.lines.len()).unwrap_or(u16::MAX);
    app.chat.messages.clamp_scroll(total_lines, inner_height);
    let scroll = app.chat.messages.scroll;

    let paragraph = Paragraph::new(text).block(block).scroll((scroll, 0));
    frame.render_widget(paragraph, area);

    if total_lines > inner_height {
        let mut scrollbar_state = ScrollbarState::new(total_lines.saturating_sub(inner_height) as usize)
            .position(scroll as usize);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area,
            &mut scrollbar_state,
        );
    }
}

fn render_prompt<B: Backend>(app: &mut App<B>, frame: &mut Frame, area: Rect) {
    let [input_area, send_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(SEND_BUTTON_WIDTH),
    ])
    .areas(area);

    app.input_area = Some(input_area);
    app.send_area = Some(send_area);

    let enabled = app.chat.input.is_enabled();
    let focused = app.chat.focus == Focus::Input;
    let border_color = if !enabled {
        Color::DarkGray
    } else if focused {
        Color::Yellow
    } else {
        Color::Gray
    };
    let title = match app.chat.phase() {
        Phase::Idle => " Prompt ",
        Phase::AwaitingResponse => " Waiting for reply ",
    };
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    let inner_width = input_area.width.saturating_sub(2);
    let inner_height = input_area.height.saturating_sub(2);
    app.chat.input.scroll_to_cursor(inner_width);

    let rows: Vec<Line> = app
        .chat
        .input
        .wrapped_lines(inner_width)
        .into_iter()
        .map(Line::from)
        .collect();
    let text_style = if enabled {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let input = Paragraph::new(rows)
        .style(text_style)
        .block(input_block)
        .scroll((app.chat.input.scroll(), 0));
    frame.render_widget(input, input_area);

    let button_style = if enabled {
        Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let button = Paragraph::new(Line::from(" Send ").centered())
        .style(button_style)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(border_color)));
    frame.render_widget(button, send_area);

    // Show cursor while the prompt can be edited
    if enabled && focused && inner_width > 0 {
        let (row, col) = app.chat.input.cursor_position(inner_width);
        let visible_row = row.saturating_sub(app.chat.input.scroll()).min(inner_height.saturating_sub(1));
        frame.set_cursor_position((input_area.x + 1 + col, input_area.y + 1 + visible_row));
    }
}

fn render_footer<B: Backend>(app: &App<B>, frame: &mut Frame, area: Rect) {
    let key_style = Style::default().fg(Color::Yellow);
    let hints: Vec<(&str, &str)> = match app.chat.focus {
        Focus::Input => vec![
            ("Enter", "send"),
            ("Shift/Alt+Enter", "new line"),
            ("Tab", "messages"),
            ("PgUp/PgDn", "scroll"),
            ("Ctrl+C", "quit"),
        ],
        Focus::Messages => vec![
            ("j/k", "scroll"),
            ("g/G", "top/bottom"),
            ("Tab", "prompt"),
            ("q", "quit"),
        ],
    };

    let mut spans = Vec::new();
    for (key, action) in hints {
        spans.push(Span::styled(format!(" {} ", key), key_style));
        spans.push(Span::raw(format!("{} ", action)));
    }

    let footer = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}
