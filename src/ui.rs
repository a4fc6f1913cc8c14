use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use crate::app::{App, InputMode, Screen, EXAMPLE_QUESTIONS};
use crate::session::Role;

const HEADER_TITLE: &str = "🎓 Angelo State University Chatbot";

pub fn render(app: &mut App, frame: &mut Frame) {
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_header(app, frame, header_area);

    match app.screen {
        Screen::Chat => render_chat_screen(app, frame, body_area),
        Screen::About => render_about_screen(frame, body_area),
        Screen::Sources => render_sources_screen(frame, body_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let tab = |label: &str, active: bool| {
        if active {
            Span::styled(
                format!(" {} ", label),
                Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(format!(" {} ", label), Style::default().fg(Color::DarkGray))
        }
    };

    let tabs = Line::from(vec![
        tab("Chat", app.screen == Screen::Chat),
        tab("About", app.screen == Screen::About),
        tab("Sources", app.screen == Screen::Sources),
    ]);

    let header = Paragraph::new(Text::from(vec![tabs]))
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue))
                .title(format!(" {} ", HEADER_TITLE)),
        );

    frame.render_widget(header, area);
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(area);

    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    if app.show_examples() {
        render_welcome(app, frame, chat_area);
    } else {
        render_transcript(app, frame, chat_area);
    }

    render_input(app, frame, input_area);
}

/// Fresh conversation: a short greeting plus the selectable example questions.
fn render_welcome(app: &mut App, frame: &mut Frame, area: Rect) {
    let [greeting_area, examples_area] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Min(0),
    ])
    .areas(area);

    let greeting = Paragraph::new(Text::from(vec![
        Line::default(),
        Line::from("Ask me anything about Angelo State University."),
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Welcome "),
    );
    frame.render_widget(greeting, greeting_area);

    let items: Vec<ListItem> = EXAMPLE_QUESTIONS
        .iter()
        .map(|question| ListItem::new(format!(" {} ", question)))
        .collect();

    let examples = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" 💡 Or try one of these questions (Enter to ask) "),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(examples, examples_area, &mut app.example_state);
}

/// The whole conversation is replayed from the session log every frame; the
/// log is the single source of truth and this is just its projection.
fn render_transcript(app: &App, frame: &mut Frame, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();

    for msg in app.session.messages() {
        match msg.role {
            Role::User => {
                lines.push(Line::from(Span::styled(
                    "You:",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
            }
            Role::Assistant => {
                lines.push(Line::from(Span::styled(
                    "Bot:",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )));
            }
        }
        for line in msg.content.lines() {
            lines.push(Line::from(line.to_string()));
        }
        lines.push(Line::default());
    }

    if app.session.is_awaiting() {
        lines.push(Line::from(Span::styled(
            "Bot:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    if let Some(error) = app.session.last_error() {
        lines.push(Line::from(Span::styled(
            format!("⚠ {}", error),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    }

    let transcript = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Conversation "),
        )
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(transcript, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let border_color = if app.input_mode == InputMode::Editing {
        Color::Yellow
    } else {
        Color::DarkGray
    };

    let title = if app.input_mode == InputMode::Editing {
        " Ask (Enter to send, Esc for keys) "
    } else {
        " Ask (press i to type) "
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Horizontal scrolling keeps the cursor visible in a narrow box.
    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.cursor;

    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);

    frame.render_widget(input, area);

    if app.input_mode == InputMode::Editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_about_screen(frame: &mut Frame, area: Rect) {
    let heading = |text: &str| {
        Line::from(Span::styled(
            text.to_string(),
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        ))
    };

    let text = Text::from(vec![
        heading("About the Angelo State University Chatbot"),
        Line::default(),
        Line::from(
            "This assistant answers questions about Angelo State University: its \
             academic structure, personnel, and programs, based on the official \
             undergraduate catalog.",
        ),
        Line::default(),
        heading("How it works"),
        Line::default(),
        Line::from(
            "Your question is sent to a backend service that consults a knowledge \
             graph built from the catalog and composes an answer with a large \
             language model. Answers arrive as a single response; nothing is \
             streamed.",
        ),
        Line::default(),
        heading("Privacy"),
        Line::default(),
        Line::from(
            "The conversation lives only in this terminal session. Clearing the \
             chat (r) discards it entirely.",
        ),
    ]);

    let about = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" ℹ️  About "),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(about, area);
}

fn render_sources_screen(frame: &mut Frame, area: Rect) {
    let heading = |text: &str| {
        Line::from(Span::styled(
            text.to_string(),
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        ))
    };

    let text = Text::from(vec![
        heading("Data Sources"),
        Line::default(),
        Line::from(
            "Answers are grounded in the Angelo State University undergraduate \
             catalog, processed into a knowledge graph of colleges, departments, \
             degree programs, courses, and personnel.",
        ),
        Line::default(),
        heading("The knowledge graph"),
        Line::default(),
        Line::from(
            "The graph store and its statistics dashboard are part of the backend \
             deployment and are not queried by this client; this client only \
             speaks to the chat endpoint.",
        ),
        Line::default(),
        heading("Freshness"),
        Line::default(),
        Line::from(
            "The catalog is republished each academic year; answers reflect the \
             edition the backend was last built from.",
        ),
    ]);

    let sources = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" 📚 Data Sources "),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(sources, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let hints = match (app.screen, app.input_mode) {
        (Screen::Chat, InputMode::Editing) => {
            "Enter send · Esc keys · ↑/↓ examples · Ctrl+C quit"
        }
        (Screen::Chat, InputMode::Normal) => {
            "i type · j/k scroll · r clear chat · a about · s sources · q quit"
        }
        _ => "Esc back to chat · a about · s sources · q quit",
    };

    let footer = Paragraph::new(hints)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);

    frame.render_widget(footer, area);
}
