use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, InputMode, Screen};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key)?,
        AppEvent::Resize => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) -> Result<()> {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return Ok(());
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }

    Ok(())
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match app.screen {
        Screen::Chat => handle_chat_normal(app, key),
        Screen::About | Screen::Sources => handle_page_normal(app, key),
    }
}

fn handle_chat_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        // Quit
        KeyCode::Char('q') => app.should_quit = true,

        // Start typing
        KeyCode::Char('i') | KeyCode::Char('/') => {
            app.input_mode = InputMode::Editing;
        }

        // Scroll chat, or move through example questions on a fresh chat
        KeyCode::Char('j') | KeyCode::Down => {
            if app.show_examples() {
                app.example_nav_down();
            } else {
                app.scroll_down();
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if app.show_examples() {
                app.example_nav_up();
            } else {
                app.scroll_up();
            }
        }
        KeyCode::Char('g') => app.chat_scroll = 0,
        KeyCode::Char('G') => app.scroll_chat_to_bottom(),

        // Submit the highlighted example question
        KeyCode::Enter => {
            if app.show_examples() {
                if let Some(question) = app.selected_example() {
                    app.submit(question.to_string());
                }
            }
        }

        // Clear chat history (ignored while a turn is in flight)
        KeyCode::Char('r') => app.reset_chat(),

        // Screen switching
        KeyCode::Char('a') => app.screen = Screen::About,
        KeyCode::Char('s') => app.screen = Screen::Sources,

        _ => {}
    }
}

fn handle_page_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Back to chat
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('c') => {
            app.screen = Screen::Chat;
        }

        KeyCode::Char('a') => app.screen = Screen::About,
        KeyCode::Char('s') => app.screen = Screen::Sources,

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }

        KeyCode::Enter => {
            if app.input.trim().is_empty() {
                // Empty input: submit the highlighted example on a fresh chat
                if app.show_examples() {
                    if let Some(question) = app.selected_example() {
                        app.submit(question.to_string());
                    }
                }
            } else if app.pending_turn.is_none() {
                let message = app.input.clone();
                app.input.clear();
                app.cursor = 0;
                app.submit(message);
            }
        }

        KeyCode::Char(c) => {
            let byte_idx = char_to_byte_index(&app.input, app.cursor);
            app.input.insert(byte_idx, c);
            app.cursor += 1;
        }
        KeyCode::Backspace => {
            if app.cursor > 0 {
                let byte_idx = char_to_byte_index(&app.input, app.cursor - 1);
                app.input.remove(byte_idx);
                app.cursor -= 1;
            }
        }
        KeyCode::Left => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            app.cursor = (app.cursor + 1).min(app.input.chars().count());
        }
        KeyCode::Home => app.cursor = 0,
        KeyCode::End => app.cursor = app.input.chars().count(),

        // Examples stay reachable while typing a fresh chat
        KeyCode::Down => {
            if app.show_examples() {
                app.example_nav_down();
            } else {
                app.scroll_down();
            }
        }
        KeyCode::Up => {
            if app.show_examples() {
                app.example_nav_up();
            } else {
                app.scroll_up();
            }
        }

        _ => {}
    }
}
