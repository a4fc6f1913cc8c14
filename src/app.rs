use std::time::Duration;

use anyhow::Result;
use ratatui::widgets::ListState;
use tokio::task::JoinHandle;

use crate::api::{ApiError, ChatBackend, ChatClient};
use crate::config::Settings;
use crate::session::Session;

/// Canned starter questions, shown while the conversation is empty.
pub const EXAMPLE_QUESTIONS: &[&str] = &[
    "What undergraduate programs are in the College of Science and Engineering?",
    "Who is the dean of the Archer College of Health and Human Services?",
    "What are the admission requirements for new students?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Chat,
    About,
    Sources,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,

    // Conversation state
    pub session: Session,
    pub pending_turn: Option<JoinHandle<Result<String, ApiError>>>,

    // Input box state
    pub input: String,
    pub cursor: usize, // cursor position in input, in chars

    // Chat viewport state
    pub chat_scroll: u16,
    pub chat_height: u16, // inner height of chat area, set during render
    pub chat_width: u16,  // inner width of chat area, for wrap calculations

    // Example questions list (empty conversation only)
    pub example_state: ListState,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Backend
    pub client: ChatClient,
    pub settings: Settings,
}

impl App {
    pub fn new(settings: Settings) -> Result<Self> {
        let client = ChatClient::new(
            &settings.api_base_url,
            Duration::from_secs(settings.timeout_secs),
        )?;

        let mut example_state = ListState::default();
        example_state.select(Some(0));

        Ok(Self {
            should_quit: false,
            screen: Screen::Chat,
            input_mode: InputMode::Editing,

            session: Session::new(),
            pending_turn: None,

            input: String::new(),
            cursor: 0,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            example_state,

            animation_frame: 0,

            client,
            settings,
        })
    }

    /// Example questions are only offered for a fresh conversation.
    pub fn show_examples(&self) -> bool {
        self.session.messages().is_empty() && !self.session.is_awaiting()
    }

    /// Starts a turn: records the user message and fires the backend call as
    /// a background task. Ignored while another turn is in flight or when
    /// the message is blank.
    pub fn submit(&mut self, message: String) {
        if self.pending_turn.is_some() || !self.session.begin_turn(&message) {
            return;
        }

        self.scroll_chat_to_bottom();

        let client = self.client.clone();
        self.pending_turn = Some(tokio::spawn(async move { client.send(&message).await }));
    }

    /// Resolves the in-flight turn once its task has finished. Called every
    /// pass of the main loop; the tick event guarantees it runs even when no
    /// keys arrive.
    pub async fn poll_turn(&mut self) {
        let finished = self
            .pending_turn
            .as_ref()
            .is_some_and(|task| task.is_finished());
        if !finished {
            return;
        }

        if let Some(task) = self.pending_turn.take() {
            let result = match task.await {
                Ok(result) => result,
                Err(e) => Err(ApiError::Transport(format!("chat task failed: {}", e))),
            };
            self.session.complete_turn(result);
            self.scroll_chat_to_bottom();
        }
    }

    /// Clears the conversation. Refused while a turn is in flight (the
    /// session guards this too).
    pub fn reset_chat(&mut self) {
        if self.pending_turn.is_some() {
            return;
        }
        self.session.reset();
        self.chat_scroll = 0;
        self.example_state.select(Some(0));
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.is_awaiting() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Chat scrolling
    pub fn scroll_down(&mut self) {
        let max_scroll = self
            .transcript_line_count()
            .saturating_sub(self.chat_height);
        if self.chat_scroll < max_scroll {
            self.chat_scroll = self.chat_scroll.saturating_add(1);
        }
    }

    pub fn scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_chat_to_bottom(&mut self) {
        let total_lines = self.transcript_line_count();

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        if total_lines > visible_height {
            self.chat_scroll = total_lines.saturating_sub(visible_height);
        } else {
            self.chat_scroll = 0;
        }
    }

    /// Estimates how many lines the transcript occupies at the current chat
    /// width, wrapping included, so scrolling can pin to the bottom.
    fn transcript_line_count(&self) -> u16 {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in self.session.messages() {
            total_lines += 1; // Role line ("You:" or "Bot:")
            for line in msg.content.lines() {
                // Character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1;
                } else {
                    total_lines += ((char_count / wrap_width) + 1) as u16;
                }
            }
            total_lines += 1; // Blank line after message
        }

        if self.session.is_awaiting() {
            total_lines += 2; // "Bot:" + "Thinking..."
        }

        if let Some(error) = self.session.last_error() {
            total_lines += 1 + ((error.chars().count() / wrap_width) + 1) as u16;
        }

        total_lines
    }

    // Example question list navigation
    pub fn example_nav_down(&mut self) {
        let len = EXAMPLE_QUESTIONS.len();
        if len > 0 {
            let i = self.example_state.selected().unwrap_or(0);
            self.example_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn example_nav_up(&mut self) {
        let i = self.example_state.selected().unwrap_or(0);
        self.example_state.select(Some(i.saturating_sub(1)));
    }

    pub fn selected_example(&self) -> Option<&'static str> {
        self.example_state
            .selected()
            .and_then(|i| EXAMPLE_QUESTIONS.get(i).copied())
    }
}
