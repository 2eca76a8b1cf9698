use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::chat_message::ChatMessage;
use crate::config::get_config;
use crate::errors::MedsageResult;
use crate::logging::LogBuffer;
use crate::status_indicator::StatusIndicator;

pub type SharedApp = Arc<Mutex<App>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppScreen {
    Chat,
    QuitConfirm,
    Quit,
}

pub struct App {
    pub screen: AppScreen,
    pub chat_messages: Vec<ChatMessage>,
    pub chat_input: String,
    pub chat_scroll: u16,
    pub follow_bottom: bool,
    pub command_history: Vec<String>,
    pub command_index: Option<usize>,
    pub in_flight: usize,
    pub status_indicator: StatusIndicator,
    pub logs: LogBuffer,
    history_limit: usize,
}

impl App {
    pub fn new() -> App {
        App {
            screen: AppScreen::Chat,
            chat_messages: Vec::new(),
            chat_input: String::new(),
            chat_scroll: 0,
            follow_bottom: true,
            command_history: Vec::new(),
            command_index: None,
            in_flight: 0,
            status_indicator: StatusIndicator::new(),
            logs: LogBuffer::new(),
            history_limit: get_config().history_limit,
        }
    }

    /// Opens a new exchange: appends the user's message and a pending
    /// placeholder carrying a fresh exchange id, and marks the indicator
    /// busy. The caller has already trimmed and non-empty-checked `question`.
    pub fn begin_exchange(&mut self, question: &str) -> Uuid {
        let exchange_id = Uuid::new_v4();

        self.push_history(question.to_string());
        self.chat_messages
            .push(ChatMessage::user(question.to_string()));
        self.chat_messages
            .push(ChatMessage::placeholder(exchange_id));

        self.in_flight += 1;
        self.status_indicator.set_busy(true);
        self.follow_bottom = true;

        exchange_id
    }

    /// Closes an exchange: overwrites the placeholder that carries
    /// `exchange_id` with the answer or the fixed error line. Resolution is
    /// by id, so overlapping exchanges each hit their own placeholder no
    /// matter which finishes first.
    pub fn complete_exchange(&mut self, exchange_id: Uuid, outcome: MedsageResult<String>) {
        match self
            .chat_messages
            .iter_mut()
            .find(|message| message.exchange_id() == Some(exchange_id))
        {
            Some(placeholder) => match outcome {
                Ok(answer) => {
                    placeholder.resolve(answer);
                    self.logs.add("Answer received".to_string());
                }
                Err(e) => {
                    log::error!("exchange {} failed: {}", exchange_id, e);
                    placeholder.fail();
                    self.logs.add(format!("Exchange failed: {}", e));
                }
            },
            None => {
                log::warn!("no placeholder found for exchange {}", exchange_id);
                self.logs
                    .add(format!("Dropped result for unknown exchange {}", exchange_id));
            }
        }

        self.in_flight = self.in_flight.saturating_sub(1);
        if self.in_flight == 0 {
            self.status_indicator.set_busy(false);
        }
        self.follow_bottom = true;
    }

    fn push_history(&mut self, question: String) {
        self.command_history.push(question);
        if self.command_history.len() > self.history_limit {
            self.command_history.remove(0);
        }
        self.command_index = None;
    }

    /// Ctrl+Up: walk the input history towards older entries.
    pub fn history_prev(&mut self) {
        if self.command_history.is_empty() {
            return;
        }
        let index = match self.command_index {
            None => self.command_history.len() - 1,
            Some(0) => 0,
            Some(i) => i - 1,
        };
        self.command_index = Some(index);
        self.chat_input = self.command_history[index].clone();
    }

    /// Ctrl+Down: walk back towards the newest entry, then an empty prompt.
    pub fn history_next(&mut self) {
        let Some(index) = self.command_index else {
            return;
        };
        if index + 1 < self.command_history.len() {
            self.command_index = Some(index + 1);
            self.chat_input = self.command_history[index + 1].clone();
        } else {
            self.command_index = None;
            self.chat_input.clear();
        }
    }

    pub fn scroll_up(&mut self) {
        self.follow_bottom = false;
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.follow_bottom = false;
        self.chat_scroll = self.chat_scroll.saturating_add(1);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow_bottom = true;
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
