use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::constants::THINKING_STATUS;

const SPINNER_FRAMES: [&str; 4] = ["◐", "◓", "◑", "◒"];

/// The one-line strip between the transcript and the input: a spinner while
/// any exchange is in flight, plus an optional status text.
#[derive(Debug, Default)]
pub struct StatusIndicator {
    busy: bool,
    status_text: String,
    spinner_idx: usize,
}

impl StatusIndicator {
    pub fn new() -> Self {
        Self {
            busy: false,
            status_text: String::new(),
            spinner_idx: 0,
        }
    }

    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
        if !busy {
            self.status_text.clear();
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status_text = status.into();
    }

    /// Advances the spinner one frame; called once per draw tick.
    pub fn tick(&mut self) {
        self.spinner_idx = self.spinner_idx.wrapping_add(1);
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let spinner = if self.busy {
            SPINNER_FRAMES[self.spinner_idx % SPINNER_FRAMES.len()]
        } else {
            " "
        };

        let status_text = if !self.status_text.is_empty() {
            self.status_text.as_str()
        } else if self.busy {
            THINKING_STATUS
        } else {
            ""
        };

        let line = Line::from(vec![
            Span::styled(spinner, Style::default().fg(Color::Gray)),
            Span::raw(" "),
            Span::styled(status_text, Style::default().fg(Color::DarkGray)),
        ]);

        frame.render_widget(
            Paragraph::new(line).alignment(ratatui::layout::Alignment::Left),
            area,
        );
    }
}
