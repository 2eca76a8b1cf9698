use chrono::{DateTime, Local};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use uuid::Uuid;

use crate::constants::{BOT_LABEL, ERROR_REPLY, PLACEHOLDER_REPLY, USER_LABEL};
use crate::markdown;

#[derive(Debug, Clone)]
pub struct ChatMessage {
    content: String,
    from_user: bool,
    timestamp: DateTime<Local>,
    status: MessageStatus,
    exchange_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStatus {
    /// A placeholder still waiting for the service to answer.
    Pending,
    Delivered,
    Failed,
}

impl ChatMessage {
    pub fn user(content: String) -> Self {
        Self {
            content,
            from_user: true,
            timestamp: Local::now(),
            status: MessageStatus::Delivered,
            exchange_id: None,
        }
    }

    pub fn bot(content: String) -> Self {
        Self {
            content,
            from_user: false,
            timestamp: Local::now(),
            status: MessageStatus::Delivered,
            exchange_id: None,
        }
    }

    /// The temporary bot entry shown while an exchange is in flight. Carries
    /// the exchange id so the completion path can find it again.
    pub fn placeholder(exchange_id: Uuid) -> Self {
        Self {
            content: PLACEHOLDER_REPLY.to_string(),
            from_user: false,
            timestamp: Local::now(),
            status: MessageStatus::Pending,
            exchange_id: Some(exchange_id),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_from_user(&self) -> bool {
        self.from_user
    }

    pub fn status(&self) -> MessageStatus {
        self.status
    }

    pub fn exchange_id(&self) -> Option<Uuid> {
        self.exchange_id
    }

    /// Overwrites the bubble with the service's answer.
    pub fn resolve(&mut self, answer: String) {
        self.content = answer;
        self.status = MessageStatus::Delivered;
    }

    /// Overwrites the bubble with the fixed error line.
    pub fn fail(&mut self) {
        self.content = ERROR_REPLY.to_string();
        self.status = MessageStatus::Failed;
    }

    pub fn render(&self, area: Rect) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        let base_style = self.get_base_style();

        self.render_header(&mut lines, base_style);
        self.render_content(&mut lines, area, base_style);
        self.render_footer(&mut lines, base_style);

        lines
    }

    fn get_base_style(&self) -> Style {
        let mut style = Style::default().fg(if self.from_user {
            Color::Rgb(255, 223, 128)
        } else {
            Color::Rgb(144, 238, 144)
        });

        match self.status {
            MessageStatus::Failed => style = style.fg(Color::Red).add_modifier(Modifier::DIM),
            MessageStatus::Pending => style = style.add_modifier(Modifier::DIM),
            MessageStatus::Delivered => {}
        }

        style
    }

    fn render_header(&self, lines: &mut Vec<Line<'static>>, style: Style) {
        let label = if self.from_user { USER_LABEL } else { BOT_LABEL };
        let timestamp = self.timestamp.format("%H:%M").to_string();
        let status_icon = self.get_status_icon();
        let indent = self.indent();

        lines.push(Line::from(vec![
            Span::styled(indent.to_string(), style),
            Span::styled("┌─".to_string(), style),
            Span::styled(label.to_string(), style.add_modifier(Modifier::BOLD)),
            Span::styled(" ".to_string(), style),
            Span::styled(timestamp, style.add_modifier(Modifier::DIM)),
            Span::styled(" ".to_string(), style),
            Span::styled(status_icon, style),
        ]));
    }

    fn render_content(&self, lines: &mut Vec<Line<'static>>, area: Rect, style: Style) {
        let indent = self.indent();
        let wrap_width = (area.width as usize).saturating_sub(4);

        for body_line in markdown::render_text(&self.content, wrap_width, style) {
            let mut spans = vec![
                Span::styled(indent.to_string(), style),
                Span::styled("│ ".to_string(), style),
            ];
            spans.extend(body_line.spans);
            lines.push(Line::from(spans));
        }
    }

    fn render_footer(&self, lines: &mut Vec<Line<'static>>, style: Style) {
        lines.push(Line::from(vec![
            Span::styled(self.indent().to_string(), style),
            Span::styled("╰─".to_string(), style),
        ]));
    }

    fn indent(&self) -> &'static str {
        if self.from_user {
            "  "
        } else {
            ""
        }
    }

    fn get_status_icon(&self) -> String {
        match self.status {
            MessageStatus::Pending => "○".to_string(),
            MessageStatus::Delivered => "●".to_string(),
            MessageStatus::Failed => "✗".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> Rect {
        Rect::new(0, 0, 60, 20)
    }

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_user_message_header_carries_static_label() {
        let message = ChatMessage::user("what helps a sore throat".to_string());
        let lines = message.render(area());
        assert!(line_text(&lines[0]).contains(USER_LABEL));
        assert!(!line_text(&lines[0]).contains("sore throat"));
    }

    #[test]
    fn test_bot_message_header_carries_ai_label() {
        let message = ChatMessage::bot("rest and fluids".to_string());
        let lines = message.render(area());
        assert!(line_text(&lines[0]).contains(BOT_LABEL));
    }

    #[test]
    fn test_placeholder_is_pending_with_fixed_text() {
        let id = Uuid::new_v4();
        let message = ChatMessage::placeholder(id);
        assert_eq!(message.status(), MessageStatus::Pending);
        assert_eq!(message.content(), PLACEHOLDER_REPLY);
        assert_eq!(message.exchange_id(), Some(id));
        assert!(!message.is_from_user());
    }

    #[test]
    fn test_resolve_overwrites_content_in_place() {
        let mut message = ChatMessage::placeholder(Uuid::new_v4());
        message.resolve("drink plenty of water".to_string());
        assert_eq!(message.content(), "drink plenty of water");
        assert_eq!(message.status(), MessageStatus::Delivered);
    }

    #[test]
    fn test_fail_overwrites_with_fixed_error_line() {
        let mut message = ChatMessage::placeholder(Uuid::new_v4());
        message.fail();
        assert_eq!(message.content(), ERROR_REPLY);
        assert_eq!(message.status(), MessageStatus::Failed);
    }

    #[test]
    fn test_bold_answer_renders_a_bold_span() {
        let message = ChatMessage::bot("take **ibuprofen** with food".to_string());
        let lines = message.render(area());
        let has_bold = lines.iter().any(|line| {
            line.spans.iter().any(|span| {
                span.content.as_ref() == "ibuprofen"
                    && span.style.add_modifier.contains(Modifier::BOLD)
            })
        });
        assert!(has_bold);
    }

    #[test]
    fn test_newlines_split_body_lines() {
        let message = ChatMessage::bot("first\nsecond".to_string());
        let lines = message.render(area());
        // header + two body lines + footer
        assert_eq!(lines.len(), 4);
        assert!(line_text(&lines[1]).ends_with("first"));
        assert!(line_text(&lines[2]).ends_with("second"));
    }
}
