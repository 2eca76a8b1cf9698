use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::api::ask_question;
use crate::app::{App, SharedApp};

pub fn draw_chat(f: &mut Frame, app: &mut App) {
    let size = f.area();
    let horizontal_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(2, 3), Constraint::Ratio(1, 3)])
        .margin(1)
        .split(size);

    let chat_vertical_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(horizontal_chunks[0]);

    draw_messages(f, app, chat_vertical_chunks[0]);

    app.status_indicator.render(f, chat_vertical_chunks[1]);

    draw_input(f, app, chat_vertical_chunks[2]);
    draw_logs(f, app, horizontal_chunks[1], size);
}

/// Scroll offset for the transcript pane: pinned to the maximum extent while
/// follow mode is on, clamped to it otherwise.
fn compute_scroll(total_lines: u16, viewport_height: u16, requested: u16, follow: bool) -> u16 {
    let max_scroll = total_lines.saturating_sub(viewport_height);
    if follow {
        max_scroll
    } else {
        requested.min(max_scroll)
    }
}

fn draw_messages(f: &mut Frame, app: &mut App, area: Rect) {
    let mut lines: Vec<Line<'static>> = Vec::new();
    for message in &app.chat_messages {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.extend(message.render(area));
    }

    // Messages arrive pre-wrapped to the pane width, so the line count is the
    // real display height and the bottom pin is exact.
    let total_lines = lines.len() as u16;
    app.chat_scroll = compute_scroll(total_lines, area.height, app.chat_scroll, app.follow_bottom);

    let msgs_para = Paragraph::new(lines)
        .style(Style::default())
        .block(Block::default());
    f.render_widget(msgs_para.scroll((app.chat_scroll, 0)), area);
}

fn draw_input(f: &mut Frame, app: &App, area: Rect) {
    let separator = "─".repeat(area.width as usize);
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            &separator,
            Style::default().fg(Color::DarkGray),
        ))),
        Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height: 1,
        },
    );

    // History browsing gets its own prefix so the mode is visible.
    let prefix = if app.command_index.is_some() {
        "⌃ "
    } else {
        "→ "
    };

    let prefix_style = if app.command_index.is_some() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let input = Line::from(vec![
        Span::styled(prefix, prefix_style),
        Span::styled(&app.chat_input, Style::default().fg(Color::White)),
    ]);

    let visible_width = area.width.saturating_sub(2);
    let text_width = app.chat_input.width() as u16;
    let scroll_offset = text_width.saturating_sub(visible_width);

    f.render_widget(
        Paragraph::new(input).scroll((0, scroll_offset)),
        Rect {
            x: area.x,
            y: area.y + 1,
            width: area.width,
            height: area.height - 2,
        },
    );

    if let Some(history_index) = app.command_index {
        let history_text = format!(
            " [History {}/{}] ",
            history_index + 1,
            app.command_history.len()
        );
        let indicator_width = history_text.len() as u16;
        let indicator_x = area.x + area.width - indicator_width;

        f.render_widget(
            Paragraph::new(Line::from(Span::styled(
                history_text,
                Style::default().fg(Color::Yellow).bg(Color::Black),
            ))),
            Rect {
                x: indicator_x,
                y: area.y + 1,
                width: indicator_width,
                height: 1,
            },
        );
    }

    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            &separator,
            Style::default().fg(Color::DarkGray),
        ))),
        Rect {
            x: area.x,
            y: area.y + area.height - 1,
            width: area.width,
            height: 1,
        },
    );

    let cursor_x = area.x + 2 + text_width.saturating_sub(scroll_offset);
    f.set_cursor_position((cursor_x, area.y + 1));
}

fn draw_logs(f: &mut Frame, app: &App, area: Rect, size: Rect) {
    let vsep = "│".repeat(size.height.saturating_sub(2) as usize);
    f.render_widget(
        Paragraph::new(Span::raw(vsep)).style(Style::default().fg(Color::DarkGray)),
        Rect {
            x: area.x.saturating_sub(1),
            y: 1,
            width: 1,
            height: size.height.saturating_sub(2),
        },
    );

    let log_lines: Vec<Line> = app
        .logs
        .entries
        .iter()
        .map(|entry| {
            Line::from(vec![
                Span::styled("• ", Style::default().fg(Color::DarkGray)),
                Span::raw(entry),
            ])
        })
        .collect();

    // The log pane always follows its newest entry.
    let total_log_lines = log_lines.len() as u16;
    let logs_scroll = compute_scroll(total_log_lines, area.height, 0, true);

    let logs_para = Paragraph::new(log_lines)
        .style(Style::default().fg(Color::DarkGray))
        .wrap(Wrap { trim: true });
    f.render_widget(logs_para.scroll((logs_scroll, 0)), area);
}

pub fn draw_quit_confirm(f: &mut Frame) {
    let area = f.area();
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Confirm Quit")
        .style(Style::default().fg(Color::LightYellow).bg(Color::Black));

    f.render_widget(block, area);

    let quit_text = "Leave the consultation?\n\nPress 'y' to quit or 'n' to keep chatting.";

    let paragraph = Paragraph::new(quit_text)
        .style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, area);
}

/// The query dispatcher: one exchange from submission to placeholder
/// overwrite. Runs as a spawned task so the event loop keeps drawing while
/// the request is on the wire.
pub async fn submit_question(app: SharedApp, base_url: String, raw_input: String) {
    let question = raw_input.trim().to_string();
    if question.is_empty() {
        return;
    }

    let exchange_id = {
        let mut guard = app.lock().await;
        let id = guard.begin_exchange(&question);
        guard.logs.add(format!("Asking: {}", question));
        id
    };

    log::info!("exchange {} opened for {:?}", exchange_id, question);
    let outcome = ask_question(&base_url, &question).await;

    let mut guard = app.lock().await;
    guard.complete_exchange(exchange_id, outcome);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat_message::MessageStatus;
    use crate::constants::ERROR_REPLY;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn shared_app() -> SharedApp {
        Arc::new(Mutex::new(App::new()))
    }

    #[test]
    fn test_follow_mode_pins_scroll_to_max_extent() {
        assert_eq!(compute_scroll(50, 20, 0, true), 30);
        assert_eq!(compute_scroll(50, 20, 7, true), 30);
    }

    #[test]
    fn test_manual_scroll_is_clamped_to_max_extent() {
        assert_eq!(compute_scroll(50, 20, 45, false), 30);
        assert_eq!(compute_scroll(50, 20, 12, false), 12);
    }

    #[test]
    fn test_short_transcript_never_scrolls() {
        assert_eq!(compute_scroll(5, 20, 3, false), 0);
        assert_eq!(compute_scroll(5, 20, 0, true), 0);
    }

    #[tokio::test]
    async fn test_whitespace_submission_appends_nothing() {
        let app = shared_app();
        submit_question(app.clone(), "http://127.0.0.1:1".to_string(), "   ".to_string()).await;

        let guard = app.lock().await;
        assert!(guard.chat_messages.is_empty());
        assert!(!guard.status_indicator.is_busy());
    }

    #[tokio::test]
    async fn test_successful_exchange_replaces_placeholder_with_answer() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ask"))
            .and(body_json(serde_json::json!({ "question": "hello" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "answer": "**hi**" })),
            )
            .mount(&mock_server)
            .await;

        let app = shared_app();
        submit_question(app.clone(), mock_server.uri(), "hello".to_string()).await;

        let guard = app.lock().await;
        assert_eq!(guard.chat_messages.len(), 2);
        assert!(guard.chat_messages[0].is_from_user());
        assert_eq!(guard.chat_messages[0].content(), "hello");
        assert_eq!(guard.chat_messages[1].content(), "**hi**");
        assert_eq!(guard.chat_messages[1].status(), MessageStatus::Delivered);
        assert!(!guard.status_indicator.is_busy());
        assert!(guard.follow_bottom);
    }

    #[tokio::test]
    async fn test_failed_exchange_replaces_placeholder_with_error_line() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ask"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let app = shared_app();
        submit_question(app.clone(), mock_server.uri(), "anything broken".to_string()).await;

        let guard = app.lock().await;
        assert_eq!(guard.chat_messages.len(), 2);
        assert_eq!(guard.chat_messages[1].content(), ERROR_REPLY);
        assert_eq!(guard.chat_messages[1].status(), MessageStatus::Failed);
    }

    #[tokio::test]
    async fn test_overlapping_exchanges_keep_their_own_placeholders() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ask"))
            .and(body_json(serde_json::json!({ "question": "slow question" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "answer": "slow answer" }))
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/ask"))
            .and(body_json(serde_json::json!({ "question": "fast question" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "answer": "fast answer" })),
            )
            .mount(&mock_server)
            .await;

        let app = shared_app();
        let slow = submit_question(app.clone(), mock_server.uri(), "slow question".to_string());
        let fast = submit_question(app.clone(), mock_server.uri(), "fast question".to_string());
        tokio::join!(slow, fast);

        let guard = app.lock().await;
        assert_eq!(guard.chat_messages.len(), 4);
        let slow_index = guard
            .chat_messages
            .iter()
            .position(|m| m.content() == "slow question")
            .unwrap();
        let fast_index = guard
            .chat_messages
            .iter()
            .position(|m| m.content() == "fast question")
            .unwrap();
        assert_eq!(guard.chat_messages[slow_index + 1].content(), "slow answer");
        assert_eq!(guard.chat_messages[fast_index + 1].content(), "fast answer");
        assert!(!guard.status_indicator.is_busy());
    }
}
