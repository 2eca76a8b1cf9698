use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, AppScreen, SharedApp};
use crate::chat_view::submit_question;
use crate::config::get_config;

pub fn handle_chat_input(key: KeyEvent, app: &mut App, app_arc: SharedApp) {
    match key.code {
        KeyCode::Esc => {
            app.screen = AppScreen::QuitConfirm;
        }
        KeyCode::Enter => {
            let raw_input = app.chat_input.drain(..).collect::<String>();
            app.command_index = None;
            // The dispatcher owns the trim/empty check; a blank Enter is a
            // no-op task.
            let base_url = get_config().api_url;
            tokio::spawn(submit_question(app_arc, base_url, raw_input));
        }
        KeyCode::Up if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.history_prev();
        }
        KeyCode::Down if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.history_next();
        }
        KeyCode::PageUp => app.scroll_up(),
        KeyCode::PageDown => app.scroll_down(),
        KeyCode::End => app.scroll_to_bottom(),
        KeyCode::Backspace => {
            app.chat_input.pop();
        }
        KeyCode::Char(c) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                match c {
                    'c' => app.screen = AppScreen::QuitConfirm,
                    'u' => app.scroll_up(),
                    'd' => app.scroll_down(),
                    _ => {}
                }
            } else {
                app.chat_input.push(c);
            }
        }
        _ => {}
    }
}

pub fn handle_quit_confirm_input(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
            app.screen = AppScreen::Quit;
        }
        KeyCode::Char('n') | KeyCode::Esc => {
            app.screen = AppScreen::Chat;
        }
        _ => {}
    }
}
