use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::Mutex;

use medsage::app::{App, AppScreen, SharedApp};
use medsage::{chat_view, config, key_handlers, logging};

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    config::initialize_config()?;
    let _logger = logging::init_logging(&config::get_config())?;

    let mut terminal = setup_terminal()?;
    let app: SharedApp = Arc::new(Mutex::new(App::new()));

    let result = run_app(&mut terminal, app).await;
    restore_terminal(&mut terminal)?;

    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app(terminal: &mut Tui, app: SharedApp) -> Result<()> {
    loop {
        {
            let mut guard = app.lock().await;
            if guard.screen == AppScreen::Quit {
                log::info!("leaving the chat");
                return Ok(());
            }

            if guard.status_indicator.is_busy() {
                guard.status_indicator.tick();
            }

            let screen = guard.screen;
            terminal.draw(|f| match screen {
                AppScreen::Chat => chat_view::draw_chat(f, &mut guard),
                AppScreen::QuitConfirm => chat_view::draw_quit_confirm(f),
                AppScreen::Quit => {}
            })?;
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let mut guard = app.lock().await;
                match guard.screen {
                    AppScreen::Chat => {
                        key_handlers::handle_chat_input(key, &mut guard, app.clone())
                    }
                    AppScreen::QuitConfirm => {
                        key_handlers::handle_quit_confirm_input(key, &mut guard)
                    }
                    AppScreen::Quit => {}
                }
            }
        }
    }
}
