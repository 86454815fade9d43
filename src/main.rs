//! Impact Quiz - terminal questionnaire for video impact reports
//!
//! A Ratatui-based TUI that walks the respondent through a branching,
//! multi-step questionnaire and delivers the answers to a webhook.

mod app;
mod bridge;
mod config;
mod platform;
mod progress;
mod quiz;
mod state;
mod ui;

use anyhow::Result;
use app::App;
use config::QuizConfig;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "impact_quiz=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = QuizConfig::load()?;
    let mut app = App::new(&config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Handle any errors
    if let Err(err) = result {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    loop {
        app.poll_submissions();

        terminal.draw(|frame| ui::draw(frame, app))?;

        if let Some(key) = next_key().await? {
            if on_key(app, key)? {
                return Ok(());
            }
        }

        // Let finished submissions land before the next frame
        tokio::task::yield_now().await;
    }
}

/// Wait up to one poll interval for a key press, off the async workers
async fn next_key() -> Result<Option<KeyEvent>> {
    let event = tokio::task::spawn_blocking(|| -> Result<Option<Event>> {
        if event::poll(POLL_INTERVAL)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    })
    .await??;

    Ok(match event {
        Some(Event::Key(key)) if key.kind == KeyEventKind::Press => Some(key),
        _ => None,
    })
}

/// Route one key press. Returns true when the app should exit.
fn on_key(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Global quit: Ctrl+C
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Ok(true);
    }

    app.handle_key(key)?;
    Ok(app.should_quit())
}
