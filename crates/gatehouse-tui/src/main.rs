//! Gatehouse - a terminal client for an email/password account service.
//!
//! Login, sign-up, password recovery and account confirmation screens,
//! plus a protected home screen gated on the rehydrated session.

mod app;
mod cli;
mod ui;

use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gatehouse_core::config::Config;

use app::{App, AppState};
use cli::Command;
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Log file written while the terminal is owned by the UI
const LOG_FILE: &str = "gatehouse.log";

fn env_filter() -> EnvFilter {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to stderr, for the non-interactive commands.
fn init_tracing_stderr() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter())
        .init();
}

/// Log to a file in `log_dir`. The returned guard flushes on drop.
fn init_tracing_file(log_dir: &Path) -> Result<WorkerGuard> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter())
        .init();
    Ok(guard)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().collect();
    let command = cli::parse_args(&args)?;

    let route = match command {
        Command::Run { route } => route,
        Command::Help => {
            cli::print_help();
            return Ok(());
        }
        other => {
            init_tracing_stderr();
            let config = Config::load().context("Failed to load configuration")?;
            return cli::run(other, &config).await;
        }
    };

    let config = Config::load().context("Failed to load configuration")?;
    let _log_guard = init_tracing_file(&config.cache_dir()?)?;
    info!("Gatehouse starting");

    let mut app = App::new(&config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.start_bootstrap();
    app.navigate(route);

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        warn!(error = %e, "Event loop failed");
        eprintln!("Error: {}", e);
    }

    info!("Gatehouse shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let mut events = EventStream::new();
    let mut task_rx = app
        .take_task_receiver()
        .context("Task receiver already taken")?;
    let mut session_rx = app.store.subscribe();

    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    // Ctrl+C to quit
                    if key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL)
                    {
                        return Ok(());
                    }
                    if handle_input(app, key)? {
                        return Ok(());
                    }
                }
                // Resize and the like only need a redraw.
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(()),
            },
            Some(result) = task_rx.recv() => app.process_task_result(result),
            Ok(()) = session_rx.changed() => app.enforce_guard(),
        }

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
