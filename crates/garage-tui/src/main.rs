//! Garage - a terminal console for managing cars and their owners.
//!
//! This application provides a fast, keyboard-driven interface over the
//! Garage REST backend: searchable card grids for cars and owners, create,
//! edit and delete forms, and a statistics dashboard.

mod app;
mod pages;
mod ui;

use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::future::join;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::{App, AppState};
use garage_core::{ApiClient, Config};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

const LOG_FILE: &str = "garage.log";

const USAGE: &str = "\
garage - car and owner administration console

USAGE:
    garage [--check | --help]

OPTIONS:
    --check    Query the backend's /hello and /api/status and exit
    --help     Print this message

ENVIRONMENT:
    GARAGE_API_BASE_URL    Backend URL (default http://127.0.0.1:8000)
    GARAGE_USER            Name shown in the title bar
    RUST_LOG               Log filter (default warn)";

/// Initialize tracing to a daily log file, since the TUI owns the terminal.
///
/// The returned guard must be kept alive for buffered lines to be flushed.
fn init_tracing(log_dir: &Path) -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();
    guard
}

fn init_stderr_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn load_config() -> Config {
    match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: failed to load config, using defaults: {:#}", e);
            Config::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("--help") | Some("-h") => {
            println!("{}", USAGE);
            return Ok(());
        }
        Some("--check") => {
            init_stderr_tracing();
            return check_backend(&load_config()).await;
        }
        Some(other) => {
            eprintln!("Unknown argument: {}\n\n{}", other, USAGE);
            std::process::exit(2);
        }
        None => {}
    }

    let config = load_config();
    let log_dir = config
        .cache_dir()
        .unwrap_or_else(|_| std::path::PathBuf::from("./cache"));
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create {}", log_dir.display()))?;
    let _log_guard = init_tracing(&log_dir);
    info!("Garage starting");

    // Create app
    let mut app = App::new(config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    app.shutdown();

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("Garage shutting down");
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        // Start fetches for whatever the current view observes
        app.on_tick();

        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Key releases are reported on some platforms
                if key.kind == KeyEventKind::Press {
                    // Ctrl+C to quit
                    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        return Ok(());
                    }

                    if handle_input(app, key) {
                        return Ok(());
                    }
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

/// Print the backend greeting and status, then exit.
async fn check_backend(config: &Config) -> Result<()> {
    let base_url = config.base_url();
    let api = ApiClient::new(&base_url)
        .with_context(|| format!("Invalid backend URL: {}", base_url))?;

    println!("Backend: {}", api.base_url());
    let (hello, status) = join(api.hello(), api.status()).await;

    match hello {
        Ok(message) => println!("  /hello       {}", message),
        Err(e) => warn!(error = %e, "Hello request failed"),
    }
    let status = status.with_context(|| format!("Backend at {} is not reachable", base_url))?;
    println!(
        "  /api/status  {} ({} {}, {})",
        status.status, status.app, status.version, status.timestamp
    );
    Ok(())
}
