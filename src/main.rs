//! userdesk binary entry point.
//!
//! Parses the command line, initializes the terminal in raw mode, runs the
//! TUI event loop against the configured API, and restores the terminal
//! state on exit.
//!
use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing_subscriber::EnvFilter;

mod api;
mod app;
mod ui;

/// TUI to manage users of a REST user-management API.
#[derive(Debug, Parser)]
#[command(name = "userdesk", version, about)]
struct Cli {
    /// Base URL of the user API.
    #[arg(long, env = "USERDESK_API_URL", default_value = "http://localhost:5000/api")]
    api_url: String,

    /// Theme configuration file (created with defaults if missing).
    #[arg(long, default_value = "theme.conf")]
    theme: String,

    /// Keybinding configuration file (created with defaults if missing).
    #[arg(long, default_value = "keybinds.conf")]
    keybinds: String,

    /// Write tracing output to this file (filtered by RUST_LOG).
    #[arg(long)]
    log_file: Option<String>,
}

/// Initialize a Crossterm-backed `ratatui` terminal in raw mode.
fn init_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Program entry point: run the TUI and report any top-level error to stderr.
fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging goes to a file: stderr would corrupt the alternate screen.
    if let Some(path) = &cli.log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open log file {path}"))?;
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::sync::Arc::new(file))
            .with_ansi(false)
            .init();
    }

    let client = api::ApiClient::new(&cli.api_url);
    let mut state = app::AppState::new(
        client.base_url().to_string(),
        app::Theme::load_or_init(&cli.theme),
        app::keymap::Keymap::load_or_init(&cli.keybinds),
    );

    let mut terminal = init_terminal().map_err(|e| anyhow::anyhow!("init terminal: {e}"))?;

    let res = app::run(&mut terminal, &mut state, &client);

    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .ok();
    terminal.show_cursor().ok();

    if let Err(err) = res {
        eprintln!("application error: {err}");
    }
    Ok(())
}
