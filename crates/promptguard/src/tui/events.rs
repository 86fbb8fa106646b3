//! Event handling for the TUI.

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::runtime::Runtime as TokioRuntime;
use tracing::info;

use promptguard_client::{AnalysisSession, HealthMonitor};
use promptguard_core::ClientConfig;

use super::app::App;
use super::ui;

/// Result type for TUI operations.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Initialize the terminal for TUI mode.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the TUI event loop.
pub fn run(config: &ClientConfig) -> Result<()> {
    // The runtime must outlive the monitor and every spawned analyze call
    let runtime = TokioRuntime::new()?;
    let _guard = runtime.enter();

    let session = AnalysisSession::from_config(config)?;
    let monitor = HealthMonitor::start(session.backend(), config.poll_interval);
    info!(api_url = %config.api_url, "terminal view started");

    let mut app = App::new(session, monitor.subscribe(), runtime.handle().clone());

    // Setup terminal
    let mut terminal = setup_terminal()?;

    // Run event loop
    let result = run_loop(&mut terminal, &mut app);

    // Restore terminal
    let restored = restore_terminal(&mut terminal);

    runtime.block_on(monitor.stop());
    info!("terminal view stopped");

    result.and(restored)
}

/// Main event loop.
fn run_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(100);

    loop {
        // Apply finished analyses before drawing
        app.poll_completions();

        // Draw UI
        terminal.draw(|f| ui::draw(f, app))?;

        // Poll for events with timeout
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind == KeyEventKind::Press {
                    handle_key(app, key);
                }
            }
        }

        // Check if should quit
        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Dispatch one key press.
pub fn handle_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl {
        match key.code {
            KeyCode::Char('c') => app.should_quit = true,
            KeyCode::Char('r') => app.toggle_raw(),
            KeyCode::Char('t') => app.toggle_theme(),
            KeyCode::Char('s') => app.toggle_tech(),
            _ => {}
        }
        return;
    }

    if let KeyCode::F(n) = key.code {
        app.apply_function_key(n);
        return;
    }

    if key.code == KeyCode::Tab {
        app.toggle_history();
        return;
    }

    if app.prefs.history_open {
        // History panel has focus
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => app.history_select_up(),
            KeyCode::Down | KeyCode::Char('j') => app.history_select_down(),
            KeyCode::Enter => app.replay_selected(),
            KeyCode::Esc => {
                app.close_panel();
            }
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Enter => app.submit(),
        KeyCode::Char(c) => app.enter_char(c),
        KeyCode::Backspace => app.delete_char(),
        KeyCode::Left => app.move_cursor_left(),
        KeyCode::Right => app.move_cursor_right(),
        KeyCode::Home => app.move_cursor_home(),
        KeyCode::End => app.move_cursor_end(),
        KeyCode::Esc => {
            if !app.close_panel() {
                app.should_quit = true;
            }
        }
        _ => {}
    }
}
