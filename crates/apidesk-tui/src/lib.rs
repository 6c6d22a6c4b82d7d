//! apidesk-tui: Terminal UI for the apidesk publisher console
//!
//! This crate provides the interactive layer, including:
//! - Overview screen with the API's description, overview, and servers
//! - Split editor/preview dialog for description and overview content
//! - Background fetch and save tasks polled by the event loop

mod app;
mod event;
mod screens;
mod tasks;
#[cfg(test)]
pub mod test_utils;
mod text;
mod ui;

use screens::Screen as ScreenTrait;

pub use app::{App, SaveRequest, Screen};
pub use event::{Action, Event, EventHandler};
pub use tasks::Backends;

use apidesk_engine::{ApiRecord, UserProfile};
use crossterm::{
    cursor::Show as ShowCursor,
    event::{DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::io::{self, stdout};
use tasks::Tasks;
use tracing::info;

/// RAII guard for terminal state restoration.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), DisableMouseCapture, LeaveAlternateScreen, ShowCursor);
    }
}

/// Run the TUI for one API.
///
/// Sets up the terminal, runs the event loop, and restores the terminal
/// on exit.
pub async fn run_tui(
    api: ApiRecord,
    user: UserProfile,
    backends: Backends,
) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!(api_id = %api.id, user = %user.username, "starting TUI");
    let mut app = App::new(api, user);

    // 4 Hz tick rate = 250ms
    let mut events = EventHandler::new(250);

    let result = run_loop(&mut terminal, &mut app, &mut events, &backends).await;

    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
    backends: &Backends,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut tasks = Tasks::default();

    loop {
        let size = terminal.size()?;
        app.resize_preview(screens::editor::preview_width(Rect::new(
            0,
            0,
            size.width,
            size.height,
        )));

        terminal.draw(|frame| {
            let area = frame.area();
            let buf = frame.buffer_mut();

            match app.screen {
                Screen::Overview => screens::overview::OverviewScreen.render(app, area, buf),
                Screen::Editor => screens::editor::EditorScreen.render(app, area, buf),
            }

            if app.show_help {
                screens::render_help_overlay(area, buf);
            }
        })?;

        tasks.spawn_pending(app, backends);

        if let Some(event) = events.next().await {
            match event {
                Event::Key(key) => {
                    if !(app.screen == Screen::Editor && handle_editor_key(app, key)) {
                        app.handle_action(event::key_to_action(key));
                    }
                }
                Event::Mouse(mouse) => {
                    use crossterm::event::MouseEventKind;
                    match mouse.kind {
                        MouseEventKind::ScrollUp => app.handle_action(Action::Up),
                        MouseEventKind::ScrollDown => app.handle_action(Action::Down),
                        _ => {}
                    }
                }
                Event::Tick => app.tick(),
                Event::Resize(_, _) => {}
            }
        }

        tasks.spawn_pending(app, backends);
        tasks.collect_finished(app).await;

        if app.should_quit {
            tasks.abort_all();
            break;
        }
    }

    Ok(())
}

/// Handle text input in the editor dialog.
/// Returns true if the key was consumed and should not become an action.
fn handle_editor_key(app: &mut App, key: KeyEvent) -> bool {
    if app.show_help || app.active().is_some_and(|e| e.is_saving()) {
        return false;
    }
    // Ctrl+S, Ctrl+C and friends go to the action handler.
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return false;
    }

    let input = &mut app.input_state;
    let edited = match key.code {
        KeyCode::Esc => return false,
        KeyCode::Char(c) => {
            input.insert(c);
            true
        }
        KeyCode::Enter => {
            input.insert('\n');
            true
        }
        KeyCode::Tab => {
            input.insert_str("  ");
            true
        }
        KeyCode::Backspace => {
            input.backspace();
            true
        }
        KeyCode::Delete => {
            input.delete();
            true
        }
        KeyCode::Left => {
            input.move_left();
            false
        }
        KeyCode::Right => {
            input.move_right();
            false
        }
        KeyCode::Up => {
            input.move_up();
            false
        }
        KeyCode::Down => {
            input.move_down();
            false
        }
        KeyCode::Home => {
            input.move_home();
            false
        }
        KeyCode::End => {
            input.move_end();
            false
        }
        _ => return false,
    };
    // Cursor moves leave the draft and its cached preview alone.
    if edited {
        app.sync_draft();
    }
    true
}

/// Get the TUI version.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
