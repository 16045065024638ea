//! # rowsel
//!
//! A terminal table of JSON rows with multi-row selection and bulk actions.

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
        MouseButton, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use rowsel::app_core::input::{AppKeyCode, AppKeyEvent, AppMouseEvent, AppMouseKind};
use rowsel::app_core::reducer;
use rowsel::app_core::state::{AppAction, AppState};
use rowsel::{data, theme, ui};
use serde_json::Value;
use simplelog::{Config, LevelFilter, WriteLogger};

use std::fs;
use std::io;
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = "rowsel: browse JSON rows in a terminal table, select several at once \
                  and run bulk actions on the selection."
)]
struct Args {
    /// JSON file holding an array of rows (or an object with a data/rows/result array)
    #[arg(short, long, conflicts_with_all = ["source", "url"])]
    file: Option<String>,

    /// Local directory of JSON files to source rows from
    #[arg(short, long, conflicts_with = "url")]
    source: Option<String>,

    /// HTTP endpoint returning JSON rows
    #[arg(short, long)]
    url: Option<String>,

    /// UI theme (dracula, solarized, gruvbox)
    #[arg(short, long)]
    theme: Option<String>,

    /// Log verbosity written to the log file (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", value_parser = parse_log_level)]
    log_level: LevelFilter,

    /// Show all paths used by the application (data, export, log)
    #[arg(long)]
    paths: bool,
}

// ---------------------------------------------------------------------------
// Crossterm → shared-reducer adapters
// ---------------------------------------------------------------------------

fn crossterm_to_app_key_event(
    code: KeyCode,
    modifiers: KeyModifiers,
    kind: KeyEventKind,
) -> Option<AppKeyEvent> {
    if matches!(kind, KeyEventKind::Release) {
        return None;
    }

    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    let shift = modifiers.contains(KeyModifiers::SHIFT);
    let super_key = modifiers.contains(KeyModifiers::SUPER);

    let key_code = match code {
        KeyCode::Char(c) => AppKeyCode::Char(c),
        KeyCode::Enter => AppKeyCode::Enter,
        KeyCode::Esc => AppKeyCode::Esc,
        KeyCode::Up => AppKeyCode::Up,
        KeyCode::Down => AppKeyCode::Down,
        KeyCode::Left => AppKeyCode::Left,
        KeyCode::Right => AppKeyCode::Right,
        KeyCode::Home => AppKeyCode::Home,
        KeyCode::End => AppKeyCode::End,
        KeyCode::PageUp => AppKeyCode::PageUp,
        KeyCode::PageDown => AppKeyCode::PageDown,
        KeyCode::Tab => AppKeyCode::Tab,
        KeyCode::BackTab => AppKeyCode::BackTab,
        _ => return None,
    };

    Some(AppKeyEvent {
        code: key_code,
        ctrl: ctrl || super_key,
        shift,
        is_release: false,
    })
}

fn crossterm_to_app_mouse_event(mouse: &event::MouseEvent) -> Option<AppMouseEvent> {
    let kind = match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => AppMouseKind::LeftDown,
        MouseEventKind::Drag(MouseButton::Left) => AppMouseKind::Drag,
        MouseEventKind::Up(MouseButton::Left) => AppMouseKind::LeftUp,
        MouseEventKind::ScrollUp => AppMouseKind::ScrollUp,
        MouseEventKind::ScrollDown => AppMouseKind::ScrollDown,
        MouseEventKind::Moved => AppMouseKind::Move,
        _ => return None,
    };
    Some(AppMouseEvent {
        kind,
        column: mouse.column,
        row: mouse.row,
        ctrl: mouse
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER),
        shift: mouse.modifiers.contains(KeyModifiers::SHIFT),
    })
}

fn handle_key_event(
    app: &mut AppState,
    code: KeyCode,
    modifiers: KeyModifiers,
    kind: KeyEventKind,
) {
    let Some(event) = crossterm_to_app_key_event(code, modifiers, kind) else {
        return;
    };
    reducer::handle_key_event(app, event);
}

fn handle_mouse_event(app: &mut AppState, mouse: event::MouseEvent) -> bool {
    let Some(app_event) = crossterm_to_app_mouse_event(&mouse) else {
        return false;
    };
    reducer::handle_mouse_event(app, app_event)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn parse_log_level(s: &str) -> Result<LevelFilter, String> {
    LevelFilter::from_str(s).map_err(|_| {
        format!(
            "Unknown log level: {} (expected off, error, warn, info, debug or trace)",
            s
        )
    })
}

fn init_logging(level: LevelFilter, data_dir: &std::path::Path) -> Result<()> {
    if level == LevelFilter::Off {
        return Ok(());
    }
    let log_file = fs::File::create(data_dir.join(data::LOG_FILE_NAME))?;
    WriteLogger::init(level, Config::default(), log_file)?;
    Ok(())
}

/// Loads rows from whichever source the arguments name, falling back to the
/// built-in sample. Returns the rows, a label for the table title, and any
/// per-file warnings.
fn load_rows(args: &Args) -> Result<(Vec<Value>, String, Vec<String>)> {
    let mut warnings = Vec::new();
    let (rows, label) = if let Some(file) = &args.file {
        (data::load_rows_from_file(file)?, file.clone())
    } else if let Some(source_dir) = &args.source {
        (
            data::load_rows_from_dir(source_dir, &mut warnings)?,
            source_dir.clone(),
        )
    } else if let Some(url) = &args.url {
        (data::fetch_rows(url)?, url.clone())
    } else {
        (data::sample_rows(), "sample".to_string())
    };
    Ok((rows, label, warnings))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Theme selection
    let theme_name = args.theme.as_deref().unwrap_or("dracula");
    let theme_enum = theme::Theme::from_str(theme_name).map_err(anyhow::Error::msg)?;
    let theme = theme_enum.config();

    let data_dir = data::get_data_dir()?;

    if args.paths {
        println!("App Paths:");
        println!("  Data:    {}", data_dir.display());
        println!(
            "  Export:  {}",
            data_dir.join(data::EXPORT_FILE_NAME).display()
        );
        println!("  Log:     {}", data_dir.join(data::LOG_FILE_NAME).display());
        return Ok(());
    }

    init_logging(args.log_level, &data_dir)?;

    let (rows, label, warnings) = load_rows(&args)?;
    log::info!("loaded {} rows from {}", rows.len(), label);

    let mut app = AppState::new(rows, theme, label, data_dir);
    app.source_warnings = warnings;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    app.selection.detach();
    process_actions(&mut app);
    res
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    terminal.draw(|f| ui::ui(f, app))?;

    loop {
        if app.should_quit {
            break;
        }

        match event::read()? {
            Event::Key(key) => {
                handle_key_event(app, key.code, key.modifiers, key.kind);
                process_actions(app);
                terminal.draw(|f| ui::ui(f, app))?;
            }
            Event::Mouse(mouse) => {
                let transitioned = handle_mouse_event(app, mouse);
                if process_actions(app) || transitioned {
                    terminal.draw(|f| ui::ui(f, app))?;
                }
            }
            Event::Resize(_, _) => {
                terminal.draw(|f| ui::ui(f, app))?;
            }
            _ => {}
        }
    }
    Ok(())
}

/// Runs queued actions until none are left; handling one may queue more.
/// Returns `true` if anything ran.
fn process_actions(app: &mut AppState) -> bool {
    let mut ran = false;
    loop {
        let actions = app.take_actions();
        if actions.is_empty() {
            return ran;
        }
        ran = true;
        for action in actions {
            handle_action(app, action);
        }
    }
}

fn handle_action(app: &mut AppState, action: AppAction) {
    match action {
        AppAction::SelectionChanged(ids) => app.note_selection_change(&ids),
        AppAction::Inspect(items) => app.open_inspect(items),
        AppAction::Export(items) => match data::export_items(&app.export_dir, &items) {
            Ok(path) => {
                log::info!("exported {} rows to {}", items.len(), path.display());
                app.status_message = Some(format!(
                    "Exported {} to {}",
                    items.len(),
                    path.display()
                ));
            }
            Err(err) => {
                log::error!("export failed: {:#}", err);
                app.status_message = Some(format!("Export failed: {}", err));
            }
        },
        AppAction::Remove(items) => app.remove_items(&items),
    }
    app.sync_view();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::MouseEvent;
    use serde_json::json;

    fn mouse_event(kind: MouseEventKind, modifiers: KeyModifiers) -> MouseEvent {
        MouseEvent {
            kind,
            column: 4,
            row: 7,
            modifiers,
        }
    }

    fn make_app(export_dir: std::path::PathBuf) -> AppState {
        AppState::new(
            vec![json!({"id": "a"}), json!({"id": "b"}), json!({"id": "c"})],
            theme::Theme::Dracula.config(),
            "test".to_string(),
            export_dir,
        )
    }

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("debug"), Ok(LevelFilter::Debug));
        assert_eq!(parse_log_level("OFF"), Ok(LevelFilter::Off));
        assert!(parse_log_level("loud").is_err());
    }

    #[test]
    fn test_key_adapter_maps_super_to_ctrl() {
        let event = crossterm_to_app_key_event(
            KeyCode::Char('a'),
            KeyModifiers::SUPER,
            KeyEventKind::Press,
        )
        .unwrap();
        assert!(event.ctrl);
        assert_eq!(event.code, AppKeyCode::Char('a'));
    }

    #[test]
    fn test_key_adapter_ignores_release_kind() {
        assert!(
            crossterm_to_app_key_event(KeyCode::Esc, KeyModifiers::NONE, KeyEventKind::Release)
                .is_none()
        );
        assert!(
            crossterm_to_app_key_event(KeyCode::F(1), KeyModifiers::NONE, KeyEventKind::Press)
                .is_none()
        );
    }

    #[test]
    fn test_mouse_adapter_kinds_and_modifiers() {
        let down = crossterm_to_app_mouse_event(&mouse_event(
            MouseEventKind::Down(MouseButton::Left),
            KeyModifiers::SHIFT,
        ))
        .unwrap();
        assert_eq!(down.kind, AppMouseKind::LeftDown);
        assert!(down.shift);
        assert!(!down.ctrl);
        assert_eq!((down.column, down.row), (4, 7));

        let drag = crossterm_to_app_mouse_event(&mouse_event(
            MouseEventKind::Drag(MouseButton::Left),
            KeyModifiers::CONTROL,
        ))
        .unwrap();
        assert_eq!(drag.kind, AppMouseKind::Drag);
        assert!(drag.ctrl);

        assert!(
            crossterm_to_app_mouse_event(&mouse_event(
                MouseEventKind::Down(MouseButton::Right),
                KeyModifiers::NONE,
            ))
            .is_none()
        );
    }

    #[test]
    fn test_space_key_toggles_through_runtime_handler() {
        let mut app = make_app(std::env::temp_dir());
        handle_key_event(
            &mut app,
            KeyCode::Char(' '),
            KeyModifiers::NONE,
            KeyEventKind::Press,
        );
        assert!(process_actions(&mut app));
        assert_eq!(app.selection.selected_ids(), vec!["a"]);
        assert!(!process_actions(&mut app));
    }

    #[test]
    fn test_export_action_writes_selection() {
        let dir = std::env::temp_dir().join(format!("rowsel-main-{}", std::process::id()));
        let mut app = make_app(dir.clone());
        app.selection.select_all();
        app.selection.invoke_button(1);
        process_actions(&mut app);

        let written = fs::read_to_string(dir.join(data::EXPORT_FILE_NAME)).unwrap();
        let value: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["rows"].as_array().map(Vec::len), Some(3));
        assert!(app.status_message.unwrap().starts_with("Exported 3"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_remove_action_drops_rows_and_clears_bar() {
        let mut app = make_app(std::env::temp_dir());
        app.selection.toggle("b");
        app.selection.invoke_button(2);
        process_actions(&mut app);

        assert_eq!(app.selection.len(), 2);
        assert!(app.selection.action_bar().is_none());
        assert!(!app.selection.is_selected("b"));
    }

    #[test]
    fn test_inspect_action_opens_modal() {
        let mut app = make_app(std::env::temp_dir());
        app.selection.toggle("c");
        app.selection.invoke_button(0);
        process_actions(&mut app);

        assert_eq!(app.inspect_items, Some(vec![json!({"id": "c"})]));
    }
}
