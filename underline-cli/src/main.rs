//! Underline CLI - terminal reader with offset-anchored underlines

mod app;
mod cursor;
mod io;
mod ui;

use std::io::stdout;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use underline_core::PanelState;

use app::{App, Mode};

fn main() -> Result<()> {
    // Get file path from args
    let args: Vec<String> = std::env::args().collect();
    let file_path = args.get(1);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app
    let mut app = App::new();

    // Load document and its annotation sidecar if provided
    if let Some(path) = file_path {
        match load_into(&mut app, path) {
            Ok(()) => app.set_status(&format!("Loaded {}", path)),
            Err(e) => app.set_status(&format!("Error: {}", e)),
        }
    } else {
        app.set_status("No file loaded. Pass an XML document path as argument.");
    }

    // Main loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = res {
        eprintln!("Error: {}", e);
    }

    Ok(())
}

fn load_into(app: &mut App, path: &str) -> Result<()> {
    let (tree, title) = io::load_document(path)?;
    let sidecar = io::sidecar_path(&title)?;
    let annotations = io::load_annotations(&sidecar)?;
    app.load(title, tree, annotations);
    app.sidecar = Some(sidecar);
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    while app.running {
        terminal.draw(|f| ui::draw(f, app))?;

        if let Event::Key(key) = event::read()? {
            // Clear status on any key
            app.clear_status();

            // The panel's forms take the keyboard while visible
            match app.panel.state() {
                PanelState::QuickForm => handle_quick_form(app, key.code),
                PanelState::CommentForm => handle_comment_form(app, key.code),
                PanelState::Hidden => match app.mode {
                    Mode::Normal => handle_normal_mode(app, key.code),
                    Mode::Visual => handle_visual_mode(app, key.code),
                },
            }
        }
    }

    save_if_dirty(app);
    Ok(())
}

fn save_if_dirty(app: &mut App) {
    if !app.dirty {
        return;
    }
    let Some(path) = app.sidecar.clone() else {
        return;
    };
    match io::save_annotations(&path, &app.annotations) {
        Ok(()) => {
            app.dirty = false;
            app.set_status(&format!("Saved {}", path.display()));
        }
        Err(e) => app.set_status(&format!("Save failed: {}", e)),
    }
}

fn handle_normal_mode(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('q') => app.running = false,

        // Navigation
        KeyCode::Char('j') | KeyCode::Down => app.cursor.move_down(),
        KeyCode::Char('k') | KeyCode::Up => app.cursor.move_up(),
        KeyCode::Char('h') | KeyCode::Left => app.cursor.move_left(),
        KeyCode::Char('l') | KeyCode::Right => app.cursor.move_right(),
        KeyCode::Char('g') => app.cursor.move_to_top(),
        KeyCode::Char('G') => app.cursor.move_to_bottom(),
        KeyCode::Char('0') | KeyCode::Home => app.cursor.move_line_start(),
        KeyCode::Char('$') | KeyCode::End => app.cursor.move_line_end(),

        // Visual mode
        KeyCode::Char('v') => app.enter_visual(),

        // Marker activation ("click" on an underline)
        KeyCode::Enter => app.activate_marker_at_cursor(),

        // Save
        KeyCode::Char('s') => save_if_dirty(app),

        KeyCode::Esc => {
            app.active_range = None;
        }

        _ => {}
    }
}

fn handle_visual_mode(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => app.cancel_visual(),

        KeyCode::Char('j') | KeyCode::Down => app.cursor.move_down(),
        KeyCode::Char('k') | KeyCode::Up => app.cursor.move_up(),
        KeyCode::Char('h') | KeyCode::Left => app.cursor.move_left(),
        KeyCode::Char('l') | KeyCode::Right => app.cursor.move_right(),
        KeyCode::Char('0') | KeyCode::Home => app.cursor.move_line_start(),
        KeyCode::Char('$') | KeyCode::End => app.cursor.move_line_end(),

        // Pointer-release equivalent: run the capture protocol
        KeyCode::Char('u') | KeyCode::Enter => app.capture_selection(),

        _ => {}
    }
}

fn handle_quick_form(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Enter | KeyCode::Char('y') => app.submit_quick(),
        KeyCode::Esc => app.panel.hide(),
        _ => {}
    }
}

fn handle_comment_form(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Enter => app.submit_comment(),
        KeyCode::Esc => app.skip_comment(),
        KeyCode::Backspace => {
            app.input_buffer.pop();
        }
        KeyCode::Char(c) => app.input_buffer.push(c),
        _ => {}
    }
}
