//! Keyboard input handling for the TUI.
//!
//! This module translates key events into application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{App, AppState};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::F(1) | KeyCode::Enter) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    handle_screen_input(app, key);
    Ok(false)
}

fn handle_screen_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::F(1) => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Down | KeyCode::Tab => {
            app.screen.focus_next();
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.screen.focus_prev();
        }
        KeyCode::Enter => {
            app.activate();
        }
        KeyCode::Backspace => {
            app.screen.pop_char();
        }
        KeyCode::Char(c) => {
            // Ignored unless a field has focus
            app.screen.push_char(c);
        }
        _ => {}
    }
}
