//! Input handling. Maps key and wheel events to state mutations.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::config::{Action, KeyBind};

use super::settings::{SettingsItem, SETTINGS_ITEMS};
use super::state::{ActiveView, AppState, ROTATION_STEP, ZOOM_STEP};

/// Total selectable rows in the controls submenu (actions + "Reset").
pub fn controls_item_count() -> usize {
    Action::ALL.len() + 1
}

/// Process a key event, dispatching based on the active view.
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    // Ctrl+c always quits, regardless of view.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    match state.active_view {
        ActiveView::Strip => handle_strip_key(state, key),
        ActiveView::SettingsMenu => handle_settings_key(state, key),
        ActiveView::ControlsSubmenu if state.awaiting_rebind => handle_rebind_key(state, key),
        ActiveView::ControlsSubmenu => handle_controls_key(state, key),
    }
}

/// Mouse wheel steps through the strip.
pub fn handle_wheel(state: &mut AppState, direction: i8) {
    if state.active_view != ActiveView::Strip {
        return;
    }
    let selected = state.strip.selected;
    match direction {
        d if d < 0 => state.select(selected.saturating_sub(1)),
        d if d > 0 => state.select(selected + 1),
        _ => {}
    }
}

// ── Strip view (configurable bindings) ──────────────────────────

fn handle_strip_key(state: &mut AppState, key: KeyEvent) {
    let Some(action) = state.config.match_key(key) else {
        return;
    };

    let selected = state.strip.selected;
    let coverflow = state.config.coverflow;
    match action {
        Action::PrevCard => state.select(selected.saturating_sub(1)),
        Action::NextCard => state.select(selected + 1),
        Action::FirstCard => state.select(0),
        Action::LastCard => state.select(state.entries.len().saturating_sub(1)),
        Action::RotateMore => {
            state.set_max_rotation_angle(coverflow.max_rotation_angle() + ROTATION_STEP)
        }
        Action::RotateLess => {
            state.set_max_rotation_angle(coverflow.max_rotation_angle() - ROTATION_STEP)
        }
        // A more negative zoom pushes the middle card toward the eye.
        Action::ZoomIn => state.set_max_zoom(coverflow.max_zoom() - ZOOM_STEP),
        Action::ZoomOut => state.set_max_zoom(coverflow.max_zoom() + ZOOM_STEP),
        Action::OpenSettings => {
            state.active_view = ActiveView::SettingsMenu;
            state.settings_selected = 0;
        }
        Action::Quit => state.should_quit = true,
    }
}

// ── Settings menu ───────────────────────────────────────────────

fn handle_settings_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            state.active_view = ActiveView::Strip;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.settings_selected = state.settings_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.settings_selected + 1 < SETTINGS_ITEMS.len() {
                state.settings_selected += 1;
            }
        }
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => {
            match SETTINGS_ITEMS.get(state.settings_selected) {
                Some(SettingsItem::Submenu { view, .. }) => {
                    state.active_view = *view;
                    state.controls_selected = 0;
                }
                Some(SettingsItem::Cycle { cycle, .. }) => cycle(state),
                None => {}
            }
        }
        _ => {}
    }
}

// ── Controls submenu ────────────────────────────────────────────

fn handle_controls_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            state.active_view = ActiveView::Strip;
        }
        KeyCode::Left | KeyCode::Char('h') => {
            state.active_view = ActiveView::SettingsMenu;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.controls_selected = state.controls_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.controls_selected + 1 < controls_item_count() {
                state.controls_selected += 1;
            }
        }
        KeyCode::Enter => {
            if state.controls_selected < Action::ALL.len() {
                state.awaiting_rebind = true;
            } else {
                state.config.reset_defaults();
                state.persist_config();
                state.status_message = Some("Key bindings reset".into());
            }
        }
        KeyCode::Delete | KeyCode::Backspace => {
            if let Some(&action) = Action::ALL.get(state.controls_selected) {
                state.config.bindings.insert(action, Vec::new());
                state.persist_config();
            }
        }
        _ => {}
    }
}

fn handle_rebind_key(state: &mut AppState, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.code == KeyCode::Esc {
        state.awaiting_rebind = false;
        return;
    }

    let Some(&action) = Action::ALL.get(state.controls_selected) else {
        state.awaiting_rebind = false;
        return;
    };
    state.config.add_binding(action, KeyBind::from_key_event(key));
    state.persist_config();
    state.awaiting_rebind = false;
}
