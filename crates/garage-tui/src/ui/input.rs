//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes. Network work is only ever started through
//! `App` methods, which spawn background tasks.

use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{App, AppState, Tab, PAGE_SCROLL_SIZE};
use crate::pages::{DashboardPage, Modal};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return false;
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return true;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return false;
    }

    // Page modals capture all keys while open
    if app.any_modal_open() {
        match app.current_tab {
            Tab::Cars => handle_cars_modal(app, key),
            Tab::Owners => handle_owners_modal(app, key),
            Tab::Dashboard => {}
        }
        return false;
    }

    if matches!(app.state, AppState::Searching) {
        handle_search_input(app, key);
        return false;
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return false;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return false;
        }
        KeyCode::Char('1') => app.current_tab = Tab::Cars,
        KeyCode::Char('2') => app.current_tab = Tab::Owners,
        KeyCode::Char('3') => app.current_tab = Tab::Dashboard,
        KeyCode::Left => app.current_tab = app.current_tab.prev(),
        KeyCode::Right => app.current_tab = app.current_tab.next(),
        KeyCode::Char('r') => app.refresh_current(),
        KeyCode::Char('t') => app.services.theme = app.services.theme.toggle(),
        KeyCode::Char('x') => app.services.notifications.dismiss(),
        KeyCode::Char('/') if app.current_tab != Tab::Dashboard => {
            app.state = AppState::Searching;
        }
        _ => match app.current_tab {
            Tab::Cars => handle_cars_input(app, key),
            Tab::Owners => handle_owners_input(app, key),
            Tab::Dashboard => handle_dashboard_input(app, key),
        },
    }

    false
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    let Some(term) = app.search_term().map(str::to_string) else {
        app.state = AppState::Normal;
        return;
    };

    match key.code {
        KeyCode::Enter => {
            app.state = AppState::Normal;
            app.persist_search_terms();
        }
        KeyCode::Esc => {
            app.set_search_term("");
            app.state = AppState::Normal;
            app.persist_search_terms();
        }
        KeyCode::Backspace => {
            let mut term = term;
            term.pop();
            app.set_search_term(term);
        }
        KeyCode::Char(c) => app.set_search_term(format!("{}{}", term, c)),
        _ => {}
    }
}

/// Selection movement shared by the list tabs. Returns true if handled.
fn handle_navigation(selection: &mut dyn FnMut(isize), key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => selection(-1),
        KeyCode::Down | KeyCode::Char('j') => selection(1),
        KeyCode::PageUp => selection(-PAGE_SCROLL_SIZE),
        KeyCode::PageDown => selection(PAGE_SCROLL_SIZE),
        _ => return false,
    }
    true
}

fn handle_cars_input(app: &mut App, key: KeyEvent) {
    let len = app.cars.list.view(&app.car_cache).items().len();
    let list = &mut app.cars.list;
    if handle_navigation(&mut |delta| list.move_selection(delta, len), key) {
        return;
    }

    let selected = app.cars.list.selected(&app.car_cache).cloned();
    match key.code {
        KeyCode::Char('n') => app.open_car_create(),
        KeyCode::Char('e') | KeyCode::Enter => {
            if let Some(car) = selected {
                app.open_car_edit(car);
            }
        }
        KeyCode::Char('d') => {
            if let Some(car) = selected {
                app.cars.open_delete(car);
            }
        }
        _ => {}
    }
}

fn handle_owners_input(app: &mut App, key: KeyEvent) {
    let len = app.owners.list.view(&app.owner_cache).items().len();
    let list = &mut app.owners.list;
    if handle_navigation(&mut |delta| list.move_selection(delta, len), key) {
        return;
    }

    let selected = app.owners.list.selected(&app.owner_cache).cloned();
    match key.code {
        KeyCode::Char('n') => app.owners.open_create(),
        KeyCode::Char('e') | KeyCode::Enter => {
            if let Some(owner) = selected {
                app.owners.open_edit(owner);
            }
        }
        KeyCode::Char('d') => {
            if let Some(owner) = selected {
                app.owners.open_delete(owner);
            }
        }
        _ => {}
    }
}

fn handle_dashboard_input(app: &mut App, key: KeyEvent) {
    let len = app
        .owner_stats
        .data(&DashboardPage::owner_key())
        .map_or(0, Vec::len);
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.dashboard.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.dashboard.select_next(len),
        _ => {}
    }
}

// ============================================================================
// Modals
// ============================================================================

fn handle_cars_modal(app: &mut App, key: KeyEvent) {
    if matches!(app.cars.list.modal, Modal::ConfirmDelete(_)) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_car_delete(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                if !app.cars.list.pending.delete {
                    app.cars.list.close_modal();
                }
            }
            _ => {}
        }
        return;
    }

    let submitting = app.cars.form.state().is_submitting();
    match key.code {
        KeyCode::Esc if !submitting => app.cars.list.close_modal(),
        KeyCode::Enter => app.submit_car_form(),
        KeyCode::Tab | KeyCode::Down => app.cars.form.state_mut().focus_next(),
        KeyCode::BackTab | KeyCode::Up => app.cars.form.state_mut().focus_prev(),
        KeyCode::Left => app.cars.form.cycle_owner(false),
        KeyCode::Right => app.cars.form.cycle_owner(true),
        KeyCode::Backspace => app.cars.form.state_mut().backspace(),
        KeyCode::Char(c) => app.cars.form.state_mut().input_char(c),
        _ => {}
    }
}

fn handle_owners_modal(app: &mut App, key: KeyEvent) {
    if matches!(app.owners.list.modal, Modal::ConfirmDelete(_)) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_owner_delete(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                if !app.owners.list.pending.delete {
                    app.owners.list.close_modal();
                }
            }
            _ => {}
        }
        return;
    }

    let submitting = app.owners.form.state().is_submitting();
    match key.code {
        KeyCode::Esc if !submitting => app.owners.list.close_modal(),
        KeyCode::Enter => app.submit_owner_form(),
        KeyCode::Tab | KeyCode::Down => app.owners.form.state_mut().focus_next(),
        KeyCode::BackTab | KeyCode::Up => app.owners.form.state_mut().focus_prev(),
        KeyCode::Backspace => app.owners.form.state_mut().backspace(),
        KeyCode::Char(c) => app.owners.form.state_mut().input_char(c),
        _ => {}
    }
}
