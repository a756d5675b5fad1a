// event handling

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;

use crate::tui::app::{Action, App, Mode, Popup, TextInput};

pub fn poll_event(timeout: Duration) -> std::io::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

pub fn handle_event(app: &mut App, event: Event) -> Action {
    match event {
        Event::Key(key) => handle_key(app, key),
        _ => Action::None,
    }
}

pub fn handle_key(app: &mut App, key: KeyEvent) -> Action {
    // global keys (work in any mode)
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    // handle popups first
    match app.popup {
        Popup::Themes => return handle_theme_popup(app, key),
        Popup::Identity => return handle_identity_popup(app, key),
        Popup::Filter => return handle_filter_popup(app, key),
        Popup::ConfirmDelete => return handle_confirm_popup(app, key),
        Popup::None => {}
    }

    match app.mode {
        Mode::Normal => handle_normal_key(app, key),
        Mode::Insert => handle_insert_key(app, key),
    }
}

// shared line editing for every text field
fn edit_input(input: &mut TextInput, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('a') => {
                input.move_start();
                true
            }
            KeyCode::Char('e') => {
                input.move_end();
                true
            }
            KeyCode::Char('u') => {
                input.clear();
                true
            }
            _ => false,
        };
    }

    match key.code {
        KeyCode::Char(c) => input.insert_char(c),
        KeyCode::Backspace => input.delete_char(),
        KeyCode::Delete => input.delete_char_forward(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Home => input.move_start(),
        KeyCode::End => input.move_end(),
        _ => return false,
    }
    true
}

fn handle_theme_popup(app: &mut App, key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.close_popup(),
        KeyCode::Char('j') | KeyCode::Down => app.theme_scroll_down(),
        KeyCode::Char('k') | KeyCode::Up => app.theme_scroll_up(),
        KeyCode::Enter => app.select_theme(),
        _ => {}
    }
    Action::None
}

fn handle_confirm_popup(app: &mut App, key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete(),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.close_popup();
            Action::None
        }
        _ => Action::None,
    }
}

// fields: 0 role, 1 nickname, 2 anonymous
fn handle_identity_popup(app: &mut App, key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Esc => app.close_popup(),
        KeyCode::Enter => app.apply_identity(),
        KeyCode::Tab | KeyCode::Down => app.identity_next_field(),
        KeyCode::BackTab | KeyCode::Up => app.identity_prev_field(),
        _ => match app.identity_field {
            0 if matches!(key.code, KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right) => {
                app.cycle_role()
            }
            1 => {
                edit_input(&mut app.nickname_input, key);
            }
            2 if matches!(key.code, KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right) => {
                app.toggle_anonymous()
            }
            _ => {}
        },
    }
    Action::None
}

// fields: 0 category, 1 role, 2 share code, 3 search text
fn handle_filter_popup(app: &mut App, key: KeyEvent) -> Action {
    if key.code == KeyCode::Char('r') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return app.clear_filter();
    }

    match key.code {
        KeyCode::Esc => {
            app.close_popup();
            Action::None
        }
        KeyCode::Enter => app.apply_filter(),
        KeyCode::Tab | KeyCode::Down => {
            app.filter_next_field();
            Action::None
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.filter_prev_field();
            Action::None
        }
        _ => {
            let cycles = matches!(key.code, KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right);
            match app.filter_field {
                0 if cycles => app.cycle_filter_category(),
                1 if cycles => app.cycle_filter_role(),
                _ => {
                    if let Some(input) = app.filter_input_mut() {
                        edit_input(input, key);
                    }
                }
            }
            Action::None
        }
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('q') => Action::Quit,

        // writing
        KeyCode::Char('n') => {
            app.start_post();
            Action::None
        }
        KeyCode::Char('c') => {
            app.start_comment();
            Action::None
        }
        KeyCode::Char('i') => {
            app.enter_insert();
            Action::None
        }

        // reactions
        KeyCode::Char('h') => app.heart_selected(),
        KeyCode::Char('!') => app.flag_selected(),
        KeyCode::Char('d') => {
            app.ask_delete();
            Action::None
        }

        // popups
        KeyCode::Char('t') => {
            app.open_theme_popup();
            Action::None
        }
        KeyCode::Char('p') => {
            app.open_identity_popup();
            Action::None
        }
        KeyCode::Char('/') | KeyCode::Char('f') => {
            app.open_filter_popup();
            Action::None
        }

        KeyCode::Char('r') => Action::Refresh,

        KeyCode::Tab => {
            app.cycle_panel();
            Action::None
        }

        KeyCode::Esc => {
            app.dismiss_ack();
            Action::None
        }

        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(),

        _ => Action::None,
    }
}

fn handle_insert_key(app: &mut App, key: KeyEvent) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            // category and share code only matter for new posts
            KeyCode::Char('g') => {
                app.cycle_compose_category();
                return Action::None;
            }
            KeyCode::Char('s') => {
                app.toggle_share_code();
                return Action::None;
            }
            _ => {}
        }
    }

    match key.code {
        KeyCode::Esc => {
            app.exit_insert();
            Action::None
        }
        KeyCode::Enter => {
            app.exit_insert();
            app.submit().unwrap_or(Action::None)
        }
        _ => {
            edit_input(&mut app.compose, key);
            Action::None
        }
    }
}
