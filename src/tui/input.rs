use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::keymap::{Action, key_matches};

use super::app::{App, EditForm, Mode};

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }

    if key_matches("ctrl+c", &key) {
        app.request_quit();
        return;
    }

    match std::mem::replace(&mut app.mode, Mode::Navigate) {
        Mode::Navigate => handle_navigate(app, key),
        Mode::Add(buffer) => handle_add(app, key, buffer),
        Mode::Edit(form) => handle_edit(app, key, form),
    }
}

fn handle_navigate(app: &mut App, key: KeyEvent) {
    let Some(action) = app.config.keymap.action_for(&key) else {
        return;
    };
    if action != Action::Quit {
        app.quit_armed = false;
    }

    let cursor = app.store.cursor();
    match action {
        Action::Quit => app.request_quit(),
        Action::Down => app.store.move_cursor(1),
        Action::Up => app.store.move_cursor(-1),
        Action::Top => app.store.set_cursor(0),
        Action::Bottom => app.store.set_cursor(app.store.len() as i64 - 1),
        Action::ToggleDone => {
            let result = app.store.toggle_done_at(cursor);
            app.track(result);
        }
        Action::Delete => {
            let result = app.store.remove_at(cursor);
            app.track(result);
        }
        Action::Add => app.mode = Mode::Add(String::new()),
        Action::OpenModal => app.open_editor(),
        Action::ExportMd => app.export_markdown(),
        Action::ExportCsv => app.export_csv(),
    }
}

fn handle_add(app: &mut App, key: KeyEvent, mut buffer: String) {
    match key.code {
        KeyCode::Enter => {
            let result = app.store.add(buffer);
            if app.track(result).is_some() {
                app.set_info("Added");
            }
        }
        KeyCode::Esc => {}
        KeyCode::Backspace => {
            buffer.pop();
            app.mode = Mode::Add(buffer);
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            buffer.push(c);
            app.mode = Mode::Add(buffer);
        }
        _ => app.mode = Mode::Add(buffer),
    }
}

fn handle_edit(app: &mut App, key: KeyEvent, mut form: EditForm) {
    match key.code {
        KeyCode::Esc => app.close_editor(),
        KeyCode::Enter => app.commit_edit(form),
        KeyCode::Tab => {
            form.field = form.field.next();
            app.mode = Mode::Edit(form);
        }
        KeyCode::BackTab => {
            form.field = form.field.prev();
            app.mode = Mode::Edit(form);
        }
        KeyCode::Backspace => {
            form.active_mut().pop();
            app.mode = Mode::Edit(form);
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            form.active_mut().push(c);
            app.mode = Mode::Edit(form);
        }
        _ => app.mode = Mode::Edit(form),
    }
}
