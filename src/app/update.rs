//! Event loop and state transitions.
//!
//! All mutations of [`AppState`] live here as free functions over the
//! state and a [`UserApi`], so the save/delete/refresh contract can be
//! exercised in tests without a terminal or a real server.

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::time::Duration;
use tracing::{debug, info};

use crate::api::{UserApi, UserDraft, UserPatch};
use crate::app::{AppState, FormField, FormMode, InputMode, ListStatus, ModalState, StatusLine};
use crate::app::keymap::KeyAction;
use crate::ui;

/// Whether the event loop should keep running.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut AppState,
    api: &dyn UserApi,
) -> Result<()> {
    refresh_users(app, api);

    loop {
        terminal.draw(|f| {
            ui::render(f, app);
        })?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handle_key(app, api, key) == Flow::Quit {
                    break;
                }
            }
        }

        if app.status.as_ref().is_some_and(StatusLine::expired) {
            app.status = None;
        }
    }

    Ok(())
}

/// Dispatch one key press according to the current input mode.
pub fn handle_key(app: &mut AppState, api: &dyn UserApi, key: KeyEvent) -> Flow {
    match app.input_mode {
        InputMode::Normal => match app.keymap.resolve(&key) {
            Some(KeyAction::Quit) => return Flow::Quit,
            Some(KeyAction::Refresh) => refresh_users(app, api),
            Some(KeyAction::NewUser) => open_create_form(app),
            Some(KeyAction::EditSelection) => open_edit_form(app),
            Some(KeyAction::DeleteSelection) => {
                if app.selected_user().is_some() {
                    // Default to No so a stray Enter cannot delete
                    app.modal = Some(ModalState::DeleteConfirm { selected: 1 });
                    app.input_mode = InputMode::Modal;
                }
            }
            Some(KeyAction::OpenHelp) => {
                app.modal = Some(ModalState::Help);
                app.input_mode = InputMode::Modal;
            }
            Some(KeyAction::MoveUp) => {
                if app.selected_index > 0 {
                    app.selected_index -= 1;
                }
            }
            Some(KeyAction::MoveDown) => {
                if app.selected_index + 1 < app.users.len() {
                    app.selected_index += 1;
                }
            }
            Some(KeyAction::PageUp) => {
                let step = app.rows_per_page.max(1);
                app.selected_index = app.selected_index.saturating_sub(step);
            }
            Some(KeyAction::PageDown) => {
                let step = app.rows_per_page.max(1);
                let new_idx = app.selected_index.saturating_add(step);
                app.selected_index = new_idx.min(app.users.len().saturating_sub(1));
            }
            Some(KeyAction::Ignore) | None => {}
        },
        InputMode::Modal => handle_modal_key(app, api, key.code),
    }
    Flow::Continue
}

fn handle_modal_key(app: &mut AppState, api: &dyn UserApi, code: KeyCode) {
    match &mut app.modal {
        Some(ModalState::UserForm { field, name, email, error, submitting, .. }) => {
            // Reentrancy lock: a submit in flight disables the whole form
            if *submitting {
                return;
            }
            match code {
                KeyCode::Esc => close_modal(app),
                KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                    *field = match field {
                        FormField::Name => FormField::Email,
                        FormField::Email => FormField::Name,
                    };
                }
                KeyCode::Backspace => {
                    match field {
                        FormField::Name => name.pop(),
                        FormField::Email => email.pop(),
                    };
                    *error = None;
                }
                KeyCode::Enter => submit_form(app, api),
                KeyCode::Char(c) => {
                    match field {
                        FormField::Name => name.push(c),
                        FormField::Email => email.push(c),
                    }
                    *error = None;
                }
                _ => {}
            }
        }
        Some(ModalState::DeleteConfirm { selected }) => match code {
            KeyCode::Esc => close_modal(app),
            KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                *selected = if *selected == 0 { 1 } else { 0 };
            }
            KeyCode::Enter => {
                if *selected == 0 {
                    confirm_delete(app, api);
                } else {
                    close_modal(app);
                }
            }
            _ => {}
        },
        Some(ModalState::Help) => match code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?') => close_modal(app),
            _ => {}
        },
        None => {}
    }
}

fn close_modal(app: &mut AppState) {
    app.modal = None;
    app.input_mode = InputMode::Normal;
}

/// Re-fetch the full collection. This is the explicit "refetch now"
/// command issued on startup, on manual refresh, and after every
/// confirmed save.
pub fn refresh_users(app: &mut AppState, api: &dyn UserApi) {
    app.list = ListStatus::Loading;
    match api.list_users() {
        Ok(users) => {
            debug!(count = users.len(), "fetched user list");
            app.users = users;
            app.list = ListStatus::Loaded;
            app.clamp_selection();
        }
        Err(e) => {
            // Previously rendered rows are kept in memory but the list
            // area renders the failure inline instead.
            app.list = ListStatus::Failed(e.to_string());
        }
    }
}

/// Open the form with cleared fields (create mode).
pub fn open_create_form(app: &mut AppState) {
    app.modal = Some(ModalState::UserForm {
        mode: FormMode::Create,
        name: String::new(),
        email: String::new(),
        field: FormField::Name,
        error: None,
        submitting: false,
    });
    app.input_mode = InputMode::Modal;
}

/// Open the form pre-populated from the selected user (edit mode).
/// Does nothing when the list is empty.
pub fn open_edit_form(app: &mut AppState) {
    let Some(user) = app.selected_user() else { return };
    app.modal = Some(ModalState::UserForm {
        mode: FormMode::Edit { id: user.id },
        name: user.name.clone(),
        email: user.email.clone(),
        field: FormField::Name,
        error: None,
        submitting: false,
    });
    app.input_mode = InputMode::Modal;
}

/// Validate and submit the open form. On success the modal closes and the
/// list is re-fetched; on failure the modal stays open with the error.
pub fn submit_form(app: &mut AppState, api: &dyn UserApi) {
    let (mode, name, email) = match &app.modal {
        Some(ModalState::UserForm { submitting: true, .. }) => return,
        Some(ModalState::UserForm { mode, name, email, .. }) => {
            (*mode, name.trim().to_string(), email.trim().to_string())
        }
        _ => return,
    };

    if name.is_empty() || email.is_empty() {
        set_form_error(app, "name and email are required");
        return;
    }

    set_form_submitting(app, true);
    let result = match mode {
        FormMode::Create => api.create_user(&UserDraft { name, email }),
        FormMode::Edit { id } => api.update_user(
            id,
            &UserPatch {
                name: Some(name),
                email: Some(email),
            },
        ),
    };

    match result {
        Ok(user) => {
            info!(id = user.id, "user saved");
            let verb = match mode {
                FormMode::Create => "created",
                FormMode::Edit { .. } => "updated",
            };
            app.status = Some(StatusLine::success(format!("user '{}' {verb}", user.name)));
            close_modal(app);
            refresh_users(app, api);
        }
        Err(e) => {
            set_form_submitting(app, false);
            set_form_error(app, e.to_string());
        }
    }
}

/// Delete the selected user after confirmation. On success the entry is
/// removed from the local list without a full re-fetch; on failure the
/// list is left unchanged and the error is shown transiently.
pub fn confirm_delete(app: &mut AppState, api: &dyn UserApi) {
    let Some(user) = app.selected_user().cloned() else {
        close_modal(app);
        return;
    };
    match api.delete_user(user.id) {
        Ok(()) => {
            info!(id = user.id, "user deleted");
            app.users.retain(|u| u.id != user.id);
            app.clamp_selection();
            app.status = Some(StatusLine::success(format!("user '{}' deleted", user.name)));
        }
        Err(e) => {
            app.status = Some(StatusLine::error(format!("delete failed: {e}")));
        }
    }
    close_modal(app);
}

fn set_form_error(app: &mut AppState, message: impl Into<String>) {
    if let Some(ModalState::UserForm { error, .. }) = &mut app.modal {
        *error = Some(message.into());
    }
}

fn set_form_submitting(app: &mut AppState, value: bool) {
    if let Some(ModalState::UserForm { submitting, .. }) = &mut app.modal {
        *submitting = value;
    }
}
