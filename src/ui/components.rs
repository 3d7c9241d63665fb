//! Shared UI components (status bar, modal dialogs).
//!
//! Contains the building blocks layered over the users table.
//!
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::{AppState, FormField, FormMode, ModalState, StatusKind};

/// Render the bottom status bar with mode, counts and any transient message.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let mode = match app.input_mode {
        crate::app::InputMode::Normal => "NORMAL",
        crate::app::InputMode::Modal => "MODAL",
    };
    let mut spans = vec![Span::raw(format!(
        "mode: {mode}  users:{}  rows/page:{}",
        app.users.len(),
        app.rows_per_page
    ))];
    if let Some(status) = &app.status {
        let fg = match status.kind {
            StatusKind::Success => app.theme.success,
            StatusKind::Error => app.theme.error,
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            status.message.clone(),
            Style::default().fg(fg).add_modifier(Modifier::BOLD),
        ));
    }
    let p = Paragraph::new(Line::from(spans)).style(
        Style::default()
            .fg(app.theme.status_fg)
            .bg(app.theme.status_bg),
    );
    f.render_widget(p, area);
}

/// Compute a rectangle centered within `area` with a maximum size.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Render the create/edit form modal.
pub fn render_form_modal(f: &mut Frame, area: Rect, app: &AppState, state: &ModalState) {
    if let ModalState::UserForm { mode, name, email, field, error, submitting } = state {
        let title = match mode {
            FormMode::Create => "New user",
            FormMode::Edit { .. } => "Edit user",
        };
        let width = 56u16.min(area.width.saturating_sub(4)).max(40);
        let height = if error.is_some() { 9 } else { 8 };
        let rect = centered_rect(width, height, area);

        let marker = |focused: bool| if focused { "▶" } else { " " };
        let mut lines: Vec<Line> = Vec::new();
        if let Some(err) = error {
            lines.push(Line::from(Span::styled(
                err.clone(),
                Style::default().fg(app.theme.error).add_modifier(Modifier::BOLD),
            )));
        }
        lines.push(Line::raw(format!(
            "{} Name:  {}",
            marker(*field == FormField::Name),
            name
        )));
        lines.push(Line::raw(format!(
            "{} Email: {}",
            marker(*field == FormField::Email),
            email
        )));
        lines.push(Line::raw(""));
        if *submitting {
            lines.push(Line::from(Span::styled(
                "Saving...",
                Style::default().add_modifier(Modifier::ITALIC),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter: save   Tab: switch field   Esc: cancel",
                Style::default().add_modifier(Modifier::ITALIC),
            )));
        }

        let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
        f.render_widget(Clear, rect);
        f.render_widget(p, rect);
    }
}

/// Render the Yes/No confirmation before deleting the selected user.
pub fn render_delete_confirm_modal(f: &mut Frame, area: Rect, app: &AppState, state: &ModalState) {
    if let ModalState::DeleteConfirm { selected } = state {
        let rect = centered_rect(50, 7, area);
        let (name, id) = match app.selected_user() {
            Some(u) => (u.name.clone(), u.id),
            None => (String::new(), 0),
        };
        let yes = if *selected == 0 { "[Yes]" } else { " Yes " };
        let no = if *selected == 1 { "[No]" } else { " No  " };
        let body = format!("Delete user '{name}' (id {id})?\n\n  {yes}    {no}");
        let p = Paragraph::new(body).block(
            Block::default()
                .title("Confirm delete")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
        f.render_widget(Clear, rect);
        f.render_widget(p, rect);
    }
}

/// Render the help modal with usage information and key tips.
pub fn render_help_modal(f: &mut Frame, area: Rect, app: &AppState) {
    let width = 64u16.min(area.width.saturating_sub(4)).max(48);
    let height = 16u16.min(area.height.saturating_sub(4)).max(10);
    let rect = centered_rect(width, height, area);

    let italic = Style::default().add_modifier(Modifier::ITALIC);
    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled("Help", Style::default().add_modifier(Modifier::BOLD))),
        Line::raw(""),
    ];
    for (label, keys) in [
        ("Navigation: ", "Arrow keys / j k, PageUp/PageDown"),
        ("New user: ", "n"),
        ("Edit selected: ", "Enter / e"),
        ("Delete selected: ", "Delete / d (asks for confirmation)"),
        ("Refresh from server: ", "r"),
        ("Quit: ", "q"),
    ] {
        lines.push(Line::from(vec![Span::raw(label), Span::styled(keys, italic)]));
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        "In the form",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    for (label, keys) in [
        ("Switch field: ", "Tab"),
        ("Save: ", "Enter"),
        ("Cancel: ", "Esc"),
    ] {
        lines.push(Line::from(vec![Span::raw(label), Span::styled(keys, italic)]));
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(vec![
        Span::raw("Close help: "),
        Span::styled("Esc / Enter", italic),
    ]));

    let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title("Help")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
