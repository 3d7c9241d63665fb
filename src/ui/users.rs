use chrono::{DateTime, Local, Utc};
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap};

use crate::app::{AppState, ListStatus};

/// Format a server timestamp for display in the viewer's local time.
pub fn format_created_at(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

pub fn render_users_table(f: &mut Frame, area: Rect, app: &mut AppState) {
    let block = Block::default()
        .title("Users")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border));

    // Loading and failure replace the table body inline.
    match &app.list {
        ListStatus::Loading => {
            let p = Paragraph::new("Loading users...")
                .style(Style::default().fg(app.theme.text))
                .block(block);
            f.render_widget(p, area);
            return;
        }
        ListStatus::Failed(message) => {
            let p = Paragraph::new(format!("Could not load users:\n{message}"))
                .style(Style::default().fg(app.theme.error))
                .wrap(Wrap { trim: false })
                .block(block);
            f.render_widget(p, area);
            return;
        }
        ListStatus::Loaded => {}
    }

    if app.users.is_empty() {
        let p = Paragraph::new("No users yet. Press 'n' to create one.")
            .style(Style::default().fg(app.theme.text))
            .block(block);
        f.render_widget(p, area);
        return;
    }

    let body_height = area.height.saturating_sub(3) as usize;
    if body_height > 0 {
        app.rows_per_page = body_height;
    }

    // Server order is preserved: the client never sorts.
    let start = (app.selected_index / app.rows_per_page) * app.rows_per_page;
    let end = (start + app.rows_per_page).min(app.users.len());
    let slice = &app.users[start..end];

    let rows = slice.iter().enumerate().map(|(i, u)| {
        let absolute_index = start + i;
        let style = if absolute_index == app.selected_index {
            Style::default().fg(app.theme.highlight_fg).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Row::new(vec![
            Cell::from(u.id.to_string()),
            Cell::from(u.name.clone()),
            Cell::from(u.email.clone()),
            Cell::from(format_created_at(&u.created_at)),
        ])
        .style(style)
    });

    let widths = [
        Constraint::Length(6),
        Constraint::Length(24),
        Constraint::Percentage(50),
        Constraint::Length(17),
    ];

    let header = Row::new(vec!["ID", "NAME", "EMAIL", "CREATED"])
        .style(Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD));

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .column_spacing(1);

    f.render_widget(table, area);
}

pub fn render_user_details(f: &mut Frame, area: Rect, app: &AppState) {
    let text = match app.selected_user() {
        Some(u) => format!(
            "ID: {}\nName: {}\nEmail: {}\nCreated: {}",
            u.id,
            u.name,
            u.email,
            format_created_at(&u.created_at)
        ),
        None => String::new(),
    };
    let p = Paragraph::new(text).style(Style::default().fg(app.theme.text)).block(
        Block::default()
            .title("Details")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(p, area);
}
