//! Application state types and entry glue.
//!
//! Defines the enums and structs that model the TUI state, as well as
//! helpers to construct defaults and to run the application loop
//! (re-exported as `run`).
//!
pub mod keymap;
pub mod update;

use ratatui::style::Color;
use std::time::{Duration, Instant};

use crate::api::User;

/// Current input mode for key handling.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Modal,
}

/// List view state machine: `Loading -> Loaded | Failed`.
///
/// `Failed` carries the message rendered inline in place of the table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListStatus {
    Loading,
    Loaded,
    Failed(String),
}

/// Whether the form creates a new user or edits an existing one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { id: i64 },
}

/// Which form field currently receives typed input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FormField {
    Name,
    Email,
}

/// Modal dialog states.
#[derive(Clone, Debug)]
pub enum ModalState {
    /// Create/edit form. `submitting` is the reentrancy lock: while set,
    /// the form ignores input and a second submit cannot be issued.
    UserForm {
        mode: FormMode,
        name: String,
        email: String,
        field: FormField,
        error: Option<String>,
        submitting: bool,
    },
    /// Yes/No confirmation before a delete. `selected` is 0 for Yes, 1 for No.
    DeleteConfirm { selected: usize },
    Help,
}

/// Transient message severity for the status bar.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

/// A transient status bar message, cleared after a few seconds.
#[derive(Clone, Debug)]
pub struct StatusLine {
    pub message: String,
    pub kind: StatusKind,
    pub shown_at: Instant,
}

impl StatusLine {
    const TTL: Duration = Duration::from_secs(5);

    pub fn success(message: impl Into<String>) -> Self {
        Self { message: message.into(), kind: StatusKind::Success, shown_at: Instant::now() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { message: message.into(), kind: StatusKind::Error, shown_at: Instant::now() }
    }

    pub fn expired(&self) -> bool {
        self.shown_at.elapsed() >= Self::TTL
    }
}

/// Color palette for theming the TUI.
#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub text: Color,
    pub title: Color,
    pub border: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub highlight_fg: Color,
    pub error: Color,
    pub success: Color,
}

impl Theme {
    /// Dark default theme.
    pub fn dark() -> Self {
        Self {
            text: Color::Gray,
            title: Color::Cyan,
            border: Color::Gray,
            header_bg: Color::Black,
            header_fg: Color::Cyan,
            status_bg: Color::DarkGray,
            status_fg: Color::Black,
            highlight_fg: Color::Yellow,
            error: Color::Red,
            success: Color::Green,
        }
    }

    /// Catppuccin Mocha theme defaults.
    pub fn mocha() -> Self {
        // Palette reference: https://github.com/catppuccin/catppuccin
        Self {
            text: Color::Rgb(0xcd, 0xd6, 0xf4),         // text
            title: Color::Rgb(0xcb, 0xa6, 0xf7),        // mauve
            border: Color::Rgb(0x58, 0x5b, 0x70),       // surface2
            header_bg: Color::Rgb(0x31, 0x32, 0x44),    // surface0
            header_fg: Color::Rgb(0xb4, 0xbe, 0xfe),    // lavender
            status_bg: Color::Rgb(0x45, 0x47, 0x5a),    // surface1
            status_fg: Color::Rgb(0xcd, 0xd6, 0xf4),    // text
            highlight_fg: Color::Rgb(0xf9, 0xe2, 0xaf), // yellow
            error: Color::Rgb(0xf3, 0x8b, 0xa8),        // red
            success: Color::Rgb(0xa6, 0xe3, 0xa1),      // green
        }
    }

    /// Load theme from a simple key=value file. Unknown or missing keys fall back to `mocha`.
    pub fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        let mut theme = Self::mocha();

        for raw_line in contents.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '=');
            let key = parts.next().map(|s| s.trim()).unwrap_or("");
            let val = parts.next().map(|s| s.trim()).unwrap_or("");
            if key.is_empty() || val.is_empty() {
                continue;
            }
            if let Some(color) = Self::parse_color(val) {
                match key {
                    "text" => theme.text = color,
                    "title" => theme.title = color,
                    "border" => theme.border = color,
                    "header_bg" => theme.header_bg = color,
                    "header_fg" => theme.header_fg = color,
                    "status_bg" => theme.status_bg = color,
                    "status_fg" => theme.status_fg = color,
                    "highlight_fg" => theme.highlight_fg = color,
                    "error" => theme.error = color,
                    "success" => theme.success = color,
                    _ => {}
                }
            }
        }

        Some(theme)
    }

    /// Parse a color from hex ("#RRGGBB" or "RRGGBB") or the special name "reset".
    fn parse_color(s: &str) -> Option<Color> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "reset" {
            return Some(Color::Reset);
        }
        let hex = lower.strip_prefix('#').unwrap_or(lower.as_str());
        if hex.len() == 6 {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return Some(Color::Rgb(r, g, b));
            }
        }
        None
    }

    /// Persist the theme to a config file in key=value format.
    pub fn write_file(&self, path: &str) -> std::io::Result<()> {
        use std::fmt::Write as _;

        fn color_to_str(c: Color) -> String {
            match c {
                Color::Rgb(r, g, b) => format!("#{r:02X}{g:02X}{b:02X}"),
                Color::Reset => "reset".to_string(),
                // Best-effort hex approximations for named colors
                Color::Black => "#000000".to_string(),
                Color::Red => "#FF0000".to_string(),
                Color::Green => "#00FF00".to_string(),
                Color::Yellow => "#FFFF00".to_string(),
                Color::Cyan => "#00FFFF".to_string(),
                Color::Gray => "#B3B3B3".to_string(),
                Color::DarkGray => "#4D4D4D".to_string(),
                other => format!("{other:?}"),
            }
        }

        let mut buf = String::new();
        buf.push_str("# userdesk theme configuration\n");
        buf.push_str("# Colors: hex as #RRGGBB or RRGGBB, or 'reset'\n\n");
        for (k, v) in [
            ("text", self.text),
            ("title", self.title),
            ("border", self.border),
            ("header_bg", self.header_bg),
            ("header_fg", self.header_fg),
            ("status_bg", self.status_bg),
            ("status_fg", self.status_fg),
            ("highlight_fg", self.highlight_fg),
            ("error", self.error),
            ("success", self.success),
        ] {
            let _ = writeln!(&mut buf, "{} = {}", k, color_to_str(v));
        }

        std::fs::write(path, buf)
    }

    /// Ensure a config file exists; if missing, write one with the current
    /// default theme and return it. If present, load from it; on parse
    /// errors, return `mocha`.
    pub fn load_or_init(path: &str) -> Self {
        let p = std::path::Path::new(path);
        if p.exists() {
            return Self::from_file(path).unwrap_or_else(Self::mocha);
        }
        let t = Self::mocha();
        let _ = t.write_file(path);
        t
    }
}

/// Root application state: the user list, the optional modal, and the
/// transient status line. Owned by the event loop; no other state exists.
pub struct AppState {
    pub base_url: String,
    pub users: Vec<User>,
    pub list: ListStatus,
    pub selected_index: usize,
    pub rows_per_page: usize,
    pub input_mode: InputMode,
    pub modal: Option<ModalState>,
    pub status: Option<StatusLine>,
    pub theme: Theme,
    pub keymap: keymap::Keymap,
}

impl AppState {
    /// Create a fresh state. The first list fetch happens in the event
    /// loop, so the list starts out `Loading`.
    pub fn new(base_url: String, theme: Theme, keymap: keymap::Keymap) -> Self {
        Self {
            base_url,
            users: Vec::new(),
            list: ListStatus::Loading,
            selected_index: 0,
            rows_per_page: 10,
            input_mode: InputMode::Normal,
            modal: None,
            status: None,
            theme,
            keymap,
        }
    }

    /// The currently selected user, if the list has one.
    pub fn selected_user(&self) -> Option<&User> {
        self.users.get(self.selected_index)
    }

    /// Keep the selection within the list bounds after any list edit.
    pub fn clamp_selection(&mut self) {
        if self.users.is_empty() {
            self.selected_index = 0;
        } else if self.selected_index >= self.users.len() {
            self.selected_index = self.users.len() - 1;
        }
    }
}

/// Re-export the application event loop entry function.
pub use update::run_app as run;
