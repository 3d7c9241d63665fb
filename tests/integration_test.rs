// Integration tests for userdesk

use chrono::{TimeZone, Utc};
use ratatui::{Terminal, backend::TestBackend};
use userdesk::api::User;
use userdesk::app::keymap::Keymap;
use userdesk::app::{AppState, FormField, FormMode, InputMode, ListStatus, ModalState, Theme};
use userdesk::ui::render;
use userdesk::ui::users::format_created_at;

fn mk_user(id: i64, name: &str, email: &str) -> User {
    User {
        id,
        name: name.to_string(),
        email: email.to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

fn mk_app() -> AppState {
    AppState::new(
        "http://localhost:5000/api".to_string(),
        Theme::dark(),
        Keymap::new_defaults(),
    )
}

fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
    terminal
        .backend()
        .buffer()
        .content
        .iter()
        .map(|c| c.symbol())
        .collect()
}

// 1) Theme config roundtrip and init
#[test]
fn theme_roundtrip_and_init() {
    use std::{
        fs,
        path::PathBuf,
        time::{SystemTime, UNIX_EPOCH},
    };

    // Unique temp path
    let mut path = std::env::temp_dir();
    let nonce = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    path.push(format!("userdesk_theme_{}_{}.conf", std::process::id(), nonce));
    let path_str = path.to_string_lossy().to_string();

    // Roundtrip write/read
    let t = Theme::mocha();
    t.write_file(&path_str).expect("write theme");
    let t2 = Theme::from_file(&path_str).expect("read theme");
    assert_eq!(format!("{:?}", t.text), format!("{:?}", t2.text));
    assert_eq!(format!("{:?}", t.title), format!("{:?}", t2.title));
    assert_eq!(format!("{:?}", t.error), format!("{:?}", t2.error));
    assert_eq!(format!("{:?}", t.success), format!("{:?}", t2.success));

    // load_or_init creates file if missing
    let mut p2 = PathBuf::from(&path_str);
    p2.set_file_name(format!(
        "{}_init.conf",
        p2.file_stem().unwrap().to_string_lossy()
    ));
    let p2_str = p2.to_string_lossy().to_string();
    let _ = fs::remove_file(&p2_str);
    let _created = Theme::load_or_init(&p2_str);
    assert!(PathBuf::from(&p2_str).exists());

    // Cleanup best-effort
    let _ = fs::remove_file(&path_str);
    let _ = fs::remove_file(&p2_str);
}

// 2) Keymap config roundtrip
#[test]
fn keymap_roundtrip_preserves_bindings() {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use userdesk::app::keymap::KeyAction;

    let mut path = std::env::temp_dir();
    path.push(format!("userdesk_keys_rt_{}.conf", std::process::id()));
    let path_str = path.to_string_lossy().to_string();

    let km = Keymap::new_defaults();
    km.write_file(&path_str).expect("write keymap");
    let km2 = Keymap::from_file(&path_str).expect("read keymap");
    let _ = std::fs::remove_file(&path_str);

    for (code, action) in [
        (KeyCode::Char('q'), KeyAction::Quit),
        (KeyCode::Char('r'), KeyAction::Refresh),
        (KeyCode::Char('n'), KeyAction::NewUser),
        (KeyCode::Enter, KeyAction::EditSelection),
        (KeyCode::Delete, KeyAction::DeleteSelection),
    ] {
        let ev = KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(km2.resolve(&ev), Some(action));
    }
}

// 3) Rendering smoke tests against a TestBackend
#[test]
fn render_loaded_list_shows_user_fields() {
    let backend = TestBackend::new(80, 24);
    let mut terminal = Terminal::new(backend).expect("create terminal");
    let mut app = mk_app();
    app.users = vec![mk_user(1, "Alice", "a@x.com")];
    app.list = ListStatus::Loaded;

    terminal.draw(|f| render(f, &mut app)).expect("render frame");

    let text = buffer_text(&terminal);
    assert!(text.contains("Alice"));
    assert!(text.contains("a@x.com"));
    assert!(text.contains("users:1"));
    // The details pane shows the creation time in the viewer's local zone
    let shown = format_created_at(&app.users[0].created_at);
    assert!(text.contains(&format!("Created: {shown}")));
}

#[test]
fn created_at_formats_to_local_wall_time() {
    use chrono::Local;

    let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let shown = format_created_at(&ts);

    // Minute precision, "YYYY-MM-DD HH:MM"
    assert_eq!(shown.len(), 16);
    let bytes = shown.as_bytes();
    assert_eq!(bytes[4], b'-');
    assert_eq!(bytes[7], b'-');
    assert_eq!(bytes[10], b' ');
    assert_eq!(bytes[13], b':');

    // Matches the instant converted to the local zone, not raw UTC
    let local = ts.with_timezone(&Local);
    assert_eq!(shown, local.format("%Y-%m-%d %H:%M").to_string());
}

#[test]
fn render_loading_and_failed_states() {
    let backend = TestBackend::new(80, 24);
    let mut terminal = Terminal::new(backend).expect("create terminal");
    let mut app = mk_app();

    // Fresh state is Loading
    terminal.draw(|f| render(f, &mut app)).expect("render loading");
    assert!(buffer_text(&terminal).contains("Loading users"));

    // Failure replaces the list area with the message inline
    app.list = ListStatus::Failed("network error: connection refused".to_string());
    terminal.draw(|f| render(f, &mut app)).expect("render failed");
    let text = buffer_text(&terminal);
    assert!(text.contains("Could not load users"));
    assert!(text.contains("connection refused"));
}

#[test]
fn render_empty_loaded_list() {
    let backend = TestBackend::new(80, 24);
    let mut terminal = Terminal::new(backend).expect("create terminal");
    let mut app = mk_app();
    app.list = ListStatus::Loaded;

    terminal.draw(|f| render(f, &mut app)).expect("render frame");
    assert!(buffer_text(&terminal).contains("No users yet"));
}

#[test]
fn render_form_and_confirm_modals() {
    let backend = TestBackend::new(80, 24);
    let mut terminal = Terminal::new(backend).expect("create terminal");
    let mut app = mk_app();
    app.users = vec![mk_user(1, "Alice", "a@x.com")];
    app.list = ListStatus::Loaded;

    app.input_mode = InputMode::Modal;
    app.modal = Some(ModalState::UserForm {
        mode: FormMode::Create,
        name: "Bob".into(),
        email: String::new(),
        field: FormField::Email,
        error: Some("invalid email".into()),
        submitting: false,
    });
    terminal.draw(|f| render(f, &mut app)).expect("render form");
    let text = buffer_text(&terminal);
    assert!(text.contains("New user"));
    assert!(text.contains("invalid email"));

    // A submit in flight replaces the key hints with a progress line
    app.modal = Some(ModalState::UserForm {
        mode: FormMode::Create,
        name: "Bob".into(),
        email: "bob@x.com".into(),
        field: FormField::Name,
        error: None,
        submitting: true,
    });
    terminal.draw(|f| render(f, &mut app)).expect("render submitting form");
    let text = buffer_text(&terminal);
    assert!(text.contains("Saving..."));
    assert!(!text.contains("Enter: save"));

    app.modal = Some(ModalState::DeleteConfirm { selected: 1 });
    terminal.draw(|f| render(f, &mut app)).expect("render confirm");
    let text = buffer_text(&terminal);
    assert!(text.contains("Confirm delete"));
    assert!(text.contains("Alice"));

    app.modal = Some(ModalState::Help);
    terminal.draw(|f| render(f, &mut app)).expect("render help");
    assert!(buffer_text(&terminal).contains("Help"));
}

// 4) ApiClient against a canned local HTTP server
mod http {
    use std::io::{Read, Write};
    use std::net::TcpListener;

    use userdesk::api::{ApiClient, ApiError, UserApi, UserDraft, UserPatch};

    fn http_response(status_line: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    /// Spawn a server that answers exactly one request with `response`
    /// and returns the base URL to reach it.
    fn serve_once(response: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let base = format!("http://{}", listener.local_addr().expect("addr"));
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut data = Vec::new();
                let mut buf = [0u8; 1024];
                // Read headers, then any body announced by Content-Length
                let header_end = loop {
                    let n = stream.read(&mut buf).unwrap_or(0);
                    if n == 0 {
                        break None;
                    }
                    data.extend_from_slice(&buf[..n]);
                    if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
                        break Some(pos + 4);
                    }
                };
                if let Some(header_end) = header_end {
                    let headers = String::from_utf8_lossy(&data[..header_end]).to_lowercase();
                    let content_length = headers
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    while data.len() < header_end + content_length {
                        let n = stream.read(&mut buf).unwrap_or(0);
                        if n == 0 {
                            break;
                        }
                        data.extend_from_slice(&buf[..n]);
                    }
                    let _ = stream.write_all(response.as_bytes());
                    let _ = stream.flush();
                }
            }
        });
        base
    }

    #[test]
    fn list_users_parses_server_response() {
        let body = r#"[{"id":1,"name":"Alice","email":"a@x.com","created_at":"2024-01-01T00:00:00Z"}]"#;
        let base = serve_once(http_response("200 OK", body));

        let client = ApiClient::new(&base);
        let users = client.list_users().expect("list users");
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, 1);
        assert_eq!(users[0].name, "Alice");
        assert_eq!(users[0].email, "a@x.com");
    }

    #[test]
    fn create_user_surfaces_validation_message() {
        let base = serve_once(http_response("400 Bad Request", r#"{"error":"invalid email"}"#));

        let client = ApiClient::new(&base);
        let err = client
            .create_user(&UserDraft { name: "Bob".into(), email: "not-an-email".into() })
            .expect_err("should fail");
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(err.to_string(), "invalid email");
    }

    #[test]
    fn update_missing_user_is_not_found() {
        let base = serve_once(http_response("404 Not Found", r#"{"error":"user not found"}"#));

        let client = ApiClient::new(&base);
        let err = client
            .update_user(42, &UserPatch { name: Some("X".into()), email: None })
            .expect_err("should fail");
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn delete_user_accepts_204() {
        let base = serve_once("HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n".to_string());

        let client = ApiClient::new(&base);
        client.delete_user(1).expect("delete should succeed");
    }

    #[test]
    fn unreachable_server_is_a_network_error() {
        // Bind then drop to get a port with nothing listening
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let base = format!("http://{}", listener.local_addr().expect("addr"));
        drop(listener);

        let client = ApiClient::new(&base);
        let err = client.list_users().expect_err("should fail");
        assert!(matches!(err, ApiError::Network(_)));
    }
}
