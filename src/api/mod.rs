//! REST client for the user API.
//!
//! Wraps the four collection calls (list, create, update, delete) behind
//! typed methods. Each call is a single blocking request: no retry, no
//! backoff, no caching. Failures are classified into [`ApiError`] and
//! surfaced to the UI as messages; nothing here panics on server input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// A user as the server represents it. `id` and `created_at` are
/// server-assigned and immutable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /users`.
#[derive(Clone, Debug, Serialize)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
}

/// Body of `PUT /users/:id`. Absent fields are omitted from the JSON and
/// left untouched by the server.
#[derive(Clone, Debug, Default, Serialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Error payload the server sends on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Failure taxonomy for API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never reached the server.
    #[error("network error: {0}")]
    Network(String),
    /// 5xx or an unexpected non-2xx status.
    #[error("server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },
    /// 4xx carrying a message, e.g. a rejected email address. Displays as
    /// the server-provided message alone.
    #[error("{0}")]
    Validation(String),
    /// 404 on update or delete: the id no longer exists.
    #[error("user not found")]
    NotFound,
}

/// Seam between the UI update logic and the wire. Implemented by
/// [`ApiClient`] for real HTTP and by test doubles in the test suite.
pub trait UserApi {
    fn list_users(&self) -> Result<Vec<User>, ApiError>;
    fn create_user(&self, draft: &UserDraft) -> Result<User, ApiError>;
    fn update_user(&self, id: i64, patch: &UserPatch) -> Result<User, ApiError>;
    fn delete_user(&self, id: i64) -> Result<(), ApiError>;
}

/// Blocking HTTP implementation of [`UserApi`].
pub struct ApiClient {
    agent: ureq::Agent,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the given base URL. A trailing slash is
    /// stripped so paths can always be joined with a leading one.
    pub fn new(base_url: &str) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl UserApi for ApiClient {
    fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let url = self.url("/users");
        debug!(%url, "GET users");
        let resp = self.agent.get(&url).call().map_err(|e| classify(e, false))?;
        let status = resp.status();
        resp.into_json::<Vec<User>>().map_err(|e| bad_body(status, e))
    }

    fn create_user(&self, draft: &UserDraft) -> Result<User, ApiError> {
        let url = self.url("/users");
        debug!(%url, name = %draft.name, "POST user");
        let resp = self
            .agent
            .post(&url)
            .send_json(draft)
            .map_err(|e| classify(e, false))?;
        let status = resp.status();
        resp.into_json::<User>().map_err(|e| bad_body(status, e))
    }

    fn update_user(&self, id: i64, patch: &UserPatch) -> Result<User, ApiError> {
        let url = self.url(&format!("/users/{id}"));
        debug!(%url, "PUT user");
        let resp = self
            .agent
            .put(&url)
            .send_json(patch)
            .map_err(|e| classify(e, true))?;
        let status = resp.status();
        resp.into_json::<User>().map_err(|e| bad_body(status, e))
    }

    fn delete_user(&self, id: i64) -> Result<(), ApiError> {
        let url = self.url(&format!("/users/{id}"));
        debug!(%url, "DELETE user");
        self.agent.delete(&url).call().map_err(|e| classify(e, true))?;
        Ok(())
    }
}

/// Map a transport or status error onto the [`ApiError`] taxonomy.
/// `id_addressed` is true for calls targeting `/users/:id`, where a 404
/// means the user is gone; elsewhere a 404 is just another rejection.
fn classify(err: ureq::Error, id_addressed: bool) -> ApiError {
    match err {
        ureq::Error::Status(code, resp) => {
            let body = resp.into_string().unwrap_or_default();
            classify_status(code, &body, id_addressed)
        }
        ureq::Error::Transport(t) => {
            warn!(error = %t, "transport failure");
            ApiError::Network(t.to_string())
        }
    }
}

fn classify_status(code: u16, body: &str, id_addressed: bool) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body).ok().map(|b| b.error);
    match code {
        404 if id_addressed => ApiError::NotFound,
        400..=499 => {
            ApiError::Validation(message.unwrap_or_else(|| format!("request rejected (HTTP {code})")))
        }
        _ => ApiError::Server {
            status: code,
            message: message.unwrap_or_else(|| format!("HTTP {code}")),
        },
    }
}

/// A 2xx response whose body did not parse as expected.
fn bad_body(status: u16, err: std::io::Error) -> ApiError {
    ApiError::Server {
        status,
        message: format!("invalid response body: {err}"),
    }
}
