//! Request and response types for the sessions API.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Session creation
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for `POST /v1/sessions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateSessionRequest {
    /// Task description for the agent.
    pub prompt: String,
    /// Reuse an existing session for an identical prompt instead of starting a new one.
    pub idempotent: bool,
}

impl CreateSessionRequest {
    /// Create an idempotent session request.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            idempotent: true,
        }
    }

    /// Set the idempotency flag.
    pub fn with_idempotent(mut self, idempotent: bool) -> Self {
        self.idempotent = idempotent;
        self
    }
}

/// Raw body of a session creation response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CreateSessionResponse {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub is_new_session: Option<bool>,
}

/// A started session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    /// Opaque session identifier used for polling.
    pub session_id: String,
    /// Web URL where a human can watch the session.
    pub url: Option<String>,
    /// Whether the server started a new session or reused one.
    pub is_new_session: Option<bool>,
}

impl SessionHandle {
    /// Create a handle for an existing session.
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            url: None,
            is_new_session: None,
        }
    }
}

impl TryFrom<CreateSessionResponse> for SessionHandle {
    type Error = Error;

    fn try_from(response: CreateSessionResponse) -> Result<Self> {
        let session_id = response
            .session_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                Error::MalformedResponse("session creation response has no session_id".to_string())
            })?;

        Ok(Self {
            session_id,
            url: response.url.filter(|u| !u.is_empty()),
            is_new_session: response.is_new_session,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session status
// ─────────────────────────────────────────────────────────────────────────────

/// Status of a session as reported in `status_enum`.
///
/// Values the client does not recognise are kept in [`SessionStatus::Unknown`]
/// and are never terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// The agent is working.
    Running,
    /// The agent is waiting on the user.
    Blocked,
    /// The session was stopped.
    Stopped,
    /// The agent completed its work.
    Finished,
    /// Any other value.
    Unknown(String),
}

impl SessionStatus {
    /// Whether polling should stop on this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Blocked | Self::Stopped | Self::Finished)
    }

    /// Wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Running => "running",
            Self::Blocked => "blocked",
            Self::Stopped => "stopped",
            Self::Finished => "finished",
            Self::Unknown(raw) => raw,
        }
    }
}

impl From<String> for SessionStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "running" => Self::Running,
            "blocked" => Self::Blocked,
            "stopped" => Self::Stopped,
            "finished" => Self::Finished,
            _ => Self::Unknown(raw),
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SessionStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session state
// ─────────────────────────────────────────────────────────────────────────────

/// `type` tag of agent-authored messages.
const DEVIN_MESSAGE_TYPE: &str = "devin_message";

/// An entry in a session's message log.
///
/// Entries are matched on their `type` tag alone. Anything that is not an
/// agent message, including entries without a tag, becomes [`SessionMessage::Other`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMessage {
    /// Text written by the agent. `None` when the entry carries no text.
    DevinMessage { message: Option<String> },
    /// User messages, system events, and anything else.
    Other,
}

impl SessionMessage {
    /// The agent text, if this is an agent message with text.
    pub fn devin_text(&self) -> Option<&str> {
        match self {
            Self::DevinMessage { message } => message.as_deref(),
            Self::Other => None,
        }
    }
}

impl<'de> Deserialize<'de> for SessionMessage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let entry = serde_json::Value::deserialize(deserializer)?;
        if entry.get("type").and_then(serde_json::Value::as_str) != Some(DEVIN_MESSAGE_TYPE) {
            return Ok(Self::Other);
        }
        let message = entry
            .get("message")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string);
        Ok(Self::DevinMessage { message })
    }
}

/// Body of `GET /v1/session/{session_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionState {
    /// Current status.
    pub status_enum: SessionStatus,
    /// Message log in chronological order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub messages: Vec<SessionMessage>,
}

impl SessionState {
    /// Whether polling should stop on this state.
    pub fn is_terminal(&self) -> bool {
        self.status_enum.is_terminal()
    }

    /// Agent message texts, in order.
    pub fn devin_messages(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().filter_map(SessionMessage::devin_text)
    }

    /// Consume the state, yielding owned agent message texts in order.
    pub fn into_devin_messages(self) -> impl Iterator<Item = String> {
        self.messages.into_iter().filter_map(|m| match m {
            SessionMessage::DevinMessage { message } => message,
            SessionMessage::Other => None,
        })
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_request_serialization() {
        let req = CreateSessionRequest::new("hello");
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value, json!({"prompt": "hello", "idempotent": true}));

        let req = CreateSessionRequest::new("hello").with_idempotent(false);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["idempotent"], json!(false));
    }

    #[test]
    fn test_handle_from_response() {
        let raw: CreateSessionResponse =
            serde_json::from_value(json!({"session_id": "s1", "url": "http://x"})).unwrap();
        let handle = SessionHandle::try_from(raw).unwrap();
        assert_eq!(handle.session_id, "s1");
        assert_eq!(handle.url.as_deref(), Some("http://x"));
    }

    #[test]
    fn test_handle_requires_session_id() {
        let raw: CreateSessionResponse =
            serde_json::from_value(json!({"url": "http://x"})).unwrap();
        assert!(matches!(
            SessionHandle::try_from(raw),
            Err(Error::MalformedResponse(_))
        ));

        let raw: CreateSessionResponse =
            serde_json::from_value(json!({"session_id": null, "url": "http://x"})).unwrap();
        assert!(SessionHandle::try_from(raw).is_err());

        let raw: CreateSessionResponse =
            serde_json::from_value(json!({"session_id": "  "})).unwrap();
        assert!(SessionHandle::try_from(raw).is_err());
    }

    #[test]
    fn test_status_parsing() {
        let parse = |s: &str| serde_json::from_value::<SessionStatus>(json!(s)).unwrap();
        assert_eq!(parse("running"), SessionStatus::Running);
        assert_eq!(parse("blocked"), SessionStatus::Blocked);
        assert_eq!(parse("stopped"), SessionStatus::Stopped);
        assert_eq!(parse("finished"), SessionStatus::Finished);
        assert_eq!(
            parse("suspend_requested"),
            SessionStatus::Unknown("suspend_requested".to_string())
        );
    }

    #[test]
    fn test_only_three_statuses_are_terminal() {
        assert!(!SessionStatus::Running.is_terminal());
        assert!(SessionStatus::Blocked.is_terminal());
        assert!(SessionStatus::Stopped.is_terminal());
        assert!(SessionStatus::Finished.is_terminal());
        assert!(!SessionStatus::Unknown("expired".to_string()).is_terminal());
        assert!(!SessionStatus::Unknown("Finished".to_string()).is_terminal());
    }

    #[test]
    fn test_status_display_round_trips_unknown() {
        assert_eq!(SessionStatus::Finished.to_string(), "finished");
        assert_eq!(SessionStatus::Unknown("working".into()).to_string(), "working");
    }

    #[test]
    fn test_extract_devin_messages_in_order() {
        let state: SessionState = serde_json::from_value(json!({
            "status_enum": "finished",
            "messages": [
                {"type": "devin_message", "message": "A"},
                {"type": "other", "message": "B"},
                {"type": "devin_message", "message": "C"}
            ]
        }))
        .unwrap();

        assert!(state.is_terminal());
        let texts: Vec<&str> = state.devin_messages().collect();
        assert_eq!(texts, vec!["A", "C"]);

        let owned: Vec<String> = state.into_devin_messages().collect();
        assert_eq!(owned, vec!["A".to_string(), "C".to_string()]);
    }

    #[test]
    fn test_other_messages_ignore_extra_fields() {
        let state: SessionState = serde_json::from_value(json!({
            "status_enum": "blocked",
            "messages": [
                {"type": "initial_user_message", "message": "do it", "timestamp": "t", "origin": "api"},
                {"type": "user_message", "username": "ada"},
                {"type": "devin_message", "message": "done", "timestamp": "t"}
            ]
        }))
        .unwrap();

        assert_eq!(state.messages.len(), 3);
        assert_eq!(state.messages[0], SessionMessage::Other);
        assert_eq!(state.devin_messages().collect::<Vec<_>>(), vec!["done"]);
    }

    #[test]
    fn test_devin_message_without_text_is_skipped() {
        let state: SessionState = serde_json::from_value(json!({
            "status_enum": "finished",
            "messages": [
                {"type": "devin_message", "message": "A"},
                {"type": "devin_message", "message": null},
                {"type": "devin_message"},
                {"type": "devin_message", "message": "C"}
            ]
        }))
        .unwrap();

        assert_eq!(state.messages.len(), 4);
        assert_eq!(
            state.messages[1],
            SessionMessage::DevinMessage { message: None }
        );
        assert_eq!(state.devin_messages().collect::<Vec<_>>(), vec!["A", "C"]);
        assert_eq!(
            state.into_devin_messages().collect::<Vec<_>>(),
            vec!["A".to_string(), "C".to_string()]
        );
    }

    #[test]
    fn test_untagged_entries_are_dropped() {
        let state: SessionState = serde_json::from_value(json!({
            "status_enum": "finished",
            "messages": [
                {"message": "no tag"},
                {"type": null, "message": "null tag"},
                "not an object",
                {"type": "devin_message", "message": "kept"}
            ]
        }))
        .unwrap();

        assert_eq!(state.messages[0], SessionMessage::Other);
        assert_eq!(state.messages[2], SessionMessage::Other);
        assert_eq!(state.devin_messages().collect::<Vec<_>>(), vec!["kept"]);
    }

    #[test]
    fn test_missing_or_null_messages() {
        let state: SessionState =
            serde_json::from_value(json!({"status_enum": "running"})).unwrap();
        assert!(state.messages.is_empty());

        let state: SessionState =
            serde_json::from_value(json!({"status_enum": "running", "messages": null})).unwrap();
        assert!(state.messages.is_empty());
        assert_eq!(state.devin_messages().count(), 0);
    }
}
