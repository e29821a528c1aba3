//! Sessions API.

use std::time::{Duration, Instant};

use futures::Stream;
use tokio_util::sync::CancellationToken;

use crate::client::DevinClient;
use crate::error::{Error, Result};
use crate::types::{
    CreateSessionRequest, CreateSessionResponse, SessionHandle, SessionState, SessionStatus,
};

/// Default delay between status requests.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Bounds for [`SessionsApi::poll_until_terminal`].
///
/// The defaults poll every five seconds forever.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOptions {
    /// Delay between consecutive status requests.
    pub interval: Duration,
    /// Maximum number of status requests before giving up.
    pub max_polls: Option<u32>,
    /// Maximum wall-clock time spent polling.
    pub deadline: Option<Duration>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_polls: None,
            deadline: None,
        }
    }
}

impl PollOptions {
    /// Set the poll interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Cap the number of status requests.
    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = Some(max_polls);
        self
    }

    /// Cap the total time spent polling.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Sessions API client.
pub struct SessionsApi {
    client: DevinClient,
}

impl SessionsApi {
    pub(crate) fn new(client: DevinClient) -> Self {
        Self { client }
    }

    /// Start a new session.
    pub async fn create(&self, request: CreateSessionRequest) -> Result<SessionHandle> {
        let response: CreateSessionResponse = self.client.post(&["sessions"], &request).await?;
        let handle = SessionHandle::try_from(response)?;

        tracing::info!(
            session_id = %handle.session_id,
            url = handle.url.as_deref().unwrap_or("-"),
            is_new = ?handle.is_new_session,
            "started Devin session"
        );

        Ok(handle)
    }

    /// Fetch the current state of a session.
    pub async fn get(&self, session_id: &str) -> Result<SessionState> {
        self.client.get(&["session", session_id]).await
    }

    /// Poll a session until it reaches a terminal status.
    ///
    /// Issues one status request per iteration and returns the first terminal
    /// state. Request failures are returned immediately without retrying.
    pub async fn poll_until_terminal(
        &self,
        handle: &SessionHandle,
        options: &PollOptions,
        cancel: &CancellationToken,
    ) -> Result<SessionState> {
        let session_id = handle.session_id.as_str();
        let cancelled = || Error::Cancelled {
            session_id: session_id.to_string(),
        };
        let started = Instant::now();
        let mut polls: u32 = 0;

        loop {
            polls += 1;
            let state = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(cancelled()),
                state = self.get(session_id) => state?,
            };

            tracing::debug!(
                session_id,
                poll = polls,
                status = %state.status_enum,
                messages = state.messages.len(),
                "polled Devin session"
            );

            if state.is_terminal() {
                tracing::info!(
                    session_id,
                    polls,
                    status = %state.status_enum,
                    "Devin session reached terminal status"
                );
                return Ok(state);
            }

            if let SessionStatus::Unknown(raw) = &state.status_enum {
                tracing::warn!(session_id, status = %raw, "unrecognised session status, polling again");
            }

            if options.max_polls.is_some_and(|max| polls >= max) {
                return Err(Error::PollLimit {
                    session_id: session_id.to_string(),
                    polls,
                });
            }

            if let Some(deadline) = options.deadline {
                let elapsed = started.elapsed();
                if elapsed + options.interval > deadline {
                    return Err(Error::DeadlineExceeded {
                        session_id: session_id.to_string(),
                        elapsed,
                    });
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(cancelled()),
                _ = tokio::time::sleep(options.interval) => {}
            }
        }
    }

    /// Start a session, wait for it to finish, and stream the agent's messages.
    ///
    /// The stream yields nothing until the session is terminal, then yields each
    /// agent message in order. Any failure ends the stream with an error.
    pub fn run(
        &self,
        request: CreateSessionRequest,
        options: PollOptions,
        cancel: CancellationToken,
    ) -> impl Stream<Item = Result<String>> + Send + 'static {
        let sessions = SessionsApi::new(self.client.clone());
        async_stream::try_stream! {
            let handle = sessions.create(request).await?;
            let state = sessions.poll_until_terminal(&handle, &options, &cancel).await?;
            for message in state.into_devin_messages() {
                yield message;
            }
        }
    }
}

/// Stream the agent messages of an already-fetched state.
pub fn message_stream(state: SessionState) -> impl Stream<Item = String> {
    futures::stream::iter(state.into_devin_messages())
}
