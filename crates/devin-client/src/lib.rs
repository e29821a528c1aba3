//! HTTP client for the Devin sessions API.
//!
//! A Devin session is a long-running unit of remote work. The client starts a
//! session with a prompt, polls its status until the session reaches a
//! terminal state, and then yields the agent's messages.
//!
//! # Example
//!
//! ```no_run
//! use devin_client::{CreateSessionRequest, DevinClient, PollOptions, Result};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<()> {
//! let client = DevinClient::builder()
//!     .auth_token("secret")
//!     .build()?;
//!
//! let sessions = client.sessions();
//! let handle = sessions.create(CreateSessionRequest::new("Fix the flaky test")).await?;
//! println!("Follow along at {}", handle.url.as_deref().unwrap_or("-"));
//!
//! let state = sessions
//!     .poll_until_terminal(&handle, &PollOptions::default(), &CancellationToken::new())
//!     .await?;
//! for message in state.devin_messages() {
//!     println!("{}", message);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Session lifecycle
//!
//! ```text
//! created ──► running ──(poll again)──► running ...
//!                 │
//!                 └──► blocked | stopped | finished   (stop polling)
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod types;

pub use api::{DEFAULT_POLL_INTERVAL, PollOptions, SessionsApi, message_stream};
pub use client::{ClientBuilder, DevinClient};
pub use error::{Error, Result};
pub use types::*;
