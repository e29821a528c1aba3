//! API endpoint implementations.

mod sessions;

pub use sessions::{DEFAULT_POLL_INTERVAL, PollOptions, SessionsApi, message_stream};
