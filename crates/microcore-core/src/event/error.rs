//! # Microcore Event System Errors
//!
//! Defines [`EventSystemError`], returned by the bus operations that can
//! fail from the caller's point of view. Failures inside subscribers never
//! surface here; they are logged at dispatch and isolated.
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventSystemError {
    #[error("Timeout waiting for response from '{event_name}' ({timeout:?})")]
    RequestTimeout {
        event_name: String,
        timeout: Duration,
    },

    #[error("Reply channel for '{event_name}' closed before a response arrived")]
    ReplyDropped { event_name: String },

    #[error("Envelope for '{event_name}' carries no request metadata to reply to")]
    NotARequest { event_name: String },

    #[error("Worker pool is closed; no further deliveries are accepted")]
    PoolClosed,
}
