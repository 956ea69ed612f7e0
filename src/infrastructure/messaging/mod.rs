//! # Messaging
//!
//! Outbound message sinks for the asynchronous result path.

pub mod nats;
pub mod traits;

pub use nats::NatsMessageSink;
pub use traits::{MessageHeaders, MessageSink, PublishError, PublishResult, validate_headers};
