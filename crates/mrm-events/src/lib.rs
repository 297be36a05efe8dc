//! Notification channel for the merchant record manager.
//!
//! Every registry operation reports its outcome twice: once to the caller
//! as a result, and once here as a [`Notification`] pushed through an
//! [`EventSink`]. The second channel is observability only and never feeds
//! back into the operation.

pub mod error;
pub mod event;
pub mod sink;

pub use error::EventError;
pub use event::{EmittedEvent, Notification, StatusCode};
pub use sink::{BroadcastSink, EventSink, EventStream, RecordingSink};
