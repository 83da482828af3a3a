//! Bounded blocking buffer for single-producer/single-consumer handoff.
//!
//! No IO, no async: callers bring their own threads.

pub mod buffer;
pub mod error;

pub use buffer::{BoundedBuffer, Delivery, Drain};
pub use error::{BufferError, PutTimeout};
