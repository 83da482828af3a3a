//! Buffer errors.
//!
//! Only the timed operations can fail; the unconditional `put`/`get` always
//! return a value.

use core::fmt;

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// No item arrived (and the buffer was not closed) before the deadline.
    #[error("timed out waiting for an item")]
    Timeout,
}

/// Capacity did not free up before the deadline. Carries the rejected item,
/// like `std::sync::mpsc::SendError`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutTimeout<T>(pub T);

impl<T> PutTimeout<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Display for PutTimeout<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("timed out waiting for buffer capacity")
    }
}

impl<T: fmt::Debug> std::error::Error for PutTimeout<T> {}
