//! `lockstep-core` — shared building blocks for the coordination primitives.
//!
//! Pure types only: no threads, no locks, no IO.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::AccountId;
