//! `rolegate-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod value_object;

pub use error::DomainError;
pub use id::{SessionId, UserUid};
pub use value_object::Email;
