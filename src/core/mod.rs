//! Core types for bindrop
//!
//! The foundation of the crate's type system: the [`InstallError`] taxonomy used
//! throughout the library and the [`ErrorContext`] wrapper the CLI uses to show
//! actionable error messages.
//!
//! # Error handling model
//!
//! - Library code returns strongly-typed [`InstallError`] values and propagates
//!   them with `?`; nothing is swallowed or retried.
//! - The CLI boundary converts whatever bubbles up into an [`ErrorContext`] via
//!   [`user_friendly_error`] and prints it with colors and a suggestion.

pub mod error;

pub use error::{ErrorContext, InstallError, user_friendly_error};
