//! # Error Handling
//!
//! This module provides error handling for the Gangway topology core.
//! It defines custom error types using `thiserror` for construction-time
//! failures; there are no runtime retries anywhere in this crate.

pub mod types;

pub use types::{GangwayError, Result};
