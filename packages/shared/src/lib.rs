//! Shared utilities for Roomcast packages.
//!
//! - `logger`: tracing subscriber setup
//! - `time`: clock abstraction and timestamp formatting

pub mod logger;
pub mod time;
