//! Shared utilities for the token-curated registry.

pub mod logging;
pub mod time;

pub use logging::{init_logging, LogFormat};
pub use time::{format_duration, SystemClock};
