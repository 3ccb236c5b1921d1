//! Utility functions for formatting values for display.

pub mod format;

pub use format::{age_display, format_price, initials, truncate_string};
