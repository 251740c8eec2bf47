//! Command-line handlers.

pub mod caption;
