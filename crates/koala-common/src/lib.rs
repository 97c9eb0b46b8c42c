//! Common diagnostics for the Koala HTML tree builder.
//!
//! This crate provides shared infrastructure used by the other crates:
//! - **Warning System** - deduplicated, colored terminal warnings
//! - **Logger** - a small [`log`] backend for the command-line tools

pub mod logger;
pub mod warning;
