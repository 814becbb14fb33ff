//! Utility code.

pub mod cache;
