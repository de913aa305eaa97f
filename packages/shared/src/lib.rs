//! Shared utilities for the Kangaroo relay packages.

pub mod logger;
pub mod time;
