//! Utility functions shared across the synthesis pipeline
//!
//! This module provides logging and progress reporting helpers.

pub mod logging;

// Re-export commonly used functions for convenience
pub use logging::{log_operation_complete, log_operation_start, log_warning};
