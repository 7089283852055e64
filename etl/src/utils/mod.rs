//! Utility functions for the application

pub mod file;
pub mod retry;
pub mod time;
