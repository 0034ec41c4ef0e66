//! Data models.

pub mod care;
pub mod config;
