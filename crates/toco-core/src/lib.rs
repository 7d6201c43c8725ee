//! Core toco library (API client, session, task view-model, config).

pub mod api;
pub mod config;
pub mod session;
pub mod tasks;
