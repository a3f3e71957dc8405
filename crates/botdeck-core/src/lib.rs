//! Core library for the botdeck control panel.
//!
//! Everything the front ends (TUI and CLI) share lives here:
//! - `config` - `${BOTDECK_HOME}/config.toml` loading and path resolution
//! - `credentials` - persisted session token + cached operator profile
//! - `api` - the management API gateway (token injection, response classification)
//! - `session` - the four-phase session state machine
//! - `roles` - operator roles and the section capability model
//! - `logging` - tracing initialization

pub mod api;
pub mod config;
pub mod credentials;
pub mod logging;
pub mod roles;
pub mod session;
