//! Core library for Candor, an anonymous feedback discussion client.
//!
//! - `thread`: builds, ranks and pages comment threads (no I/O)
//! - `vote`: toggle-and-switch vote rules
//! - `api`: HTTP client for the feedback server
//! - `identity`: the anonymous session id
//! - `config` / `logging`: ambient setup shared by the CLI and the TUI

pub mod api;
pub mod config;
pub mod identity;
pub mod logging;
pub mod thread;
pub mod vote;
