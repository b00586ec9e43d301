//! CLI command handlers.

pub mod comment;
pub mod config;
pub mod feed;
pub mod session;
pub mod thread;
pub mod vote;

use anyhow::{Context, Result};
use candor_core::api::ApiClient;
use candor_core::config::{Config, paths};
use candor_core::identity::SessionId;

/// Builds an API client for the configured server and the stored session.
pub(crate) fn api_client(config: &Config) -> Result<ApiClient> {
    let session = SessionId::load_or_create(&paths::session_path()).context("load session")?;
    ApiClient::new(config.api.base_url.clone(), session, config.api.timeout())
        .context("create API client")
}
