use anyhow::Result;
use candor_core::api::ThreadRef;
use candor_core::config::Config;

#[cfg(feature = "tui")]
pub async fn run(config: &Config, thread: ThreadRef) -> Result<()> {
    let client = super::api_client(config)?;
    candor_tui::run_feed(config, client, thread).await
}

#[cfg(not(feature = "tui"))]
pub async fn run(_config: &Config, thread: ThreadRef) -> Result<()> {
    anyhow::bail!(
        "This build has no feed view (built without the `tui` feature).\n\
         Use `candor thread show {thread}` instead."
    )
}
