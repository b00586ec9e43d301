//! Full-screen feed view for a single discussion thread.

pub mod effects;
pub mod events;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod text;
pub mod update;

use std::io::{IsTerminal, stdout};

use anyhow::Result;
use candor_core::api::{ApiClient, ThreadRef};
use candor_core::config::Config;
pub use runtime::TuiRuntime;
use tracing::info;

use crate::state::AppState;

/// Opens the feed for `thread` and blocks until the user quits.
///
/// Must be called from within a multi-threaded tokio runtime; network calls
/// are spawned onto it while this thread drives the terminal.
pub async fn run_feed(config: &Config, client: ApiClient, thread: ThreadRef) -> Result<()> {
    if !stdout().is_terminal() {
        anyhow::bail!(
            "The feed view requires a terminal.\n\
             Use `candor thread show {thread}` for non-interactive output."
        );
    }

    info!(%thread, base_url = client.base_url(), "opening feed");
    let state = AppState::new(
        thread,
        config.thread.default_sort,
        config.thread.page_sizes(),
    );
    let mut runtime = TuiRuntime::new(state, client)?;
    runtime.run()
}
