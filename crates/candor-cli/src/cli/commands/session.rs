//! Session command handlers.

use anyhow::{Context, Result};
use candor_core::config::paths;
use candor_core::identity::SessionId;

pub fn show() -> Result<()> {
    let session = SessionId::load_or_create(&paths::session_path()).context("load session")?;
    println!("{session}");
    Ok(())
}

pub fn reset() -> Result<()> {
    let session = SessionId::reset(&paths::session_path()).context("reset session")?;
    println!("New session: {session}");
    Ok(())
}
