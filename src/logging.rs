use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, LOG_ENV};

/// Build the level filter: `CHAT_LOG`, then the config file, then `info`.
pub fn build_filter(env: Option<&str>, configured: Option<&str>) -> EnvFilter {
    [env, configured]
        .into_iter()
        .flatten()
        .find_map(|directive| directive.parse::<EnvFilter>().ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Send tracing output to `<config dir>/chat-tui/chat.log`.
///
/// The terminal belongs to the UI, so nothing is written to stdout or stderr.
pub fn init(config: &Config) -> Result<()> {
    let dir = Config::get_config_dir()?;
    std::fs::create_dir_all(&dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("chat.log"))?;

    let env = std::env::var(LOG_ENV).ok();
    let filter = build_filter(env.as_deref(), config.log_level.as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {}", e))?;

    Ok(())
}
