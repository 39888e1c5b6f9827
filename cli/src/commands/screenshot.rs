use std::path::Path;

use anyhow::Context;
use scopr_common::config::Config;
use scopr_core::dispatcher::CommandDispatcher;
use scopr_core::screenshot::Screenshot;
use tracing::{info, warn};

pub async fn screenshot(address: &str, output: &Path, cfg: &Config) -> anyhow::Result<()> {
    let dispatcher = CommandDispatcher::new(cfg.clone());
    let shot: Screenshot = dispatcher.fetch_screenshot(address).await?;

    if !shot.has_png_signature() {
        warn!(
            "Payload does not look like {}; saving it unchanged",
            shot.mime_type()
        );
    }

    tokio::fs::write(output, shot.bytes())
        .await
        .with_context(|| format!("failed to write {}", output.display()))?;

    info!("Saved {} bytes to {}", shot.len(), output.display());
    Ok(())
}
