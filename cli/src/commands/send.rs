use colored::*;
use scopr_common::config::Config;
use scopr_core::dispatcher::CommandDispatcher;
use tracing::info;

use crate::terminal::{colors, print};

pub async fn send(address: &str, command: &str, cfg: &Config) -> anyhow::Result<()> {
    anyhow::ensure!(!command.trim().is_empty(), "command must not be empty");

    let dispatcher = CommandDispatcher::new(cfg.clone());
    let reply: Option<String> = dispatcher.send_command(address, command).await?;

    info!("Command {} executed successfully.", command.trim());
    if let Some(reply) = reply {
        print::print_status(format!("{}", reply.color(colors::PRIMARY)));
    }
    Ok(())
}
