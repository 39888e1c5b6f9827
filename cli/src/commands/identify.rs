use colored::*;
use scopr_common::config::Config;
use scopr_core::dispatcher::CommandDispatcher;

use crate::terminal::{colors, print};

pub async fn identify(address: &str, cfg: &Config) -> anyhow::Result<()> {
    let dispatcher = CommandDispatcher::new(cfg.clone());
    let idn: String = dispatcher.identify(address).await?;

    print::print_status(format!("{}", idn.color(colors::PRIMARY)));
    Ok(())
}
