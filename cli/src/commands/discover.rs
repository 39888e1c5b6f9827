use std::time::{Duration, Instant};

use colored::*;
use scopr_common::config::Config;
use scopr_common::device::DeviceInfo;
use scopr_common::network::target::SweepTarget;
use scopr_core::discovery::DiscoveryService;
use scopr_core::enumerators::{ChainedResources, FixedResources, TcpSweep};

use crate::mprint;
use crate::terminal::{colors, format, print, spinner};

pub async fn discover(
    resources: Vec<String>,
    sweep: Option<SweepTarget>,
    cfg: &Config,
    quiet: u8,
) -> anyhow::Result<()> {
    let mut sources = ChainedResources::new();
    if !resources.is_empty() {
        sources.push(Box::new(FixedResources::new(resources)));
    }
    if let Some(target) = sweep {
        sources.push(Box::new(TcpSweep::new(target, cfg)));
    }
    anyhow::ensure!(
        !sources.is_empty(),
        "nothing to discover: pass --resource and/or --sweep"
    );

    let service = DiscoveryService::new(Box::new(sources), cfg)
        .with_progress(spinner::report_discovery_progress);

    spinner::start("Enumerating instruments...");
    let start_time: Instant = Instant::now();
    let result = service.discover().await;
    spinner::finish();

    let devices: Vec<DeviceInfo> = result?;
    discovery_ends(&devices, start_time.elapsed(), quiet);
    Ok(())
}

fn discovery_ends(devices: &[DeviceInfo], total_time: Duration, quiet: u8) {
    if devices.is_empty() {
        print::header("zero devices detected", quiet);
        print::no_results();
        return;
    }

    print::header("instrument discovery", quiet);
    print_devices(devices, quiet);
    print_summary(devices, total_time, quiet);
}

fn print_devices(devices: &[DeviceInfo], quiet: u8) {
    for (idx, device) in devices.iter().enumerate() {
        print::tree_head(idx, &device.display_name);
        if quiet < 2 {
            print::as_tree_one_level(format::device_to_details(device));
        }
        if quiet == 0 && idx + 1 != devices.len() {
            mprint!();
        }
    }
}

fn print_summary(devices: &[DeviceInfo], total_time: Duration, quiet: u8) {
    let identified = devices.iter().filter(|d| d.is_identified()).count();
    let found: ColoredString = format!("{} device(s)", devices.len()).bold().green();
    let named: ColoredString = format!("{identified} identified").bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: String = format!("Discovery complete: {found}, {named} in {total_time}")
        .color(colors::TEXT_DEFAULT)
        .to_string();

    match quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output);
        }
        _ => print::print_status(output),
    }
}
