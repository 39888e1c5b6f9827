use colored::*;
use scopr_common::device::{DeviceInfo, ProbeOutcome};

use crate::terminal::colors;

type Detail = (String, ColoredString);

/// Key/value rows shown under a device in the discovery tree.
pub fn device_to_details(device: &DeviceInfo) -> Vec<Detail> {
    let mut details: Vec<Detail> = vec![(
        "Address".to_string(),
        device.address.raw().color(colors::TEXT_DEFAULT),
    )];

    if let Some(endpoint) = device.address.endpoint() {
        details.push(("Socket".to_string(), endpoint.to_string().color(colors::ENDPOINT)));
    }

    details.push(outcome_to_detail(&device.outcome));
    details
}

fn outcome_to_detail(outcome: &ProbeOutcome) -> Detail {
    let value = match outcome {
        ProbeOutcome::Identified { .. } => "identified".green(),
        ProbeOutcome::Unidentified { reason, .. } => {
            format!("no identity ({reason})").color(colors::WARNING)
        }
        ProbeOutcome::Skipped => "not probed".dimmed(),
    };
    ("Status".to_string(), value)
}
