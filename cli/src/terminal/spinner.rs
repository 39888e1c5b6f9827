use std::io::Write;
use std::sync::OnceLock;
use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

static SPINNER: OnceLock<ProgressBar> = OnceLock::new();

fn get_spinner() -> &'static ProgressBar {
    SPINNER.get_or_init(init_spinner)
}

fn init_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&[
            "▁▁▁▁▁",
            "▁▂▂▂▁",
            "▁▄▂▄▁",
            "▂▄▆▄▂",
            "▄▆█▆▄",
            "▂▄▆▄▂",
            "▁▄▂▄▁",
            "▁▂▂▂▁",
        ]);

    pb.set_style(style);
    pb
}

pub fn start(msg: &str) {
    let pb = get_spinner();
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
}

pub fn finish() {
    if let Some(pb) = SPINNER.get() {
        pb.finish_and_clear();
    }
}

pub fn report_discovery_progress(count: usize) {
    if let Some(pb) = SPINNER.get() {
        pb.set_message(format!(
            "Probed {} instrument(s) so far...",
            count.to_string().green().bold()
        ));
    }
}

fn is_spinning() -> bool {
    SPINNER
        .get()
        .is_some_and(|pb| !pb.is_finished() && !pb.is_hidden())
}

/// Log sink that keeps output above the spinner while it is running.
pub struct SpinnerWriter;

impl Write for SpinnerWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if is_spinning() {
            let msg = String::from_utf8_lossy(buf);
            if let Some(pb) = SPINNER.get() {
                pb.println(msg.trim_end());
            }
            return Ok(buf.len());
        }
        std::io::stdout().write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        std::io::stdout().flush()
    }
}
