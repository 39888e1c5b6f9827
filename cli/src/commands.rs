pub mod discover;
pub mod identify;
pub mod screenshot;
pub mod send;

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};
use scopr_common::config::{Config, DEFAULT_INSTRUMENT_PORT, SessionTimeouts};
use scopr_common::network::target::SweepTarget;

#[derive(Parser)]
#[command(name = "scopr", version)]
#[command(about = "Discover, identify and control SCPI instruments over TCP.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Less terminal decoration (-q drops headers, -qq drops device details)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Instrument port used when a resource names none
    #[arg(long, global = true, default_value_t = DEFAULT_INSTRUMENT_PORT)]
    pub port: u16,

    /// Connect timeout for direct operations, in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    pub connect_timeout: Option<u64>,

    /// Read timeout for screenshot transfers, in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    pub read_timeout: Option<u64>,

    /// Connect and read timeout while probing during discovery, in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    pub probe_timeout: Option<u64>,

    /// Maximum number of probes in flight
    #[arg(short, long, global = true)]
    pub jobs: Option<usize>,

    /// Query used to request the screen image
    #[arg(long, global = true)]
    pub query: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find instruments and read their identity
    #[command(alias = "d")]
    Discover {
        /// Resource string to probe, e.g. TCPIP::192.168.1.5::INSTR (repeatable)
        #[arg(short, long = "resource", value_name = "RESOURCE")]
        resources: Vec<String>,
        /// Hosts to sweep for an open instrument port (IP, range, CIDR or list)
        #[arg(short, long)]
        sweep: Option<SweepTarget>,
    },
    /// Print the *IDN? string of an instrument
    #[command(alias = "i")]
    Identify { address: String },
    /// Send one SCPI command and print any reply
    #[command(alias = "s")]
    Send { address: String, command: String },
    /// Save the instrument's screen as a PNG
    #[command(alias = "c")]
    Screenshot {
        address: String,
        #[arg(short, long, default_value = "screenshot.png")]
        output: PathBuf,
    },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Builds the runtime configuration, starting from defaults and applying
    /// only the flags that were given.
    pub fn to_config(&self) -> anyhow::Result<Config> {
        let mut cfg = Config {
            default_port: self.port,
            ..Config::default()
        };

        let connect = self.connect_timeout.map(Duration::from_millis);
        let read = self.read_timeout.map(Duration::from_millis);
        cfg.operation = SessionTimeouts::new(
            connect.unwrap_or(cfg.operation.connect()),
            read.unwrap_or(cfg.operation.read()),
        )?;

        if let Some(ms) = self.probe_timeout {
            let probe = Duration::from_millis(ms);
            cfg.probe = SessionTimeouts::new(probe, probe)?;
        }
        if let Some(jobs) = self.jobs {
            cfg.probe_concurrency = jobs;
        }
        if let Some(query) = &self.query {
            cfg.screenshot_query = query.clone();
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
