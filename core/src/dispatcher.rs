//! # Command Dispatcher
//!
//! Direct, one-connection-per-call operations on a single instrument:
//! screen capture, identification, and pass-through control commands.
//!
//! Every call resolves the address, opens a session, performs its exchange,
//! and closes the session whether the exchange succeeded or not. Nothing is
//! retried; the first failure is returned to the caller.

use scopr_common::config::Config;
use scopr_common::error::ScoprError;
use scopr_common::network::address::{self, Endpoint};
use scopr_protocols::block::BlockDecoder;
use scopr_protocols::scpi;
use tracing::{error, info};

use crate::screenshot::Screenshot;
use crate::session::{ScpiSession, SessionConfig};

#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    config: Config,
}

impl CommandDispatcher {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Maps an operator-supplied address to the endpoint it would connect to.
    pub fn resolve(&self, address: &str) -> Result<Endpoint, ScoprError> {
        address::resolve_endpoint(address, self.config.default_port)
    }

    /// Sends `command` as-is and drains any reply for a short while.
    ///
    /// A silent instrument is not a failure; `Ok(None)` means nothing came
    /// back before the drain deadline.
    pub async fn send_command(&self, address: &str, command: &str) -> Result<Option<String>, ScoprError> {
        let endpoint = self.resolve(address)?;
        info!("Sending command {} to {endpoint}", command.trim());

        let mut session = self.open(&endpoint).await?;
        let result = self.exchange_command(&mut session, command).await;
        session.close().await;

        if let Err(e) = &result {
            error!("Failed to execute command {}. {e}", command.trim());
        }
        result
    }

    /// Returns the full, trimmed `*IDN?` reply.
    pub async fn identify(&self, address: &str) -> Result<String, ScoprError> {
        let endpoint = self.resolve(address)?;
        info!("Sending command {} to {endpoint}", scpi::IDN_QUERY);

        let mut session = self.open(&endpoint).await?;
        let result = self.exchange_identity(&mut session).await;
        session.close().await;

        if let Err(e) = &result {
            error!("Failed to identify device. {e}");
        }
        result
    }

    /// Retrieves the current display contents as one binary block.
    pub async fn fetch_screenshot(&self, address: &str) -> Result<Screenshot, ScoprError> {
        let endpoint = self.resolve(address)?;
        info!("Requesting screenshot from {endpoint}");

        let mut session = self.open(&endpoint).await?;
        let result = self.exchange_screenshot(&mut session).await;
        session.close().await;

        match &result {
            Ok(shot) => info!("Received {} byte screenshot from {endpoint}", shot.len()),
            Err(e) => error!("Screenshot retrieval failed. {e}"),
        }
        result
    }

    async fn open(&self, endpoint: &Endpoint) -> Result<ScpiSession, ScoprError> {
        let config = SessionConfig::new(endpoint.clone(), self.config.operation);
        ScpiSession::open(&config).await
    }

    async fn exchange_command(
        &self,
        session: &mut ScpiSession,
        command: &str,
    ) -> Result<Option<String>, ScoprError> {
        session.send_line(command).await?;
        let reply = session.read_text(self.config.drain_timeout).await?;
        Ok(Some(reply).filter(|r| !r.is_empty()))
    }

    async fn exchange_identity(&self, session: &mut ScpiSession) -> Result<String, ScoprError> {
        session.send_line(scpi::IDN_QUERY).await?;
        let reply = session.read_text(self.config.identify_timeout).await?;

        if reply.is_empty() {
            return Err(ScoprError::protocol(
                session.endpoint(),
                "no identification string received from the device",
            ));
        }
        Ok(reply)
    }

    async fn exchange_screenshot(&self, session: &mut ScpiSession) -> Result<Screenshot, ScoprError> {
        let decoder = BlockDecoder::new(session.timeouts().read())
            .with_max_len(self.config.max_block_len)
            .with_terminator_timeout(self.config.terminator_timeout);

        session.send_line(&self.config.screenshot_query).await?;
        let block = session.read_binary_block(&decoder).await?;
        Ok(Screenshot::new(block.into_payload()))
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
