//! # scopr core
//!
//! Instrument communication layer: raw SCPI sessions over TCP, best-effort
//! identity probing, discovery, and one-shot command dispatch.
//!
//! * [`discovery::DiscoveryService`]: enumerate and probe instruments.
//! * [`dispatcher::CommandDispatcher`]: screenshot, identify, send command.
//! * [`session::ScpiSession`]: one request/response conversation.
//! * [`enumerators`]: sources of candidate resource strings.

pub mod discovery;
pub mod dispatcher;
pub mod enumerators;
pub mod network;
pub mod prober;
pub mod screenshot;
pub mod session;
