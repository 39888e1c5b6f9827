//! Shared model for the `scopr` workspace: configuration, addresses,
//! discovered devices, and the error taxonomy every operation reports with.

pub mod config;
pub mod device;
pub mod enumeration;
pub mod error;
pub mod network;
