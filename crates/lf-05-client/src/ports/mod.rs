//! Ports for the client.

pub mod transport;
