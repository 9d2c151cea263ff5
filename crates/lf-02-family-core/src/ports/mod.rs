//! # Ports Layer
//!
//! - `inbound`: implemented by families
//! - `outbound`: implemented by the host ledger

pub mod inbound;
pub mod outbound;
