//! # Node Container
//!
//! Configuration and family loading. Everything a node needs is built here
//! and handed to `LedgerNode` explicitly; nothing is process-global.

pub mod config;
pub mod families;

pub use config::{ApiConfig, ConfigError, FamilyConfig, NodeConfig, OrderingConfig, StatusConfig};
pub use families::load_families;
