//! # Adapters

pub mod memory_store;
