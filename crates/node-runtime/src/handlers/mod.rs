//! # Background Handlers

pub mod ordering;

pub use ordering::spawn_ordering_loop;
