//! # Domain Layer

pub mod game;
pub mod transaction;
