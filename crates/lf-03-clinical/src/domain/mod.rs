//! # Domain Layer

pub mod entities;
pub mod transaction;
