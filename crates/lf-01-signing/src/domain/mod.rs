//! # Domain Layer
//!
//! Pure cryptographic logic. Only `keys` touches the filesystem.

pub mod ecdsa;
pub mod entities;
pub mod errors;
pub mod keys;
