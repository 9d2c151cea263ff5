//! # Arcade Family (LF-04)
//!
//! Rock-paper-scissors over the ledger. One store entry per game, keyed by
//! game name. Players are identified by their signing address; a `SHOOT` is
//! attributed to the envelope originator.
//!
//! ```text
//! CREATE ──→ OPEN ──SHOOT × players──→ COMPLETE (WIN / LOSE / TIE)
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod family;

pub use domain::game::{score, Game, GameState, Hand, Outcome};
pub use domain::transaction::{
    ArcadePayload, ArcadeTransaction, ACTIONS, CREATE, FIELDS, HAND, NAME, PLAYERS, SHOOT,
};
pub use family::{ArcadeFamily, TAGS};
