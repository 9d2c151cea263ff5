//! # Shared Bus - Ledger Event Bus
//!
//! Carries transaction lifecycle events from the node runtime to anyone who
//! wants to observe commits without polling: in-process clients, tests, and
//! the HTTP layer.
//!
//! ```text
//! ┌──────────────┐    publish()     ┌──────────────┐   subscribe()   ┌──────────────┐
//! │ Node intake  │ ───────────────→ │  Event Bus   │ ──────────────→ │  Observers   │
//! │ Ordering loop│                  │ (broadcast)  │                 │              │
//! └──────────────┘                  └──────────────┘                 └──────────────┘
//! ```
//!
//! The bus is an observation channel only. Store mutation never flows through
//! it; a dropped event never changes what was committed.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic, LedgerEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventSubscriber, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
