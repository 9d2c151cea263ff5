//! # Ledger Events
//!
//! Defines all event types that flow through the shared bus.

use serde::{Deserialize, Serialize};
use shared_types::entities::TransactionId;

/// All events that can be published to the event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    // =========================================================================
    // INTAKE
    // =========================================================================
    /// A signed submission passed intake and is waiting to be ordered.
    TransactionSubmitted {
        id: TransactionId,
        transaction_type: String,
        originator: String,
    },

    // =========================================================================
    // ORDERING / APPLY
    // =========================================================================
    /// The transaction validated and was applied to its family store.
    TransactionCommitted { id: TransactionId, block: u64 },

    /// The transaction failed validation, at intake or when ordered.
    TransactionRejected { id: TransactionId, reason: String },

    /// A batch of transactions was ordered and applied.
    BlockCommitted {
        block: u64,
        committed: usize,
        rejected: usize,
    },
}

impl LedgerEvent {
    /// Returns the topic for this event.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::TransactionSubmitted { .. } => EventTopic::Intake,
            Self::TransactionCommitted { .. } | Self::TransactionRejected { .. } => {
                EventTopic::Outcome
            }
            Self::BlockCommitted { .. } => EventTopic::Block,
        }
    }

    /// The transaction this event is about, if any.
    #[must_use]
    pub fn transaction_id(&self) -> Option<&TransactionId> {
        match self {
            Self::TransactionSubmitted { id, .. }
            | Self::TransactionCommitted { id, .. }
            | Self::TransactionRejected { id, .. } => Some(id),
            Self::BlockCommitted { .. } => None,
        }
    }
}

/// Event topics for filtering subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Submissions accepted by the node.
    Intake,
    /// Per-transaction commit or rejection.
    Outcome,
    /// Block boundaries.
    Block,
    /// Wildcard.
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to match (empty = all).
    pub topics: Vec<EventTopic>,
    /// Only events about this transaction (`None` = any).
    pub transaction: Option<TransactionId>,
}

impl EventFilter {
    /// Create a filter that matches all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            transaction: None,
        }
    }

    /// Create a filter for the outcome of one transaction.
    #[must_use]
    pub fn outcome_of(id: TransactionId) -> Self {
        Self {
            topics: vec![EventTopic::Outcome],
            transaction: Some(id),
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &LedgerEvent) -> bool {
        let topic_ok = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let txn_ok = match &self.transaction {
            None => true,
            Some(wanted) => event.transaction_id() == Some(wanted),
        };

        topic_ok && txn_ok
    }
}
