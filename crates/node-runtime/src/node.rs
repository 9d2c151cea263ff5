//! # Ledger Node
//!
//! A single node standing in for the replicated ledger.
//!
//! ## Flow
//!
//! ```text
//! submit ──→ verify signature ──→ TransactionMessage ──→ registry.dispatch
//!                 │ mismatch                                   │
//!                 ↓                                            ↓
//!             Rejected                              pending queue (Pending)
//!                                                              │
//!                                           commit_block (ordering loop)
//!                                                              │
//!                                  Lifecycle::validate ──→ Lifecycle::apply
//!                                        │ rejected                │
//!                                        ↓                         ↓
//!                                    Rejected               Committed { block }
//! ```
//!
//! ## Invariants
//!
//! - Blocks are ordered one at a time; no two `apply` calls overlap.
//! - Within a block, transactions are validated and applied in arrival order,
//!   each against the store as left by the previous one.
//! - A family store is written only by `Lifecycle<Validated>::apply`.
//! - A verified envelope is queued at most once for the life of the node,
//!   independent of how long its status is retained.

use crate::container::{load_families, NodeConfig};
use crate::errors::NodeError;
use crate::replay::ReplayGuard;
use crate::status::StatusBook;
use lf_01_signing::{envelope_digest, EnvelopeSignatureApi, EnvelopeSigningService, SigningError};
use lf_02_family_core::{
    FamilyRegistry, FamilyTransaction, Lifecycle, TransactionMessage, TransactionMeta,
};
use parking_lot::Mutex;
use shared_bus::{EventPublisher, InMemoryEventBus, LedgerEvent};
use shared_types::{SignedEnvelope, SubmissionId, SubmissionStatus, TransactionId};
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// A dispatched transaction waiting for its block.
struct PendingTransaction {
    id: TransactionId,
    transaction_type: String,
    transaction: Box<dyn FamilyTransaction>,
}

/// Result of one ordering round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSummary {
    pub block: u64,
    pub outcomes: Vec<(TransactionId, SubmissionStatus)>,
}

impl BlockSummary {
    pub fn committed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, status)| status.is_committed())
            .count()
    }

    pub fn rejected(&self) -> usize {
        self.outcomes.len() - self.committed()
    }
}

pub struct LedgerNode {
    config: NodeConfig,
    registry: FamilyRegistry,
    verifier: EnvelopeSigningService,
    pending: Mutex<VecDeque<PendingTransaction>>,
    statuses: StatusBook,
    replay: ReplayGuard,
    /// Serializes ordering rounds and holds the last committed block number.
    height: Mutex<u64>,
    committed_height: AtomicU64,
    bus: Arc<InMemoryEventBus>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl LedgerNode {
    /// Validate the configuration and load the enabled families.
    pub fn new(config: NodeConfig) -> Result<Self, NodeError> {
        config.validate()?;
        let registry = load_families(&config.families)?;
        Ok(Self::with_registry(config, registry))
    }

    /// Use an already populated registry.
    pub fn with_registry(config: NodeConfig, registry: FamilyRegistry) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let statuses = StatusBook::new(config.status.retention);
        Self {
            config,
            registry,
            verifier: EnvelopeSigningService::new(),
            pending: Mutex::new(VecDeque::new()),
            statuses,
            replay: ReplayGuard::new(),
            height: Mutex::new(0),
            committed_height: AtomicU64::new(0),
            bus: Arc::new(InMemoryEventBus::new()),
            shutdown_tx,
            shutdown_rx,
        }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn registry(&self) -> &FamilyRegistry {
        &self.registry
    }

    pub fn events(&self) -> Arc<InMemoryEventBus> {
        Arc::clone(&self.bus)
    }

    /// Last committed block number; 0 before the first block.
    pub fn block_height(&self) -> u64 {
        self.committed_height.load(Ordering::Acquire)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn status(&self, id: &SubmissionId) -> Option<SubmissionStatus> {
        self.statuses.get(id)
    }

    /// Committed contents of a store, with the block they reflect.
    pub fn store_entries(
        &self,
        store_name: &str,
    ) -> Result<Option<(u64, BTreeMap<String, String>)>, NodeError> {
        let Some(store) = self.registry.store_by_name(store_name) else {
            return Ok(None);
        };
        // Hold the ordering lock so the snapshot never sees half a block.
        let height = self.height.lock();
        Ok(Some((*height, store.entries()?)))
    }

    // =========================================================================
    // INTAKE
    // =========================================================================

    /// Accept a signed submission.
    ///
    /// A bad signature still yields an id and is recorded as rejected, but
    /// claims nothing: a correctly signed envelope with the same id replaces
    /// that rejection. Resubmitting an accepted envelope returns the same id
    /// and does nothing else, however long ago it committed.
    pub async fn submit(&self, envelope: SignedEnvelope) -> Result<SubmissionId, NodeError> {
        envelope.check_version()?;
        let digest = envelope_digest(&envelope.transaction_type, &envelope.update, &envelope.nonce)
            .map_err(|e| NodeError::Malformed(e.to_string()))?;
        let id = TransactionId::from_hash(&digest);

        if self.replay.is_accepted(&digest) {
            debug!(txn_id = %id.short(), "Duplicate submission ignored");
            return Ok(id);
        }

        match self.registry.transaction_type_of(&envelope.message_type) {
            None => {
                warn!(message_type = %envelope.message_type, "No family for message type");
                return Err(lf_02_family_core::ConfigurationError::UnknownMessageType(
                    envelope.message_type.clone(),
                )
                .into());
            }
            Some(expected) if expected != envelope.transaction_type => {
                return Err(NodeError::Malformed(format!(
                    "message type {} carries {}, not {}",
                    envelope.message_type, expected, envelope.transaction_type
                )));
            }
            Some(_) => {}
        }

        let verified = match self.verifier.verify_envelope(&envelope) {
            Ok(verified) => verified,
            Err(SigningError::Envelope(e)) => return Err(e.into()),
            Err(e) => {
                self.reject_at_intake(&id, e.to_string()).await;
                return Ok(id);
            }
        };

        let meta = TransactionMeta::new(verified.originator, id.clone());
        let message = TransactionMessage::new(
            envelope.message_type,
            envelope.transaction_type.clone(),
            envelope.update,
            meta,
        );
        let transaction = self.registry.dispatch(message)?;
        debug!(txn_id = %id.short(), identity = %transaction.identity(), "Dispatched");

        if let Err(e) = self.replay.accept(digest) {
            debug!(error = %e, "Duplicate submission ignored");
            return Ok(id);
        }
        self.statuses.admit(id.clone());
        self.pending.lock().push_back(PendingTransaction {
            id: id.clone(),
            transaction_type: envelope.transaction_type.clone(),
            transaction,
        });

        info!(txn_id = %id.short(), transaction_type = %envelope.transaction_type, "Submission accepted");
        self.bus
            .publish(LedgerEvent::TransactionSubmitted {
                id: id.clone(),
                transaction_type: envelope.transaction_type,
                originator: envelope.signer,
            })
            .await;
        Ok(id)
    }

    async fn reject_at_intake(&self, id: &TransactionId, reason: String) {
        warn!(txn_id = %id.short(), %reason, "Signature check failed");
        let recorded = self.statuses.insert_new(
            id.clone(),
            SubmissionStatus::Rejected {
                reason: reason.clone(),
            },
        );
        if !recorded {
            return;
        }
        self.bus
            .publish(LedgerEvent::TransactionRejected {
                id: id.clone(),
                reason,
            })
            .await;
    }

    // =========================================================================
    // ORDERING
    // =========================================================================

    /// Order up to `max_batch_size` pending transactions into the next block.
    ///
    /// Returns `None` when nothing was pending.
    pub async fn commit_block(&self) -> Option<BlockSummary> {
        let summary = self.order_batch()?;

        for (id, status) in &summary.outcomes {
            let event = match status {
                SubmissionStatus::Committed { block } => LedgerEvent::TransactionCommitted {
                    id: id.clone(),
                    block: *block,
                },
                SubmissionStatus::Rejected { reason } => LedgerEvent::TransactionRejected {
                    id: id.clone(),
                    reason: reason.clone(),
                },
                SubmissionStatus::Pending => continue,
            };
            self.bus.publish(event).await;
        }
        self.bus
            .publish(LedgerEvent::BlockCommitted {
                block: summary.block,
                committed: summary.committed(),
                rejected: summary.rejected(),
            })
            .await;

        Some(summary)
    }

    fn order_batch(&self) -> Option<BlockSummary> {
        let mut height = self.height.lock();

        let batch: Vec<PendingTransaction> = {
            let mut pending = self.pending.lock();
            let take = pending.len().min(self.config.ordering.max_batch_size);
            pending.drain(..take).collect()
        };
        if batch.is_empty() {
            return None;
        }

        let block = *height + 1;
        let outcomes: Vec<_> = batch
            .into_iter()
            .map(|item| {
                let id = item.id.clone();
                let status = self.order_one(item, block);
                self.statuses.finish(&id, status.clone());
                (id, status)
            })
            .collect();

        *height = block;
        self.committed_height.store(block, Ordering::Release);

        let summary = BlockSummary { block, outcomes };
        info!(
            block,
            committed = summary.committed(),
            rejected = summary.rejected(),
            "Block committed"
        );
        Some(summary)
    }

    fn order_one(&self, item: PendingTransaction, block: u64) -> SubmissionStatus {
        let store = match self.registry.store_for(&item.transaction_type) {
            Ok(store) => store,
            Err(e) => {
                error!(txn_id = %item.id.short(), error = %e, "No store for transaction");
                return SubmissionStatus::Rejected {
                    reason: e.to_string(),
                };
            }
        };

        let validated = match Lifecycle::new(item.transaction).validate(store.as_ref()) {
            Ok(validated) => validated,
            Err(discarded) => {
                let reason = discarded.rejection().reason().to_string();
                warn!(txn_id = %item.id.short(), identity = %discarded.identity(), %reason, "Transaction rejected");
                return SubmissionStatus::Rejected { reason };
            }
        };

        match validated.apply(store.as_ref()) {
            Ok(applied) => {
                debug!(txn_id = %item.id.short(), identity = %applied.identity(), block, "Applied");
                SubmissionStatus::Committed { block }
            }
            Err(e) => {
                error!(txn_id = %item.id.short(), error = %e, "Store fault during apply");
                SubmissionStatus::Rejected {
                    reason: format!("store fault: {e}"),
                }
            }
        }
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown_rx.clone()
    }

    pub fn is_shutting_down(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    /// Stop the ordering loop and the HTTP server.
    pub fn shutdown(&self) {
        info!("Initiating shutdown...");
        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }
    }

    /// Subscribers currently attached to the node's event bus.
    pub fn event_subscribers(&self) -> usize {
        self.bus.subscriber_count()
    }
}

impl std::fmt::Debug for LedgerNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerNode")
            .field("block_height", &self.block_height())
            .field("pending", &self.pending_count())
            .field("families", &self.registry.families())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lf_01_signing::{sign_update_with_nonce, KeyPair};
    use lf_02_family_core::TransactionFamily;
    use lf_03_clinical::{ClinicalFamily, CREATE_STUDY, STUDY_DETAILS, STUDY_NUMBER};
    use lf_04_arcade::{ArcadeFamily, Game, GameState, Hand, CREATE, HAND, NAME, PLAYERS, SHOOT};
    use serde_json::json;
    use shared_bus::EventFilter;
    use shared_types::UpdateRecord;
    use uuid::Uuid;

    fn node() -> LedgerNode {
        LedgerNode::new(NodeConfig::default()).unwrap()
    }

    fn signed<F: TransactionFamily>(
        family: &F,
        key: &KeyPair,
        action: &str,
        provided: UpdateRecord,
    ) -> SignedEnvelope {
        let tags = family.tags();
        let update = family.prepare_update(action, provided);
        sign_update_with_nonce(key, tags.transaction_type, tags.message_type, update, Uuid::new_v4())
            .unwrap()
            .envelope
    }

    fn study(number: &str) -> UpdateRecord {
        UpdateRecord::new()
            .field(STUDY_NUMBER, number)
            .field(STUDY_DETAILS, json!({"title": "T"}))
    }

    #[tokio::test]
    async fn test_submit_order_commit() {
        let node = node();
        let key = KeyPair::generate();
        let mut outcomes = node.events().subscribe(EventFilter::all());

        let id = node
            .submit(signed(&ClinicalFamily::default(), &key, CREATE_STUDY, study("S100")))
            .await
            .unwrap();
        assert_eq!(node.status(&id), Some(SubmissionStatus::Pending));

        let summary = node.commit_block().await.unwrap();
        assert_eq!(summary.block, 1);
        assert_eq!(node.status(&id), Some(SubmissionStatus::Committed { block: 1 }));

        let (block, entries) = node.store_entries("ClinicalTransaction").unwrap().unwrap();
        assert_eq!(block, 1);
        assert!(entries.contains_key("S100"));

        assert!(matches!(
            outcomes.recv().await,
            Some(LedgerEvent::TransactionSubmitted { .. })
        ));
        assert!(matches!(
            outcomes.recv().await,
            Some(LedgerEvent::TransactionCommitted { block: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_validation_rejection_recorded() {
        let node = node();
        let envelope = signed(
            &ClinicalFamily::default(),
            &KeyPair::generate(),
            "DELETE",
            UpdateRecord::new(),
        );
        let id = node.submit(envelope).await.unwrap();
        node.commit_block().await.unwrap();

        assert_eq!(
            node.status(&id),
            Some(SubmissionStatus::Rejected {
                reason: "invalid action".into()
            })
        );
        assert!(node.store_entries("ClinicalTransaction").unwrap().unwrap().1.is_empty());
    }

    #[tokio::test]
    async fn test_forged_signer_rejected_at_intake() {
        let node = node();
        let mut envelope = signed(
            &ClinicalFamily::default(),
            &KeyPair::generate(),
            CREATE_STUDY,
            study("S1"),
        );
        envelope.signer = KeyPair::generate().address_hex();

        let id = node.submit(envelope).await.unwrap();
        assert_eq!(
            node.status(&id),
            Some(SubmissionStatus::Rejected {
                reason: "signature does not match signer".into()
            })
        );
        assert_eq!(node.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_message_type_refused() {
        let node = node();
        let mut envelope = signed(
            &ClinicalFamily::default(),
            &KeyPair::generate(),
            CREATE_STUDY,
            study("S1"),
        );
        envelope.message_type = "/Poker/Transaction".into();

        let err = node.submit(envelope).await.unwrap_err();
        assert_eq!(err.kind(), "unknown_family");
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_resubmission_after_status_eviction_is_not_reapplied() {
        let mut config = NodeConfig::default();
        config.status.retention = 1;
        let node = LedgerNode::new(config).unwrap();
        let key = KeyPair::generate();
        let family = ClinicalFamily::default();

        let first = signed(
            &family,
            &key,
            CREATE_STUDY,
            UpdateRecord::new().field(STUDY_NUMBER, "S1").field(STUDY_DETAILS, "v1"),
        );
        let first_id = node.submit(first.clone()).await.unwrap();
        node.commit_block().await.unwrap();

        let second = signed(
            &family,
            &key,
            CREATE_STUDY,
            UpdateRecord::new().field(STUDY_NUMBER, "S1").field(STUDY_DETAILS, "v2"),
        );
        node.submit(second).await.unwrap();
        node.commit_block().await.unwrap();
        assert_eq!(node.status(&first_id), None);

        assert_eq!(node.submit(first).await.unwrap(), first_id);
        assert_eq!(node.pending_count(), 0);
        assert!(node.commit_block().await.is_none());

        let (height, entries) = node.store_entries("ClinicalTransaction").unwrap().unwrap();
        assert_eq!(height, 2);
        assert_eq!(entries["S1"], "v2");
    }

    #[tokio::test]
    async fn test_forged_copy_does_not_block_genuine_envelope() {
        let node = node();
        let genuine = signed(
            &ClinicalFamily::default(),
            &KeyPair::generate(),
            CREATE_STUDY,
            study("S7"),
        );
        let mut forged = genuine.clone();
        forged.signature = "11".repeat(65);

        let forged_id = node.submit(forged.clone()).await.unwrap();
        assert!(matches!(
            node.status(&forged_id),
            Some(SubmissionStatus::Rejected { .. })
        ));

        let id = node.submit(genuine).await.unwrap();
        assert_eq!(id, forged_id);
        assert_eq!(node.status(&id), Some(SubmissionStatus::Pending));
        assert_eq!(node.pending_count(), 1);

        // A later forged copy changes nothing either.
        node.submit(forged).await.unwrap();
        assert_eq!(node.status(&id), Some(SubmissionStatus::Pending));

        node.commit_block().await.unwrap();
        assert_eq!(node.status(&id), Some(SubmissionStatus::Committed { block: 1 }));
        let (_, entries) = node.store_entries("ClinicalTransaction").unwrap().unwrap();
        assert!(entries.contains_key("S7"));
    }

    #[tokio::test]
    async fn test_duplicate_submission_is_idempotent() {
        let node = node();
        let envelope = signed(
            &ClinicalFamily::default(),
            &KeyPair::generate(),
            CREATE_STUDY,
            study("S1"),
        );

        let first = node.submit(envelope.clone()).await.unwrap();
        let second = node.submit(envelope).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(node.pending_count(), 1);
    }

    #[tokio::test]
    async fn test_block_applies_in_arrival_order() {
        let node = node();
        let alice = KeyPair::generate();
        let bob = KeyPair::generate();
        let players = json!([alice.address_hex(), bob.address_hex()]);

        let create = UpdateRecord::new().field(NAME, "g1").field(PLAYERS, players);
        node.submit(signed(&ArcadeFamily, &alice, CREATE, create.clone())).await.unwrap();
        let dup = node.submit(signed(&ArcadeFamily, &bob, CREATE, create)).await.unwrap();
        let shoot = |hand: Hand| UpdateRecord::new().field(NAME, "g1").field(HAND, hand.as_str());
        node.submit(signed(&ArcadeFamily, &alice, SHOOT, shoot(Hand::Rock)))
            .await
            .unwrap();
        node.submit(signed(&ArcadeFamily, &bob, SHOOT, shoot(Hand::Scissors)))
            .await
            .unwrap();

        let summary = node.commit_block().await.unwrap();
        assert_eq!(summary.committed(), 3);
        assert_eq!(
            node.status(&dup),
            Some(SubmissionStatus::Rejected {
                reason: "game already exists".into()
            })
        );

        let (_, entries) = node.store_entries("RPSTransaction").unwrap().unwrap();
        let game: Game = serde_json::from_str(&entries["g1"]).unwrap();
        assert_eq!(game.state, GameState::Complete);
    }

    #[tokio::test]
    async fn test_batch_size_bounds_a_block() {
        let mut config = NodeConfig::default();
        config.ordering.max_batch_size = 2;
        let node = LedgerNode::new(config).unwrap();
        let key = KeyPair::generate();
        for n in 0..3 {
            let envelope = signed(&ClinicalFamily::default(), &key, CREATE_STUDY, study(&format!("S{n}")));
            node.submit(envelope).await.unwrap();
        }

        assert_eq!(node.commit_block().await.unwrap().outcomes.len(), 2);
        assert_eq!(node.commit_block().await.unwrap().block, 2);
        assert!(node.commit_block().await.is_none());
        assert_eq!(node.block_height(), 2);
    }

    #[test]
    fn test_unknown_store() {
        assert!(node().store_entries("Nope").unwrap().is_none());
    }
}
