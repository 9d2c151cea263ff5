//! # Family Client
//!
//! One client per (family, transport, key). Every operation of the commit
//! protocol is exposed separately so callers can stop after any step;
//! [`FamilyClient::send`] runs them in order.

use crate::config::ClientConfig;
use crate::errors::ClientError;
use crate::ports::transport::Transport;
use lf_01_signing::{EnvelopeSignatureApi, EnvelopeSigningService, KeyPair, SignedTransaction};
use lf_02_family_core::{FamilyTransaction, InMemoryStore, TransactionFamily, TransactionMeta};
use parking_lot::Mutex;
use shared_types::{SubmissionId, SubmissionStatus, UpdateRecord};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Poll backoff for [`FamilyClient::wait_for_commit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub poll_interval: Duration,
    pub max_poll_interval: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            max_poll_interval: Duration::from_secs(2),
        }
    }
}

impl WaitPolicy {
    /// Doubles, capped at `max_poll_interval`.
    pub fn next_delay(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max_poll_interval)
    }
}

/// Outcome of [`FamilyClient::send`].
///
/// `status` is `Pending` unless the client was configured to wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub id: SubmissionId,
    pub status: SubmissionStatus,
}

pub struct FamilyClient<F, T> {
    family: F,
    transport: T,
    keypair: KeyPair,
    signer: EnvelopeSigningService,
    validate_locally: bool,
    wait: bool,
    wait_timeout: Option<Duration>,
    policy: WaitPolicy,
    shutdown: Option<watch::Receiver<bool>>,
    last_submission: Mutex<Option<SubmissionId>>,
}

impl<F: TransactionFamily, T: Transport> FamilyClient<F, T> {
    /// Pre-validation on, no waiting, default backoff.
    pub fn new(family: F, transport: T, keypair: KeyPair) -> Self {
        Self {
            family,
            transport,
            keypair,
            signer: EnvelopeSigningService::new(),
            validate_locally: true,
            wait: false,
            wait_timeout: None,
            policy: WaitPolicy::default(),
            shutdown: None,
            last_submission: Mutex::new(None),
        }
    }

    pub fn from_config(family: F, transport: T, keypair: KeyPair, config: &ClientConfig) -> Self {
        Self::new(family, transport, keypair)
            .with_validation(!config.disable_client_validation)
            .with_wait(config.wait, config.wait_timeout())
            .with_wait_policy(config.wait_policy())
    }

    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validate_locally = enabled;
        self
    }

    /// Make [`send`](Self::send) wait for commit, bounded by `timeout`.
    pub fn with_wait(mut self, wait: bool, timeout: Option<Duration>) -> Self {
        self.wait = wait;
        self.wait_timeout = timeout;
        self
    }

    pub fn with_wait_policy(mut self, policy: WaitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Waits end with `Cancelled` once `true` is sent on this channel.
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn family(&self) -> &F {
        &self.family
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn address_hex(&self) -> String {
        self.keypair.address_hex()
    }

    pub fn last_submission(&self) -> Option<SubmissionId> {
        self.last_submission.lock().clone()
    }

    // ===== BUILD / VALIDATE / SIGN =====

    /// Full-superset update for `action`, with the family's cross-field
    /// defaults applied.
    pub fn build_update(&self, action: &str, provided: UpdateRecord) -> UpdateRecord {
        self.family.prepare_update(action, provided)
    }

    /// Committed contents of this family's store.
    pub async fn store_snapshot(&self) -> Result<BTreeMap<String, String>, ClientError> {
        Ok(self
            .transport
            .fetch_store(self.family.tags().store_name)
            .await?)
    }

    /// Run the family's own `validate` against the node's committed store,
    /// attributed to this client's address.
    pub async fn pre_validate(&self, update: &UpdateRecord) -> Result<(), ClientError> {
        let snapshot = InMemoryStore::from_entries(self.store_snapshot().await?);
        let draft = self
            .family
            .decode(update, TransactionMeta::draft(self.keypair.address()));

        draft.validate(&snapshot).map_err(|e| {
            warn!(identity = %draft.identity(), reason = %e, "Rejected before submission");
            ClientError::Validation(e)
        })
    }

    pub fn sign(&self, update: UpdateRecord) -> Result<SignedTransaction, ClientError> {
        let tags = self.family.tags();
        Ok(self.signer.sign_update(
            &self.keypair,
            tags.transaction_type,
            tags.message_type,
            update,
        )?)
    }

    // ===== SUBMIT =====

    pub async fn submit(&self, signed: &SignedTransaction) -> Result<SubmissionId, ClientError> {
        let id = self.transport.submit(&signed.envelope).await?;
        if id != signed.id {
            warn!(expected = %signed.id.short(), got = %id.short(), "Node assigned a different id");
        }
        info!(txn_id = %id.short(), family = self.family.tags().name, "Submitted transaction");

        *self.last_submission.lock() = Some(id.clone());
        Ok(id)
    }

    /// Build, optionally pre-validate, sign, submit and optionally wait.
    pub async fn send(&self, action: &str, provided: UpdateRecord) -> Result<Receipt, ClientError> {
        let update = self.build_update(action, provided);
        debug!(action, update = ?update, "Built update");

        if self.validate_locally {
            self.pre_validate(&update).await?;
        }

        let signed = self.sign(update)?;
        let id = self.submit(&signed).await?;

        if !self.wait {
            return Ok(Receipt {
                id,
                status: SubmissionStatus::Pending,
            });
        }

        let block = self.wait_for_commit(&id, self.wait_timeout).await?;
        Ok(Receipt {
            id,
            status: SubmissionStatus::Committed { block },
        })
    }

    // ===== WAIT =====

    /// Poll until the submission commits. Returns the block number.
    ///
    /// Ends with `Rejected` if the node's validation refused it, `Timeout`
    /// once `deadline` elapses, and `Cancelled` on shutdown. Dropping the
    /// future abandons the wait; the submission itself is unaffected.
    pub async fn wait_for_commit(
        &self,
        id: &SubmissionId,
        deadline: Option<Duration>,
    ) -> Result<u64, ClientError> {
        let started = Instant::now();
        let polling = self.poll_until_final(id);

        let block = match deadline {
            Some(limit) => tokio::time::timeout(limit, polling)
                .await
                .map_err(|_| ClientError::Timeout {
                    id: id.clone(),
                    waited: started.elapsed(),
                })??,
            None => polling.await?,
        };

        info!(txn_id = %id.short(), block, elapsed = ?started.elapsed(), "Transaction committed");
        Ok(block)
    }

    /// Wait on the most recent submission from this client.
    pub async fn wait_for_last_commit(&self, deadline: Option<Duration>) -> Result<u64, ClientError> {
        let id = self
            .last_submission()
            .ok_or_else(|| ClientError::Configuration("nothing submitted yet".to_string()))?;
        self.wait_for_commit(&id, deadline).await
    }

    async fn poll_until_final(&self, id: &SubmissionId) -> Result<u64, ClientError> {
        let mut delay = self.policy.poll_interval;
        loop {
            match self.transport.status(id).await? {
                SubmissionStatus::Committed { block } => return Ok(block),
                SubmissionStatus::Rejected { reason } => {
                    warn!(txn_id = %id.short(), %reason, "Rejected by node");
                    return Err(ClientError::Rejected {
                        id: id.clone(),
                        reason,
                    });
                }
                SubmissionStatus::Pending => {
                    debug!(txn_id = %id.short(), next_poll = ?delay, "Still pending");
                }
            }
            self.pause(id, delay).await?;
            delay = self.policy.next_delay(delay);
        }
    }

    /// Sleep for `delay` unless shutdown fires first.
    async fn pause(&self, id: &SubmissionId, delay: Duration) -> Result<(), ClientError> {
        let Some(shutdown) = &self.shutdown else {
            tokio::time::sleep(delay).await;
            return Ok(());
        };

        let mut shutdown = shutdown.clone();
        if *shutdown.borrow() {
            return Err(ClientError::Cancelled(id.clone()));
        }

        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => return Ok(()),
                changed = shutdown.changed() => match changed {
                    Ok(()) if *shutdown.borrow() => {
                        info!(txn_id = %id.short(), "Wait cancelled");
                        return Err(ClientError::Cancelled(id.clone()));
                    }
                    Ok(()) => continue,
                    // Sender gone: no cancel can arrive any more.
                    Err(_) => {
                        (&mut sleep).await;
                        return Ok(());
                    }
                },
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::errors::TransportError;
    use async_trait::async_trait;
    use lf_03_clinical::{ClinicalFamily, CREATE_STUDY, STUDY_DETAILS, STUDY_NUMBER};
    use shared_types::SignedEnvelope;
    use std::collections::VecDeque;

    /// Records submissions and replays scripted statuses. Once the script
    /// runs out, the last status repeats.
    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        pub submitted: Mutex<Vec<SignedEnvelope>>,
        pub statuses: Mutex<VecDeque<SubmissionStatus>>,
        pub store: Mutex<BTreeMap<String, String>>,
        pub polls: Mutex<usize>,
    }

    impl ScriptedTransport {
        pub(crate) fn with_statuses(statuses: Vec<SubmissionStatus>) -> Self {
            Self {
                statuses: Mutex::new(statuses.into()),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn submit(&self, envelope: &SignedEnvelope) -> Result<SubmissionId, TransportError> {
            let id = lf_01_signing::envelope_digest(
                &envelope.transaction_type,
                &envelope.update,
                &envelope.nonce,
            )
            .map(|digest| SubmissionId::from_hash(&digest))
            .map_err(|e| TransportError::Decode(e.to_string()))?;
            self.submitted.lock().push(envelope.clone());
            Ok(id)
        }

        async fn status(&self, _id: &SubmissionId) -> Result<SubmissionStatus, TransportError> {
            *self.polls.lock() += 1;
            let mut statuses = self.statuses.lock();
            let status = if statuses.len() > 1 {
                statuses.pop_front()
            } else {
                statuses.front().cloned()
            };
            Ok(status.unwrap_or(SubmissionStatus::Pending))
        }

        async fn fetch_store(&self, _name: &str) -> Result<BTreeMap<String, String>, TransportError> {
            Ok(self.store.lock().clone())
        }
    }

    fn fast() -> WaitPolicy {
        WaitPolicy {
            poll_interval: Duration::from_millis(1),
            max_poll_interval: Duration::from_millis(4),
        }
    }

    fn client(transport: ScriptedTransport) -> FamilyClient<ClinicalFamily, ScriptedTransport> {
        FamilyClient::new(ClinicalFamily::default(), transport, KeyPair::generate())
            .with_wait_policy(fast())
    }

    fn study(number: &str) -> UpdateRecord {
        UpdateRecord::new()
            .field(STUDY_NUMBER, number)
            .field(STUDY_DETAILS, "phase one")
    }

    #[test]
    fn test_backoff_doubles_to_cap() {
        let policy = WaitPolicy {
            poll_interval: Duration::from_millis(100),
            max_poll_interval: Duration::from_millis(350),
        };
        let d1 = policy.next_delay(policy.poll_interval);
        let d2 = policy.next_delay(d1);
        assert_eq!(d1, Duration::from_millis(200));
        assert_eq!(d2, Duration::from_millis(350));
        assert_eq!(policy.next_delay(d2), Duration::from_millis(350));
    }

    #[tokio::test]
    async fn test_pre_validation_fails_fast_without_submitting() {
        let client = client(ScriptedTransport::default());
        let err = client.send("DELETE", UpdateRecord::new()).await.unwrap_err();

        assert_eq!(err.rejection_reason(), Some("invalid action"));
        assert!(client.transport().submitted.lock().is_empty());
        assert_eq!(client.last_submission(), None);
    }

    #[tokio::test]
    async fn test_disabled_pre_validation_submits_anyway() {
        let client = client(ScriptedTransport::default()).with_validation(false);
        let receipt = client.send("DELETE", UpdateRecord::new()).await.unwrap();

        assert_eq!(receipt.status, SubmissionStatus::Pending);
        assert_eq!(client.transport().submitted.lock().len(), 1);
        assert_eq!(client.last_submission(), Some(receipt.id));
    }

    #[tokio::test]
    async fn test_signed_update_is_the_built_update() {
        let client = client(ScriptedTransport::default());
        let expected = client.build_update(CREATE_STUDY, study("S100"));
        client.send(CREATE_STUDY, study("S100")).await.unwrap();

        let submitted = client.transport().submitted.lock();
        assert_eq!(submitted[0].update, expected);
        assert_eq!(submitted[0].signer, client.address_hex());
        assert_eq!(submitted[0].transaction_type, "/ClinicalTransaction");
    }

    #[tokio::test]
    async fn test_send_and_wait_until_committed() {
        let transport = ScriptedTransport::with_statuses(vec![
            SubmissionStatus::Pending,
            SubmissionStatus::Pending,
            SubmissionStatus::Committed { block: 3 },
        ]);
        let client = client(transport).with_wait(true, Some(Duration::from_secs(5)));

        let receipt = client.send(CREATE_STUDY, study("S100")).await.unwrap();
        assert_eq!(receipt.status, SubmissionStatus::Committed { block: 3 });
        assert_eq!(*client.transport().polls.lock(), 3);
    }

    #[tokio::test]
    async fn test_zero_deadline_times_out() {
        let client = client(ScriptedTransport::default());
        let id = SubmissionId::new("never");

        let err = client
            .wait_for_commit(&id, Some(Duration::ZERO))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Timeout { .. }), "{err}");
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_server_rejection_ends_wait() {
        let transport = ScriptedTransport::with_statuses(vec![
            SubmissionStatus::Pending,
            SubmissionStatus::Rejected {
                reason: "study number is not set".into(),
            },
        ]);
        let client = client(transport).with_validation(false);
        let receipt = client.send(CREATE_STUDY, study("")).await.unwrap();

        let err = client.wait_for_last_commit(None).await.unwrap_err();
        assert!(matches!(err, ClientError::Rejected { ref id, .. } if *id == receipt.id));
        assert_eq!(err.rejection_reason(), Some("study number is not set"));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_shutdown_cancels_wait() {
        let (tx, rx) = watch::channel(false);
        let client = client(ScriptedTransport::default()).with_shutdown(rx);
        let id = SubmissionId::new("pending-forever");

        let cancel = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            tx.send(true).unwrap();
        };
        let (result, ()) = tokio::join!(client.wait_for_commit(&id, None), cancel);

        assert!(matches!(result, Err(ClientError::Cancelled(_))));
    }

    #[tokio::test]
    async fn test_wait_for_last_commit_needs_a_submission() {
        let client = client(ScriptedTransport::default());
        let err = client.wait_for_last_commit(None).await.unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)));
    }
}
