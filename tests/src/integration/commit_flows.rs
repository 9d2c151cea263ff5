//! # Commit Flows
//!
//! Client build → sign → submit → wait, against an in-process node with its
//! ordering loop running.
//!
//! ## Scenarios
//!
//! 1. CREATE_STUDY commits and the study is in the store
//! 2. CREATE_STUDY with an empty study number is rejected
//! 3. ADD without a procedure identifier is rejected
//! 4. Arcade CREATE commits under the arcade store
//! 5. An action outside both families is rejected as invalid
//!
//! Plus the wait semantics: deadline, node-side rejection, cancellation,
//! and commits that land after the caller stopped waiting.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{client, fast_polling, node};
    use lf_01_signing::KeyPair;
    use lf_03_clinical::{
        ClinicalFamily, CrfDetails, StudyDetails, ADD, CREATE_STUDY, CRF_ID, PROD_ID,
        STUDY_DETAILS, STUDY_NUMBER,
    };
    use lf_04_arcade::{ArcadeFamily, GameState, Hand, Outcome, CREATE, NAME, PLAYERS};
    use lf_05_client::{ClientError, FamilyClient};
    use node_runtime::{spawn_ordering_loop, LocalTransport};
    use serde_json::json;
    use shared_bus::{EventFilter, LedgerEvent};
    use shared_types::{SubmissionStatus, UpdateRecord};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::watch;

    fn study_details() -> StudyDetails {
        StudyDetails {
            study_name: "Trial".into(),
            division: "Oncology".into(),
            title: "T".into(),
            investigator: "Dr. X".into(),
        }
    }

    // =========================================================================
    // SCENARIOS
    // =========================================================================

    #[tokio::test]
    async fn scenario_1_create_study_commits() {
        let node = node();
        let _ordering = spawn_ordering_loop(Arc::clone(&node));
        let client = client(ClinicalFamily::default(), &node, KeyPair::generate());

        let receipt = client.create_study("S100", &study_details()).await.unwrap();
        assert!(receipt.status.is_committed());

        let stored = client.show_study("S100").await.unwrap().unwrap();
        let details: StudyDetails = serde_json::from_str(&stored).unwrap();
        assert_eq!(details, study_details());
        node.shutdown();
    }

    #[tokio::test]
    async fn scenario_2_empty_study_number_rejected() {
        let node = node();
        let client = client(ClinicalFamily::default(), &node, KeyPair::generate());

        let err = client.create_study("", &study_details()).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(err.rejection_reason(), Some("study number is not set"));
        assert_eq!(node.pending_count(), 0);
    }

    #[tokio::test]
    async fn scenario_3_add_without_procedure_rejected() {
        let node = node();
        let client = client(ClinicalFamily::default(), &node, KeyPair::generate());

        let provided = UpdateRecord::new().field(CRF_ID, "C1").field(PROD_ID, "");
        let err = client.send(ADD, provided).await.unwrap_err();
        assert_eq!(err.rejection_reason(), Some("Procedure identifier not set"));
    }

    #[tokio::test]
    async fn scenario_4_arcade_create_commits_in_its_own_store() {
        let node = node();
        let _ordering = spawn_ordering_loop(Arc::clone(&node));
        let client = client(ArcadeFamily, &node, KeyPair::generate());

        let provided = UpdateRecord::new()
            .field(NAME, "g1")
            .field(PLAYERS, json!(["a", "b"]));
        client.send(CREATE, provided).await.unwrap();

        let game = client.show_game("g1").await.unwrap().unwrap();
        assert_eq!(game.state, GameState::Open);
        assert!(node
            .store_entries("ClinicalTransaction")
            .unwrap()
            .unwrap()
            .1
            .is_empty());
        node.shutdown();
    }

    #[tokio::test]
    async fn scenario_5_unknown_action_rejected_by_both_families() {
        let node = node();
        let clinical = client(ClinicalFamily::default(), &node, KeyPair::generate());
        let arcade = client(ArcadeFamily, &node, KeyPair::generate());

        let err = clinical.send("DELETE", UpdateRecord::new()).await.unwrap_err();
        assert_eq!(err.rejection_reason(), Some("invalid action"));
        let err = arcade.send("DELETE", UpdateRecord::new()).await.unwrap_err();
        assert_eq!(err.rejection_reason(), Some("invalid action"));
    }

    // =========================================================================
    // FULL FLOWS
    // =========================================================================

    #[tokio::test]
    async fn test_study_crf_and_entry() {
        let node = node();
        let _ordering = spawn_ordering_loop(Arc::clone(&node));
        let client = client(ClinicalFamily::default(), &node, KeyPair::generate());

        client.create_study("S100", &study_details()).await.unwrap();
        client
            .create_crf("C1", &CrfDetails { crf_name: "Vitals".into() }, "S100")
            .await
            .unwrap();
        client
            .add_crf_entry("C1", "P1", json!({"bp": "120/80"}))
            .await
            .unwrap();

        let crf: serde_json::Value =
            serde_json::from_str(&client.show_crf("C1").await.unwrap().unwrap()).unwrap();
        assert_eq!(crf["StudyNumber"], "S100");

        let all = client.list().await.unwrap();
        assert_eq!(all.len(), 3);
        let entry: serde_json::Value = serde_json::from_str(&all["P1"]).unwrap();
        assert_eq!(entry, json!({"CrfId": "C1", "CrfData": {"bp": "120/80"}}));
        node.shutdown();
    }

    #[tokio::test]
    async fn test_arcade_round_between_two_signers() {
        let node = node();
        let _ordering = spawn_ordering_loop(Arc::clone(&node));
        let alice = client(ArcadeFamily, &node, KeyPair::generate());
        let bob = client(ArcadeFamily, &node, KeyPair::generate());
        let players = vec![alice.address_hex(), bob.address_hex()];

        alice.create("g1", &players).await.unwrap();
        alice.shoot("g1", Hand::Paper).await.unwrap();

        let err = alice.shoot("g1", Hand::Rock).await.unwrap_err();
        assert_eq!(err.rejection_reason(), Some("player already shot"));

        bob.shoot("g1", Hand::Rock).await.unwrap();
        let game = bob.show_game("g1").await.unwrap().unwrap();
        assert_eq!(game.state, GameState::Complete);
        assert_eq!(game.results[&alice.address_hex()], Outcome::Win);
        assert_eq!(game.results[&bob.address_hex()], Outcome::Lose);

        let outsider = client(ArcadeFamily, &node, KeyPair::generate());
        let err = outsider.shoot("g1", Hand::Rock).await.unwrap_err();
        assert_eq!(err.rejection_reason(), Some("game is not open"));
        node.shutdown();
    }

    // =========================================================================
    // WAIT SEMANTICS
    // =========================================================================

    #[tokio::test]
    async fn test_wait_times_out_when_nothing_orders() {
        let node = node();
        let client = client(ClinicalFamily::default(), &node, KeyPair::generate())
            .with_wait(true, Some(Duration::from_millis(30)));

        let err = client.create_study("S1", &study_details()).await.unwrap_err();
        assert!(matches!(err, ClientError::Timeout { .. }));

        // The submission stands; it commits once ordering runs.
        let id = client.last_submission().unwrap();
        assert_eq!(node.status(&id), Some(SubmissionStatus::Pending));
        node.commit_block().await.unwrap();
        assert_eq!(client.wait_for_last_commit(None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_zero_deadline_returns_timeout() {
        let node = node();
        let client = client(ClinicalFamily::default(), &node, KeyPair::generate())
            .with_wait(false, None);

        let receipt = client.create_study("S1", &study_details()).await.unwrap();
        assert_eq!(receipt.status, SubmissionStatus::Pending);

        let err = client
            .wait_for_commit(&receipt.id, Some(Duration::ZERO))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_node_side_rejection_matches_local_reason() {
        let node = node();
        let _ordering = spawn_ordering_loop(Arc::clone(&node));
        let client = client(ClinicalFamily::default(), &node, KeyPair::generate())
            .with_validation(false);

        let provided = UpdateRecord::new()
            .field(STUDY_NUMBER, "")
            .field(STUDY_DETAILS, "x");
        let err = client.send(CREATE_STUDY, provided).await.unwrap_err();

        assert!(matches!(err, ClientError::Rejected { .. }));
        assert_eq!(err.rejection_reason(), Some("study number is not set"));
        node.shutdown();
    }

    #[tokio::test]
    async fn test_cancelled_wait_leaves_submission_alive() {
        let node = node();
        let (stop, stopped) = watch::channel(false);
        let client = FamilyClient::new(
            ClinicalFamily::default(),
            LocalTransport::new(Arc::clone(&node)),
            KeyPair::generate(),
        )
        .with_wait_policy(fast_polling())
        .with_shutdown(stopped);

        let receipt = client.create_study("S1", &study_details()).await.unwrap();
        let cancel = async {
            tokio::time::sleep(Duration::from_millis(25)).await;
            stop.send(true).unwrap();
        };
        let (waited, ()) = tokio::join!(client.wait_for_commit(&receipt.id, None), cancel);
        assert!(matches!(waited, Err(ClientError::Cancelled(_))));

        node.commit_block().await.unwrap();
        assert!(node.status(&receipt.id).unwrap().is_committed());
    }

    #[tokio::test]
    async fn test_events_follow_the_submission() {
        let node = node();
        let client = client(ClinicalFamily::default(), &node, KeyPair::generate())
            .with_wait(false, None);
        let mut events = node.events().subscribe(EventFilter::all());

        let receipt = client.create_study("S1", &study_details()).await.unwrap();
        node.commit_block().await.unwrap();

        let mut seen = Vec::new();
        for _ in 0..3 {
            let event = tokio::time::timeout(Duration::from_secs(1), events.recv())
                .await
                .unwrap()
                .unwrap();
            seen.push(event);
        }
        assert!(matches!(&seen[0], LedgerEvent::TransactionSubmitted { id, .. } if *id == receipt.id));
        assert!(matches!(&seen[1], LedgerEvent::TransactionCommitted { block: 1, .. }));
        assert!(matches!(
            &seen[2],
            LedgerEvent::BlockCommitted {
                block: 1,
                committed: 1,
                rejected: 0
            }
        ));
    }
}
