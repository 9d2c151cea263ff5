//! # HTTP Flows
//!
//! The same commit protocol over the axum API and the reqwest transport.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{fast_polling, node};
    use lf_01_signing::{KeyPair, SignedTransaction};
    use lf_03_clinical::{ClinicalFamily, StudyDetails, CREATE_STUDY};
    use lf_04_arcade::{ArcadeFamily, GameState, Hand};
    use lf_05_client::{
        ClientConfig, ClientError, FamilyClient, HttpTransport, Transport, TransportError,
    };
    use node_runtime::{serve, spawn_ordering_loop, LedgerNode};
    use shared_types::{SubmissionStatus, UpdateRecord};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::net::TcpListener;

    /// Node with ordering and HTTP running on an ephemeral port.
    async fn running_node() -> (Arc<LedgerNode>, String) {
        let node = node();
        spawn_ordering_loop(Arc::clone(&node));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(serve(Arc::clone(&node), listener));
        (node, url)
    }

    fn config(url: &str) -> ClientConfig {
        ClientConfig {
            url: url.to_string(),
            wait: true,
            wait_timeout_secs: Some(5),
            poll_interval_ms: fast_polling().poll_interval.as_millis() as u64,
            max_poll_interval_ms: fast_polling().max_poll_interval.as_millis() as u64,
            ..ClientConfig::default()
        }
    }

    #[tokio::test]
    async fn test_create_study_over_http() {
        let (node, url) = running_node().await;
        let config = config(&url);
        let client = FamilyClient::from_config(
            ClinicalFamily::default(),
            HttpTransport::new(&config.url).unwrap(),
            KeyPair::generate(),
            &config,
        );

        let details = StudyDetails {
            study_name: "Trial".into(),
            division: "Oncology".into(),
            title: "T".into(),
            investigator: "Dr. X".into(),
        };
        let receipt = client.create_study("S100", &details).await.unwrap();
        assert!(matches!(receipt.status, SubmissionStatus::Committed { .. }));
        assert!(client.show_study("S100").await.unwrap().is_some());

        let err = client.create_study("", &details).await.unwrap_err();
        assert_eq!(err.rejection_reason(), Some("study number is not set"));
        node.shutdown();
    }

    #[tokio::test]
    async fn test_key_file_client_plays_a_round() {
        let (node, url) = running_node().await;
        let dir = tempfile::tempdir().unwrap();

        let mut clients = Vec::new();
        for name in ["alice", "bob"] {
            let key_path = dir.path().join(format!("{name}.priv"));
            KeyPair::generate().save(&key_path).unwrap();
            let config = ClientConfig {
                key_file: Some(key_path),
                ..config(&url)
            };
            clients.push(FamilyClient::from_config(
                ArcadeFamily,
                HttpTransport::new(&config.url).unwrap(),
                config.load_keypair().unwrap(),
                &config,
            ));
        }
        let players: Vec<String> = clients.iter().map(|c| c.address_hex()).collect();

        clients[0].create("g1", &players).await.unwrap();
        clients[0].shoot("g1", Hand::Scissors).await.unwrap();
        clients[1].shoot("g1", Hand::Scissors).await.unwrap();

        let game = clients[1].show_game("g1").await.unwrap().unwrap();
        assert_eq!(game.state, GameState::Complete);
        assert!(game.results.values().all(|o| *o == lf_04_arcade::Outcome::Tie));
        node.shutdown();
    }

    #[tokio::test]
    async fn test_forged_signer_is_rejected_not_refused() {
        let (node, url) = running_node().await;
        let transport = HttpTransport::new(&url).unwrap();
        let client = FamilyClient::new(ClinicalFamily::default(), transport, KeyPair::generate())
            .with_wait_policy(fast_polling());

        let update = client.build_update(CREATE_STUDY, UpdateRecord::new().field("StudyNumber", "S1"));
        let SignedTransaction { mut envelope, .. } = client.sign(update).unwrap();
        envelope.signer = KeyPair::generate().address_hex();

        let id = client.transport().submit(&envelope).await.unwrap();
        let err = client
            .wait_for_commit(&id, Some(Duration::from_secs(5)))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Rejected { .. }));
        assert_eq!(err.rejection_reason(), Some("signature does not match signer"));
        node.shutdown();
    }

    #[tokio::test]
    async fn test_unknown_family_is_refused() {
        let (node, url) = running_node().await;
        let transport = HttpTransport::new(&url).unwrap();
        let client = FamilyClient::new(ClinicalFamily::default(), transport, KeyPair::generate());

        let signed = client.sign(UpdateRecord::new()).unwrap();
        let mut envelope = signed.envelope;
        envelope.message_type = "/Poker/Transaction".into();

        let err = client.transport().submit(&envelope).await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::Refused { status: 400, ref kind, .. } if kind == "unknown_family"
        ));
        assert!(!err.is_transient());

        let err = client
            .transport()
            .status(&signed.id)
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::UnknownSubmission(_)));
        node.shutdown();
    }
}
