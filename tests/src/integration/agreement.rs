//! # Validation Agreement
//!
//! A client's pre-validation and the node's validation are the same
//! `validate`, so for any update they must reach the same verdict with the
//! same reason.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{client, node};
    use lf_01_signing::KeyPair;
    use lf_02_family_core::{FamilyTransaction, InMemoryStore, TransactionFamily, TransactionMeta};
    use lf_03_clinical::{ClinicalFamily, ACTIONS as CLINICAL_ACTIONS, FIELDS as CLINICAL_FIELDS};
    use lf_04_arcade::{ArcadeFamily, ACTIONS as ARCADE_ACTIONS, FIELDS as ARCADE_FIELDS};
    use proptest::prelude::*;
    use serde_json::json;
    use shared_types::{FieldValue, SubmissionStatus, UpdateRecord, ACTION_FIELD};

    fn field_value() -> impl Strategy<Value = FieldValue> {
        prop_oneof![
            Just(FieldValue::Null),
            Just(json!("")),
            "[A-Z][0-9]{1,3}".prop_map(FieldValue::String),
            Just(json!(["a", "b"])),
            Just(json!({"k": 1})),
        ]
    }

    fn action(known: &'static [&'static str]) -> impl Strategy<Value = String> {
        prop_oneof![
            proptest::sample::select(known.to_vec()).prop_map(str::to_string),
            Just(String::new()),
            Just("DELETE".to_string()),
        ]
    }

    fn provided(fields: &'static [&'static str]) -> impl Strategy<Value = UpdateRecord> {
        proptest::collection::vec(field_value(), fields.len()).prop_map(move |values| {
            let mut record = UpdateRecord::new();
            for (name, value) in fields.iter().zip(values) {
                if *name != ACTION_FIELD && !value.is_null() {
                    record.insert(name, value);
                }
            }
            record
        })
    }

    /// Verdict of the family's validate on an empty store.
    fn local_verdict<F: TransactionFamily>(family: &F, action: &str, provided: UpdateRecord) -> Option<String> {
        let update = family.prepare_update(action, provided);
        let txn = family.decode(&update, TransactionMeta::draft([1u8; 20]));
        txn.validate(&InMemoryStore::new()).err().map(|e| e.reason().to_string())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_clinical_validate_total(action in action(CLINICAL_ACTIONS), provided in provided(CLINICAL_FIELDS)) {
            let family = ClinicalFamily::default();
            let update = family.prepare_update(&action, provided.clone());
            prop_assert_eq!(update.len(), CLINICAL_FIELDS.len());
            // Never panics; unknown or empty actions are always rejected.
            let verdict = local_verdict(&family, &action, provided);
            if action.is_empty() {
                prop_assert_eq!(verdict.as_deref(), Some("action not set"));
            } else if !CLINICAL_ACTIONS.contains(&action.as_str()) {
                prop_assert_eq!(verdict.as_deref(), Some("invalid action"));
            }
        }

        #[test]
        fn prop_arcade_validate_total(action in action(ARCADE_ACTIONS), provided in provided(ARCADE_FIELDS)) {
            let family = ArcadeFamily;
            let update = family.prepare_update(&action, provided.clone());
            prop_assert_eq!(update.len(), ARCADE_FIELDS.len());
            let verdict = local_verdict(&family, &action, provided);
            if action.is_empty() {
                prop_assert_eq!(verdict.as_deref(), Some("action not set"));
            }
        }
    }

    /// Same clinical updates, once checked locally and once by the node.
    #[tokio::test]
    async fn test_client_and_node_agree() {
        let cases: Vec<(&str, UpdateRecord)> = vec![
            ("CREATE_STUDY", UpdateRecord::new().field("StudyNumber", "S1").field("StudyDetails", "d")),
            ("CREATE_STUDY", UpdateRecord::new().field("StudyNumber", "S2")),
            ("CREATE_CRF", UpdateRecord::new().field("CrfId", "C1")),
            ("CREATE_CRF", UpdateRecord::new().field("CrfId", "C1").field("StudyNumber", "S1")),
            ("ADD", UpdateRecord::new().field("ProdId", "P1")),
            ("ADD", UpdateRecord::new().field("CrfId", "C1").field("ProdId", "P1")),
            ("", UpdateRecord::new()),
            ("DELETE", UpdateRecord::new()),
        ];

        let node = node();
        let remote = client(ClinicalFamily::default(), &node, KeyPair::generate())
            .with_validation(false)
            .with_wait(false, None);

        for (action, provided) in cases {
            let local = local_verdict(&ClinicalFamily::default(), action, provided.clone());

            let receipt = remote.send(action, provided).await.unwrap();
            node.commit_block().await.unwrap();
            let remote_verdict = match node.status(&receipt.id).unwrap() {
                SubmissionStatus::Rejected { reason } => Some(reason),
                _ => None,
            };

            assert_eq!(local, remote_verdict, "action {action:?}");
        }
    }
}
