//! # Clinical Family
//!
//! Binds the clinical transaction into the family contract.

use crate::domain::entities::*;
use crate::domain::transaction::ClinicalTransaction;
use lf_02_family_core::{pad_update, FamilyTags, TransactionFamily, TransactionMeta};
use shared_types::{FieldValue, UpdateRecord, ACTION_FIELD};

pub const TAGS: FamilyTags = FamilyTags {
    name: "clinical",
    message_type: "/Clinical/Transaction",
    transaction_type: "/ClinicalTransaction",
    store_name: "ClinicalTransaction",
};

#[derive(Debug, Clone, Copy, Default)]
pub struct ClinicalFamily {
    mode: ApplyMode,
}

impl ClinicalFamily {
    pub fn new(mode: ApplyMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ApplyMode {
        self.mode
    }
}

impl TransactionFamily for ClinicalFamily {
    type Transaction = ClinicalTransaction;

    fn tags(&self) -> FamilyTags {
        TAGS
    }

    fn actions(&self) -> &'static [&'static str] {
        ACTIONS
    }

    fn fields(&self) -> &'static [&'static str] {
        FIELDS
    }

    fn decode(&self, update: &UpdateRecord, meta: TransactionMeta) -> ClinicalTransaction {
        ClinicalTransaction::decode(update, meta, self.mode)
    }

    fn prepare_update(&self, action: &str, provided: UpdateRecord) -> UpdateRecord {
        let with_action = pad_update(&[], action, provided);
        pad_update(FIELDS, action, inject_cross_field_defaults(with_action))
    }
}

/// Null defaults that depend on which identifiers the caller supplied.
///
/// - `StudyNumber` without `CrfId`: `StudyDetails`
/// - `CrfId` without `ProdId`: `CrfDetails`, `StudyNumber`
/// - `ProdId`: `CrfId`, `CrfData`
/// - always: `Action`
pub fn inject_cross_field_defaults(mut update: UpdateRecord) -> UpdateRecord {
    if update.contains(STUDY_NUMBER) && !update.contains(CRF_ID) {
        update.declare_null(STUDY_DETAILS);
    }
    if update.contains(CRF_ID) && !update.contains(PROD_ID) {
        update.declare_null(CRF_DETAILS);
        update.declare_null(STUDY_NUMBER);
    }
    if update.contains(PROD_ID) {
        update.declare_null(CRF_ID);
        update.declare_null(CRF_DATA);
    }
    if !update.contains(ACTION_FIELD) {
        update.insert(ACTION_FIELD, FieldValue::Null);
    }
    update
}
