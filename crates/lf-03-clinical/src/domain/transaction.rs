//! # Clinical Transaction
//!
//! One decoded clinical update. The flat wire record is translated into a
//! per-action payload on decode and back on serialize; nothing else looks at
//! the flat shape.

use super::entities::*;
use lf_02_family_core::{
    FamilyTransaction, KeyValueStore, StoreError, TransactionMeta, ValidationError,
};
use serde_json::json;
use shared_types::{FieldValue, UpdateRecord};
use tracing::debug;

/// Per-action payload. `None` is the null sentinel of an absent field.
#[derive(Debug, Clone, PartialEq)]
pub enum ClinicalPayload {
    CreateStudy {
        study_number: Option<String>,
        study_details: Option<FieldValue>,
    },
    CreateCrf {
        crf_id: Option<String>,
        study_number: Option<String>,
        crf_details: Option<FieldValue>,
    },
    Add {
        crf_id: Option<String>,
        prod_id: Option<String>,
        crf_data: Option<FieldValue>,
    },
    /// `Action` absent, null or empty.
    Unset,
    /// `Action` outside the family's set.
    Unknown(String),
}

impl ClinicalPayload {
    pub fn decode(update: &UpdateRecord) -> Self {
        let action = update.get_str(shared_types::ACTION_FIELD).unwrap_or_default();
        match action.as_str() {
            "" => Self::Unset,
            CREATE_STUDY => Self::CreateStudy {
                study_number: update.get_str(STUDY_NUMBER),
                study_details: update.get_value(STUDY_DETAILS),
            },
            CREATE_CRF => Self::CreateCrf {
                crf_id: update.get_str(CRF_ID),
                study_number: update.get_str(STUDY_NUMBER),
                crf_details: update.get_value(CRF_DETAILS),
            },
            ADD => Self::Add {
                crf_id: update.get_str(CRF_ID),
                prod_id: update.get_str(PROD_ID),
                crf_data: update.get_value(CRF_DATA),
            },
            _ => Self::Unknown(action),
        }
    }

    pub fn action(&self) -> Option<&str> {
        match self {
            Self::CreateStudy { .. } => Some(CREATE_STUDY),
            Self::CreateCrf { .. } => Some(CREATE_CRF),
            Self::Add { .. } => Some(ADD),
            Self::Unset => None,
            Self::Unknown(action) => Some(action),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClinicalTransaction {
    payload: ClinicalPayload,
    meta: TransactionMeta,
    mode: ApplyMode,
}

impl ClinicalTransaction {
    pub fn new(payload: ClinicalPayload, meta: TransactionMeta, mode: ApplyMode) -> Self {
        Self {
            payload,
            meta,
            mode,
        }
    }

    pub fn decode(update: &UpdateRecord, meta: TransactionMeta, mode: ApplyMode) -> Self {
        Self::new(ClinicalPayload::decode(update), meta, mode)
    }

    pub fn payload(&self) -> &ClinicalPayload {
        &self.payload
    }

    fn apply_field_value(&self, store: &dyn KeyValueStore) -> Result<(), StoreError> {
        match &self.payload {
            ClinicalPayload::CreateStudy {
                study_number: Some(number),
                study_details,
            } => store.set(number, render(study_details.as_ref())),
            ClinicalPayload::CreateCrf {
                crf_id: Some(crf_id),
                study_number,
                crf_details,
            } => {
                let record = json!({ STUDY_NUMBER: study_number, CRF_DETAILS: crf_details });
                store.set(crf_id, record.to_string())
            }
            ClinicalPayload::Add {
                crf_id,
                prod_id: Some(prod_id),
                crf_data,
            } => {
                let record = json!({ CRF_ID: crf_id, CRF_DATA: crf_data });
                store.set(prod_id, record.to_string())
            }
            _ => Ok(()),
        }
    }

    fn apply_legacy(&self, store: &dyn KeyValueStore) -> Result<(), StoreError> {
        let mut writes: Vec<(String, String)> = Vec::new();
        match &self.payload {
            ClinicalPayload::CreateStudy {
                study_number,
                study_details,
            } => {
                push_self(&mut writes, study_number.clone());
                if let Some(details) = study_details {
                    writes.push((render(Some(details)), "test".to_string()));
                }
            }
            ClinicalPayload::CreateCrf {
                crf_id,
                crf_details,
                ..
            } => {
                push_self(&mut writes, crf_id.clone());
                push_self(&mut writes, crf_details.as_ref().map(|d| render(Some(d))));
            }
            ClinicalPayload::Add {
                crf_id,
                prod_id,
                crf_data,
            } => {
                push_self(&mut writes, crf_id.clone());
                push_self(&mut writes, prod_id.clone());
                push_self(&mut writes, crf_data.as_ref().map(|d| render(Some(d))));
            }
            ClinicalPayload::Unset | ClinicalPayload::Unknown(_) => {}
        }

        for (key, value) in writes {
            store.set(&key, value)?;
        }
        Ok(())
    }
}

impl FamilyTransaction for ClinicalTransaction {
    fn meta(&self) -> &TransactionMeta {
        &self.meta
    }

    fn action_name(&self) -> Option<&str> {
        self.payload.action()
    }

    fn validate(&self, _store: &dyn KeyValueStore) -> Result<(), ValidationError> {
        debug!(identity = %self.identity(), "Checking clinical transaction");

        match &self.payload {
            ClinicalPayload::Unset => Err(ValidationError::new("action not set")),
            ClinicalPayload::CreateStudy {
                study_number,
                study_details,
            } => {
                require(study_number.as_deref(), "study number is not set")?;
                require_value(study_details.as_ref(), "study details are not set")
            }
            ClinicalPayload::CreateCrf {
                crf_id,
                study_number,
                ..
            } => {
                require(crf_id.as_deref(), "CRF identifier is not set")?;
                require(study_number.as_deref(), "study number is not set")
            }
            ClinicalPayload::Add {
                crf_id, prod_id, ..
            } => {
                require(crf_id.as_deref(), "Need to specify CRF identifier")?;
                require(prod_id.as_deref(), "Procedure identifier not set")
            }
            ClinicalPayload::Unknown(_) => Err(ValidationError::new("invalid action")),
        }
    }

    fn apply(&self, store: &dyn KeyValueStore) -> Result<(), StoreError> {
        debug!(identity = %self.identity(), mode = ?self.mode, "Applying clinical transaction");
        match self.mode {
            ApplyMode::FieldValue => self.apply_field_value(store),
            ApplyMode::Legacy => self.apply_legacy(store),
        }
    }

    fn serialize(&self) -> UpdateRecord {
        let mut record = match self.payload.action() {
            Some(action) => UpdateRecord::with_action(action),
            None => UpdateRecord::new(),
        };

        let (identifiers, details) = match &self.payload {
            ClinicalPayload::CreateStudy {
                study_number,
                study_details,
            } => (vec![(STUDY_NUMBER, study_number)], Some((STUDY_DETAILS, study_details))),
            ClinicalPayload::CreateCrf {
                crf_id,
                study_number,
                crf_details,
            } => (
                vec![(CRF_ID, crf_id), (STUDY_NUMBER, study_number)],
                Some((CRF_DETAILS, crf_details)),
            ),
            ClinicalPayload::Add {
                crf_id,
                prod_id,
                crf_data,
            } => (
                vec![(CRF_ID, crf_id), (PROD_ID, prod_id)],
                Some((CRF_DATA, crf_data)),
            ),
            ClinicalPayload::Unset | ClinicalPayload::Unknown(_) => (Vec::new(), None),
        };

        for (name, value) in identifiers {
            if let Some(v) = value {
                record.insert(name, FieldValue::String(v.clone()));
            }
        }
        if let Some((name, Some(value))) = details {
            record.insert(name, value.clone());
        }

        record
    }

    fn identity(&self) -> String {
        let key = match &self.payload {
            ClinicalPayload::CreateStudy { study_number, .. } => study_number.as_deref(),
            ClinicalPayload::CreateCrf { crf_id, .. } => crf_id.as_deref(),
            ClinicalPayload::Add { prod_id, .. } => prod_id.as_deref(),
            ClinicalPayload::Unset | ClinicalPayload::Unknown(_) => None,
        };
        format!(
            "({} {} {})",
            self.meta.originator_hex(),
            self.payload.action().unwrap_or("-"),
            key.unwrap_or("-")
        )
    }
}

fn require(value: Option<&str>, reason: &str) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.is_empty() => Ok(()),
        _ => Err(ValidationError::new(reason)),
    }
}

fn require_value(value: Option<&FieldValue>, reason: &str) -> Result<(), ValidationError> {
    match value {
        None | Some(FieldValue::Null) => Err(ValidationError::new(reason)),
        Some(FieldValue::String(s)) if s.is_empty() => Err(ValidationError::new(reason)),
        Some(_) => Ok(()),
    }
}

/// Strings as-is, anything else as compact JSON.
fn render(value: Option<&FieldValue>) -> String {
    match value {
        None | Some(FieldValue::Null) => String::new(),
        Some(FieldValue::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Legacy `store[x] = x`, skipping absent and empty keys.
fn push_self(writes: &mut Vec<(String, String)>, key: Option<String>) {
    if let Some(key) = key.filter(|k| !k.is_empty()) {
        writes.push((key.clone(), key));
    }
}
