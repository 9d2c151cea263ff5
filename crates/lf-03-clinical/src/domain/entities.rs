//! # Clinical Entities
//!
//! Field names, action tags, detail records and the apply mode.

use serde::{Deserialize, Serialize};
use shared_types::FieldValue;

// =============================================================================
// WIRE NAMES
// =============================================================================

pub const CREATE_STUDY: &str = "CREATE_STUDY";
pub const CREATE_CRF: &str = "CREATE_CRF";
pub const ADD: &str = "ADD";

pub const ACTIONS: &[&str] = &[CREATE_STUDY, CREATE_CRF, ADD];

pub const STUDY_NUMBER: &str = "StudyNumber";
pub const STUDY_DETAILS: &str = "StudyDetails";
pub const CRF_ID: &str = "CrfId";
pub const CRF_DETAILS: &str = "CrfDetails";
pub const PROD_ID: &str = "ProdId";
pub const CRF_DATA: &str = "CrfData";

/// The full field superset of a clinical update.
pub const FIELDS: &[&str] = &[
    shared_types::ACTION_FIELD,
    STUDY_NUMBER,
    STUDY_DETAILS,
    CRF_ID,
    CRF_DETAILS,
    PROD_ID,
    CRF_DATA,
];

// =============================================================================
// DETAIL RECORDS
// =============================================================================

/// Descriptive details of a study.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyDetails {
    pub study_name: String,
    pub division: String,
    pub title: String,
    pub investigator: String,
}

impl StudyDetails {
    pub fn to_field_value(&self) -> FieldValue {
        serde_json::json!({
            "study_name": self.study_name,
            "division": self.division,
            "title": self.title,
            "investigator": self.investigator,
        })
    }
}

/// Descriptive details of a case report form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrfDetails {
    pub crf_name: String,
}

impl CrfDetails {
    pub fn to_field_value(&self) -> FieldValue {
        serde_json::json!({ "crf_name": self.crf_name })
    }
}

// =============================================================================
// APPLY MODE
// =============================================================================

/// How `apply` lays out store writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyMode {
    /// Identifier key, payload value.
    #[default]
    FieldValue,
    /// Name-to-name writes of earlier deployments, for state parity.
    Legacy,
}

impl ApplyMode {
    pub fn from_legacy_flag(legacy: bool) -> Self {
        if legacy {
            Self::Legacy
        } else {
            Self::FieldValue
        }
    }
}
