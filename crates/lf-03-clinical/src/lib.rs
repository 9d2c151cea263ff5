//! # Clinical Family (LF-03)
//!
//! Reference transaction family for a clinical-trial registry.
//!
//! | Action | Required | Store write |
//! |--------|----------|-------------|
//! | `CREATE_STUDY` | `StudyNumber`, `StudyDetails` | study number → details |
//! | `CREATE_CRF` | `CrfId`, `StudyNumber` | CRF id → `{StudyNumber, CrfDetails}` |
//! | `ADD` | `CrfId`, `ProdId` | procedure id → `{CrfId, CrfData}` |
//!
//! `ApplyMode::Legacy` switches apply to the name-to-name writes of
//! earlier deployments.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod family;

pub use domain::entities::{
    ApplyMode, CrfDetails, StudyDetails, ACTIONS, ADD, CREATE_CRF, CREATE_STUDY, CRF_DATA,
    CRF_DETAILS, CRF_ID, FIELDS, PROD_ID, STUDY_DETAILS, STUDY_NUMBER,
};
pub use domain::transaction::{ClinicalPayload, ClinicalTransaction};
pub use family::{inject_cross_field_defaults, ClinicalFamily, TAGS};
