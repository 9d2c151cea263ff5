//! Typed calls for the clinical family.

use crate::errors::ClientError;
use crate::ports::transport::Transport;
use crate::service::{FamilyClient, Receipt};
use lf_03_clinical::{
    ClinicalFamily, CrfDetails, StudyDetails, ADD, CREATE_CRF, CREATE_STUDY, CRF_DATA, CRF_DETAILS,
    CRF_ID, PROD_ID, STUDY_DETAILS, STUDY_NUMBER,
};
use shared_types::{FieldValue, UpdateRecord};
use std::collections::BTreeMap;

pub type ClinicalClient<T> = FamilyClient<ClinicalFamily, T>;

impl<T: Transport> FamilyClient<ClinicalFamily, T> {
    pub async fn create_study(
        &self,
        study_number: &str,
        details: &StudyDetails,
    ) -> Result<Receipt, ClientError> {
        let provided = UpdateRecord::new()
            .field(STUDY_NUMBER, study_number)
            .field(STUDY_DETAILS, details.to_field_value());
        self.send(CREATE_STUDY, provided).await
    }

    pub async fn create_crf(
        &self,
        crf_id: &str,
        crf_details: &CrfDetails,
        study_number: &str,
    ) -> Result<Receipt, ClientError> {
        let provided = UpdateRecord::new()
            .field(CRF_ID, crf_id)
            .field(CRF_DETAILS, crf_details.to_field_value())
            .field(STUDY_NUMBER, study_number);
        self.send(CREATE_CRF, provided).await
    }

    /// Record one procedure's data against a CRF.
    pub async fn add_crf_entry(
        &self,
        crf_id: &str,
        prod_id: &str,
        crf_data: FieldValue,
    ) -> Result<Receipt, ClientError> {
        let provided = UpdateRecord::new()
            .field(CRF_ID, crf_id)
            .field(PROD_ID, prod_id)
            .field(CRF_DATA, crf_data);
        self.send(ADD, provided).await
    }

    pub async fn show_study(&self, study_number: &str) -> Result<Option<String>, ClientError> {
        Ok(self.store_snapshot().await?.remove(study_number))
    }

    pub async fn show_crf(&self, crf_id: &str) -> Result<Option<String>, ClientError> {
        Ok(self.store_snapshot().await?.remove(crf_id))
    }

    /// Every committed clinical entry.
    pub async fn list(&self) -> Result<BTreeMap<String, String>, ClientError> {
        self.store_snapshot().await
    }
}
