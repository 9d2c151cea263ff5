//! HTTP transport to a ledger node.

use crate::errors::TransportError;
use crate::ports::transport::Transport;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared_types::{
    ErrorResponse, SignedEnvelope, StatusResponse, StoreResponse, SubmissionId, SubmissionStatus,
    SubmitResponse,
};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(2))
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn connection_error(&self, e: reqwest::Error) -> TransportError {
        if e.is_connect() {
            TransportError::Connection(self.base_url.clone())
        } else {
            TransportError::from(e)
        }
    }

    /// Decode a 2xx body, or turn an error body into `Refused`.
    async fn decode<R: DeserializeOwned>(response: Response) -> Result<R, TransportError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<R>()
                .await
                .map_err(|e| TransportError::Decode(e.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        let error = serde_json::from_str::<ErrorResponse>(&body)
            .unwrap_or_else(|_| ErrorResponse::new("http", body));
        Err(TransportError::Refused {
            status: status.as_u16(),
            kind: error.kind,
            message: error.message,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn submit(&self, envelope: &SignedEnvelope) -> Result<SubmissionId, TransportError> {
        let response = self
            .client
            .post(self.url("/transactions"))
            .json(envelope)
            .send()
            .await
            .map_err(|e| self.connection_error(e))?;

        let accepted: SubmitResponse = Self::decode(response).await?;
        debug!(txn_id = %accepted.id.short(), url = %self.base_url, "Submitted");
        Ok(accepted.id)
    }

    async fn status(&self, id: &SubmissionId) -> Result<SubmissionStatus, TransportError> {
        let response = self
            .client
            .get(self.url(&format!("/transactions/{id}")))
            .send()
            .await
            .map_err(|e| self.connection_error(e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(TransportError::UnknownSubmission(id.clone()));
        }
        let status: StatusResponse = Self::decode(response).await?;
        Ok(status.status)
    }

    async fn fetch_store(&self, name: &str) -> Result<BTreeMap<String, String>, TransportError> {
        let response = self
            .client
            .get(self.url(&format!("/store/{name}")))
            .send()
            .await
            .map_err(|e| self.connection_error(e))?;

        let store: StoreResponse = Self::decode(response).await?;
        Ok(store.entries)
    }
}
