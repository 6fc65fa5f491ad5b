//! Contact form delivery.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client};
use shared::{
    domain::ContactFields,
    protocol::{ContactReply, REQUESTED_WITH_HEADER, REQUESTED_WITH_VALUE},
};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid form action '{action}': {source}")]
    InvalidAction {
        action: String,
        source: url::ParseError,
    },
    #[error("contact request timed out")]
    Timeout,
    #[error("contact request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("contact reply is not JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Request(err)
        }
    }
}

#[async_trait]
pub trait ContactTransport: Send + Sync {
    /// Posts the fields to `action`. Any JSON reply is a reply; everything else is an error.
    async fn send(&self, action: &Url, fields: &ContactFields)
        -> Result<ContactReply, TransportError>;
}

/// Resolves a form's `action` attribute the way a browser does: relative to the document,
/// with an empty or missing action meaning the document itself.
pub fn resolve_action(document_url: &str, action: Option<&str>) -> Result<Url, TransportError> {
    let base = Url::parse(document_url).map_err(|source| TransportError::InvalidAction {
        action: document_url.to_string(),
        source,
    })?;

    match action.map(str::trim).filter(|a| !a.is_empty()) {
        None => Ok(base),
        Some(action) => base
            .join(action)
            .map_err(|source| TransportError::InvalidAction {
                action: action.to_string(),
                source,
            }),
    }
}

pub struct HttpContactTransport {
    http: Client,
}

impl HttpContactTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ContactTransport for HttpContactTransport {
    async fn send(
        &self,
        action: &Url,
        fields: &ContactFields,
    ) -> Result<ContactReply, TransportError> {
        let response = self
            .http
            .post(action.clone())
            .header(REQUESTED_WITH_HEADER, REQUESTED_WITH_VALUE)
            .header(ACCEPT, "application/json")
            .form(fields)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        let reply = ContactReply::from_slice(&body)?;

        if status.is_success() {
            debug!(%action, %status, success = reply.success, "contact reply received");
        } else {
            warn!(%action, %status, success = reply.success, "contact endpoint answered with error status");
        }
        Ok(reply)
    }
}
