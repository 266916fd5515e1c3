use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use error_stack::{report, ResultExt};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::instrument;

use crate::domain::transfer::{RecordSink, TransferError};
use crate::infrastructure::config::caspio_config::CaspioConfig;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Strips a protocol scheme and a trailing `.caspio.com` so a pasted portal
/// URL works as an account id.
fn normalize_account_id(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    without_scheme
        .strip_suffix(".caspio.com")
        .unwrap_or(without_scheme)
        .to_owned()
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Sink Writer: Caspio REST v2 client. `authenticate` performs the
/// client-credentials exchange once; `push_record` creates one table record
/// per call with the stored bearer token.
pub struct CaspioApiClient {
    client: Client,
    config: CaspioConfig,
    token: RwLock<Option<String>>,
}

impl CaspioApiClient {
    pub fn new(config: CaspioConfig) -> Self {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        CaspioApiClient {
            client,
            config,
            token: RwLock::new(None),
        }
    }

    fn base_url(&self) -> String {
        format!("https://{}.caspio.com", normalize_account_id(&self.config.account_id))
    }

    fn token_url(&self) -> String {
        format!("{}/oauth/token", self.base_url())
    }

    fn records_url(&self) -> String {
        format!(
            "{}/rest/v2/tables/{}/records",
            self.base_url(),
            self.config.table_name
        )
    }

    fn stored_token(&self) -> Option<String> {
        self.token.read().expect("token lock poisoned").clone()
    }
}

#[async_trait::async_trait]
impl RecordSink for CaspioApiClient {
    #[instrument(skip(self))]
    async fn authenticate(&self) -> error_stack::Result<(), TransferError> {
        let response = self
            .client
            .post(self.token_url())
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()
            .await
            .change_context(TransferError::Authentication)?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(report!(TransferError::Authentication)
                .attach_printable(format!("token endpoint returned HTTP {status}: {body}")));
        }

        let token_data: TokenResponse = response
            .json()
            .await
            .change_context(TransferError::MalformedResponse)
            .attach_printable("token response missing access_token")?;

        *self.token.write().expect("token lock poisoned") = Some(token_data.access_token);
        tracing::info!("✓ Caspio authentication successful");
        Ok(())
    }

    #[instrument(skip(self, record))]
    async fn push_record(
        &self,
        record: &HashMap<String, String>,
    ) -> error_stack::Result<serde_json::Value, TransferError> {
        let Some(token) = self.stored_token() else {
            return Err(report!(TransferError::Authentication)
                .attach_printable("no bearer token; authenticate() must succeed first"));
        };

        let response = self
            .client
            .post(self.records_url())
            .bearer_auth(token)
            .json(record)
            .send()
            .await
            .change_context(TransferError::Transport)?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(report!(TransferError::Transport)
                .attach_printable(format!("record create returned HTTP {status}: {body}")));
        }

        let body = response
            .text()
            .await
            .change_context(TransferError::Transport)?;
        if body.is_empty() {
            return Ok(serde_json::Value::Object(Default::default()));
        }
        serde_json::from_str(&body).change_context(TransferError::MalformedResponse)
    }
}
