// 📛 Name reservation service (NameX)
//
// PATCH {api_url}{nrNumber}  {"consume": {"corpNum": "<identifier>"}}

use crate::config::NamexConfig;
use crate::error::ServiceError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;
use std::time::Duration;

#[async_trait]
pub trait NameService: Send + Sync {
    /// Mark `nr_number` consumed by `corp_num`; returns the service's status code
    async fn consume(&self, nr_number: &str, corp_num: &str, token: &str) -> Result<StatusCode, ServiceError>;
}

#[derive(Clone)]
pub struct NamexClient {
    client: Client,
    api_url: String,
}

impl NamexClient {
    pub fn new(config: &NamexConfig, timeout: Duration) -> Result<Self, ServiceError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
        })
    }
}

#[async_trait]
impl NameService for NamexClient {
    async fn consume(&self, nr_number: &str, corp_num: &str, token: &str) -> Result<StatusCode, ServiceError> {
        let response = self
            .client
            .patch(format!("{}{}", self.api_url, nr_number))
            .bearer_auth(token)
            .json(&json!({"consume": {"corpNum": corp_num}}))
            .send()
            .await?;

        tracing::debug!(nr_number, corp_num, status = %response.status(), "NR consume requested");
        Ok(response.status())
    }
}
