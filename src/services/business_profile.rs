// 📇 Business profile - contact point held by the accounts service
//
// POST {entity_url}/{identifier}/contacts; an existing contact is updated
// with PUT instead.

use super::accounts::AccountService;
use crate::error::ServiceError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// `incorporationApplication.contactPoint`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactPoint {
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// Filed as either a number or a string
    #[serde(default)]
    pub extension: Option<Value>,
}

impl ContactPoint {
    fn request_body(&self) -> Value {
        let extension = match &self.extension {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        json!({
            "email": self.email,
            "phone": self.phone.clone().unwrap_or_default(),
            "phoneExtension": extension,
        })
    }
}

#[async_trait]
pub trait BusinessProfileService: Send + Sync {
    async fn update_business_profile(&self, identifier: &str, contact_point: &ContactPoint) -> Result<(), ServiceError>;
}

#[derive(Clone)]
pub struct BusinessProfileClient {
    client: Client,
    entity_url: String,
    accounts: Arc<dyn AccountService>,
}

impl BusinessProfileClient {
    pub fn new(entity_url: &str, timeout: Duration, accounts: Arc<dyn AccountService>) -> Result<Self, ServiceError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            entity_url: entity_url.trim_end_matches('/').to_string(),
            accounts,
        })
    }
}

#[async_trait]
impl BusinessProfileService for BusinessProfileClient {
    async fn update_business_profile(&self, identifier: &str, contact_point: &ContactPoint) -> Result<(), ServiceError> {
        let token = self.accounts.get_bearer_token().await?;
        let url = format!("{}/{}/contacts", self.entity_url, identifier);
        let body = contact_point.request_body();

        let mut response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        if matches!(response.status(), StatusCode::BAD_REQUEST | StatusCode::CONFLICT) {
            tracing::debug!(identifier, "Contact exists, updating instead");
            response = self.client.put(&url).bearer_auth(&token).json(&body).send().await?;
        }

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ServiceError::Status(response.status().as_u16()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeAccounts;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn contact() -> ContactPoint {
        ContactPoint {
            email: "test@test.com".to_string(),
            phone: Some("(250) 555-1234".to_string()),
            extension: Some(json!(123)),
        }
    }

    #[tokio::test]
    async fn test_existing_contact_is_updated_with_put() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/entities/BC0000042/contacts"))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/entities/BC0000042/contacts"))
            .and(body_json(json!({"email": "test@test.com", "phone": "(250) 555-1234", "phoneExtension": "123"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = BusinessProfileClient::new(
            &format!("{}/entities", server.uri()),
            Duration::from_secs(5),
            Arc::new(FakeAccounts::default()),
        )
        .unwrap();

        client.update_business_profile("BC0000042", &contact()).await.unwrap();
    }

    #[tokio::test]
    async fn test_server_error_surfaces_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = BusinessProfileClient::new(
            &format!("{}/entities", server.uri()),
            Duration::from_secs(5),
            Arc::new(FakeAccounts::default()),
        )
        .unwrap();

        let result = client.update_business_profile("BC0000042", &contact()).await;
        assert!(matches!(result, Err(ServiceError::Status(503))));
    }
}
