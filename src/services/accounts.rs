// 🔐 Accounts service - auth tokens, entities and affiliations
//
// An affiliation links an account to a business (or bootstrap) identifier.
// Creating one is two calls (entity, then affiliation); deleting one is two
// calls in the other order. Both report a single status code: 200 when every
// underlying call succeeded, 400 otherwise.

use crate::config::AccountServiceConfig;
use crate::entities::{RegistrationBootstrap, TEMP_CORP_TYPE};
use crate::error::ServiceError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

/// Status codes an affiliation call counts as success
pub fn is_affiliation_success(status: StatusCode) -> bool {
    status == StatusCode::OK || status == StatusCode::CREATED
}

#[async_trait]
pub trait AccountService: Send + Sync {
    async fn get_bearer_token(&self) -> Result<String, ServiceError>;

    async fn create_affiliation(
        &self,
        account: &str,
        business_registration: &str,
        business_name: &str,
        corp_type_code: &str,
    ) -> StatusCode;

    async fn delete_affiliation(&self, account: &str, business_registration: &str) -> StatusCode;
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[derive(Clone)]
pub struct AccountsClient {
    client: Client,
    config: AccountServiceConfig,
}

impl AccountsClient {
    pub fn new(config: &AccountServiceConfig) -> Result<Self, ServiceError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn entity_url(&self) -> &str {
        self.config.entity_url.trim_end_matches('/')
    }

    fn affiliate_url(&self) -> &str {
        self.config.affiliate_url.trim_end_matches('/')
    }

    async fn try_create_affiliation(
        &self,
        account: &str,
        business_registration: &str,
        business_name: &str,
        corp_type_code: &str,
    ) -> Result<(), ServiceError> {
        let token = self.get_bearer_token().await?;

        let entity = self
            .client
            .post(self.entity_url())
            .bearer_auth(&token)
            .json(&json!({
                "businessIdentifier": business_registration,
                "corpTypeCode": corp_type_code,
                "name": business_name,
                "passCode": "",
            }))
            .send()
            .await?;
        if !is_affiliation_success(entity.status()) {
            return Err(ServiceError::Status(entity.status().as_u16()));
        }

        let affiliation = self
            .client
            .post(format!("{}/{}/affiliations", self.affiliate_url(), account))
            .bearer_auth(&token)
            .json(&json!({
                "businessIdentifier": business_registration,
                "passCode": "",
            }))
            .send()
            .await?;
        if !is_affiliation_success(affiliation.status()) {
            return Err(ServiceError::Status(affiliation.status().as_u16()));
        }

        Ok(())
    }

    async fn try_delete_affiliation(&self, account: &str, business_registration: &str) -> Result<(), ServiceError> {
        let token = self.get_bearer_token().await?;

        let affiliation = self
            .client
            .delete(format!(
                "{}/{}/affiliations/{}",
                self.affiliate_url(),
                account,
                business_registration
            ))
            .bearer_auth(&token)
            .send()
            .await?;
        if affiliation.status() != StatusCode::OK {
            return Err(ServiceError::Status(affiliation.status().as_u16()));
        }

        let entity = self
            .client
            .delete(format!("{}/{}", self.entity_url(), business_registration))
            .bearer_auth(&token)
            .send()
            .await?;
        if entity.status() != StatusCode::OK {
            return Err(ServiceError::Status(entity.status().as_u16()));
        }

        Ok(())
    }
}

#[async_trait]
impl AccountService for AccountsClient {
    async fn get_bearer_token(&self) -> Result<String, ServiceError> {
        let response = self
            .client
            .post(&self.config.auth_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::Status(response.status().as_u16()));
        }

        let token: TokenResponse = response.json().await?;
        token.access_token.ok_or(ServiceError::MissingToken)
    }

    async fn create_affiliation(
        &self,
        account: &str,
        business_registration: &str,
        business_name: &str,
        corp_type_code: &str,
    ) -> StatusCode {
        match self
            .try_create_affiliation(account, business_registration, business_name, corp_type_code)
            .await
        {
            Ok(()) => {
                tracing::debug!(account, business_registration, "Affiliation created");
                StatusCode::OK
            }
            Err(e) => {
                tracing::warn!(account, business_registration, error = %e, "Affiliation create failed");
                StatusCode::BAD_REQUEST
            }
        }
    }

    async fn delete_affiliation(&self, account: &str, business_registration: &str) -> StatusCode {
        match self.try_delete_affiliation(account, business_registration).await {
            Ok(()) => {
                tracing::debug!(account, business_registration, "Affiliation deleted");
                StatusCode::OK
            }
            Err(e) => {
                tracing::warn!(account, business_registration, error = %e, "Affiliation delete failed");
                StatusCode::BAD_REQUEST
            }
        }
    }
}

// ============================================================================
// BOOTSTRAP REGISTRATION
// ============================================================================

/// Affiliate a new bootstrap with its account so the pending registration
/// shows up there. `business_name` is the NR number when one was filed,
/// otherwise the bootstrap identifier.
pub async fn register_bootstrap(
    accounts: &dyn AccountService,
    bootstrap: &RegistrationBootstrap,
    business_name: &str,
) -> Result<StatusCode, ServiceError> {
    let status = accounts
        .create_affiliation(&bootstrap.account, &bootstrap.identifier, business_name, TEMP_CORP_TYPE)
        .await;

    if is_affiliation_success(status) {
        Ok(status)
    } else {
        Err(ServiceError::Status(status.as_u16()))
    }
}
