// 🔢 Corporate number allocator (COLIN)
//
// POST {api_url}/{business_type} -> {"corpNum": 1234567}
// The identifier is the type code followed by the 7-digit, zero-padded number.
// Every failure (connection, non-200, out-of-range number) comes back as None;
// retrying is left to queue redelivery.

use crate::config::ColinConfig;
use crate::error::ServiceError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;

/// Largest sequence number that fits the 7-digit identifier format
pub const MAX_CORP_NUM: i64 = 9_999_999;

#[async_trait]
pub trait CorpNumberAllocator: Send + Sync {
    /// Next sequential registration number for `business_type`, e.g. "BC0000042"
    async fn get_next_corp_num(&self, business_type: &str) -> Option<String>;
}

/// Format a sequence number as an identifier; rejects 0 and anything over 7 digits
pub fn format_corp_num(business_type: &str, corp_num: i64) -> Option<String> {
    if corp_num <= 0 || corp_num > MAX_CORP_NUM {
        return None;
    }
    Some(format!("{business_type}{corp_num:07}"))
}

fn parse_corp_num(body: &Value) -> Option<i64> {
    match body.get("corpNum")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Clone)]
pub struct ColinClient {
    client: Client,
    api_url: String,
}

impl ColinClient {
    pub fn new(config: &ColinConfig) -> Result<Self, ServiceError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CorpNumberAllocator for ColinClient {
    async fn get_next_corp_num(&self, business_type: &str) -> Option<String> {
        let url = format!("{}/{}", self.api_url, business_type);

        let response = match self.client.post(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(url = %url, error = %e, "Failed to connect to corp number allocator");
                return None;
            }
        };

        if response.status() != StatusCode::OK {
            tracing::warn!(status = %response.status(), business_type, "Corp number allocation refused");
            return None;
        }

        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, "Corp number response was not JSON");
                return None;
            }
        };

        let identifier = parse_corp_num(&body).and_then(|n| format_corp_num(business_type, n));
        if identifier.is_none() {
            tracing::warn!(body = %body, "Corp number out of range or missing");
        }
        identifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ColinClient {
        ColinClient::new(&ColinConfig {
            api_url: format!("{}/api/v1/businesses", server.uri()),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_format_corp_num() {
        assert_eq!(format_corp_num("BC", 42).as_deref(), Some("BC0000042"));
        assert_eq!(format_corp_num("BC", 9_999_999).as_deref(), Some("BC9999999"));
        assert_eq!(format_corp_num("BC", 10_000_000), None);
        assert_eq!(format_corp_num("BC", 0), None);
    }

    #[tokio::test]
    async fn test_allocates_padded_identifier() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/businesses/BC"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"corpNum": 42})))
            .expect(1)
            .mount(&server)
            .await;

        let corp_num = client_for(&server).get_next_corp_num("BC").await;

        assert_eq!(corp_num.as_deref(), Some("BC0000042"));
    }

    #[tokio::test]
    async fn test_eight_digit_number_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"corpNum": 10000000})))
            .mount(&server)
            .await;

        assert_eq!(client_for(&server).get_next_corp_num("BC").await, None);
    }

    #[tokio::test]
    async fn test_non_200_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"corpNum": 42})))
            .mount(&server)
            .await;

        assert_eq!(client_for(&server).get_next_corp_num("BC").await, None);
    }

    #[tokio::test]
    async fn test_connection_failure_is_none() {
        let client = ColinClient::new(&ColinConfig {
            api_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
        })
        .unwrap();

        assert_eq!(client.get_next_corp_num("BC").await, None);
    }

    #[tokio::test]
    async fn test_string_corp_num_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"corpNum": "1234567"})))
            .mount(&server)
            .await;

        assert_eq!(client_for(&server).get_next_corp_num("BC").await.as_deref(), Some("BC1234567"));
    }
}
