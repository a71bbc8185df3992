use crate::domain::model::Session;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, RoomError};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use std::time::Duration;

/// reqwest client bound to one backend project: base URL plus the public API key.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl BackendClient {
    pub fn new(base_url: &str, anon_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RoomError::ConfigError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(
            config.backend_url(),
            config.anon_key(),
            Duration::from_secs(config.request_timeout_seconds()),
        )
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Request carrying the project key, authorized as the session's user when present.
    pub fn request(&self, method: Method, path: &str, session: Option<&Session>) -> RequestBuilder {
        let token = session
            .map(|s| s.access_token.as_str())
            .unwrap_or(self.anon_key.as_str());

        self.client
            .request(method, self.url(path))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
    }
}

/// Status and the most useful message/code out of an error response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetails {
    pub status: StatusCode,
    pub message: String,
    pub code: Option<String>,
}

impl ErrorDetails {
    pub async fn from_response(response: Response) -> Self {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Self::parse(status, &body)
    }

    pub fn parse(status: StatusCode, body: &str) -> Self {
        let json: Option<serde_json::Value> = serde_json::from_str(body).ok();

        let field = |keys: &[&str]| -> Option<String> {
            let json = json.as_ref()?;
            keys.iter().find_map(|key| match json.get(*key)? {
                serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
        };

        let message = field(&["message", "msg", "error_description", "error"])
            .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            });
        let code = field(&["error_code", "code"]);

        Self {
            status,
            message,
            code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_postgrest_error() {
        let details = ErrorDetails::parse(
            StatusCode::FORBIDDEN,
            r#"{"code":"42501","details":null,"hint":null,"message":"new row violates row-level security policy"}"#,
        );
        assert_eq!(details.message, "new row violates row-level security policy");
        assert_eq!(details.code.as_deref(), Some("42501"));
    }

    #[test]
    fn test_parse_auth_error() {
        let details = ErrorDetails::parse(
            StatusCode::BAD_REQUEST,
            r#"{"code":400,"error_code":"invalid_credentials","msg":"Invalid login credentials"}"#,
        );
        assert_eq!(details.message, "Invalid login credentials");
        assert_eq!(details.code.as_deref(), Some("invalid_credentials"));
    }

    #[test]
    fn test_parse_plain_and_empty_bodies() {
        let plain = ErrorDetails::parse(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(plain.message, "upstream down");
        assert_eq!(plain.code, None);

        let empty = ErrorDetails::parse(StatusCode::SERVICE_UNAVAILABLE, "");
        assert_eq!(empty.message, "Service Unavailable");
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let client =
            BackendClient::new("https://project.example.com/", "anon", Duration::from_secs(5))
                .unwrap();
        assert_eq!(
            client.url("/rest/v1/rooms"),
            "https://project.example.com/rest/v1/rooms"
        );
    }
}
