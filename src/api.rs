use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Request body sent to the QA endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QaRequest {
    pub query: String,
    /// Always serialized, `null` on the first turn
    pub conversation_id: Option<String>,
    pub user_id: String,
}

/// Decoded answer from the QA endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QaResponse {
    pub conversation_id: String,
    pub text: String,
    #[serde(default, deserialize_with = "lenient_citations")]
    pub citations: Vec<Citation>,
}

/// Source reference attached to an answer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

impl Citation {
    pub fn new(title: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            snippet: Some(snippet.into()),
        }
    }

    /// Title shown to the user, falling back to a generic label
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Document")
    }
}

/// A malformed or null citations list is treated as no citations.
fn lenient_citations<'de, D>(deserializer: D) -> Result<Vec<Citation>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// The request failed: network error, non-success status or undecodable body.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct RequestError {
    message: String,
    status: Option<u16>,
    body: Option<String>,
    detail: Option<String>,
}

impl RequestError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            body: None,
            detail: None,
        }
    }

    fn status(status: StatusCode, body: String) -> Self {
        Self {
            message: format!("Request failed with status code {}", status.as_u16()),
            status: Some(status.as_u16()),
            body: Some(body),
            detail: None,
        }
    }

    fn decode(err: serde_json::Error, body: String) -> Self {
        Self {
            message: format!("Invalid response body: {}", err),
            status: None,
            body: Some(body),
            detail: None,
        }
    }

    /// No usable response. The reqwest error text only goes to the log.
    fn network(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            Self {
                detail: Some(err.to_string()),
                ..Self::new("Network Error")
            }
        } else {
            Self::new(err.to_string())
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status, when the server answered at all
    pub fn status_code(&self) -> Option<u16> {
        self.status
    }

    pub fn response_body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Underlying transport error, for diagnostics
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

/// The single network exchange with the QA service.
#[async_trait]
pub trait QaTransport: Send + Sync {
    async fn send_query(
        &self,
        query: &str,
        conversation_id: Option<&str>,
        user_id: &str,
    ) -> Result<QaResponse, RequestError>;
}

/// reqwest-backed transport posting JSON to a fixed endpoint
#[derive(Clone)]
pub struct HttpTransport {
    endpoint: Url,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(endpoint: &str) -> anyhow::Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| anyhow::anyhow!("Invalid endpoint URL '{}': {}", endpoint, e))?;
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn post(&self, request: &QaRequest) -> Result<QaResponse, RequestError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(RequestError::network)?;

        let status = response.status();
        let body = response.text().await.map_err(RequestError::network)?;

        if !status.is_success() {
            return Err(RequestError::status(status, body));
        }

        serde_json::from_str(&body).map_err(|e| RequestError::decode(e, body))
    }
}

#[async_trait]
impl QaTransport for HttpTransport {
    async fn send_query(
        &self,
        query: &str,
        conversation_id: Option<&str>,
        user_id: &str,
    ) -> Result<QaResponse, RequestError> {
        let request = QaRequest {
            query: query.to_string(),
            conversation_id: conversation_id.map(str::to_string),
            user_id: user_id.to_string(),
        };

        tracing::debug!(endpoint = %self.endpoint, "Sending request");

        match self.post(&request).await {
            Ok(response) => {
                tracing::debug!(
                    conversation_id = %response.conversation_id,
                    citations = response.citations.len(),
                    "Received response"
                );
                Ok(response)
            }
            Err(err) => {
                tracing::error!(error = %err, "Error calling API");
                if let Some(detail) = err.detail() {
                    tracing::error!(detail, "Transport error");
                }
                if let Some(status) = err.status_code() {
                    tracing::error!(status, "Response status");
                }
                if let Some(body) = err.response_body() {
                    tracing::error!(body, "Response data");
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn request_serializes_null_conversation_id() {
        let request = QaRequest {
            query: "max torque?".to_string(),
            conversation_id: None,
            user_id: "user-1".to_string(),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "query": "max torque?",
                "conversationId": null,
                "userId": "user-1"
            })
        );
    }

    #[test]
    fn response_without_citations_defaults_to_empty() {
        let response: QaResponse =
            serde_json::from_str(r#"{"conversationId":"c1","text":"ok"}"#).unwrap();
        assert!(response.citations.is_empty());
    }

    #[test]
    fn malformed_citations_degrade_to_empty() {
        let response: QaResponse = serde_json::from_str(
            r#"{"conversationId":"c1","text":"ok","citations":"not-a-list"}"#,
        )
        .unwrap();
        assert!(response.citations.is_empty());

        let response: QaResponse =
            serde_json::from_str(r#"{"conversationId":"c1","text":"ok","citations":null}"#)
                .unwrap();
        assert!(response.citations.is_empty());
    }

    #[test]
    fn citations_keep_partial_fields() {
        let response: QaResponse = serde_json::from_str(
            r#"{"conversationId":"c1","text":"ok","citations":[{"snippet":"rated to 150 psi"},{"title":"Spec B"}]}"#,
        )
        .unwrap();

        assert_eq!(
            response.citations,
            vec![
                Citation { title: None, snippet: Some("rated to 150 psi".to_string()) },
                Citation { title: Some("Spec B".to_string()), snippet: None },
            ]
        );
        assert_eq!(response.citations[0].display_title(), "Document");
    }

    #[test]
    fn missing_text_is_a_decode_error() {
        let err = serde_json::from_str::<QaResponse>(r#"{"conversationId":"c1"}"#).unwrap_err();
        let err = RequestError::decode(err, String::new());
        assert!(err.message().starts_with("Invalid response body"));
    }

    #[test]
    fn status_error_uses_http_client_wording() {
        let err = RequestError::status(StatusCode::BAD_GATEWAY, "upstream down".to_string());
        assert_eq!(err.to_string(), "Request failed with status code 502");
        assert_eq!(err.status_code(), Some(502));
        assert_eq!(err.response_body(), Some("upstream down"));
    }

    #[test]
    fn rejects_invalid_endpoint() {
        assert!(HttpTransport::new("not a url").is_err());
        assert!(HttpTransport::new("http://localhost:8080/query").is_ok());
    }
}
