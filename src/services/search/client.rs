use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::kernel::event::RequestFailure;
use crate::kernel::state::{Content, SearchPage, SearchResult};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service rejected request: {0}")]
    Rejected(String),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("invalid service url: {0}")]
    InvalidUrl(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl From<ServiceError> for RequestFailure {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Rejected(reason) => RequestFailure::Rejected(reason),
            other => RequestFailure::Network(other.to_string()),
        }
    }
}

/// The remote search/content service. Stateless request/response.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &str) -> Result<SearchPage, ServiceError>;
    async fn content(&self, result_id: &str) -> Result<Content, ServiceError>;
}

#[derive(Clone)]
pub struct HttpSearchService {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
}

#[derive(Deserialize)]
struct SearchEnvelope {
    success: bool,
    #[serde(default)]
    results: Vec<SearchResult>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct ContentEnvelope {
    success: bool,
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    error: Option<String>,
}

impl HttpSearchService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout) // Network level; the driver enforces its own deadline too
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ServiceError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| ServiceError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ServiceError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl SearchBackend for HttpSearchService {
    async fn search(&self, query: &str) -> Result<SearchPage, ServiceError> {
        let url = self.endpoint(&["api", "search"])?;
        debug!("POST {}", url);

        let response = self.client.post(url).json(&SearchRequest { query }).send().await?;
        let status = response.status();
        let body = response.text().await?;
        decode_search(status, &body)
    }

    async fn content(&self, result_id: &str) -> Result<Content, ServiceError> {
        let url = self.endpoint(&["api", "content", result_id])?;
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        decode_content(status, &body)
    }
}

/// The service reports failures in-band (`success: false`), often with a 4xx/5xx
/// status. The envelope wins when it parses; the status only matters when it doesn't.
fn decode_search(status: StatusCode, body: &str) -> Result<SearchPage, ServiceError> {
    let envelope: SearchEnvelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) if status.is_success() => return Err(ServiceError::Decode(e.to_string())),
        Err(_) => return Err(ServiceError::Rejected(format!("HTTP {}", status))),
    };

    if !envelope.success {
        let reason = envelope.error.unwrap_or_else(|| format!("HTTP {}", status));
        warn!("Search service error: {}", reason);
        return Err(ServiceError::Rejected(reason));
    }

    Ok(SearchPage { results: envelope.results, message: envelope.message })
}

fn decode_content(status: StatusCode, body: &str) -> Result<Content, ServiceError> {
    let envelope: ContentEnvelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) if status.is_success() => return Err(ServiceError::Decode(e.to_string())),
        Err(_) => return Err(ServiceError::Rejected(format!("HTTP {}", status))),
    };

    if !envelope.success {
        let reason = envelope.error.unwrap_or_else(|| format!("HTTP {}", status));
        warn!("Content service error: {}", reason);
        return Err(ServiceError::Rejected(reason));
    }

    envelope
        .content
        .ok_or_else(|| ServiceError::Decode("success without content".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_envelope_keeps_response_order() {
        let body = r#"{"success": true, "results": [
            {"id": "b2", "title": "Giant panda", "snippet": "Bear", "url": "https://a"},
            {"id": "a1", "title": "Red panda", "snippet": "Not a bear", "url": "https://b"}
        ]}"#;
        let page = decode_search(StatusCode::OK, body).unwrap();
        let ids: Vec<_> = page.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["b2", "a1"]);
        assert!(page.message.is_none());
    }

    #[test]
    fn in_band_failure_is_rejected_even_on_error_status() {
        let body = r#"{"success": false, "error": "Query cannot be empty"}"#;
        match decode_search(StatusCode::BAD_REQUEST, body) {
            Err(ServiceError::Rejected(reason)) => assert_eq!(reason, "Query cannot be empty"),
            other => panic!("expected rejection, got {:?}", other.map(|p| p.results.len())),
        }
    }

    #[test]
    fn non_json_error_page_is_rejected_with_status() {
        match decode_content(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>") {
            Err(ServiceError::Rejected(reason)) => assert!(reason.contains("502")),
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn garbage_on_success_status_is_a_decode_error() {
        assert!(matches!(
            decode_content(StatusCode::OK, "not json"),
            Err(ServiceError::Decode(_))
        ));
    }

    #[test]
    fn content_ids_are_path_encoded() {
        let service = HttpSearchService::new("http://localhost:5000/", Duration::from_secs(1));
        let url = service.endpoint(&["api", "content", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/content/a%20b%2Fc");
    }

    #[test]
    fn rejection_maps_to_rejected_failure() {
        let failure: RequestFailure = ServiceError::Rejected("nope".into()).into();
        assert_eq!(failure, RequestFailure::Rejected("nope".into()));
        let failure: RequestFailure = ServiceError::Timeout(Duration::from_secs(2)).into();
        assert!(matches!(failure, RequestFailure::Network(_)));
    }
}
