//! HTTP client for the third-party form relay
//!
//! This module encodes a [`FormInput`] into the relay's JSON shape, issues a
//! single POST, and maps every transport or HTTP outcome onto
//! [`SubmissionError`].

use super::traits::SubmissionClient;
use crate::config::RelaySettings;
use crate::error::SubmissionError;
use crate::form::FormInput;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Where a submission identifier came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdOrigin {
    /// Assigned by the relay in its response body
    Relay,
    /// Generated locally because the relay returned none
    Local,
}

/// Opaque identifier of an accepted submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionId {
    value: String,
    origin: IdOrigin,
}

impl SubmissionId {
    pub fn relay(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            origin: IdOrigin::Relay,
        }
    }

    pub fn local() -> Self {
        Self {
            value: Uuid::new_v4().to_string(),
            origin: IdOrigin::Local,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn origin(&self) -> IdOrigin {
        self.origin
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// JSON body posted to the relay
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RelayPayload<'a> {
    pub access_key: &'a str,
    pub name: String,
    pub email: &'a str,
    pub subject: String,
    pub message: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub company: &'a str,
    pub role: Option<&'a str>,
    pub interested_in: &'a str,
    pub service_type: Option<&'a str>,
    pub urgency: &'a str,
}

impl<'a> RelayPayload<'a> {
    pub fn new(access_key: &'a str, input: &'a FormInput) -> Self {
        Self {
            access_key,
            name: input.full_name(),
            email: &input.email,
            subject: input.subject(),
            message: &input.message,
            first_name: &input.first_name,
            last_name: &input.last_name,
            company: &input.company,
            role: input.role.as_deref(),
            interested_in: &input.interested_in,
            service_type: input.service_type.as_deref(),
            urgency: &input.urgency,
        }
    }
}

/// Client for a Web3Forms-style relay endpoint
pub struct HttpRelay {
    client: Client,
    url: String,
    access_key: String,
}

impl HttpRelay {
    /// Create a relay client from resolved settings
    pub fn new(settings: &RelaySettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            url: settings.relay_url.clone(),
            access_key: settings.access_key.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SubmissionClient for HttpRelay {
    async fn submit(&self, input: &FormInput) -> Result<SubmissionId, SubmissionError> {
        let payload = RelayPayload::new(&self.access_key, input);

        let response = self
            .client
            .post(&self.url)
            .header(ACCEPT, "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or_default();

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) if status.is_success() => {
                return Err(SubmissionError::Parse(format!(
                    "failed to read response body: {e}"
                )));
            }
            Err(e) => {
                tracing::warn!(status = status.as_u16(), error = %e, "Relay error body unreadable");
                return classify_response(status.as_u16(), status_text, &[]);
            }
        };

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "Relay responded");

        classify_response(status.as_u16(), status_text, &body)
    }
}

fn transport_error(err: reqwest::Error) -> SubmissionError {
    if err.is_timeout() {
        SubmissionError::Timeout(err.to_string())
    } else {
        SubmissionError::Network(err.to_string())
    }
}

/// Map a relay response onto the submission result
///
/// Non-2xx statuses are classified by status alone; an unreadable error
/// body is treated as an empty object.
pub fn classify_response(
    status: u16,
    status_text: &str,
    body: &[u8],
) -> Result<SubmissionId, SubmissionError> {
    if !(200..300).contains(&status) {
        let detail = serde_json::from_slice::<Value>(body)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string));
        tracing::warn!(status, ?detail, "Relay rejected submission");
        return Err(SubmissionError::server(status, status_text));
    }

    let parsed: Value = serde_json::from_slice(body)
        .map_err(|e| SubmissionError::Parse(format!("response body is not JSON: {e}")))?;

    match extract_id(&parsed) {
        Some(id) => Ok(SubmissionId::relay(id)),
        None => {
            let id = SubmissionId::local();
            tracing::info!(%id, "Relay returned no identifier, using local id");
            Ok(id)
        }
    }
}

fn extract_id(body: &Value) -> Option<String> {
    let candidates = [
        body.get("id"),
        body.get("data").and_then(|d| d.get("id")),
        body.get("submission_id"),
    ];
    candidates.into_iter().flatten().find_map(|v| match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FallbackContact;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    fn sample_input() -> FormInput {
        FormInput {
            first_name: "John".into(),
            last_name: "Doe".into(),
            email: "john@example.com".into(),
            company: "Test Corp".into(),
            interested_in: "Risk Strategy & Assessment".into(),
            message: "I am interested in your risk strategy services.".into(),
            urgency: "normal".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_payload_shape() {
        let input = sample_input();
        let payload = RelayPayload::new("key-123", &input);
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["access_key"], "key-123");
        assert_eq!(json["name"], "John Doe");
        assert_eq!(json["email"], "john@example.com");
        assert_eq!(
            json["subject"],
            "New Contact Request - Risk Strategy & Assessment"
        );
        assert_eq!(json["company"], "Test Corp");
        assert_eq!(json["interested_in"], "Risk Strategy & Assessment");
        assert_eq!(json["urgency"], "normal");
        assert_eq!(json["role"], Value::Null);
        assert_eq!(json["service_type"], Value::Null);
    }

    #[test]
    fn test_success_with_id() {
        let id = classify_response(200, "OK", br#"{"id": "contact-123"}"#).unwrap();
        assert_eq!(id.as_str(), "contact-123");
        assert_eq!(id.origin(), IdOrigin::Relay);
    }

    #[test]
    fn test_success_with_nested_or_numeric_id() {
        let id = classify_response(200, "OK", br#"{"success": true, "data": {"id": 42}}"#)
            .unwrap();
        assert_eq!(id.as_str(), "42");

        let id = classify_response(201, "Created", br#"{"submission_id": "s-9"}"#).unwrap();
        assert_eq!(id.as_str(), "s-9");
    }

    #[test]
    fn test_success_without_id_uses_local() {
        let id = classify_response(200, "OK", br#"{"success": true}"#).unwrap();
        assert_eq!(id.origin(), IdOrigin::Local);
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn test_success_with_non_json_body() {
        let err = classify_response(200, "OK", b"<html>ok</html>").unwrap_err();
        assert!(matches!(err, SubmissionError::Parse(_)));
    }

    #[test]
    fn test_server_error_status() {
        let err = classify_response(503, "Service Unavailable", b"").unwrap_err();
        assert_eq!(err, SubmissionError::server(503, "Service Unavailable"));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_client_error_with_unparseable_body() {
        let err = classify_response(400, "Bad Request", b"not json").unwrap_err();
        assert_eq!(err, SubmissionError::server(400, "Bad Request"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_display_is_value() {
        assert_eq!(SubmissionId::relay("abc").to_string(), "abc");
    }

    fn settings(url: String, request_timeout: Duration) -> RelaySettings {
        RelaySettings {
            relay_url: url,
            access_key: "k".into(),
            max_attempts: 1,
            retry_delay: Duration::ZERO,
            request_timeout,
            fallback: FallbackContact::default(),
            draft_dir: None,
        }
    }

    /// Read one HTTP/1.1 request: head plus a `content-length` body
    async fn read_request(stream: &mut TcpStream) -> (String, Vec<u8>) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        let head_end = loop {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before request head");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..head_end]).to_lowercase();
        let length = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .map(|v| v.trim().parse::<usize>().unwrap())
            .unwrap_or(0);

        let mut body = buf[head_end..].to_vec();
        while body.len() < length {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before request body");
            body.extend_from_slice(&chunk[..n]);
        }
        (head, body)
    }

    /// Serve one connection with a canned raw response, then close it
    async fn serve_once(response: impl Into<String>) -> (String, JoinHandle<(String, Vec<u8>)>) {
        let response = response.into();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/submit", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
            request
        });
        (url, handle)
    }

    #[tokio::test]
    async fn test_submit_posts_json_and_reads_id() {
        let body = r#"{"success":true,"id":"contact-123"}"#;
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        );
        let (url, server) = serve_once(response).await;
        let relay = HttpRelay::new(&settings(url, Duration::from_secs(5))).unwrap();

        let id = relay.submit(&sample_input()).await.unwrap();
        assert_eq!(id.as_str(), "contact-123");
        assert_eq!(id.origin(), IdOrigin::Relay);

        let (head, sent) = server.await.unwrap();
        assert!(head.starts_with("post /submit http/1.1\r\n"), "{head}");
        assert!(head.contains("\r\naccept: application/json\r\n"), "{head}");
        assert!(head.contains("\r\ncontent-type: application/json\r\n"), "{head}");

        let sent: Value = serde_json::from_slice(&sent).unwrap();
        let expected = serde_json::to_value(RelayPayload::new("k", &sample_input())).unwrap();
        assert_eq!(sent, expected);
    }

    #[tokio::test]
    async fn test_submit_maps_unavailable_to_server_error() {
        let (url, server) = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;
        let relay = HttpRelay::new(&settings(url, Duration::from_secs(5))).unwrap();

        let err = relay.submit(&sample_input()).await.unwrap_err();
        assert_eq!(err, SubmissionError::server(503, "Service Unavailable"));
        assert!(err.is_retryable());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_truncated_error_body_keeps_status() {
        let (url, server) =
            serve_once("HTTP/1.1 400 Bad Request\r\nContent-Length: 100\r\n\r\nabc").await;
        let relay = HttpRelay::new(&settings(url, Duration::from_secs(5))).unwrap();

        let err = relay.submit(&sample_input()).await.unwrap_err();
        assert_eq!(err, SubmissionError::server(400, "Bad Request"));
        assert!(!err.is_retryable());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_truncated_success_body_is_parse_error() {
        let (url, server) =
            serve_once("HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n{\"id\":").await;
        let relay = HttpRelay::new(&settings(url, Duration::from_secs(5))).unwrap();

        let err = relay.submit(&sample_input()).await.unwrap_err();
        assert!(matches!(err, SubmissionError::Parse(_)), "{err:?}");
        assert!(!err.is_retryable());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_refused_connection_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/submit", listener.local_addr().unwrap());
        drop(listener);
        let relay = HttpRelay::new(&settings(url, Duration::from_secs(5))).unwrap();

        let err = relay.submit(&sample_input()).await.unwrap_err();
        assert!(matches!(err, SubmissionError::Network(_)), "{err:?}");
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_silent_relay_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/submit", listener.local_addr().unwrap());
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_request(&mut stream).await;
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(stream);
        });
        let relay = HttpRelay::new(&settings(url, Duration::from_millis(100))).unwrap();

        let err = relay.submit(&sample_input()).await.unwrap_err();
        assert!(matches!(err, SubmissionError::Timeout(_)), "{err:?}");
        assert!(err.is_retryable());
        server.abort();
    }
}
