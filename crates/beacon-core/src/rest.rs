//! REST client for the service API.
//!
//! Thin request construction over `reqwest`: bearer-token auth, JSON bodies,
//! and two result shapes - a materialized JSON response for ordinary calls,
//! and a framed row stream for tabular queries. The framing layer splits the
//! response body on newlines; every line is one self-contained frame (`[`,
//! a single JSON element, or `]`), so the transcoder never has to parse
//! across chunk boundaries.

use std::time::Duration;

use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::error::ApiError;
use crate::output::{FrameResult, SourceError};

pub use reqwest::Method;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Capacity of the frame channel; the producer blocks here when the
/// consumer (and ultimately the sink) falls behind.
const FRAME_CHANNEL_CAPACITY: usize = 64;

/// OData-style list envelope used by the service's collection endpoints.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub value: Vec<T>,
}

/// Authenticated client bound to one API base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Execute one call and return the decoded body, or `None` for an empty
    /// success (204 or a bodyless 200).
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Option<Value>, ApiError> {
        let url = self.url(path);
        debug!(%method, %url, "calling service API");

        let mut request = self
            .http
            .request(method, &url)
            .bearer_auth(&self.token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, detail });
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&text)?))
    }

    /// GET a path and decode the body into a typed value.
    pub async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(%url, "fetching");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, detail });
        }
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// POST a tabular query and expose the newline-framed response body as a
    /// frame channel for the streaming transcoder.
    ///
    /// The producer task forwards frames in arrival order; a transport error
    /// mid-body is sent as a distinct error item, and closing the channel
    /// signals end-of-stream.
    pub async fn stream_rows(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<mpsc::Receiver<FrameResult>, ApiError> {
        let url = self.url(path);
        debug!(%url, "opening row stream");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, detail });
        }

        let (tx, rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);
        let mut chunks = response.bytes_stream();
        tokio::spawn(async move {
            let mut pending: Vec<u8> = Vec::new();
            while let Some(next) = chunks.next().await {
                match next {
                    Ok(bytes) => {
                        pending.extend_from_slice(&bytes);
                        while let Some(position) = pending.iter().position(|&b| b == b'\n') {
                            let line: Vec<u8> = pending.drain(..=position).collect();
                            if !forward_line(&tx, &line).await {
                                return;
                            }
                        }
                    }
                    Err(err) => {
                        // Mid-body failure: surface it and stop; the
                        // transcoder leaves the document unclosed.
                        let _ = tx.send(Err(SourceError::new(err.to_string()))).await;
                        return;
                    }
                }
            }
            // Final line without a trailing newline.
            let tail = pending;
            if !tail.is_empty() {
                forward_line(&tx, &tail).await;
            }
            trace!("row stream body exhausted");
        });
        Ok(rx)
    }
}

/// Send one framed line, skipping blanks. Returns false once the consumer
/// has gone away.
async fn forward_line(tx: &mpsc::Sender<FrameResult>, raw: &[u8]) -> bool {
    let line = String::from_utf8_lossy(raw).trim().to_string();
    if line.is_empty() {
        return true;
    }
    tx.send(Ok(line)).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn request_decodes_success_bodies() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/workspaces"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [{"id": "w1"}]
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), "secret").unwrap();
        let body = client
            .request(Method::GET, "workspaces", None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(body["value"][0]["id"], "w1");
    }

    #[tokio::test]
    async fn empty_success_body_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/refresh"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), "secret").unwrap();
        let body = client
            .request(Method::POST, "refresh", Some(&serde_json::json!({})))
            .await
            .unwrap();
        assert!(body.is_none());
    }

    #[tokio::test]
    async fn non_success_status_carries_the_body_detail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such thing"))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), "secret").unwrap();
        let err = client.fetch::<Value>("missing").await.unwrap_err();
        match err {
            ApiError::Status { status, detail } => {
                assert_eq!(status.as_u16(), 404);
                assert_eq!(detail, "no such thing");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn stream_rows_frames_the_body_by_line() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("[\n{\"a\":1}\n{\"a\":2}\n]\n"),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), "secret").unwrap();
        let mut rx = client
            .stream_rows("query", &serde_json::json!({"query": "rows"}))
            .await
            .unwrap();

        let mut frames = Vec::new();
        while let Some(frame) = rx.recv().await {
            frames.push(frame.unwrap());
        }
        assert_eq!(frames, vec!["[", "{\"a\":1}", "{\"a\":2}", "]"]);
    }
}
