//! HTTP client for the streaming chat endpoint

use futures::StreamExt;
use reqwest::StatusCode;

use crate::{
    error::{Error, Result},
    stream::ChunkStream,
    types::ChatRequest,
};

/// How a response status is treated before any body is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 2xx: go on and stream the body
    Stream,
    /// 429
    RateLimited,
    /// 402
    QuotaExhausted,
    /// Anything else
    Failure,
}

/// Classify a response status.
pub fn classify_status(status: StatusCode) -> StatusClass {
    match status {
        StatusCode::TOO_MANY_REQUESTS => StatusClass::RateLimited,
        StatusCode::PAYMENT_REQUIRED => StatusClass::QuotaExhausted,
        s if s.is_success() => StatusClass::Stream,
        _ => StatusClass::Failure,
    }
}

/// Result of opening one chat request, decided before decoding starts.
pub enum TransportOutcome {
    /// The body is ready to be decoded
    Streaming(ChunkStream),
    RateLimited,
    QuotaExhausted,
    /// Network error, unexpected status, or missing body
    Failed(Error),
}

impl std::fmt::Debug for TransportOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportOutcome::Streaming(_) => f.write_str("Streaming(..)"),
            TransportOutcome::RateLimited => f.write_str("RateLimited"),
            TransportOutcome::QuotaExhausted => f.write_str("QuotaExhausted"),
            TransportOutcome::Failed(e) => f.debug_tuple("Failed").field(e).finish(),
        }
    }
}

impl From<Result<ChunkStream>> for TransportOutcome {
    fn from(result: Result<ChunkStream>) -> Self {
        match result {
            Ok(chunks) => TransportOutcome::Streaming(chunks),
            Err(Error::RateLimited) => TransportOutcome::RateLimited,
            Err(Error::QuotaExhausted) => TransportOutcome::QuotaExhausted,
            Err(e) => TransportOutcome::Failed(e),
        }
    }
}

/// Chat endpoint client
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl ChatClient {
    /// Create a client for the given endpoint URL
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::InvalidConfig(format!(
                "chat URL must be http(s), got {:?}",
                url
            )));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            url,
            api_key: None,
        })
    }

    /// Send this key as a bearer token
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Endpoint URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Build the POST request without sending it
    pub fn build_request(&self, request: &ChatRequest) -> reqwest::RequestBuilder {
        let builder = self.client.post(&self.url).json(request);
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    /// Send the request and hand back the raw body stream.
    ///
    /// 429 and 402 return immediately without touching the body.
    pub async fn stream(&self, request: &ChatRequest) -> Result<ChunkStream> {
        tracing::debug!(
            "POST {} ({} messages, {} bytes of task context)",
            self.url,
            request.messages.len(),
            request.task_context.len()
        );

        let response = self.build_request(request).send().await?;
        let status = response.status();

        match classify_status(status) {
            StatusClass::RateLimited => return Err(Error::RateLimited),
            StatusClass::QuotaExhausted => return Err(Error::QuotaExhausted),
            StatusClass::Failure => {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::status(status.as_u16(), body));
            }
            StatusClass::Stream => {}
        }

        if status == StatusCode::NO_CONTENT || response.content_length() == Some(0) {
            return Err(Error::MissingBody);
        }

        let chunks = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(Error::from));
        Ok(Box::pin(chunks))
    }

    /// Open a request and classify the outcome
    pub async fn open(&self, request: &ChatRequest) -> TransportOutcome {
        self.stream(request).await.into()
    }
}
