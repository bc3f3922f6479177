//! Transport abstraction for opening chat requests

use async_trait::async_trait;
use kanban_ai::{ChatClient, ChatRequest, TransportOutcome};

/// Opens one request per turn and classifies the response before decoding.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn open(&self, request: &ChatRequest) -> TransportOutcome;
}

/// Transport that posts to the chat endpoint over HTTP
pub struct HttpTransport {
    client: ChatClient,
}

impl HttpTransport {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ChatClient {
        &self.client
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn open(&self, request: &ChatRequest) -> TransportOutcome {
        self.client.open(request).await
    }
}
