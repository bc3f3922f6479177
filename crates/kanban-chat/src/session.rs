//! Chat session: runs one request/stream cycle per user turn

use futures::StreamExt;
use kanban_ai::{
    ChatRequest, ChunkStream, DEFAULT_MAX_PARSE_ATTEMPTS, Message, Role, StreamEvent,
    TransportOutcome, decode_stream,
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::{
    advisory::AdvisoryKind,
    conversation::{ChatMessage, Conversation, TurnId},
    error::{Error, Result},
    events::{ChatEvent, TurnOutcome},
    handle::ChatHandle,
    reconciler::Reconciler,
    store::MessageStore,
    transport::ChatTransport,
};

/// Default number of persisted messages loaded on hydration
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Session configuration
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Parse attempts for a malformed data line before it is dropped
    pub max_parse_attempts: u32,
    /// Messages loaded by [`ChatSession::hydrate_from_store`]
    pub history_limit: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_parse_attempts: DEFAULT_MAX_PARSE_ATTEMPTS,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Owns one conversation and drives its turns.
///
/// Every failure after the user message is accepted ends the turn with an
/// advisory message; `submit_turn` only returns `Err` for rejected input.
pub struct ChatSession {
    config: ChatConfig,
    conversation: Conversation,
    transport: Arc<dyn ChatTransport>,
    store: Arc<dyn MessageStore>,
    event_tx: broadcast::Sender<ChatEvent>,
    handle: ChatHandle,
    /// Set once history is loaded or the first turn is submitted
    hydrated: bool,
}

impl ChatSession {
    pub fn new(
        config: ChatConfig,
        transport: Arc<dyn ChatTransport>,
        store: Arc<dyn MessageStore>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            config,
            conversation: Conversation::new(),
            transport,
            store,
            event_tx,
            handle: ChatHandle::new(),
            hydrated: false,
        }
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.event_tx.subscribe()
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.conversation.messages()
    }

    /// Get a cloneable handle for aborting or awaiting turns from outside.
    pub fn handle(&self) -> ChatHandle {
        self.handle.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.handle.is_loading()
    }

    /// Abort the turn in flight
    pub fn abort(&self) {
        self.handle.abort();
    }

    /// Seed the conversation from persisted history, oldest first.
    ///
    /// Allowed once, and only before the first turn.
    pub fn hydrate(&mut self, persisted: Vec<Message>) -> Result<usize> {
        if self.hydrated || !self.conversation.is_empty() {
            return Err(Error::AlreadyHydrated);
        }
        self.conversation = Conversation::hydrate(persisted);
        self.hydrated = true;

        let messages = self.conversation.len();
        tracing::debug!("Hydrated conversation with {} messages", messages);
        self.emit(ChatEvent::Hydrated { messages });
        Ok(messages)
    }

    /// Load the first `history_limit` stored messages and hydrate with them.
    pub async fn hydrate_from_store(&mut self) -> Result<usize> {
        if self.hydrated {
            return Err(Error::AlreadyHydrated);
        }
        let history = self.store.load_history(self.config.history_limit).await?;
        self.hydrate(history)
    }

    /// Run one turn: append the user message, stream the reply into the
    /// conversation, and report how the turn ended.
    pub async fn submit_turn(&mut self, user_text: &str, task_context: &str) -> Result<TurnOutcome> {
        let text = user_text.trim();
        if text.is_empty() {
            return Err(Error::EmptyInput);
        }
        if self.handle.is_loading() {
            return Err(Error::TurnInFlight);
        }
        self.recover_stale_turn();

        let turn_id = self.conversation.begin_turn(text)?;
        self.hydrated = true;
        let guard = self.handle.start_turn();

        let index = self.conversation.len() - 1;
        tracing::debug!("Turn {} started", turn_id);
        self.emit(ChatEvent::TurnStart {
            turn_id,
            index,
            message: self.conversation.messages()[index].clone(),
        });

        self.persist(Role::User, text).await;

        let request = ChatRequest::new(self.conversation.wire_messages(), task_context);
        let outcome = self.run_turn(turn_id, &request, guard.token()).await;

        self.conversation.end_turn(turn_id);
        drop(guard);
        tracing::debug!("Turn {} ended: {:?}", turn_id, outcome);
        self.emit(ChatEvent::TurnEnd {
            turn_id,
            outcome: outcome.clone(),
        });
        Ok(outcome)
    }

    /// A turn whose future was dropped mid-await leaves the gate closed with
    /// nothing driving it. Close it out before the next turn.
    fn recover_stale_turn(&mut self) {
        if let Some(stale) = self.conversation.current_turn() {
            tracing::warn!("Recovering abandoned turn {}", stale);
            self.conversation.end_turn(stale);
        }
    }

    async fn run_turn(
        &mut self,
        turn_id: TurnId,
        request: &ChatRequest,
        cancel: &CancellationToken,
    ) -> TurnOutcome {
        let transport = self.transport.clone();
        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => return TurnOutcome::Cancelled,
            outcome = transport.open(request) => outcome,
        };

        match opened {
            TransportOutcome::Streaming(chunks) => self.consume(turn_id, chunks, cancel).await,
            TransportOutcome::RateLimited => {
                tracing::warn!("Turn {} rate limited", turn_id);
                self.advise(turn_id, AdvisoryKind::RateLimited);
                TurnOutcome::RateLimited
            }
            TransportOutcome::QuotaExhausted => {
                tracing::warn!("Turn {} hit the usage quota", turn_id);
                self.advise(turn_id, AdvisoryKind::QuotaExhausted);
                TurnOutcome::QuotaExhausted
            }
            TransportOutcome::Failed(e) => {
                tracing::error!("Turn {} failed: {}", turn_id, e);
                self.advise(turn_id, AdvisoryKind::Failure);
                TurnOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Decode the body into the turn's assistant message.
    async fn consume(
        &mut self,
        turn_id: TurnId,
        chunks: ChunkStream,
        cancel: &CancellationToken,
    ) -> TurnOutcome {
        let mut deltas = decode_stream(chunks, self.config.max_parse_attempts);
        let mut reconciler = Reconciler::new(turn_id);
        let mut failure: Option<String> = None;
        let mut cancelled = false;

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                next = deltas.next() => next,
            };

            match next {
                Some(Ok(StreamEvent::Delta(fragment))) => {
                    match reconciler.apply(&mut self.conversation, &fragment) {
                        Ok(Some(index)) => self.emit(ChatEvent::MessageUpdate {
                            turn_id,
                            index,
                            message: self.conversation.messages()[index].clone(),
                        }),
                        Ok(None) => {}
                        Err(e) => {
                            failure = Some(e.to_string());
                            break;
                        }
                    }
                }
                Some(Ok(StreamEvent::Done)) | None => break,
                Some(Err(e)) => {
                    failure = Some(e.to_string());
                    break;
                }
            }
        }
        // Closes the connection.
        drop(deltas);

        let sealed = reconciler.seal(&mut self.conversation);
        if let Some(sealed) = &sealed {
            self.emit(ChatEvent::MessageEnd {
                turn_id,
                index: sealed.index,
                message: self.conversation.messages()[sealed.index].clone(),
            });
        }

        if cancelled {
            tracing::debug!("Turn {} cancelled", turn_id);
            return TurnOutcome::Cancelled;
        }
        if let Some(reason) = failure {
            tracing::error!("Turn {} stream failed: {}", turn_id, reason);
            self.advise(turn_id, AdvisoryKind::Failure);
            return TurnOutcome::Failed { reason };
        }

        match sealed {
            Some(sealed) => {
                self.persist(Role::Assistant, &sealed.content).await;
                TurnOutcome::Completed {
                    content: sealed.content,
                }
            }
            None => {
                tracing::debug!("Turn {} produced no text", turn_id);
                TurnOutcome::Empty
            }
        }
    }

    fn advise(&mut self, turn_id: TurnId, kind: AdvisoryKind) {
        match self.conversation.push_advisory(turn_id, kind.text()) {
            Ok(index) => self.emit(ChatEvent::Advisory {
                turn_id,
                kind,
                index,
                message: self.conversation.messages()[index].clone(),
            }),
            Err(e) => tracing::warn!("Could not append advisory for turn {}: {}", turn_id, e),
        }
    }

    /// Save a message. Failures are logged and never touch the conversation.
    async fn persist(&self, role: Role, content: &str) {
        if let Err(e) = self.store.persist(role, content).await {
            tracing::warn!("Failed to persist {} message: {}", role.as_str(), e);
        }
    }

    fn emit(&self, event: ChatEvent) {
        let _ = self.event_tx.send(event);
    }
}
