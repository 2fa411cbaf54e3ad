//! Chat dispatcher.
//!
//! The chat-transport client (network session, pairing, message delivery)
//! lives outside this crate. It hands every inbound message to
//! [`Dispatcher::dispatch`] — one independent task per message — and
//! receives at most one reply through its [`ReplySink`]. Failures never
//! escape a dispatch: they become a reply or silence.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use engine::Ledger;

mod handlers;
pub mod parsing;
pub mod ui;

pub use parsing::{Operation, ParseError};

/// One inbound chat event, as the transport collaborator delivers it.
#[derive(Clone, Debug)]
pub struct InboundMessage {
    pub external_id: String,
    pub body: String,
    pub occurred_at: DateTime<Utc>,
}

/// Delivery side of a dispatched event.
///
/// Implementations forward the text back into the chat network; delivery
/// failure is theirs to handle, not the ledger's.
pub trait ReplySink: Send + Sync {
    fn reply(&self, text: String) -> impl Future<Output = ()> + Send;
}

pub struct Dispatcher {
    ledger: Arc<Ledger>,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    /// Processes one inbound event to completion: exactly one reply for
    /// every recognized command, silence for unrecognized text. Never
    /// panics and never returns an error, so the transport can spawn one
    /// task per event and forget about it.
    pub async fn dispatch<S>(&self, msg: InboundMessage, sink: &S)
    where
        S: ReplySink,
    {
        handlers::handle_message(&self.ledger, &msg, sink).await;
    }
}

#[derive(Default)]
pub struct DispatcherBuilder {
    ledger: Option<Arc<Ledger>>,
}

impl DispatcherBuilder {
    /// Pass the required ledger
    pub fn ledger(mut self, ledger: Arc<Ledger>) -> DispatcherBuilder {
        self.ledger = Some(ledger);
        self
    }

    /// Construct `Dispatcher`
    pub fn build(self) -> Result<Dispatcher, String> {
        let ledger = self.ledger.ok_or_else(|| "missing ledger".to_string())?;
        Ok(Dispatcher { ledger })
    }
}
