use std::fmt;
use std::sync::{Arc, Mutex};

use crate::domain::{ProviderEvent, TxEvent};
use crate::ports::PortError;

/// Shared append-only queue between an event producer and its owner.
#[derive(Debug)]
pub struct EventFeed<T> {
    events: Arc<Mutex<Vec<T>>>,
}

impl<T> Clone for EventFeed<T> {
    fn clone(&self) -> Self {
        Self {
            events: Arc::clone(&self.events),
        }
    }
}

impl<T> Default for EventFeed<T> {
    fn default() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<T> EventFeed<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: T) {
        if let Ok(mut g) = self.events.lock() {
            g.push(event);
        }
    }

    pub fn drain(&self) -> Result<Vec<T>, PortError> {
        let mut g = self
            .events
            .lock()
            .map_err(|e| PortError::Transport(format!("event feed lock poisoned: {e}")))?;
        Ok(std::mem::take(&mut *g))
    }
}

/// Handle for a sent transaction; yields hash, receipt and error events.
#[derive(Debug)]
pub struct PendingTx {
    feed: EventFeed<TxEvent>,
}

impl PendingTx {
    pub fn new(feed: EventFeed<TxEvent>) -> Self {
        Self { feed }
    }

    pub fn drain_events(&self) -> Result<Vec<TxEvent>, PortError> {
        self.feed.drain()
    }
}

/// Scoped provider subscription; unregisters itself when dropped.
pub struct ProviderSubscription {
    feed: EventFeed<ProviderEvent>,
    teardown: Option<Box<dyn FnOnce() + Send>>,
}

impl ProviderSubscription {
    pub fn new(feed: EventFeed<ProviderEvent>, teardown: impl FnOnce() + Send + 'static) -> Self {
        Self {
            feed,
            teardown: Some(Box::new(teardown)),
        }
    }

    pub fn drain_events(&self) -> Result<Vec<ProviderEvent>, PortError> {
        self.feed.drain()
    }
}

impl fmt::Debug for ProviderSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSubscription")
            .field("feed", &self.feed)
            .field("active", &self.teardown.is_some())
            .finish()
    }
}

impl Drop for ProviderSubscription {
    fn drop(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}
