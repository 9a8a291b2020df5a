//! Debounced search with generation guarding.
//!
//! Each submitted input bumps a generation counter. A request only fires
//! once the debounce delay passes with no newer input, and its response is
//! applied only if no newer input arrived while it was in flight. Stale
//! responses are dropped instead of overwriting fresher results.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::debug;

#[derive(Clone)]
pub struct SearchDebouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
}

/// Handle for one submitted input; valid while no newer input exists.
#[derive(Debug, Clone, Copy)]
pub struct SearchTicket {
    generation: u64,
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Registers a new input, superseding every earlier ticket.
    pub fn submit(&self) -> SearchTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        SearchTicket { generation }
    }

    fn is_current(&self, ticket: SearchTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.generation
    }

    /// Waits out the debounce delay, then runs `fetch` — unless the ticket
    /// was superseded before the delay elapsed or while the fetch was in
    /// flight. Returns `None` whenever the result must not be applied.
    pub async fn run<F, Fut, T>(&self, ticket: SearchTicket, fetch: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        tokio::time::sleep(self.delay).await;
        if !self.is_current(ticket) {
            debug!("search input superseded before firing");
            return None;
        }
        let result = fetch().await;
        if !self.is_current(ticket) {
            debug!("search response arrived stale, dropping");
            return None;
        }
        Some(result)
    }
}
