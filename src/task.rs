//! Change detection for chart redraws.
//!
//! Every chart owns a [`RedrawState`]: the watermark of what it last painted
//! and the request it is currently waiting on. Ticks that find nothing new
//! return before any provider call, so a scheduler can tick as often as the
//! UI refreshes.

/// Last state a chart successfully processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Watermark<K> {
    /// Nothing processed yet.
    Uninitialized,
    /// The display was cleared because no project was active.
    NoProject,
    /// The display shows data for this key.
    Painted(K),
}

/// What a tick should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickDecision<K> {
    /// Listeners are frozen; skip without touching the watermark.
    Frozen,
    /// Nothing changed since the last paint.
    Unchanged,
    /// A request for the same key is already running.
    InFlight,
    /// No project: clear the display.
    Clear,
    /// Fetch and paint data for this key.
    Repaint(K),
}

/// Request a chart is waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest<K> {
    /// Request ticket.
    pub ticket: u64,
    /// Key the request was made for.
    pub key: K,
}

/// Outcome of one run of a chart's update task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Listeners frozen; nothing done.
    Frozen,
    /// Nothing changed since the last paint.
    Unchanged,
    /// Waiting on a request for the current state.
    InFlight,
    /// The display was cleared because no project is active.
    Cleared,
    /// The widget has no usable width yet.
    Skipped,
    /// A request was handed to the background worker.
    Requested,
    /// New data was applied to the display.
    Painted,
    /// The provider had nothing to paint yet; the next tick retries.
    NotPainted,
}

/// Watermark and in-flight bookkeeping of one chart.
#[derive(Debug, Clone)]
pub struct RedrawState<K> {
    watermark: Watermark<K>,
    pending: Option<PendingRequest<K>>,
    next_ticket: u64,
}

impl<K: Clone + PartialEq> RedrawState<K> {
    /// Fresh state; the first tick with an active project repaints.
    pub fn new() -> Self {
        Self {
            watermark: Watermark::Uninitialized,
            pending: None,
            next_ticket: 0,
        }
    }

    /// Current watermark.
    pub fn watermark(&self) -> &Watermark<K> {
        &self.watermark
    }

    /// Request currently in flight, if any.
    pub fn pending(&self) -> Option<&PendingRequest<K>> {
        self.pending.as_ref()
    }

    /// Decide what a tick must do, given the freeze flag and the key of the
    /// current state (`None` when no project is active).
    ///
    /// Only [`TickDecision::Clear`] changes the state here; a repaint starts
    /// with [`RedrawState::start`] once the caller knows it can proceed.
    pub fn evaluate(&mut self, frozen: bool, current: Option<K>) -> TickDecision<K> {
        if frozen {
            return TickDecision::Frozen;
        }
        let Some(key) = current else {
            self.pending = None;
            if self.watermark == Watermark::NoProject {
                return TickDecision::Unchanged;
            }
            self.watermark = Watermark::NoProject;
            return TickDecision::Clear;
        };
        if matches!(&self.watermark, Watermark::Painted(painted) if *painted == key) {
            // A request for an older key can no longer be applied.
            self.pending = None;
            return TickDecision::Unchanged;
        }
        if self.pending.as_ref().is_some_and(|pending| pending.key == key) {
            return TickDecision::InFlight;
        }
        TickDecision::Repaint(key)
    }

    /// Record a request for `key`, superseding any earlier one.
    pub fn start(&mut self, key: K) -> u64 {
        self.next_ticket = self.next_ticket.wrapping_add(1);
        let ticket = self.next_ticket;
        self.pending = Some(PendingRequest { ticket, key });
        ticket
    }

    /// Check whether `ticket` is the request in flight.
    pub fn is_pending(&self, ticket: u64) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| pending.ticket == ticket)
    }

    /// Settle the request `ticket`. The watermark advances only if it
    /// `painted`. Returns false when the ticket is no longer in flight.
    pub fn complete(&mut self, ticket: u64, painted: bool) -> bool {
        if !self.is_pending(ticket) {
            return false;
        }
        let Some(pending) = self.pending.take() else {
            return false;
        };
        if painted {
            self.watermark = Watermark::Painted(pending.key);
        }
        true
    }

    /// Drop the request `ticket` without touching the watermark.
    pub fn abandon(&mut self, ticket: u64) {
        if self.is_pending(ticket) {
            self.pending = None;
        }
    }

    /// Forget everything; the next tick repaints from scratch.
    pub fn reset(&mut self) {
        self.watermark = Watermark::Uninitialized;
        self.pending = None;
    }
}

impl<K: Clone + PartialEq> Default for RedrawState<K> {
    fn default() -> Self {
        Self::new()
    }
}
