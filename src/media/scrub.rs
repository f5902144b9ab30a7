//! Frame-scrub scheduling.
//!
//! Slider drags are debounced into one fetch of the latest timestamp; button steps bypass the
//! debounce. At most one fetch is in flight. There is no cancellation: a result whose timestamp
//! is no longer the latest request is reported as superseded and a follow-up is scheduled.

use std::time::{Duration, Instant};

/// Handle for one issued fetch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FetchTicket {
    id: u64,
    issued_at: Instant,
    /// Timestamp to fetch, in seconds.
    pub timestamp: f64,
}

/// What to do with a completed fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The result is for the latest request; show it.
    Apply,
    /// A newer request exists; discard the result.
    Superseded,
}

/// Debounced, single-in-flight request scheduler. Time is always passed in.
#[derive(Clone, Debug)]
pub struct FrameScrubber {
    debounce: Duration,
    latest: Option<f64>,
    pending: bool,
    due: Option<Instant>,
    in_flight: Option<FetchTicket>,
    next_id: u64,
}

impl FrameScrubber {
    /// Scheduler with the given quiet period.
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            latest: None,
            pending: false,
            due: None,
            in_flight: None,
            next_id: 0,
        }
    }

    /// Quiet period applied to debounced requests.
    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Most recently requested timestamp.
    pub fn latest(&self) -> Option<f64> {
        self.latest
    }

    /// Fetch currently outstanding.
    pub fn in_flight(&self) -> Option<FetchTicket> {
        self.in_flight
    }

    /// `true` when nothing is in flight or waiting.
    pub fn is_idle(&self) -> bool {
        self.in_flight.is_none() && !self.pending
    }

    /// Record a slider position; eligible once `debounce` passes without another request.
    pub fn request_debounced(&mut self, timestamp: f64, now: Instant) {
        self.latest = Some(timestamp);
        self.pending = true;
        self.due = Some(now + self.debounce);
    }

    /// Record a step request, eligible immediately.
    pub fn request_immediate(&mut self, timestamp: f64) {
        self.latest = Some(timestamp);
        self.pending = true;
        self.due = None;
    }

    /// Issue the next fetch if one is eligible and none is in flight.
    pub fn poll(&mut self, now: Instant) -> Option<FetchTicket> {
        if self.in_flight.is_some() || !self.pending {
            return None;
        }
        if self.due.is_some_and(|due| now < due) {
            return None;
        }
        let timestamp = self.latest?;
        let ticket = FetchTicket {
            id: self.next_id,
            issued_at: now,
            timestamp,
        };
        self.next_id += 1;
        self.pending = false;
        self.due = None;
        self.in_flight = Some(ticket);
        Some(ticket)
    }

    /// Mark `ticket` finished and classify its result.
    ///
    /// Unknown or stale tickets are always superseded and leave the in-flight fetch alone.
    pub fn complete(&mut self, ticket: FetchTicket, now: Instant) -> FetchOutcome {
        if !self.finish(ticket) {
            tracing::debug!(
                timestamp = ticket.timestamp,
                "completion for a ticket that is not in flight"
            );
            return FetchOutcome::Superseded;
        }
        if self.latest == Some(ticket.timestamp) {
            self.pending = false;
            self.due = None;
            FetchOutcome::Apply
        } else {
            tracing::debug!(
                fetched = ticket.timestamp,
                latest = ?self.latest,
                elapsed_ms = now.saturating_duration_since(ticket.issued_at).as_millis() as u64,
                "frame fetch superseded"
            );
            FetchOutcome::Superseded
        }
    }

    /// Mark `ticket` failed. A newer pending request stays eligible; nothing is retried.
    pub fn fail(&mut self, ticket: FetchTicket) {
        if !self.finish(ticket) {
            return;
        }
        if self.latest == Some(ticket.timestamp) {
            self.pending = false;
            self.due = None;
        }
    }

    fn finish(&mut self, ticket: FetchTicket) -> bool {
        if self.in_flight.map(|t| t.id) != Some(ticket.id) {
            return false;
        }
        self.in_flight = None;
        if self.latest != Some(ticket.timestamp) {
            // Changed while in flight: follow up right away.
            self.pending = true;
            self.due = None;
        }
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/scrub.rs"]
mod tests;
