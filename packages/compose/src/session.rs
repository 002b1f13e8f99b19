//! Staleness guard for overlapping composition requests.
//!
//! Filter toggles can arrive faster than compositions finish. Each
//! request takes a ticket with a monotonically increasing sequence
//! number; when it finishes, the result is published only if no newer
//! ticket has been issued since. A superseded result is dropped, so a
//! renderer never observes stale output after a newer input arrived.

use std::sync::atomic::{AtomicU64, Ordering};

use geojson::FeatureCollection;

/// Issues composition tickets and discards superseded results.
#[derive(Debug, Default)]
pub struct ComposeSequencer {
    last_issued: AtomicU64,
}

/// A claim on one composition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposeTicket {
    sequence: u64,
}

impl ComposeSequencer {
    /// A sequencer with no requests issued yet.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_issued: AtomicU64::new(0),
        }
    }

    /// Begins a new composition request, superseding all earlier ones.
    pub fn begin(&self) -> ComposeTicket {
        let sequence = self.last_issued.fetch_add(1, Ordering::SeqCst) + 1;
        ComposeTicket { sequence }
    }

    /// Publishes a finished composition.
    ///
    /// Returns the collection if `ticket` is still the newest request,
    /// or `None` (logging at debug) when a newer request superseded it.
    pub fn publish(
        &self,
        ticket: ComposeTicket,
        collection: FeatureCollection,
    ) -> Option<FeatureCollection> {
        let newest = self.last_issued.load(Ordering::SeqCst);
        if ticket.sequence == newest {
            Some(collection)
        } else {
            log::debug!(
                "Discarding stale composition {} (newest is {newest})",
                ticket.sequence
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_collection() -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features: Vec::new(),
            foreign_members: None,
        }
    }

    #[test]
    fn newest_ticket_publishes() {
        let sequencer = ComposeSequencer::new();
        let ticket = sequencer.begin();
        assert!(sequencer.publish(ticket, empty_collection()).is_some());
    }

    #[test]
    fn superseded_ticket_is_discarded() {
        let sequencer = ComposeSequencer::new();
        let stale = sequencer.begin();
        let fresh = sequencer.begin();

        assert!(sequencer.publish(stale, empty_collection()).is_none());
        assert!(sequencer.publish(fresh, empty_collection()).is_some());
    }

    #[test]
    fn publish_order_does_not_matter() {
        let sequencer = ComposeSequencer::new();
        let first = sequencer.begin();
        let second = sequencer.begin();

        // The newer result lands first; the older one must still be
        // dropped when it eventually finishes.
        assert!(sequencer.publish(second, empty_collection()).is_some());
        assert!(sequencer.publish(first, empty_collection()).is_none());
    }
}
