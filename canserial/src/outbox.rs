use heapless::Deque;

use crate::frame::Frame;
use crate::link::{Transport, TxError};

/// Upper bound of frames awaiting transmit-complete events
const LEDGER_DEPTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum FrameKind {
    /// Discovery response
    Control,
    /// Keepalive ack
    Ack,
    /// Outbound stream chunk
    Stream,
}

/// Transport wrapper that tracks submitted frames
///
/// Completions are matched to submissions in order, so the node always knows whether a
/// stream chunk is still in flight.
pub(crate) struct Outbox<T> {
    transport: T,
    ledger: Deque<FrameKind, LEDGER_DEPTH>,
}

impl<T: Transport> Outbox<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            ledger: Deque::new(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn send(&mut self, frame: &Frame, kind: FrameKind) -> Result<(), TxError> {
        if self.ledger.is_full() {
            return Err(TxError::Busy);
        }
        self.transport.send(frame)?;
        // Capacity checked above
        let _ = self.ledger.push_back(kind);
        Ok(())
    }

    pub fn complete(&mut self) -> Option<FrameKind> {
        let kind = self.ledger.pop_front();
        if kind.is_none() {
            trace!("Unmatched transmit-complete event");
        }
        kind
    }

    pub fn stream_in_flight(&self) -> bool {
        self.ledger.iter().any(|kind| *kind == FrameKind::Stream)
    }

    /// Forgets in-flight frames and re-arms the transport after an error.
    pub fn recover(&mut self) {
        self.ledger.clear();
        self.transport.rearm();
    }
}
