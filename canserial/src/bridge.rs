//! Byte stream over bus frames
//!
//! Outbound bytes leave in chunks of up to eight bytes on `bus_id + 1`. The next chunk is
//! drained only after the previous one completes, so at most one chunk is in flight and byte
//! order is preserved. A chunk the transport refuses is held back and offered again before
//! any newer bytes. Inbound frames on `bus_id` are appended to the inbound queue verbatim;
//! an empty inbound frame is a keepalive ping, answered at once with an empty frame.

use crate::core::BusId;
use crate::frame::{Data, Frame, MTU};
use crate::link::Transport;
use crate::outbox::{FrameKind, Outbox};
use crate::queue::StreamQueues;

#[derive(Debug, Default)]
pub(crate) struct SerialBridge {
    pending: Option<Frame>,
    dropped_inbound: u32,
}

impl SerialBridge {
    pub const fn new() -> Self {
        Self {
            pending: None,
            dropped_inbound: 0,
        }
    }

    /// Inbound bytes lost to queue overflow since boot
    pub fn dropped_inbound(&self) -> u32 {
        self.dropped_inbound
    }

    /// Sends the next outbound chunk unless one is already in flight.
    ///
    /// A chunk held back by an earlier refusal goes first.
    pub fn drain<T: Transport, Q: StreamQueues>(
        &mut self,
        bus_id: BusId,
        outbox: &mut Outbox<T>,
        queues: &mut Q,
    ) {
        if outbox.stream_in_flight() {
            return;
        }

        let frame = match self.pending.take() {
            Some(frame) => frame,
            None => {
                let mut buf = [0; MTU];
                let count = queues.pull_outbound(&mut buf).min(MTU);
                if count == 0 {
                    return;
                }
                Frame::new(bus_id.tx_id(), unwrap!(Data::new(&buf[..count])))
            }
        };

        if let Err(err) = outbox.send(&frame, FrameKind::Stream) {
            debug!("Holding {} outbound bytes: {:?}", frame.data.len(), err);
            self.pending = Some(frame);
        }
    }

    /// Handles a frame addressed to the node.
    pub fn receive<T: Transport, Q: StreamQueues>(
        &mut self,
        bus_id: BusId,
        data: &Data,
        outbox: &mut Outbox<T>,
        queues: &mut Q,
    ) {
        if data.is_empty() {
            if let Err(err) = outbox.send(&Frame::empty(bus_id.tx_id()), FrameKind::Ack) {
                warn!("Keepalive ack failed: {:?}", err);
            }
            return;
        }

        let mut dropped = 0u32;
        for &byte in data.iter() {
            if queues.push_inbound(byte).is_err() {
                dropped += 1;
            }
        }
        if dropped > 0 {
            warn!("Inbound queue full, dropped {} bytes", dropped);
            self.dropped_inbound = self.dropped_inbound.saturating_add(dropped);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::TxError;
    use crate::queue::SerialQueues;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use embedded_can::StandardId;
    use heapless::Vec;

    #[derive(Default)]
    struct Wire {
        busy: bool,
        sent: Vec<Frame, 8>,
    }

    impl Transport for Wire {
        fn send(&mut self, frame: &Frame) -> Result<(), TxError> {
            if self.busy {
                return Err(TxError::Busy);
            }
            unwrap!(self.sent.push(*frame));
            Ok(())
        }

        fn set_filter(&mut self, _ids: &[StandardId]) {}

        fn rearm(&mut self) {}
    }

    const BUS_ID: BusId = match BusId::new(0x200) {
        Some(id) => id,
        None => unreachable!(),
    };

    #[test]
    fn test_refused_chunk_goes_first() {
        let mut bridge = SerialBridge::new();
        let mut outbox = Outbox::new(Wire {
            busy: true,
            ..Default::default()
        });
        let mut queues = SerialQueues::<NoopRawMutex, 16, 16>::new();
        queues.write(b"abcdefghij");

        bridge.drain(BUS_ID, &mut outbox, &mut queues);
        assert!(outbox.transport().sent.is_empty());
        assert_eq!(queues.outbound_len(), 2);

        outbox.transport_mut().busy = false;
        bridge.drain(BUS_ID, &mut outbox, &mut queues);
        assert_eq!(&outbox.transport().sent[0].data[..], b"abcdefgh");
        assert_eq!(outbox.transport().sent[0].id, BUS_ID.tx_id());

        // Still in flight
        bridge.drain(BUS_ID, &mut outbox, &mut queues);
        assert_eq!(outbox.transport().sent.len(), 1);

        outbox.complete();
        bridge.drain(BUS_ID, &mut outbox, &mut queues);
        assert_eq!(&outbox.transport().sent[1].data[..], b"ij");
    }

    #[test]
    fn test_ping_is_answered() {
        let mut bridge = SerialBridge::new();
        let mut outbox = Outbox::new(Wire::default());
        let mut queues = SerialQueues::<NoopRawMutex, 16, 16>::new();

        bridge.receive(BUS_ID, &Data::EMPTY, &mut outbox, &mut queues);
        assert_eq!(outbox.transport().sent[0], Frame::empty(BUS_ID.tx_id()));
        assert_eq!(queues.inbound_len(), 0);
    }
}
