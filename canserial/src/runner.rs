//! Deferred event dispatch
//!
//! Interrupt handlers may post events into an [`EventChannel`] instead of dispatching them in
//! place. A [`Runner`] then feeds them into the node in arrival order, one at a time, from a
//! task or a main loop.
//!
//! ```
//! # use canserial::config::Config;
//! # use canserial::core::HardwareUid;
//! # use canserial::frame::Frame;
//! # use canserial::link::{Event, Platform, Transport, TxError};
//! # use canserial::node::Node;
//! # use canserial::queue::SerialQueues;
//! # use embedded_can::StandardId;
//! # struct Can;
//! # impl Transport for Can {
//! #     fn send(&mut self, _frame: &Frame) -> Result<(), TxError> { Ok(()) }
//! #     fn set_filter(&mut self, _ids: &[StandardId]) {}
//! #     fn rearm(&mut self) {}
//! # }
//! # struct Chip;
//! # impl Platform for Chip {
//! #     fn hardware_uid(&self) -> HardwareUid { HardwareUid::from_bytes([7; 12]) }
//! #     fn request_system_reset(&mut self) {}
//! # }
//! use canserial::runner::{EventChannel, Runner};
//! use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex as Mutex;
//!
//! static EVENTS: EventChannel<Mutex, 8> = EventChannel::new();
//! static QUEUES: SerialQueues<Mutex, 64, 64> = SerialQueues::new();
//!
//! let node = Node::new(Config::default(), Can, Chip, &QUEUES).unwrap();
//! let mut runner = Runner::new(&EVENTS, node);
//!
//! // From the scheduler, after writing to QUEUES
//! EVENTS.post(Event::OutboundDataAvailable).unwrap();
//!
//! // From the main loop
//! assert_eq!(runner.poll(), 1);
//! ```

use core::cell::Cell;
use embassy_sync::blocking_mutex::{Mutex, raw::RawMutex};
use embassy_sync::channel::{Channel, TrySendError};

use crate::link::{Event, Platform, Transport};
use crate::node::Node;
use crate::queue::StreamQueues;

/// Bounded event queue between interrupt handlers and a [`Runner`]
pub struct EventChannel<M: RawMutex, const N: usize> {
    channel: Channel<M, Event, N>,
    dropped: Mutex<M, Cell<u32>>,
}

impl<M: RawMutex, const N: usize> EventChannel<M, N> {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            dropped: Mutex::new(Cell::new(0)),
        }
    }

    /// Enqueues an event without blocking.
    ///
    /// A full channel rejects the event and counts it as dropped.
    pub fn post(&self, event: Event) -> Result<(), Event> {
        self.channel.try_send(event).map_err(|err| {
            let TrySendError::Full(event) = err;
            self.dropped.lock(|cell| cell.set(cell.get().saturating_add(1)));
            warn!("Event channel full, dropping {:?}", event);
            event
        })
    }

    /// Events rejected by [`EventChannel::post`] so far
    pub fn dropped(&self) -> u32 {
        self.dropped.lock(|cell| cell.get())
    }
}

impl<M: RawMutex, const N: usize> Default for EventChannel<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Node driver fed from an [`EventChannel`]
pub struct Runner<'a, M: RawMutex, const N: usize, T: Transport, P: Platform, Q: StreamQueues> {
    events: &'a EventChannel<M, N>,
    node: Node<T, P, Q>,
}

impl<'a, M, const N: usize, T, P, Q> Runner<'a, M, N, T, P, Q>
where
    M: RawMutex,
    T: Transport,
    P: Platform,
    Q: StreamQueues,
{
    pub fn new(events: &'a EventChannel<M, N>, node: Node<T, P, Q>) -> Self {
        Self { events, node }
    }

    pub fn node(&self) -> &Node<T, P, Q> {
        &self.node
    }

    /// Dispatches every queued event, returning the count.
    pub fn poll(&mut self) -> usize {
        let mut count = 0;
        while let Ok(event) = self.events.channel.try_receive() {
            self.node.dispatch(event);
            count += 1;
        }
        count
    }

    pub async fn run(&mut self) -> ! {
        loop {
            let event = self.events.channel.receive().await;
            trace!("Dispatching {:?}", event);
            self.node.dispatch(event);
        }
    }
}
