//! Node event dispatcher
//!
//! The node owns the identity state, the acceptance list and the serial bridge. All protocol
//! logic runs inside [`Node::dispatch`], one event at a time, without blocking.
//!
//! ## Examples
//!
//! Feeding events from interrupt handlers:
//! ```
//! use canserial::config::Config;
//! use canserial::core::HardwareUid;
//! use canserial::frame::Frame;
//! use canserial::link::{Event, Platform, Transport, TxError};
//! use canserial::node::Node;
//! use canserial::queue::SerialQueues;
//! use embassy_sync::blocking_mutex::raw::NoopRawMutex;
//! use embedded_can::StandardId;
//!
//! struct Can;
//!
//! impl Transport for Can {
//!     fn send(&mut self, _frame: &Frame) -> Result<(), TxError> { Ok(()) }
//!     fn set_filter(&mut self, _ids: &[StandardId]) {}
//!     fn rearm(&mut self) {}
//! }
//!
//! struct Chip;
//!
//! impl Platform for Chip {
//!     fn hardware_uid(&self) -> HardwareUid { HardwareUid::from_bytes([7; 12]) }
//!     fn request_system_reset(&mut self) {}
//! }
//!
//! let queues = SerialQueues::<NoopRawMutex, 64, 64>::new();
//! let mut node = Node::new(Config::default(), Can, Chip, &queues).unwrap();
//!
//! // CAN RX interrupt
//! node.dispatch(Event::FrameReceived(Frame::empty(Config::DEFAULT_DISCOVERY_ID)));
//! ```

use crate::bridge::SerialBridge;
use crate::config::{Config, ConfigError};
use crate::core::BusId;
use crate::filter::{FilterManager, FilterSet};
use crate::frame::Frame;
use crate::identity::{Action, NodeIdentity, Resolver};
use crate::link::{Event, Platform, Transport};
use crate::outbox::{FrameKind, Outbox};
use crate::queue::StreamQueues;

pub struct Node<T: Transport, P: Platform, Q: StreamQueues> {
    resolver: Resolver,
    filter: FilterManager,
    bridge: SerialBridge,
    outbox: Outbox<T>,
    platform: P,
    queues: Q,
    reset_requested: bool,
}

impl<T: Transport, P: Platform, Q: StreamQueues> Node<T, P, Q> {
    /// Creates an unassigned node and installs the unassigned-phase acceptance list.
    pub fn new(config: Config, transport: T, platform: P, queues: Q) -> Result<Self, ConfigError> {
        config.validate()?;
        let short_uid = platform.hardware_uid().short_uid();
        debug!("Short UID: {:?}", short_uid);

        let mut node = Self {
            resolver: Resolver::new(config, short_uid),
            filter: FilterManager::new(),
            bridge: SerialBridge::new(),
            outbox: Outbox::new(transport),
            platform,
            queues,
            reset_requested: false,
        };
        node.filter
            .activate(FilterSet::Unassigned, &config, node.outbox.transport_mut());
        Ok(node)
    }

    pub fn dispatch(&mut self, event: Event) {
        match event {
            Event::FrameReceived(frame) => self.on_frame_received(&frame),
            Event::TransmitComplete => self.on_transmit_complete(),
            Event::Error => self.on_error(),
            Event::OutboundDataAvailable => self.on_outbound_data_available(),
        }
    }

    pub fn on_frame_received(&mut self, frame: &Frame) {
        match self.resolver.classify(frame) {
            Action::Ignore => {}
            Action::Respond(response) => {
                debug!("Answering discovery");
                if let Err(err) = self.outbox.send(&response, FrameKind::Control) {
                    warn!("Discovery response failed: {:?}", err);
                }
            }
            Action::Assign(bus_id) => self.assign(bus_id),
            Action::Reset => self.reset(),
            Action::Stream(data) => {
                if let Some(bus_id) = self.bus_id() {
                    self.bridge.receive(bus_id, &data, &mut self.outbox, &mut self.queues);
                }
            }
        }
    }

    pub fn on_transmit_complete(&mut self) {
        self.outbox.complete();
        self.drain();
    }

    /// Discards the in-flight frame and re-arms reception. Protocol state is kept.
    pub fn on_error(&mut self) {
        warn!("Transport error");
        self.outbox.recover();
    }

    /// Kicks the outbound drain. Ignored until a bus id is assigned.
    pub fn on_outbound_data_available(&mut self) {
        self.drain();
    }

    pub fn identity(&self) -> &NodeIdentity {
        self.resolver.identity()
    }

    pub fn bus_id(&self) -> Option<BusId> {
        self.identity().bus_id()
    }

    pub fn config(&self) -> &Config {
        self.resolver.config()
    }

    pub fn active_filter(&self) -> Option<FilterSet> {
        self.filter.active()
    }

    pub fn reset_requested(&self) -> bool {
        self.reset_requested
    }

    /// Inbound bytes lost to queue overflow since boot
    pub fn dropped_inbound(&self) -> u32 {
        self.bridge.dropped_inbound()
    }

    pub fn transport(&self) -> &T {
        self.outbox.transport()
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn queues(&self) -> &Q {
        &self.queues
    }

    fn assign(&mut self, bus_id: BusId) {
        if let Err(err) = self.resolver.assign(bus_id) {
            // classify never yields Assign once assigned
            warn!("Ignoring assignment: {:?}", err);
            return;
        }
        let config = *self.resolver.config();
        self.filter.activate(
            FilterSet::Assigned(bus_id),
            &config,
            self.outbox.transport_mut(),
        );
        info!("Assigned bus id {:?}", bus_id);

        // Flush output produced before assignment
        self.drain();
    }

    fn reset(&mut self) {
        if self.reset_requested {
            return;
        }
        self.reset_requested = true;
        info!("Reset requested by host");
        self.platform.request_system_reset();
    }

    fn drain(&mut self) {
        if let Some(bus_id) = self.bus_id() {
            self.bridge.drain(bus_id, &mut self.outbox, &mut self.queues);
        }
    }
}
