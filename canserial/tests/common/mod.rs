#![allow(dead_code)]

use canserial::config::Config;
use canserial::core::{BusId, HardwareUid, ShortUid};
use canserial::frame::Frame;
use canserial::link::{Platform, Transport, TxError};
use canserial::node::Node;
use canserial::packet::{Claim, Discovery};
use canserial::queue::SerialQueues;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embedded_can::StandardId;
use std::boxed::Box;
use std::cell::RefCell;
use std::rc::Rc;
use std::vec::Vec;

pub const HARDWARE_UID: HardwareUid = HardwareUid::from_bytes([
    0x35, 0x00, 0x42, 0x00, 0x0F, 0x51, 0x37, 0x33, 0x38, 0x39, 0x36, 0x31,
]);
pub const SHORT_UID: ShortUid = HARDWARE_UID.short_uid();
pub const OTHER_UID: ShortUid = ShortUid::from_bytes([0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x01]);
pub const BUS_ID: BusId = BusId::new(0x100).unwrap();
pub const NODE_RX: StandardId = StandardId::new(0x100).unwrap();
pub const NODE_TX: StandardId = StandardId::new(0x101).unwrap();

pub type Queues = SerialQueues<CriticalSectionRawMutex, 64, 64>;
pub type TestNode = Node<MockTransport, MockPlatform, &'static Queues>;

/// Everything the node did to the outside world
#[derive(Debug, Default)]
pub struct Log {
    pub sent: Vec<Frame>,
    pub filters: Vec<Vec<StandardId>>,
    pub rearmed: usize,
    pub resets: usize,
    /// Refuse the next transmissions while set
    pub offline: bool,
}

impl Log {
    pub fn active_filter(&self) -> &[StandardId] {
        self.filters.last().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn take_sent(&mut self) -> Vec<Frame> {
        std::mem::take(&mut self.sent)
    }
}

pub type SharedLog = Rc<RefCell<Log>>;

pub struct MockTransport(pub SharedLog);

impl Transport for MockTransport {
    fn send(&mut self, frame: &Frame) -> Result<(), TxError> {
        let mut log = self.0.borrow_mut();
        if log.offline {
            return Err(TxError::Offline);
        }
        log.sent.push(*frame);
        Ok(())
    }

    fn set_filter(&mut self, ids: &[StandardId]) {
        self.0.borrow_mut().filters.push(ids.to_vec());
    }

    fn rearm(&mut self) {
        self.0.borrow_mut().rearmed += 1;
    }
}

pub struct MockPlatform(pub SharedLog);

impl Platform for MockPlatform {
    fn hardware_uid(&self) -> HardwareUid {
        HARDWARE_UID
    }

    fn request_system_reset(&mut self) {
        self.0.borrow_mut().resets += 1;
    }
}

pub fn make_node() -> (TestNode, SharedLog, &'static Queues) {
    let log = SharedLog::default();
    let queues: &'static Queues = Box::leak(Box::new(Queues::new()));
    let node = Node::new(
        Config::default(),
        MockTransport(log.clone()),
        MockPlatform(log.clone()),
        queues,
    )
    .unwrap();
    (node, log, queues)
}

/// A node that has already been assigned `BUS_ID`, with an empty log.
pub fn make_assigned_node() -> (TestNode, SharedLog, &'static Queues) {
    let (mut node, log, queues) = make_node();
    node.on_frame_received(&claim(BUS_ID, SHORT_UID));
    assert_eq!(node.bus_id(), Some(BUS_ID));
    log.borrow_mut().take_sent();
    (node, log, queues)
}

pub fn frame(id: StandardId, data: &[u8]) -> Frame {
    Frame::from_slice(id, data).unwrap()
}

pub fn announce() -> Frame {
    Frame::new(Config::DEFAULT_DISCOVERY_ID, Discovery::Announce.encode())
}

pub fn reset(target: u16) -> Frame {
    Frame::new(Config::DEFAULT_DISCOVERY_ID, Discovery::Reset(target).encode())
}

pub fn claim(candidate: BusId, target: ShortUid) -> Frame {
    Frame::new(Config::DEFAULT_CLAIM_ID, Claim { candidate, target }.encode())
}
