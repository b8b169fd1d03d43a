mod common;

use canserial::frame::Frame;
use canserial::link::Event;
use canserial::runner::{EventChannel, Runner};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use futures_executor::LocalPool;
use futures_task::LocalSpawn;
use std::boxed::Box;

use common::*;

type Events = EventChannel<CriticalSectionRawMutex, 4>;
type TestRunner =
    Runner<'static, CriticalSectionRawMutex, 4, MockTransport, MockPlatform, &'static Queues>;

#[test]
fn test_run() {
    let mut executor = LocalPool::new();
    let spawner = executor.spawner();

    let events: &'static Events = Box::leak(Box::new(EventChannel::new()));
    let (node, log, queues) = make_node();
    let runner = Runner::new(events, node);

    spawner
        .spawn_local_obj(Box::new(run_node(runner)).into())
        .unwrap();
    executor.run_until_stalled();

    events.post(Event::FrameReceived(claim(BUS_ID, SHORT_UID))).unwrap();
    queues.write(b"hello, host");
    events.post(Event::OutboundDataAvailable).unwrap();
    executor.run_until_stalled();

    assert_eq!(log.borrow_mut().take_sent(), [frame(NODE_TX, b"hello, h")]);

    events.post(Event::TransmitComplete).unwrap();
    events.post(Event::FrameReceived(Frame::empty(NODE_RX))).unwrap();
    executor.run_until_stalled();

    assert_eq!(
        log.borrow_mut().take_sent(),
        [frame(NODE_TX, b"ost"), Frame::empty(NODE_TX)]
    );
}

async fn run_node(mut runner: TestRunner) {
    runner.run().await
}

#[test]
fn test_poll() {
    let events: &'static Events = Box::leak(Box::new(EventChannel::new()));
    let (node, log, _) = make_node();
    let mut runner = Runner::new(events, node);

    events.post(Event::FrameReceived(announce())).unwrap();
    events.post(Event::TransmitComplete).unwrap();
    assert_eq!(runner.poll(), 2);
    assert_eq!(runner.poll(), 0);

    assert_eq!(log.borrow().sent.len(), 1);
    assert_eq!(runner.node().bus_id(), None);
}

#[test]
fn test_overflow() {
    let events: &'static Events = Box::leak(Box::new(EventChannel::new()));
    for _ in 0..4 {
        events.post(Event::TransmitComplete).unwrap();
    }
    assert_eq!(events.post(Event::Error), Err(Event::Error));
    assert_eq!(events.dropped(), 1);
}
