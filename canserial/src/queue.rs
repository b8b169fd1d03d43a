//! Byte-queue boundary between the serial bridge and the rest of the firmware
//!
//! The bridge pulls outbound bytes in frame-sized chunks and pushes inbound bytes one at a time.
//! Overflow policy belongs to the queue: [`SerialQueues`] drops inbound bytes that do not fit.

use core::cell::RefCell;
use embassy_sync::blocking_mutex::{Mutex, raw::RawMutex};
use heapless::Deque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QueueFull;

/// Stream storage consumed by the serial bridge
///
/// Implementations shared with other execution contexts must synchronize internally.
/// Both methods run in event-handler context and must not block.
pub trait StreamQueues {
    /// Moves up to `buf.len()` outbound bytes into `buf`, returning the count.
    fn pull_outbound(&mut self, buf: &mut [u8]) -> usize;

    /// Appends a byte received from the host.
    fn push_inbound(&mut self, byte: u8) -> Result<(), QueueFull>;
}

impl<Q: StreamQueues + ?Sized> StreamQueues for &mut Q {
    fn pull_outbound(&mut self, buf: &mut [u8]) -> usize {
        (**self).pull_outbound(buf)
    }

    fn push_inbound(&mut self, byte: u8) -> Result<(), QueueFull> {
        (**self).push_inbound(byte)
    }
}

/// A pair of fixed-capacity byte queues
///
/// Each queue access runs in a short critical section of `M`. Use `CriticalSectionRawMutex`
/// when the node runs in interrupt context.
///
/// # Examples
///
/// ```
/// use canserial::queue::SerialQueues;
/// use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex as Mutex;
///
/// static QUEUES: SerialQueues<Mutex, 64, 256> = SerialQueues::new();
///
/// assert_eq!(QUEUES.write(b"hello"), 5);
/// assert_eq!(QUEUES.outbound_len(), 5);
/// ```
pub struct SerialQueues<M: RawMutex, const RX: usize, const TX: usize> {
    inbound: Mutex<M, RefCell<Deque<u8, RX>>>,
    outbound: Mutex<M, RefCell<Deque<u8, TX>>>,
}

impl<M: RawMutex, const RX: usize, const TX: usize> SerialQueues<M, RX, TX> {
    pub const fn new() -> Self {
        Self {
            inbound: Mutex::new(RefCell::new(Deque::new())),
            outbound: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Enqueues bytes for the host. Returns the number of bytes accepted.
    ///
    /// Call the node's outbound entry point afterwards to start transmission.
    pub fn write(&self, data: &[u8]) -> usize {
        self.outbound.lock(|cell| {
            let mut queue = cell.borrow_mut();
            data.iter()
                .take_while(|&&byte| queue.push_back(byte).is_ok())
                .count()
        })
    }

    /// Dequeues bytes received from the host. Returns the number of bytes read.
    pub fn read(&self, buf: &mut [u8]) -> usize {
        self.inbound.lock(|cell| pop_into(&mut cell.borrow_mut(), buf))
    }

    pub fn outbound_len(&self) -> usize {
        self.outbound.lock(|cell| cell.borrow().len())
    }

    pub fn inbound_len(&self) -> usize {
        self.inbound.lock(|cell| cell.borrow().len())
    }

    fn pull(&self, buf: &mut [u8]) -> usize {
        self.outbound.lock(|cell| pop_into(&mut cell.borrow_mut(), buf))
    }

    fn push(&self, byte: u8) -> Result<(), QueueFull> {
        self.inbound.lock(|cell| cell.borrow_mut().push_back(byte).map_err(|_| QueueFull))
    }
}

impl<M: RawMutex, const RX: usize, const TX: usize> Default for SerialQueues<M, RX, TX> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex, const RX: usize, const TX: usize> StreamQueues for &SerialQueues<M, RX, TX> {
    fn pull_outbound(&mut self, buf: &mut [u8]) -> usize {
        self.pull(buf)
    }

    fn push_inbound(&mut self, byte: u8) -> Result<(), QueueFull> {
        self.push(byte)
    }
}

impl<M: RawMutex, const RX: usize, const TX: usize> StreamQueues for SerialQueues<M, RX, TX> {
    fn pull_outbound(&mut self, buf: &mut [u8]) -> usize {
        self.pull(buf)
    }

    fn push_inbound(&mut self, byte: u8) -> Result<(), QueueFull> {
        self.push(byte)
    }
}

fn pop_into<const N: usize>(queue: &mut Deque<u8, N>, buf: &mut [u8]) -> usize {
    let mut count = 0;
    for slot in buf.iter_mut() {
        let Some(byte) = queue.pop_front() else {
            break;
        };
        *slot = byte;
        count += 1;
    }
    count
}
