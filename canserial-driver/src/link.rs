//! Boundary between the stack, the CAN driver and the platform

use canserial_core::HardwareUid;
use embedded_can::StandardId;

use crate::frame::Frame;

/// Bus and scheduler activity fed into the node
///
/// Events must be dispatched one at a time, each running to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// A frame passed the acceptance list.
    FrameReceived(Frame),
    /// The oldest pending transmission has left the controller.
    TransmitComplete,
    /// Overrun or bus error. The in-flight frame, if any, is lost.
    Error,
    /// The scheduler enqueued outbound stream bytes.
    OutboundDataAvailable,
}

/// Reason a transmission request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum TxError {
    /// No free transmit mailbox
    Busy,
    /// Controller is not able to transmit, e.g. bus-off
    Offline,
}

/// Frame transport implemented by a CAN driver
///
/// All methods are called from event-handler context and must not block.
pub trait Transport {
    /// Requests transmission of a frame.
    ///
    /// Completion is reported later with [`Event::TransmitComplete`].
    fn send(&mut self, frame: &Frame) -> Result<(), TxError>;

    /// Replaces the acceptance list.
    ///
    /// The new list must be in effect when the call returns: no frame accepted under the old
    /// list may be delivered afterwards.
    fn set_filter(&mut self, ids: &[StandardId]);

    /// Discards the in-flight frame and re-arms reception after [`Event::Error`].
    fn rearm(&mut self);
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, frame: &Frame) -> Result<(), TxError> {
        (**self).send(frame)
    }

    fn set_filter(&mut self, ids: &[StandardId]) {
        (**self).set_filter(ids)
    }

    fn rearm(&mut self) {
        (**self).rearm()
    }
}

/// Platform services consumed by the node
pub trait Platform {
    /// Reads the factory-programmed UID.
    fn hardware_uid(&self) -> HardwareUid;

    /// Requests a full system reset.
    ///
    /// Hardware implementations typically never return.
    fn request_system_reset(&mut self);
}

impl<P: Platform + ?Sized> Platform for &mut P {
    fn hardware_uid(&self) -> HardwareUid {
        (**self).hardware_uid()
    }

    fn request_system_reset(&mut self) {
        (**self).request_system_reset()
    }
}
