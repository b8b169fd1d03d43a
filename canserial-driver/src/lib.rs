//! canserial driver interface
//!
//! The crate provides an interface between a CAN peripheral driver, the platform and the
//! canserial stack. Limited scope facilitates compatibility across versions.
//! Driver crates should depend on this crate. Stack users should depend on the `canserial`
//! crate instead.
//!
//! A driver implements [`link::Transport`]:
//! * `send` requests transmission of a single frame and returns without waiting
//! * `set_filter` replaces the acceptance list; the new list must be in effect when it returns
//! * `rearm` restores reception after a transport error
//!
//! The platform implements [`link::Platform`] to expose the hardware UID and the reset request.
//!
//! Drivers report bus activity by feeding [`link::Event`] values into the node, one at a time.
//! Transmit-complete events must arrive in submission order. Frames rejected by the
//! acceptance list must never be delivered.

#![no_std]

pub mod frame;
pub mod link;
