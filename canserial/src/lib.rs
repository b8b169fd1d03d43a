//! # canserial
//!
//! This library lets otherwise identical microcontroller nodes on a shared CAN bus acquire a
//! runtime bus address from a single host, and then tunnel a byte stream (a virtual serial
//! console) to that host over the same bus. It runs in no_std environments without dynamic
//! memory allocation.
//!
//! All protocol logic runs in event-handler context: every function runs to completion without
//! blocking, so the node can be driven directly from CAN interrupts.
//!
//! ## Architecture
//!
//! ```text
//!   ┌───────────┐  Event   ┌──────────────────────────────┐
//!   │ Transport ├─────────►│             Node             │
//!   └───────────┘          │ ┌──────────┐  ┌────────────┐ │
//!         ▲                │ │ Resolver ├─►│ Filter mgr │ │
//!         │  send/filter   │ └────┬─────┘  └────────────┘ │
//!         └────────────────┤      ▼                       │
//!                          │ ┌───────────────┐            │
//!                          │ │ Serial bridge │◄───────────┼──► Byte queues
//!                          │ └───────────────┘            │
//!                          └──────────────────────────────┘
//! ```
//! Components:
//! * _Transport_ is the CAN driver. It delivers accepted frames, reports transmit completion
//!   and errors, and applies acceptance lists.
//! * _Resolver_ holds the node identity (unassigned or assigned) and classifies each accepted
//!   frame: discovery broadcasts, address claims, reset broadcasts, or stream traffic.
//! * _Filter manager_ keeps the transport acceptance list equal to the one prescribed for the
//!   current identity state.
//! * _Serial bridge_ chunks outbound bytes into frames and appends inbound payloads to the
//!   inbound queue. It also answers keepalive pings.
//! * _Byte queues_ are shared with the rest of the firmware.
//!
//! ## Enumeration
//!
//! 1. The host broadcasts an empty frame on the discovery identifier.
//! 2. Every unassigned node answers on the response identifier with its 48-bit short UID,
//!    folded from the 96-bit hardware UID.
//! 3. The host broadcasts a claim carrying a bus id and one of the short UIDs.
//! 4. The node with the matching short UID adopts the bus id and switches its acceptance
//!    list to `{bus_id, discovery}`.
//! 5. The host talks to the node on `bus_id`; the node answers on `bus_id + 1`.
//! 6. A discovery broadcast whose first two bytes equal the bus id resets the node.
//!
//! ## Limitations
//!
//! * Assignment is one-shot per boot: claims received after assignment are ignored.
//! * Assigned nodes do not answer empty discovery broadcasts, so a host scan only finds
//!   nodes that still wait for a bus id.
//! * Two nodes with equal short UIDs cannot be told apart.
//! * No flow control beyond what the transport provides.
//! * A single host per bus.
#![no_std]

pub use canserial_core as core;
pub use canserial_driver::{frame, link};

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

mod bridge;
pub mod config;
pub mod filter;
pub mod identity;
pub mod node;
mod outbox;
pub mod packet;
pub mod queue;
pub mod runner;
