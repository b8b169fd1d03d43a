//! Identity lifecycle and control packet handling
//!
//! A node boots `Unassigned`, answers discovery broadcasts with its short UID, and becomes
//! `Assigned` once a claim carrying its short UID arrives. Assignment is one-shot per boot:
//! only a full system reset returns the node to `Unassigned`.
//!
//! The [`Resolver`] classifies each accepted frame into an [`Action`] without touching
//! the transport. The node carries out the action.

use crate::config::Config;
use crate::core::{BusId, ShortUid};
use crate::frame::{Data, Frame};
use crate::packet::{self, Claim, Discovery};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EnumerationState {
    Unassigned,
    Assigned(BusId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlreadyAssigned(pub BusId);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NodeIdentity {
    short_uid: ShortUid,
    state: EnumerationState,
}

impl NodeIdentity {
    pub const fn new(short_uid: ShortUid) -> Self {
        Self {
            short_uid,
            state: EnumerationState::Unassigned,
        }
    }

    pub fn short_uid(&self) -> ShortUid {
        self.short_uid
    }

    pub fn state(&self) -> EnumerationState {
        self.state
    }

    pub fn bus_id(&self) -> Option<BusId> {
        match self.state {
            EnumerationState::Unassigned => None,
            EnumerationState::Assigned(bus_id) => Some(bus_id),
        }
    }

    /// The only transition into `Assigned`.
    fn assign(&mut self, bus_id: BusId) -> Result<(), AlreadyAssigned> {
        match self.state {
            EnumerationState::Unassigned => {
                self.state = EnumerationState::Assigned(bus_id);
                Ok(())
            }
            EnumerationState::Assigned(current) => Err(AlreadyAssigned(current)),
        }
    }
}

/// Outcome of classifying an accepted frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Irrelevant or malformed; no side effect.
    Ignore,
    /// Transmit the frame immediately.
    Respond(Frame),
    /// Adopt the bus id and switch to the assigned-phase acceptance list.
    Assign(BusId),
    /// A reset broadcast matched the assigned bus id.
    Reset,
    /// Stream traffic for the serial bridge.
    Stream(Data),
}

/// Identity state machine
pub struct Resolver {
    config: Config,
    identity: NodeIdentity,
}

impl Resolver {
    pub fn new(config: Config, short_uid: ShortUid) -> Self {
        Self {
            config,
            identity: NodeIdentity::new(short_uid),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn identity(&self) -> &NodeIdentity {
        &self.identity
    }

    pub fn classify(&self, frame: &Frame) -> Action {
        match self.identity.state {
            EnumerationState::Unassigned => self.classify_unassigned(frame),
            EnumerationState::Assigned(bus_id) => self.classify_assigned(bus_id, frame),
        }
    }

    /// Applies an [`Action::Assign`] outcome.
    pub(crate) fn assign(&mut self, bus_id: BusId) -> Result<(), AlreadyAssigned> {
        self.identity.assign(bus_id)
    }

    fn classify_unassigned(&self, frame: &Frame) -> Action {
        if frame.id == self.config.discovery_id {
            match Discovery::parse(&frame.data) {
                Ok(Discovery::Announce) => {
                    let data = packet::response(&self.identity.short_uid);
                    Action::Respond(Frame::new(self.config.response_id, data))
                }
                // Reset targets a bus id, which an unassigned node does not hold
                Ok(Discovery::Reset(_)) => Action::Ignore,
                Err(err) => {
                    debug!("Ignoring malformed discovery packet: {:?}", err);
                    Action::Ignore
                }
            }
        } else if frame.id == self.config.claim_id {
            match Claim::parse(&frame.data) {
                Ok(claim) if claim.target != self.identity.short_uid => Action::Ignore,
                Ok(claim) if !self.config.admits(claim.candidate) => {
                    debug!("Ignoring claim of reserved bus id {:?}", claim.candidate);
                    Action::Ignore
                }
                Ok(claim) => Action::Assign(claim.candidate),
                Err(err) => {
                    debug!("Ignoring malformed claim packet: {:?}", err);
                    Action::Ignore
                }
            }
        } else {
            Action::Ignore
        }
    }

    fn classify_assigned(&self, bus_id: BusId, frame: &Frame) -> Action {
        if frame.id == bus_id.rx_id() {
            Action::Stream(frame.data)
        } else if frame.id == self.config.discovery_id {
            match Discovery::parse(&frame.data) {
                Ok(Discovery::Reset(target)) if target == bus_id.into_u16() => Action::Reset,
                Ok(_) => Action::Ignore,
                Err(err) => {
                    debug!("Ignoring malformed discovery packet: {:?}", err);
                    Action::Ignore
                }
            }
        } else {
            // Claims after assignment are deliberately not re-armed
            Action::Ignore
        }
    }
}
