//! Acceptance list management
//!
//! The node accepts exactly two identifiers in each lifecycle phase:
//! * unassigned: discovery and claim broadcasts
//! * assigned: its own bus id, and discovery broadcasts to keep hearing reset requests

use embedded_can::StandardId;

use crate::config::Config;
use crate::core::BusId;
use crate::identity::EnumerationState;
use crate::link::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FilterSet {
    Unassigned,
    Assigned(BusId),
}

impl FilterSet {
    pub fn identifiers(self, config: &Config) -> [StandardId; 2] {
        match self {
            FilterSet::Unassigned => [config.discovery_id, config.claim_id],
            FilterSet::Assigned(bus_id) => [bus_id.rx_id(), config.discovery_id],
        }
    }

    /// The set prescribed for a lifecycle state.
    pub fn for_state(state: EnumerationState) -> Self {
        match state {
            EnumerationState::Unassigned => FilterSet::Unassigned,
            EnumerationState::Assigned(bus_id) => FilterSet::Assigned(bus_id),
        }
    }
}

/// Owner of the transport acceptance list
///
/// `active` is `None` until the first activation.
#[derive(Debug, Default)]
pub struct FilterManager {
    active: Option<FilterSet>,
}

impl FilterManager {
    pub const fn new() -> Self {
        Self { active: None }
    }

    pub fn active(&self) -> Option<FilterSet> {
        self.active
    }

    /// Installs `set` on the transport.
    ///
    /// Returns after the transport has switched; no frame is accepted under the previous list
    /// afterwards.
    pub fn activate<T: Transport>(&mut self, set: FilterSet, config: &Config, transport: &mut T) {
        let ids = set.identifiers(config);
        transport.set_filter(&ids);
        trace!("Acceptance list: {:#x}, {:#x}", ids[0].as_raw(), ids[1].as_raw());
        self.active = Some(set);
    }
}
