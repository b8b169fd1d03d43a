//! Node configuration

use embedded_can::StandardId;

use crate::core::BusId;

/// Control identifiers shared by the host and all nodes on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct Config {
    /// Host broadcast: an empty payload asks unassigned nodes to announce themselves,
    /// a payload starting with a bus id asks that node to reset.
    pub discovery_id: StandardId,
    /// Node answer to an empty discovery broadcast, carrying the short UID.
    pub response_id: StandardId,
    /// Host broadcast assigning a bus id to the node with a matching short UID.
    pub claim_id: StandardId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Two control roles share an identifier
    DuplicateId(StandardId),
}

#[cfg(feature = "defmt")]
impl defmt::Format for Config {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "Config {{ discovery_id: {=u16:#x}, response_id: {=u16:#x}, claim_id: {=u16:#x} }}",
            self.discovery_id.as_raw(),
            self.response_id.as_raw(),
            self.claim_id.as_raw()
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            ConfigError::DuplicateId(id) => {
                defmt::write!(fmt, "DuplicateId({=u16:#x})", id.as_raw())
            }
        }
    }
}

impl Config {
    pub const DEFAULT_DISCOVERY_ID: StandardId = StandardId::new(0x3F0).unwrap();
    pub const DEFAULT_RESPONSE_ID: StandardId = StandardId::new(0x3F1).unwrap();
    pub const DEFAULT_CLAIM_ID: StandardId = StandardId::new(0x3F2).unwrap();

    pub const fn new(
        discovery_id: StandardId,
        response_id: StandardId,
        claim_id: StandardId,
    ) -> Self {
        Self {
            discovery_id,
            response_id,
            claim_id,
        }
    }

    /// Checks that every control role has its own identifier.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ids = self.control_ids();
        for (i, id) in ids.iter().enumerate() {
            if ids[i + 1..].contains(id) {
                return Err(ConfigError::DuplicateId(*id));
            }
        }
        Ok(())
    }

    pub fn control_ids(&self) -> [StandardId; 3] {
        [self.discovery_id, self.response_id, self.claim_id]
    }

    /// Whether a node may adopt `bus_id` without shadowing a control identifier.
    ///
    /// The node owns both `bus_id` and `bus_id + 1`.
    pub fn admits(&self, bus_id: BusId) -> bool {
        let ids = self.control_ids();
        !ids.contains(&bus_id.rx_id()) && !ids.contains(&bus_id.tx_id())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_DISCOVERY_ID,
            Self::DEFAULT_RESPONSE_ID,
            Self::DEFAULT_CLAIM_ID,
        )
    }
}
