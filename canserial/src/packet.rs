//! Control packet layouts
//!
//! Multi-byte integers are little-endian.
//!
//! | Identifier | Payload |
//! |---|---|
//! | discovery | empty: announce request |
//! | discovery | `bus_id: u16`, trailing bytes ignored: reset request |
//! | claim | `bus_id: u16`, `short_uid: [u8; 6]` |
//! | response | `short_uid: [u8; 6]` |

use crate::core::{BusId, ShortUid};
use crate::frame::Data;

/// Reason a control packet was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Malformed {
    Length(usize),
    BusIdRange(u16),
}

/// Parsed discovery broadcast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Discovery {
    Announce,
    /// Raw target id. Values outside the bus id range never match a node.
    Reset(u16),
}

impl Discovery {
    pub fn parse(data: &[u8]) -> Result<Self, Malformed> {
        match data {
            [] => Ok(Discovery::Announce),
            [lo, hi, ..] => Ok(Discovery::Reset(u16::from_le_bytes([*lo, *hi]))),
            _ => Err(Malformed::Length(data.len())),
        }
    }

    pub fn encode(&self) -> Data {
        match self {
            Discovery::Announce => Data::EMPTY,
            Discovery::Reset(target) => encode_exact(&target.to_le_bytes()),
        }
    }
}

/// Address claim broadcast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Claim {
    pub candidate: BusId,
    pub target: ShortUid,
}

impl Claim {
    pub const LEN: usize = 2 + ShortUid::LEN;

    pub fn parse(data: &[u8]) -> Result<Self, Malformed> {
        let [lo, hi, uid @ ..] = data else {
            return Err(Malformed::Length(data.len()));
        };
        let target = ShortUid::try_from(uid).map_err(|_| Malformed::Length(data.len()))?;
        let raw = u16::from_le_bytes([*lo, *hi]);
        let candidate = BusId::new(raw).ok_or(Malformed::BusIdRange(raw))?;
        Ok(Self { candidate, target })
    }

    pub fn encode(&self) -> Data {
        let mut bytes = [0; Self::LEN];
        bytes[..2].copy_from_slice(&self.candidate.to_le_bytes());
        bytes[2..].copy_from_slice(self.target.as_bytes());
        encode_exact(&bytes)
    }
}

/// Payload of the announce response
pub fn response(uid: &ShortUid) -> Data {
    encode_exact(uid.as_bytes())
}

fn encode_exact(bytes: &[u8]) -> Data {
    // Every layout above fits into a classic frame
    unwrap!(Data::new(bytes))
}
