//! Node enumeration protocol core data types
//!
//! This crate provides basic data type definitions used by other canserial crates.
//! Users should not depend on this crate directly. Use the `canserial::core` reexport instead.
#![no_std]

use embedded_can::StandardId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidValue;

/// Factory-programmed unique identifier of the microcontroller
///
/// 96 bits, supplied by silicon at boot and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HardwareUid([u8; HardwareUid::LEN]);

impl HardwareUid {
    pub const LEN: usize = 12;

    pub const fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    /// Assembles the UID from three little-endian words, the layout used by STM32 parts.
    pub const fn from_words(words: [u32; 3]) -> Self {
        let mut bytes = [0; Self::LEN];
        let mut i = 0;
        while i < Self::LEN {
            bytes[i] = words[i / 4].to_le_bytes()[i % 4];
            i += 1;
        }
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    /// Folds the two 48-bit halves into a [`ShortUid`].
    ///
    /// Byte `i` of the result is byte `i` XOR byte `i + 6` of the hardware UID.
    pub const fn short_uid(&self) -> ShortUid {
        let mut bytes = [0; ShortUid::LEN];
        let mut i = 0;
        while i < ShortUid::LEN {
            bytes[i] = self.0[i] ^ self.0[i + ShortUid::LEN];
            i += 1;
        }
        ShortUid(bytes)
    }
}

/// 48-bit key a node is addressed by during enumeration
///
/// Two nodes with equal short UIDs are indistinguishable to the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ShortUid([u8; ShortUid::LEN]);

impl ShortUid {
    pub const LEN: usize = 6;

    pub const fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }
}

impl TryFrom<&[u8]> for ShortUid {
    type Error = InvalidValue;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let bytes = <[u8; Self::LEN]>::try_from(value).map_err(|_| InvalidValue)?;
        Ok(Self(bytes))
    }
}

/// Runtime-assigned bus address
///
/// The node receives on `bus_id` and transmits on `bus_id + 1`, so the largest valid value is
/// one below the largest standard identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusId(u16);

impl BusId {
    pub const MAX: BusId = BusId(0x7FE);

    pub const fn new(value: u16) -> Option<Self> {
        if value <= Self::MAX.0 {
            Some(Self(value))
        } else {
            None
        }
    }

    pub const fn from_le_bytes(bytes: [u8; 2]) -> Option<Self> {
        Self::new(u16::from_le_bytes(bytes))
    }

    pub const fn into_u16(self) -> u16 {
        self.0
    }

    pub const fn to_le_bytes(self) -> [u8; 2] {
        self.0.to_le_bytes()
    }

    /// Identifier of frames addressed to the node
    pub const fn rx_id(self) -> StandardId {
        match StandardId::new(self.0) {
            Some(id) => id,
            None => unreachable!(),
        }
    }

    /// Identifier of frames the node sends back to the host
    pub const fn tx_id(self) -> StandardId {
        // MAX leaves room for the successor
        match StandardId::new(self.0 + 1) {
            Some(id) => id,
            None => unreachable!(),
        }
    }
}

impl From<BusId> for u16 {
    fn from(value: BusId) -> Self {
        value.into_u16()
    }
}

impl TryFrom<u16> for BusId {
    type Error = InvalidValue;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InvalidValue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UID: HardwareUid = HardwareUid::from_bytes([
        0x10, 0x21, 0x32, 0x43, 0x54, 0x65, 0x01, 0x01, 0x02, 0x03, 0xF0, 0xFF,
    ]);

    #[test]
    fn test_short_uid_fold() {
        assert_eq!(
            UID.short_uid(),
            ShortUid::from_bytes([0x11, 0x20, 0x30, 0x40, 0xA4, 0x9A])
        );
    }

    #[test]
    fn test_short_uid_is_repeatable() {
        assert_eq!(UID.short_uid(), UID.short_uid());
        let copy = HardwareUid::from_bytes(*UID.as_bytes());
        assert_eq!(copy.short_uid(), UID.short_uid());
    }

    #[test]
    fn test_short_uid_of_equal_halves_is_zero() {
        let uid = HardwareUid::from_bytes([1, 2, 3, 4, 5, 6, 1, 2, 3, 4, 5, 6]);
        assert_eq!(uid.short_uid(), ShortUid::from_bytes([0; 6]));
    }

    #[test]
    fn test_uid_from_words() {
        let uid = HardwareUid::from_words([0x4332_2110, 0x0101_6554, 0xFFF0_0302]);
        assert_eq!(uid, UID);
    }

    #[test]
    fn test_bus_id_range() {
        assert_eq!(BusId::new(0x100).map(u16::from), Some(0x100));
        assert_eq!(BusId::new(0x7FE), Some(BusId::MAX));
        assert_eq!(BusId::new(0x7FF), None);
        assert_eq!(BusId::from_le_bytes([0x00, 0x01]), BusId::new(0x100));
        assert_eq!(BusId::try_from(0x800u16), Err(InvalidValue));
    }

    #[test]
    fn test_bus_id_identifiers() {
        let id = unwrap_bus_id(0x100);
        assert_eq!(id.rx_id().as_raw(), 0x100);
        assert_eq!(id.tx_id().as_raw(), 0x101);
        assert_eq!(BusId::MAX.tx_id(), StandardId::MAX);
    }

    #[test]
    fn test_short_uid_from_slice() {
        assert!(ShortUid::try_from(&[1u8, 2, 3, 4, 5, 6][..]).is_ok());
        assert_eq!(ShortUid::try_from(&[1u8, 2, 3][..]), Err(InvalidValue));
    }

    fn unwrap_bus_id(value: u16) -> BusId {
        BusId::new(value).unwrap()
    }
}
