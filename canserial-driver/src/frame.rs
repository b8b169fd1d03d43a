//! Transport frame object

use embedded_can::{Id, StandardId};

/// Classic CAN maximum transmission unit
pub const MTU: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidLength;

/// Classic CAN data vector
///
/// Holds up to [`MTU`] bytes. Reads past the stored length are impossible through the
/// slice interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Data {
    length: u8,
    bytes: [u8; MTU],
}

impl Data {
    pub const EMPTY: Self = Self {
        length: 0,
        bytes: [0; MTU],
    };

    /// Creates a new vector from a slice of at most [`MTU`] bytes.
    pub fn new(data: &[u8]) -> Result<Self, InvalidLength> {
        if data.len() > MTU {
            return Err(InvalidLength);
        }
        let mut bytes = [0; MTU];
        bytes[..data.len()].copy_from_slice(data);

        Ok(Self {
            length: data.len() as u8,
            bytes,
        })
    }

    pub fn len(&self) -> usize {
        usize::from(self.length)
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

impl Default for Data {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl core::ops::Deref for Data {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.bytes[..usize::from(self.length)]
    }
}

impl core::ops::DerefMut for Data {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.bytes[..usize::from(self.length)]
    }
}

impl TryFrom<&[u8]> for Data {
    type Error = InvalidLength;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Classic data frame with a standard identifier
///
/// Extended and remote frames do not take part in the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub id: StandardId,
    pub data: Data,
}

impl Frame {
    pub const fn new(id: StandardId, data: Data) -> Self {
        Self { id, data }
    }

    /// Zero-length frame, used for keepalive pings and acks.
    pub const fn empty(id: StandardId) -> Self {
        Self {
            id,
            data: Data::EMPTY,
        }
    }

    pub fn from_slice(id: StandardId, data: &[u8]) -> Result<Self, InvalidLength> {
        Ok(Self {
            id,
            data: Data::new(data)?,
        })
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Frame {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "Frame {{ id: {=u16:#x}, data: {=[u8]:x} }}",
            self.id.as_raw(),
            &self.data[..]
        )
    }
}

impl embedded_can::Frame for Frame {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        match id.into() {
            Id::Standard(id) => Frame::from_slice(id, data).ok(),
            Id::Extended(_) => None,
        }
    }

    fn new_remote(_id: impl Into<Id>, _dlc: usize) -> Option<Self> {
        None
    }

    fn is_extended(&self) -> bool {
        false
    }

    fn is_remote_frame(&self) -> bool {
        false
    }

    fn id(&self) -> Id {
        Id::Standard(self.id)
    }

    fn dlc(&self) -> usize {
        self.data.len()
    }

    fn data(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_can::{ExtendedId, Frame as _};

    const ID: StandardId = StandardId::new(0x123).unwrap();

    #[test]
    fn test_data_length() {
        for len in 0..=MTU {
            let bytes = [0xA5; MTU];
            let data = Data::new(&bytes[..len]).unwrap();
            assert_eq!(data.len(), len);
            assert_eq!(&data[..], &bytes[..len]);
        }
        assert_eq!(Data::new(&[0; MTU + 1]), Err(InvalidLength));
    }

    #[test]
    fn test_data_does_not_expose_tail() {
        let mut data = Data::new(&[1, 2, 3]).unwrap();
        data[0] = 7;
        assert_eq!(&data[..], &[7, 2, 3]);
        assert!(data.get(3).is_none());
    }

    #[test]
    fn test_embedded_can_frame() {
        let frame = <Frame as embedded_can::Frame>::new(ID, &[1, 2]).unwrap();
        assert_eq!(frame.id(), Id::Standard(ID));
        assert_eq!(frame.dlc(), 2);
        assert_eq!(frame.data(), &[1, 2]);
        assert!(!frame.is_extended());

        let extended = ExtendedId::new(0x123).unwrap();
        assert!(<Frame as embedded_can::Frame>::new(extended, &[]).is_none());
        assert!(Frame::new_remote(ID, 0).is_none());
        assert!(<Frame as embedded_can::Frame>::new(ID, &[0; 9]).is_none());
    }

    #[cfg(feature = "defmt")]
    #[test]
    fn test_frame_is_loggable() {
        fn assert_format<T: defmt::Format>() {}
        assert_format::<Frame>();
        assert_format::<crate::link::Event>();
    }
}
