//! Fixed EAP header.
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |     Code      |  Identifier   |            Length             |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |     Type      |  Type-Data ...
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use zerocopy::{
    FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned, byteorder::network_endian::U16,
};

use crate::{Code, ProtocolError, Result};

/// The 4-byte header shared by all EAP packets.
///
/// `length` covers the whole packet including this header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct EapHeader {
    code: u8,
    identifier: u8,
    length: U16,
}

impl EapHeader {
    /// Encoded header size
    pub const SIZE: usize = 4;

    /// Create a header for a packet of `length` bytes.
    pub fn new(code: Code, identifier: u8, length: u16) -> Self {
        Self { code: code.to_u8(), identifier, length: U16::new(length) }
    }

    /// Read a header from the front of `bytes`.
    pub fn read(bytes: &[u8]) -> Result<Self> {
        Self::read_from_prefix(bytes)
            .map(|(header, _)| header)
            .map_err(|_| ProtocolError::TooShort { expected: Self::SIZE, actual: bytes.len() })
    }

    /// Raw code byte.
    pub fn raw_code(&self) -> u8 {
        self.code
    }

    /// Decoded code, `None` for unknown values.
    pub fn code(&self) -> Option<Code> {
        Code::from_u8(self.code)
    }

    /// Transaction identifier used to match responses to requests.
    pub fn identifier(&self) -> u8 {
        self.identifier
    }

    /// Value of the length field.
    pub fn length(&self) -> u16 {
        self.length.get()
    }

    /// Wire encoding.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out.copy_from_slice(self.as_bytes());
        out
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    #[test]
    fn header_layout() {
        let header = EapHeader::new(Code::Request, 7, 9);
        assert_eq!(header.to_bytes(), hex!("01 07 0009"));
    }

    #[test]
    fn read_header() {
        let header = EapHeader::read(&hex!("02 2a 0010 01")).unwrap();
        assert_eq!(header.code(), Some(Code::Response));
        assert_eq!(header.identifier(), 0x2a);
        assert_eq!(header.length(), 16);
    }

    #[test]
    fn read_short_buffer() {
        let result = EapHeader::read(&hex!("02 2a 00"));
        assert_eq!(result, Err(ProtocolError::TooShort { expected: 4, actual: 3 }));
    }

    #[test]
    fn unknown_code_is_preserved() {
        let header = EapHeader::read(&hex!("09 00 0004")).unwrap();
        assert_eq!(header.code(), None);
        assert_eq!(header.raw_code(), 9);
    }
}
