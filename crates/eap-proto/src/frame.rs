//! Complete EAP frames.

use std::fmt;

use bytes::Bytes;

use crate::{Code, EapHeader, MethodType, ProtocolError, Result, Vendor};

/// Size of the expanded type field: type byte, 24-bit vendor, 32-bit type.
pub(crate) const EXPANDED_TYPE_SIZE: usize = 8;

/// An EAP packet as received from or sent to the peer.
///
/// Cheap to clone. The frame only guarantees that a header is present;
/// method specific checks happen in [`crate::validate`].
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    header: EapHeader,
    bytes: Bytes,
}

impl Frame {
    /// Largest encodable frame (the length field is 16 bits).
    pub const MAX_SIZE: usize = u16::MAX as usize;

    /// Wrap received bytes.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Result<Self> {
        let bytes = bytes.into();
        let header = EapHeader::read(&bytes)?;
        Ok(Self { header, bytes })
    }

    /// Build a Request or Response frame for `vendor`/`method_type`.
    ///
    /// IETF methods use the one-byte type field, every other vendor uses the
    /// expanded header.
    pub fn build(
        code: Code,
        vendor: Vendor,
        method_type: MethodType,
        identifier: u8,
        payload: &[u8],
    ) -> Result<Self> {
        let expanded = vendor != Vendor::IETF || method_type.value() > u32::from(u8::MAX);
        let type_size = if expanded { EXPANDED_TYPE_SIZE } else { 1 };
        let size = EapHeader::SIZE + type_size + payload.len();
        let length = u16::try_from(size)
            .map_err(|_| ProtocolError::FrameTooLarge { size, max: Self::MAX_SIZE })?;

        let mut buf = Vec::new();
        buf.try_reserve_exact(size).map_err(|_| ProtocolError::AllocationFailed { size })?;

        let header = EapHeader::new(code, identifier, length);
        buf.extend_from_slice(&header.to_bytes());
        if expanded {
            buf.push(MethodType::EXPANDED.value() as u8);
            buf.extend_from_slice(&vendor.to_be_bytes());
            buf.extend_from_slice(&method_type.value().to_be_bytes());
        } else {
            buf.push(method_type.value() as u8);
        }
        buf.extend_from_slice(payload);

        Ok(Self { header, bytes: Bytes::from(buf) })
    }

    /// Build a Request frame.
    pub fn request(
        vendor: Vendor,
        method_type: MethodType,
        identifier: u8,
        payload: &[u8],
    ) -> Result<Self> {
        Self::build(Code::Request, vendor, method_type, identifier, payload)
    }

    /// Build a Response frame.
    pub fn response(
        vendor: Vendor,
        method_type: MethodType,
        identifier: u8,
        payload: &[u8],
    ) -> Result<Self> {
        Self::build(Code::Response, vendor, method_type, identifier, payload)
    }

    /// Parsed header.
    pub fn header(&self) -> &EapHeader {
        &self.header
    }

    /// Decoded code, `None` for unknown values.
    pub fn code(&self) -> Option<Code> {
        self.header.code()
    }

    /// Transaction identifier.
    pub fn identifier(&self) -> u8 {
        self.header.identifier()
    }

    /// Raw method type byte, if the buffer has one.
    pub fn type_byte(&self) -> Option<u8> {
        self.bytes.get(EapHeader::SIZE).copied()
    }

    /// Full encoded frame.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the frame and return its encoding.
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    /// Size of the received buffer, which may differ from the header length.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false for a constructed frame; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("code", &self.header.raw_code())
            .field("identifier", &self.header.identifier())
            .field("length", &self.header.length())
            .field("received", &self.bytes.len())
            .finish()
    }
}
