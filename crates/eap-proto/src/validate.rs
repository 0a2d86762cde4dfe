//! Header validation for method implementations.
//!
//! A method only ever sees frames the dispatcher routed to it, but it still
//! has to confirm that the frame carries its own (vendor, type) pair and that
//! the header length is consistent before touching the payload. [`validate`]
//! does both and hands back the payload bounded by the header length.
//!
//! The code field is deliberately not inspected; the dispatcher decides
//! whether a Request or Response is acceptable.

use crate::{
    EapHeader, Frame, MethodType, ProtocolError, Result, Vendor, frame::EXPANDED_TYPE_SIZE,
};

/// Validate `frame` for `vendor`/`method_type` and return its payload.
pub fn validate(vendor: Vendor, method_type: MethodType, frame: &Frame) -> Result<&[u8]> {
    validate_slice(vendor, method_type, frame.as_bytes())
}

/// Validate raw bytes for `vendor`/`method_type` and return the payload.
///
/// Bytes past the header length are ignored.
pub fn validate_slice(vendor: Vendor, method_type: MethodType, bytes: &[u8]) -> Result<&[u8]> {
    let header = EapHeader::read(bytes)?;
    let length = usize::from(header.length());
    if length < EapHeader::SIZE + 1 || length > bytes.len() {
        return Err(ProtocolError::InvalidLength { length, actual: bytes.len() });
    }

    let body = &bytes[EapHeader::SIZE..length];
    let (found_vendor, found_type, payload) = match body {
        [0xFE, rest @ ..] => {
            if length < EapHeader::SIZE + EXPANDED_TYPE_SIZE {
                return Err(ProtocolError::InvalidExpandedLength { length });
            }
            let found_vendor = u32::from_be_bytes([0, rest[0], rest[1], rest[2]]);
            let found_type = u32::from_be_bytes([rest[3], rest[4], rest[5], rest[6]]);
            (found_vendor, found_type, &rest[EXPANDED_TYPE_SIZE - 1..])
        },
        [type_byte, rest @ ..] => (Vendor::IETF.id(), u32::from(*type_byte), rest),
        [] => return Err(ProtocolError::InvalidLength { length, actual: bytes.len() }),
    };

    if found_vendor != vendor.id() || found_type != method_type.value() {
        return Err(ProtocolError::TypeMismatch {
            vendor: Vendor::new(found_vendor).unwrap_or(Vendor::IETF),
            method_type: MethodType::new(found_type),
            expected_vendor: vendor,
            expected_type: method_type,
        });
    }

    Ok(payload)
}
