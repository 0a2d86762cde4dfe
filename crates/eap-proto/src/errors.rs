//! Protocol error types.

use thiserror::Error;

use crate::{MethodType, Vendor};

/// Result alias for wire format operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while building or validating EAP frames.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Buffer is shorter than the structure being read
    #[error("frame too short: expected at least {expected} bytes, got {actual}")]
    TooShort {
        /// Minimum number of bytes required
        expected: usize,
        /// Bytes actually available
        actual: usize,
    },

    /// Header length field is below the minimum or exceeds the buffer
    #[error("invalid EAP length {length} for {actual}-byte frame")]
    InvalidLength {
        /// Value of the header length field
        length: usize,
        /// Size of the received buffer
        actual: usize,
    },

    /// Expanded header is truncated
    #[error("invalid expanded EAP length {length}")]
    InvalidExpandedLength {
        /// Value of the header length field
        length: usize,
    },

    /// Frame carries a different method than the caller expects
    #[error("frame carries {vendor}/{method_type}, expected {expected_vendor}/{expected_type}")]
    TypeMismatch {
        /// Vendor found in the frame
        vendor: Vendor,
        /// Method type found in the frame
        method_type: MethodType,
        /// Vendor the caller asked for
        expected_vendor: Vendor,
        /// Method type the caller asked for
        expected_type: MethodType,
    },

    /// Encoded frame would not fit the 16-bit length field
    #[error("frame of {size} bytes exceeds maximum {max}")]
    FrameTooLarge {
        /// Encoded size that was requested
        size: usize,
        /// Largest encodable frame
        max: usize,
    },

    /// Buffer reservation failed
    #[error("failed to allocate {size}-byte frame")]
    AllocationFailed {
        /// Requested buffer size
        size: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_both_sides_of_mismatch() {
        let err = ProtocolError::TypeMismatch {
            vendor: Vendor::IETF,
            method_type: MethodType::MD5,
            expected_vendor: Vendor::IETF,
            expected_type: MethodType::IDENTITY,
        };
        let text = err.to_string();
        assert!(text.contains("MD5(4)"));
        assert!(text.contains("Identity(1)"));
    }

    #[test]
    fn display_too_short() {
        let err = ProtocolError::TooShort { expected: 4, actual: 2 };
        assert_eq!(err.to_string(), "frame too short: expected at least 4 bytes, got 2");
    }
}
