//! Method error types.

use std::collections::TryReserveError;

use eap_proto::{MethodType, ProtocolError, Vendor};
use thiserror::Error;

/// Errors returned by method factories, exchanges and the registry.
///
/// Protocol-level outcomes (failed authentication, deferred processing) are
/// not errors; they are reported through [`crate::ProcessOutcome`] and the
/// exchange state.
#[derive(Debug, Error)]
pub enum MethodError {
    /// Request frame could not be built
    #[error("failed to build request: {0}")]
    BuildRequest(#[source] ProtocolError),

    /// Identity buffer could not be allocated
    #[error("failed to allocate {len}-byte identity buffer")]
    IdentityAllocation {
        /// Requested identity length
        len: usize,
        /// Underlying reservation failure
        #[source]
        source: TryReserveError,
    },

    /// Identity exceeds the session's configured limit
    #[error("{len}-byte identity exceeds the {max}-byte limit")]
    IdentityTooLong {
        /// Received identity length
        len: usize,
        /// Configured limit
        max: usize,
    },

    /// Method does not support resuming a peer-initiated exchange
    #[error("method {name} cannot pick up an exchange")]
    PickUpUnsupported {
        /// Method name
        name: &'static str,
    },

    /// A method with the same (vendor, type) or name is already registered
    #[error("method {name} ({vendor}/{method_type}) is already registered")]
    DuplicateMethod {
        /// Method name
        name: &'static str,
        /// Vendor id
        vendor: Vendor,
        /// Method type
        method_type: MethodType,
    },

    /// Method was built against a different interface version
    #[error("method {name} uses interface version {found}, expected {expected}")]
    InterfaceVersion {
        /// Method name
        name: &'static str,
        /// Version the registry implements
        expected: u32,
        /// Version the method reports
        found: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_variants() {
        let err = MethodError::BuildRequest(ProtocolError::FrameTooLarge { size: 70_000, max: 65_535 });
        assert!(err.to_string().contains("failed to build request"));

        let err = MethodError::IdentityTooLong { len: 300, max: 253 };
        assert_eq!(err.to_string(), "300-byte identity exceeds the 253-byte limit");

        let err = MethodError::PickUpUnsupported { name: "MD5" };
        assert_eq!(err.to_string(), "method MD5 cannot pick up an exchange");

        let err = MethodError::DuplicateMethod {
            name: "Identity",
            vendor: Vendor::IETF,
            method_type: MethodType::IDENTITY,
        };
        assert_eq!(err.to_string(), "method Identity (IETF/Identity(1)) is already registered");
    }
}
