//! Vendor and method type identifiers.
//!
//! IETF methods are identified by a single type byte. Vendor specific methods
//! use the expanded type and are identified by a (vendor, type) pair, so both
//! identifiers are modelled as open newtypes rather than closed enums.

use std::fmt;

/// SMI network management private enterprise code (24 bits on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Vendor(u32);

impl Vendor {
    /// Methods defined by the IETF
    pub const IETF: Self = Self(0);

    /// Largest vendor id that fits the 24-bit expanded header field.
    pub const MAX: u32 = 0x00FF_FFFF;

    /// Create a vendor id, rejecting values wider than 24 bits.
    pub fn new(id: u32) -> Option<Self> {
        (id <= Self::MAX).then_some(Self(id))
    }

    /// Numeric vendor id.
    pub fn id(self) -> u32 {
        self.0
    }

    /// Big-endian 24-bit encoding used by the expanded header.
    pub fn to_be_bytes(self) -> [u8; 3] {
        let [_, a, b, c] = self.0.to_be_bytes();
        [a, b, c]
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::IETF { f.write_str("IETF") } else { write!(f, "{:#08x}", self.0) }
    }
}

/// EAP method type.
///
/// For the IETF vendor this is the one-byte type field. For other vendors it
/// is the 32-bit vendor type of the expanded header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodType(u32);

impl MethodType {
    /// Identity (RFC 3748)
    pub const IDENTITY: Self = Self(1);
    /// Notification (RFC 3748)
    pub const NOTIFICATION: Self = Self(2);
    /// Legacy Nak (RFC 3748)
    pub const NAK: Self = Self(3);
    /// MD5-Challenge (RFC 3748)
    pub const MD5: Self = Self(4);
    /// EAP-TLS (RFC 5216)
    pub const TLS: Self = Self(13);
    /// EAP-TTLS (RFC 5281)
    pub const TTLS: Self = Self(21);
    /// Protected EAP
    pub const PEAP: Self = Self(25);
    /// EAP-MSCHAPv2
    pub const MSCHAPV2: Self = Self(26);
    /// Expanded type marker (RFC 3748 section 5.7)
    pub const EXPANDED: Self = Self(254);

    /// Create a method type from its numeric value.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Numeric method type.
    pub fn value(self) -> u32 {
        self.0
    }

    /// Short IANA name for well known types.
    pub fn name(self) -> Option<&'static str> {
        match self {
            Self::IDENTITY => Some("Identity"),
            Self::NOTIFICATION => Some("Notification"),
            Self::NAK => Some("Nak"),
            Self::MD5 => Some("MD5"),
            Self::TLS => Some("TLS"),
            Self::TTLS => Some("TTLS"),
            Self::PEAP => Some("PEAP"),
            Self::MSCHAPV2 => Some("MSCHAPV2"),
            Self::EXPANDED => Some("Expanded"),
            _ => None,
        }
    }
}

impl fmt::Display for MethodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}({})", self.0),
            None => write!(f, "{}", self.0),
        }
    }
}
