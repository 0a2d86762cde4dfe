//! EAP packet codes.

/// EAP packet code, the first byte of every EAP packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Code {
    /// Sent by the authenticator
    Request = 1,
    /// Sent by the peer in reply to a Request
    Response = 2,
    /// Authentication succeeded
    Success = 3,
    /// Authentication failed
    Failure = 4,
    /// ERP initiate (RFC 6696)
    Initiate = 5,
    /// ERP finish (RFC 6696)
    Finish = 6,
}

impl Code {
    /// Convert from the wire value.
    ///
    /// Returns `None` for codes not defined by RFC 3748 / RFC 6696.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Request),
            2 => Some(Self::Response),
            3 => Some(Self::Success),
            4 => Some(Self::Failure),
            5 => Some(Self::Initiate),
            6 => Some(Self::Finish),
            _ => None,
        }
    }

    /// Wire value of this code.
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Whether packets with this code carry a method type byte.
    pub fn has_type(self) -> bool {
        matches!(self, Self::Request | Self::Response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_values_match_rfc() {
        assert_eq!(Code::Request.to_u8(), 1);
        assert_eq!(Code::Response.to_u8(), 2);
        assert_eq!(Code::Success.to_u8(), 3);
        assert_eq!(Code::Failure.to_u8(), 4);
    }

    #[test]
    fn unknown_codes_are_rejected() {
        assert_eq!(Code::from_u8(0), None);
        assert_eq!(Code::from_u8(7), None);
        assert_eq!(Code::from_u8(255), None);
    }

    #[test]
    fn only_request_and_response_carry_type() {
        assert!(Code::Request.has_type());
        assert!(Code::Response.has_type());
        assert!(!Code::Success.has_type());
        assert!(!Code::Failure.has_type());
    }
}
