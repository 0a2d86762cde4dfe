//! Wire format for EAP (RFC 3748) request and response frames.
//!
//! Every EAP packet starts with a fixed 4-byte header (code, identifier,
//! length) followed by a one-byte method type and the method payload. Vendor
//! specific methods use the expanded type (254) which carries a 24-bit vendor
//! id and a 32-bit vendor type before the payload.
//!
//! Methods never parse the header themselves. They ask [`validate`] for the
//! payload of a frame that must carry their own vendor/type pair, and get
//! either a borrowed payload slice or a [`ProtocolError`].
//!
//! # Security
//!
//! Header parsing uses compile-time verified layouts via `zerocopy`. The
//! header length field is authoritative: payload slices never extend past it,
//! and a length larger than the received buffer is rejected.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod codes;
pub mod errors;
pub mod frame;
pub mod header;
pub mod method;
pub mod validate;

pub use codes::Code;
pub use errors::{ProtocolError, Result};
pub use frame::Frame;
pub use header::EapHeader;
pub use method::{MethodType, Vendor};
pub use validate::{validate, validate_slice};
