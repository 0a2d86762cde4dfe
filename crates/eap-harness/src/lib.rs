//! Deterministic harness for EAP server method testing.
//!
//! Stand-ins for the pieces that surround a server method in a real
//! authenticator: a dispatcher that drives method exchanges over in-memory
//! frames, a host that records session events, and a simulated relay peer
//! exposing the inner-method phase.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod dispatcher;
pub mod host;
pub mod relay_peer;

pub use dispatcher::{DispatchAction, DispatchError, DispatchStatus, Dispatcher};
pub use host::RecordingHost;
pub use relay_peer::SimRelayPeer;
