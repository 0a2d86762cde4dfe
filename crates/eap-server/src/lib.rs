//! Authenticator-side EAP method logic.
//!
//! Pure state machine logic for EAP server methods, decoupled from I/O and
//! from the authenticator state machine that drives them.
//!
//! # Architecture
//!
//! A method is registered once as a [`ServerMethod`] factory. For every
//! exchange the dispatcher asks the factory for a [`MethodExchange`] handle
//! and then drives it: build a request, check and process the peer's
//! response, poll for completion, release the handle. The handle never
//! performs I/O. Effects it cannot apply to the [`ServerSession`] directly,
//! such as retransmitting the last frame, are returned as a
//! [`ProcessOutcome`] for the dispatcher to execute.
//!
//! # Components
//!
//! - [`method`]: method traits and exchange outcomes
//! - [`registry`]: methods keyed by (vendor, type)
//! - [`session`]: per-peer context shared by the methods of one session
//! - [`identity`]: the Identity method
//! - [`relay`]: relay delay controller and the inner-method channel
//! - [`diag`]: escaping of peer data for logs
//! - [`error`]: method error types

pub mod diag;
pub mod error;
pub mod identity;
pub mod method;
pub mod registry;
pub mod relay;
pub mod session;

pub use error::MethodError;
pub use identity::{IdentityExchange, IdentityMethod};
pub use method::{
    ExchangeState, FrameCheck, METHOD_INTERFACE_VERSION, MethodExchange, ProcessOutcome,
    ServerMethod,
};
pub use registry::{MethodRegistry, register_identity};
pub use relay::{RelayChannel, RelayConfig, RelayCountdown, RelayGate, RelayPhase};
pub use session::{Identity, InstanceRole, ServerSession, SessionCallbacks};
