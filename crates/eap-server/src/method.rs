//! Method interface.
//!
//! # Lifecycle
//!
//! ```text
//! ┌──────────────────┐
//! │ init             │          ┌──────────────────────────┐
//! │ init_pick_up     │─────────>│ build_req/check/process  │<──┐
//! └──────────────────┘          └──────────────────────────┘   │ not done
//!                                            │                 │
//!                                            ↓                 │
//!                                       ┌─────────┐            │
//!                                       │ is_done │────────────┘
//!                                       └─────────┘
//!                                            │ done
//!                                            ↓
//!                                       ┌─────────┐
//!                                       │  reset  │
//!                                       └─────────┘
//! ```
//!
//! The dispatcher owns the handle for the duration of one exchange. After
//! every `process` call it inspects the returned [`ProcessOutcome`] and polls
//! `is_done`/`is_success`. A `Pending` outcome means no decision was taken and
//! the same handle must be driven again on a later event.

use std::fmt;

use eap_proto::{Frame, MethodType, Vendor};

use crate::{MethodError, ServerSession};

/// Version of the method interface implemented by this crate.
///
/// The registry refuses methods reporting a different version.
pub const METHOD_INTERFACE_VERSION: u32 = 1;

/// State of a single exchange.
///
/// Starts at `Continue`. Methods only ever move it to one of the terminal
/// variants, so it never returns to `Continue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExchangeState {
    /// No decision yet
    Continue,
    /// Exchange completed successfully
    Success,
    /// Exchange failed
    Failure,
}

impl ExchangeState {
    /// Whether a decision has been taken.
    pub fn is_terminal(self) -> bool {
        self != Self::Continue
    }
}

/// Result of validating a frame with [`MethodExchange::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameCheck {
    /// Frame is acceptable for this method
    Accept,
    /// Frame must be dropped
    Reject,
}

impl FrameCheck {
    /// True when the frame must be dropped.
    ///
    /// Matches the polarity of the classic `check` callback, which returns
    /// true for invalid frames.
    pub fn is_reject(self) -> bool {
        self == Self::Reject
    }
}

/// Control flow outcome of [`MethodExchange::process`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Frame consumed, the exchange continues without a decision
    Continue,
    /// No decision was taken; the dispatcher must invoke `process` again later
    Pending {
        /// Resend the last frame sent to the peer before waiting
        retransmit: bool,
    },
    /// The exchange reached a terminal state
    Done {
        /// Whether the terminal state is success
        success: bool,
    },
}

impl ProcessOutcome {
    /// Whether the dispatcher has to defer and retry.
    pub fn is_pending(self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

/// Factory registered once per method.
pub trait ServerMethod: fmt::Debug + Send + Sync {
    /// Vendor of the method.
    fn vendor(&self) -> Vendor;

    /// Method type within the vendor's space.
    fn method_type(&self) -> MethodType;

    /// Human readable method name, unique in a registry.
    fn name(&self) -> &'static str;

    /// Interface version this method was written against.
    fn interface_version(&self) -> u32 {
        METHOD_INTERFACE_VERSION
    }

    /// Start an exchange initiated by the authenticator.
    fn init(&self, session: &ServerSession) -> Result<Box<dyn MethodExchange>, MethodError>;

    /// Start an exchange the peer began before any request was sent.
    fn init_pick_up(
        &self,
        session: &ServerSession,
    ) -> Result<Box<dyn MethodExchange>, MethodError> {
        let _ = session;
        Err(MethodError::PickUpUnsupported { name: self.name() })
    }
}

/// Per-exchange handle.
pub trait MethodExchange: fmt::Debug + Send {
    /// Build the next request to send with transaction `identifier`.
    fn build_req(&mut self, session: &ServerSession, identifier: u8)
    -> Result<Frame, MethodError>;

    /// Decide whether a received frame may be processed.
    fn check(&self, session: &ServerSession, frame: &Frame) -> FrameCheck;

    /// Consume a received frame.
    fn process(&mut self, session: &mut ServerSession, frame: &Frame) -> ProcessOutcome;

    /// Whether a decision has been taken.
    fn is_done(&self) -> bool;

    /// Whether the decision is success.
    fn is_success(&self) -> bool;

    /// Release the handle at the end of the exchange.
    fn reset(self: Box<Self>) {}
}
