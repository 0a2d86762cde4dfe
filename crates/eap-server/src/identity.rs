//! EAP-Identity server method.
//!
//! The authenticator asks the peer who it is and stores the answer in the
//! session. The exchange is a single round trip:
//!
//! ```text
//! ┌──────────┐  Response/Identity  ┌─────────┐
//! │ Continue │────────────────────>│ Success │
//! └──────────┘                     └─────────┘
//!      │
//!      │ pick-up check failed / identity not stored
//!      ↓
//! ┌─────────┐
//! │ Failure │
//! └─────────┘
//! ```
//!
//! # Pick-up
//!
//! When the peer sends its identity before being asked, the exchange is
//! started with [`ServerMethod::init_pick_up`]. The first processed frame is
//! then validated once more; a frame that fails that check ends the exchange
//! with Failure.
//!
//! # Relay delay
//!
//! An Identity method built with [`IdentityMethod::with_relay`] consults the
//! shared [`RelayCountdown`] before processing anything on relay sessions
//! running the protected method. While the countdown holds, `process` returns
//! [`ProcessOutcome::Pending`] and asks for the last frame to be resent.

use eap_proto::{Frame, MethodType, Vendor, validate};
use tracing::{debug, error, info, trace, warn};

use crate::{
    ExchangeState, FrameCheck, MethodError, MethodExchange, ProcessOutcome, RelayCountdown,
    RelayGate, ServerMethod, ServerSession, diag,
};

/// Identity method factory.
#[derive(Debug, Clone, Default)]
pub struct IdentityMethod {
    relay: Option<RelayCountdown>,
}

impl IdentityMethod {
    /// Registered method name
    pub const NAME: &'static str = "Identity";

    /// Identity method for a regular authenticator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity method that applies the relay delay on qualifying sessions.
    pub fn with_relay(countdown: RelayCountdown) -> Self {
        Self { relay: Some(countdown) }
    }
}

impl ServerMethod for IdentityMethod {
    fn vendor(&self) -> Vendor {
        Vendor::IETF
    }

    fn method_type(&self) -> MethodType {
        MethodType::IDENTITY
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn init(&self, _session: &ServerSession) -> Result<Box<dyn MethodExchange>, MethodError> {
        Ok(Box::new(IdentityExchange::new(self.relay.clone())))
    }

    fn init_pick_up(
        &self,
        _session: &ServerSession,
    ) -> Result<Box<dyn MethodExchange>, MethodError> {
        Ok(Box::new(IdentityExchange::pick_up(self.relay.clone())))
    }
}

/// State of one Identity exchange.
#[derive(Debug)]
pub struct IdentityExchange {
    state: ExchangeState,
    resuming: bool,
    relay: Option<RelayCountdown>,
}

impl IdentityExchange {
    /// Exchange started by sending a request.
    pub fn new(relay: Option<RelayCountdown>) -> Self {
        Self { state: ExchangeState::Continue, resuming: false, relay }
    }

    /// Exchange picked up from a response the peer sent unsolicited.
    pub fn pick_up(relay: Option<RelayCountdown>) -> Self {
        Self { resuming: true, ..Self::new(relay) }
    }

    /// Current state.
    pub fn state(&self) -> ExchangeState {
        self.state
    }

    /// Whether the first response still has to pass the pick-up check.
    pub fn is_resuming(&self) -> bool {
        self.resuming
    }

    fn succeed(&mut self) {
        self.state = ExchangeState::Success;
    }

    fn fail(&mut self) {
        self.state = ExchangeState::Failure;
    }

    fn relay_gate(&self, session: &ServerSession) -> RelayGate {
        match &self.relay {
            Some(countdown) if countdown.applies_to(session) => {
                countdown.gate(session.relay_channel())
            },
            _ => RelayGate::Proceed,
        }
    }
}

impl MethodExchange for IdentityExchange {
    fn build_req(
        &mut self,
        session: &ServerSession,
        identifier: u8,
    ) -> Result<Frame, MethodError> {
        let prompt = session.identity_request_text().unwrap_or_default();
        Frame::request(Vendor::IETF, MethodType::IDENTITY, identifier, &prompt).map_err(|err| {
            error!(error = %err, identifier, "failed to allocate memory for identity request");
            self.fail();
            MethodError::BuildRequest(err)
        })
    }

    fn check(&self, _session: &ServerSession, frame: &Frame) -> FrameCheck {
        match validate(Vendor::IETF, MethodType::IDENTITY, frame) {
            Ok(_) => FrameCheck::Accept,
            Err(err) => {
                info!(error = %err, "invalid identity frame");
                FrameCheck::Reject
            },
        }
    }

    fn process(&mut self, session: &mut ServerSession, frame: &Frame) -> ProcessOutcome {
        if self.state.is_terminal() {
            return ProcessOutcome::Done { success: self.is_success() };
        }

        if self.relay_gate(session) == RelayGate::Hold {
            return ProcessOutcome::Pending { retransmit: true };
        }

        if self.resuming {
            if self.check(session, frame).is_reject() {
                debug!("failed to pick up already started negotiation");
                self.fail();
                return ProcessOutcome::Done { success: false };
            }
            self.resuming = false;
        }

        // Dispatcher runs check() before process(), so this only trips on a
        // dispatcher bug.
        let Ok(payload) = validate(Vendor::IETF, MethodType::IDENTITY, frame) else {
            return ProcessOutcome::Continue;
        };

        trace!(identity = %hex::encode(payload), "peer identity");
        let escaped = diag::escape(payload);
        debug!(len = payload.len(), identity = %escaped, "received identity response");
        session.log_event(&format!("EAP-Response/Identity '{escaped}'"));

        match session.replace_identity(payload) {
            Ok(()) => {
                self.succeed();
                ProcessOutcome::Done { success: true }
            },
            Err(err) => {
                warn!(error = %err, "dropping identity exchange");
                self.fail();
                ProcessOutcome::Done { success: false }
            },
        }
    }

    fn is_done(&self) -> bool {
        self.state.is_terminal()
    }

    fn is_success(&self) -> bool {
        self.state == ExchangeState::Success
    }

    fn reset(self: Box<Self>) {
        trace!(state = ?self.state, "identity exchange released");
    }
}
