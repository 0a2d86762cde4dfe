//! Minimal authenticator-side dispatcher.
//!
//! Drives one method exchange per session the way an authenticator state
//! machine does, without timers or transport.
//!
//! # Architecture: Action-Based Dispatch
//!
//! - Methods accept frames and return actions for the caller
//! - The caller delivers [`DispatchAction::SendFrame`] and
//!   [`DispatchAction::Retransmit`] frames to the peer
//! - A `Pending` exchange is resumed by [`Dispatcher::retry`], which stands
//!   in for the retransmission timer firing
//!
//! ```text
//! ┌──────┐  start/pick_up  ┌─────────┐  response  ┌──────────┐
//! │ Idle │────────────────>│ Running │───────────>│ Finished │
//! └──────┘                 └─────────┘            └──────────┘
//!                            │     ^
//!                    pending │     │ retry
//!                            ↓     │
//!                          ┌─────────┐
//!                          │ Pending │
//!                          └─────────┘
//! ```
//!
//! The session's current method is left to the caller: tunnelled methods run
//! while the outer method is still the one selected on the session.

use std::sync::Arc;

use eap_proto::{Code, EapHeader, Frame, MethodType, ProtocolError, Vendor};
use eap_server::{MethodError, MethodExchange, MethodRegistry, ProcessOutcome, ServerSession};
use thiserror::Error;
use tracing::{debug, warn};

/// Length of a Success or Failure packet: header only.
const DECISION_LENGTH: u16 = 4;

/// Actions returned by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchAction {
    /// Send this frame to the peer
    SendFrame(Frame),

    /// Send the previous frame again
    Retransmit(Frame),

    /// The exchange reached a decision
    Finished {
        /// Whether the method succeeded
        success: bool,
    },
}

/// Observable dispatcher state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStatus {
    /// No exchange started
    Idle,
    /// Waiting for the peer's response
    Running,
    /// Method deferred its decision; waiting for `retry`
    Pending,
    /// Exchange finished
    Finished {
        /// Whether the method succeeded
        success: bool,
    },
}

/// Dispatcher errors.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No method registered for the requested pair
    #[error("no method registered for {vendor}/{method_type}")]
    UnknownMethod {
        /// Requested vendor
        vendor: Vendor,
        /// Requested method type
        method_type: MethodType,
    },

    /// Method failed
    #[error(transparent)]
    Method(#[from] MethodError),

    /// Final Success/Failure packet could not be encoded
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// No exchange is running
    #[error("no exchange is running")]
    NotRunning,

    /// `retry` called without a deferred frame
    #[error("no deferred frame to retry")]
    NothingPending,
}

/// Drives method exchanges for a single session.
#[derive(Debug)]
pub struct Dispatcher {
    registry: Arc<MethodRegistry>,
    session: ServerSession,
    exchange: Option<Box<dyn MethodExchange>>,
    identifier: u8,
    last_request: Option<Frame>,
    pending: Option<Frame>,
    outcome: Option<bool>,
    retransmissions: usize,
}

impl Dispatcher {
    /// Create a dispatcher whose first request uses identifier 0.
    pub fn new(registry: Arc<MethodRegistry>, session: ServerSession) -> Self {
        Self {
            registry,
            session,
            exchange: None,
            identifier: u8::MAX,
            last_request: None,
            pending: None,
            outcome: None,
            retransmissions: 0,
        }
    }

    /// Use `identifier` for the first request.
    #[must_use]
    pub fn with_first_identifier(mut self, identifier: u8) -> Self {
        self.identifier = identifier.wrapping_sub(1);
        self
    }

    /// Session the methods run against.
    pub fn session(&self) -> &ServerSession {
        &self.session
    }

    /// Mutable session access for the caller.
    pub fn session_mut(&mut self) -> &mut ServerSession {
        &mut self.session
    }

    /// Current status.
    pub fn status(&self) -> DispatchStatus {
        if let Some(success) = self.outcome {
            return DispatchStatus::Finished { success };
        }
        match (&self.exchange, &self.pending) {
            (None, _) => DispatchStatus::Idle,
            (Some(_), Some(_)) => DispatchStatus::Pending,
            (Some(_), None) => DispatchStatus::Running,
        }
    }

    /// Number of retransmissions requested by methods so far.
    pub fn retransmissions(&self) -> usize {
        self.retransmissions
    }

    /// Last request sent to the peer.
    pub fn last_request(&self) -> Option<&Frame> {
        self.last_request.as_ref()
    }

    /// Start an authenticator-initiated exchange and build the first request.
    pub fn start(
        &mut self,
        vendor: Vendor,
        method_type: MethodType,
    ) -> Result<Vec<DispatchAction>, DispatchError> {
        self.release();
        let method = self
            .registry
            .get(vendor, method_type)
            .ok_or(DispatchError::UnknownMethod { vendor, method_type })?;

        debug!(method = method.name(), "starting exchange");
        self.exchange = Some(method.init(&self.session)?);
        self.next_request()
    }

    /// Pick up an exchange from a response the peer sent unsolicited.
    ///
    /// The frame goes straight to `process`; the method validates it itself.
    pub fn pick_up(
        &mut self,
        vendor: Vendor,
        method_type: MethodType,
        frame: Frame,
    ) -> Result<Vec<DispatchAction>, DispatchError> {
        self.release();
        let method = self
            .registry
            .get(vendor, method_type)
            .ok_or(DispatchError::UnknownMethod { vendor, method_type })?;

        debug!(method = method.name(), identifier = frame.identifier(), "picking up exchange");
        self.exchange = Some(method.init_pick_up(&self.session)?);
        self.identifier = frame.identifier();
        self.run_process(frame)
    }

    /// Deliver a response from the peer.
    ///
    /// Responses with a stale identifier or that the method rejects are
    /// dropped without changing state.
    pub fn handle_response(&mut self, frame: Frame) -> Result<Vec<DispatchAction>, DispatchError> {
        let exchange = self.exchange.as_ref().ok_or(DispatchError::NotRunning)?;

        if frame.identifier() != self.identifier {
            warn!(
                expected = self.identifier,
                found = frame.identifier(),
                "dropping response with unexpected identifier"
            );
            return Ok(Vec::new());
        }

        if exchange.check(&self.session, &frame).is_reject() {
            debug!("method rejected response");
            return Ok(Vec::new());
        }

        self.run_process(frame)
    }

    /// Re-run `process` on the deferred frame.
    pub fn retry(&mut self) -> Result<Vec<DispatchAction>, DispatchError> {
        let frame = self.pending.take().ok_or(DispatchError::NothingPending)?;
        self.run_process(frame)
    }

    fn run_process(&mut self, frame: Frame) -> Result<Vec<DispatchAction>, DispatchError> {
        let exchange = self.exchange.as_mut().ok_or(DispatchError::NotRunning)?;

        let outcome = exchange.process(&mut self.session, &frame);
        if let ProcessOutcome::Pending { retransmit } = outcome {
            return Ok(self.defer(frame, retransmit));
        }

        self.pending = None;
        if exchange.is_done() { self.finish() } else { self.next_request() }
    }

    fn defer(&mut self, frame: Frame, retransmit: bool) -> Vec<DispatchAction> {
        self.pending = Some(frame);
        let mut actions = Vec::new();
        if retransmit {
            if let Some(last) = &self.last_request {
                self.retransmissions += 1;
                actions.push(DispatchAction::Retransmit(last.clone()));
            }
        }
        actions
    }

    fn next_request(&mut self) -> Result<Vec<DispatchAction>, DispatchError> {
        let exchange = self.exchange.as_mut().ok_or(DispatchError::NotRunning)?;
        let identifier = self.identifier.wrapping_add(1);

        match exchange.build_req(&self.session, identifier) {
            Ok(frame) => {
                self.identifier = identifier;
                self.last_request = Some(frame.clone());
                Ok(vec![DispatchAction::SendFrame(frame)])
            },
            Err(err) => {
                self.release();
                self.outcome = Some(false);
                Err(err.into())
            },
        }
    }

    fn finish(&mut self) -> Result<Vec<DispatchAction>, DispatchError> {
        let success = self.exchange.as_ref().is_some_and(|exchange| exchange.is_success());
        self.release();
        self.outcome = Some(success);

        let code = if success { Code::Success } else { Code::Failure };
        let header = EapHeader::new(code, self.identifier, DECISION_LENGTH);
        let frame = Frame::from_bytes(header.to_bytes().to_vec())?;
        debug!(success, "exchange finished");

        Ok(vec![DispatchAction::SendFrame(frame), DispatchAction::Finished { success }])
    }

    fn release(&mut self) {
        if let Some(exchange) = self.exchange.take() {
            exchange.reset();
        }
        self.pending = None;
        self.outcome = None;
    }
}
