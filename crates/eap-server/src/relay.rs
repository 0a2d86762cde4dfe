//! Relay delay controller.
//!
//! A relay sits between a peer and a real server and runs an Identity
//! exchange towards the peer while its own peer half runs a protected (PEAP)
//! method towards the server. The relay must not resolve the peer's identity
//! until that inner method has reached the point where it can continue with
//! phase 2, so Identity processing is held back for a bounded number of
//! rounds.
//!
//! # Countdown
//!
//! ```text
//! ┌───────────────┐  qualifying process()   ┌───────────────┐
//! │ Active(n > 1) │────────────────────────>│ Active(n - 1) │  Hold + retransmit
//! └───────────────┘                         └───────────────┘
//!         │
//!         │ n reaches 0, or inner method ready
//!         ↓
//! ┌──────────┐
//! │ Disabled │  Proceed, forever
//! └──────────┘
//! ```
//!
//! The countdown is one object shared by every Identity method instance it
//! is handed to, and therefore by every exchange those instances run. Once
//! one exchange has exhausted or short-circuited it, no other exchange is
//! delayed again. Concurrent relay exchanges drain the same budget.

use std::sync::{Arc, Mutex, PoisonError};

use eap_proto::MethodType;
use tracing::debug;

use crate::{InstanceRole, ServerSession};

/// Phase of the relay's inner method, as seen by the Identity exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RelayPhase {
    /// Inner method has not reached phase 2
    #[default]
    Idle,
    /// Inner method is waiting for the identity exchange to continue
    AwaitingContinuation,
    /// Identity exchange released the inner method
    Continuing,
}

/// Narrow view of the inner method run by the relay's peer half.
pub trait RelayChannel: Send + Sync {
    /// Current phase of the inner method.
    fn phase(&self) -> RelayPhase;

    /// Whether the inner method holds data to relay to the peer.
    fn has_relay_payload(&self) -> bool;

    /// Move from `from` to `to`. Returns false if the phase was not `from`.
    fn advance(&self, from: RelayPhase, to: RelayPhase) -> bool;
}

/// Relay delay configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayConfig {
    /// Countdown start value. The first `initial_rounds - 1` qualifying calls
    /// are held.
    pub initial_rounds: u32,
    /// Outer method type that marks a session as running the relayed method
    pub protected_method: MethodType,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self { initial_rounds: 10, protected_method: MethodType::PEAP }
    }
}

/// Decision of [`RelayCountdown::gate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayGate {
    /// Continue with normal processing
    Proceed,
    /// Defer: retransmit the last frame and try again later
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Countdown {
    Active { remaining: u32 },
    Disabled,
}

/// Countdown shared by all relay-capable Identity exchanges.
#[derive(Debug, Clone)]
pub struct RelayCountdown {
    config: RelayConfig,
    state: Arc<Mutex<Countdown>>,
}

impl RelayCountdown {
    /// Create a countdown. A zero start value disables it immediately.
    pub fn new(config: RelayConfig) -> Self {
        let state = match config.initial_rounds {
            0 => Countdown::Disabled,
            remaining => Countdown::Active { remaining },
        };
        Self { config, state: Arc::new(Mutex::new(state)) }
    }

    /// Configuration this countdown was created with.
    pub fn config(&self) -> RelayConfig {
        self.config
    }

    /// Rounds left, `None` once disabled.
    pub fn remaining(&self) -> Option<u32> {
        match *self.lock() {
            Countdown::Active { remaining } => Some(remaining),
            Countdown::Disabled => None,
        }
    }

    /// Whether the delay has ended for good.
    pub fn is_disabled(&self) -> bool {
        self.remaining().is_none()
    }

    /// Whether `session` qualifies for the delay.
    pub fn applies_to(&self, session: &ServerSession) -> bool {
        session.role() == InstanceRole::RelayServer
            && session.current_method() == Some(self.config.protected_method)
    }

    /// Run one round of the countdown.
    ///
    /// Call once per qualifying `process` invocation. `channel` is the
    /// relay's inner method; without one the countdown simply runs out.
    pub fn gate(&self, channel: Option<&dyn RelayChannel>) -> RelayGate {
        let mut state = self.lock();
        let Countdown::Active { remaining } = *state else {
            return RelayGate::Proceed;
        };

        if remaining == self.config.initial_rounds {
            debug!(rounds = remaining, "relay delay loop started");
        }

        let remaining = remaining - 1;
        let released = remaining > 0 && channel.is_some_and(release_inner);
        if remaining > 0 && !released {
            *state = Countdown::Active { remaining };
            debug!(remaining, "holding identity until relay peer is ready");
            return RelayGate::Hold;
        }

        *state = Countdown::Disabled;
        debug!(remaining, released, "relay delay loop ended");
        RelayGate::Proceed
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Countdown> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn release_inner(channel: &dyn RelayChannel) -> bool {
    if channel.phase() != RelayPhase::AwaitingContinuation || !channel.has_relay_payload() {
        return false;
    }
    let advanced = channel.advance(RelayPhase::AwaitingContinuation, RelayPhase::Continuing);
    if advanced {
        debug!("relay peer ready, continuing identity exchange");
    }
    advanced
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::atomic::{AtomicBool, Ordering},
    };

    use super::*;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn captured(level: tracing::Level, run: impl FnOnce()) -> String {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, run);
        let bytes = capture.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[derive(Default)]
    struct Inner {
        phase: Mutex<RelayPhase>,
        payload: AtomicBool,
    }

    impl Inner {
        fn ready() -> Self {
            Self {
                phase: Mutex::new(RelayPhase::AwaitingContinuation),
                payload: AtomicBool::new(true),
            }
        }
    }

    impl RelayChannel for Inner {
        fn phase(&self) -> RelayPhase {
            *self.phase.lock().unwrap()
        }

        fn has_relay_payload(&self) -> bool {
            self.payload.load(Ordering::SeqCst)
        }

        fn advance(&self, from: RelayPhase, to: RelayPhase) -> bool {
            let mut phase = self.phase.lock().unwrap();
            if *phase != from {
                return false;
            }
            *phase = to;
            true
        }
    }

    #[test]
    fn nine_holds_then_proceed() {
        let countdown = RelayCountdown::new(RelayConfig::default());
        for round in 0..9 {
            assert_eq!(countdown.gate(None), RelayGate::Hold, "round {round}");
        }
        assert_eq!(countdown.remaining(), Some(1));
        assert_eq!(countdown.gate(None), RelayGate::Proceed);
        assert!(countdown.is_disabled());
    }

    #[test]
    fn disabled_countdown_never_holds() {
        let countdown = RelayCountdown::new(RelayConfig { initial_rounds: 2, ..Default::default() });
        assert_eq!(countdown.gate(None), RelayGate::Hold);
        assert_eq!(countdown.gate(None), RelayGate::Proceed);
        for _ in 0..20 {
            assert_eq!(countdown.gate(None), RelayGate::Proceed);
        }
    }

    #[test]
    fn zero_rounds_starts_disabled() {
        let countdown = RelayCountdown::new(RelayConfig { initial_rounds: 0, ..Default::default() });
        assert!(countdown.is_disabled());
        assert_eq!(countdown.gate(None), RelayGate::Proceed);
    }

    #[test]
    fn ready_inner_method_short_circuits() {
        let countdown = RelayCountdown::new(RelayConfig::default());
        let inner = Inner::ready();

        assert_eq!(countdown.gate(Some(&inner)), RelayGate::Proceed);
        assert!(countdown.is_disabled());
        assert_eq!(inner.phase(), RelayPhase::Continuing);
    }

    #[test]
    fn awaiting_without_payload_keeps_holding() {
        let countdown = RelayCountdown::new(RelayConfig::default());
        let inner = Inner::ready();
        inner.payload.store(false, Ordering::SeqCst);

        assert_eq!(countdown.gate(Some(&inner)), RelayGate::Hold);
        assert_eq!(inner.phase(), RelayPhase::AwaitingContinuation);

        inner.payload.store(true, Ordering::SeqCst);
        assert_eq!(countdown.gate(Some(&inner)), RelayGate::Proceed);
        assert_eq!(inner.phase(), RelayPhase::Continuing);
    }

    #[test]
    fn inner_method_untouched_on_last_round() {
        let countdown = RelayCountdown::new(RelayConfig { initial_rounds: 1, ..Default::default() });
        let inner = Inner::ready();

        assert_eq!(countdown.gate(Some(&inner)), RelayGate::Proceed);
        assert_eq!(inner.phase(), RelayPhase::AwaitingContinuation);
    }

    #[test]
    fn clones_share_the_budget() {
        let countdown = RelayCountdown::new(RelayConfig { initial_rounds: 3, ..Default::default() });
        let other = countdown.clone();

        assert_eq!(countdown.gate(None), RelayGate::Hold);
        assert_eq!(other.gate(None), RelayGate::Hold);
        assert_eq!(countdown.gate(None), RelayGate::Proceed);
        assert!(other.is_disabled());
    }

    #[test]
    fn qualification() {
        let countdown = RelayCountdown::new(RelayConfig::default());

        let mut session = ServerSession::new().with_role(InstanceRole::RelayServer);
        assert!(!countdown.applies_to(&session));

        session.set_current_method(MethodType::PEAP);
        assert!(countdown.applies_to(&session));

        let mut plain = ServerSession::new();
        plain.set_current_method(MethodType::PEAP);
        assert!(!countdown.applies_to(&plain));

        let mut other_method = ServerSession::new().with_role(InstanceRole::RelayServer);
        other_method.set_current_method(MethodType::TTLS);
        assert!(!countdown.applies_to(&other_method));
    }

    #[test]
    fn loop_start_and_end_share_a_level() {
        let run = || {
            let config = RelayConfig { initial_rounds: 2, ..RelayConfig::default() };
            let countdown = RelayCountdown::new(config);
            countdown.gate(None);
            countdown.gate(None);
        };

        let info = captured(tracing::Level::INFO, run);
        assert!(!info.contains("relay delay loop"));

        let debug = captured(tracing::Level::DEBUG, run);
        assert!(debug.contains("DEBUG") && debug.contains("relay delay loop started"));
        assert!(debug.contains("relay delay loop ended"));
    }
}
