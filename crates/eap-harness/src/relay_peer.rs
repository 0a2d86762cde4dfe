//! Simulated inner method of a relay.
//!
//! In a relay the peer half runs a protected method against the real server
//! while the server half runs Identity against the victim. This stand-in only
//! models the part the Identity exchange can see: the phase flag and whether
//! data is waiting to be relayed.

use std::sync::{
    Mutex, PoisonError,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use eap_server::{RelayChannel, RelayPhase};
use tracing::trace;

/// Inner method state shared between the relay's two halves.
#[derive(Debug, Default)]
pub struct SimRelayPeer {
    phase: Mutex<RelayPhase>,
    payload: AtomicBool,
    advances: AtomicUsize,
}

impl SimRelayPeer {
    /// Inner method that has not reached phase 2.
    pub fn new() -> Self {
        Self::default()
    }

    /// Force the phase flag.
    pub fn set_phase(&self, phase: RelayPhase) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = phase;
    }

    /// Set whether data is waiting to be relayed.
    pub fn set_payload(&self, present: bool) {
        self.payload.store(present, Ordering::SeqCst);
    }

    /// Inner method reached phase 2 with data to relay.
    pub fn mark_ready(&self) {
        self.set_payload(true);
        self.set_phase(RelayPhase::AwaitingContinuation);
    }

    /// Number of successful phase advances.
    pub fn advances(&self) -> usize {
        self.advances.load(Ordering::SeqCst)
    }
}

impl RelayChannel for SimRelayPeer {
    fn phase(&self) -> RelayPhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn has_relay_payload(&self) -> bool {
        self.payload.load(Ordering::SeqCst)
    }

    fn advance(&self, from: RelayPhase, to: RelayPhase) -> bool {
        let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        if *phase != from {
            return false;
        }
        trace!(?from, ?to, "inner method phase advanced");
        *phase = to;
        self.advances.fetch_add(1, Ordering::SeqCst);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_is_compare_and_set() {
        let peer = SimRelayPeer::new();
        assert!(!peer.advance(RelayPhase::AwaitingContinuation, RelayPhase::Continuing));
        assert_eq!(peer.phase(), RelayPhase::Idle);

        peer.mark_ready();
        assert!(peer.has_relay_payload());
        assert!(peer.advance(RelayPhase::AwaitingContinuation, RelayPhase::Continuing));
        assert_eq!(peer.phase(), RelayPhase::Continuing);
        assert_eq!(peer.advances(), 1);
    }
}
