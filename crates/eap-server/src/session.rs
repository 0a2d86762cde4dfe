//! Per-peer session context.
//!
//! The session outlives individual method exchanges. It carries what the
//! surrounding authenticator knows about the peer (the identity received so
//! far, which method is currently running) plus the hooks a method may call
//! back into.

use std::{collections::TryReserveError, fmt, sync::Arc};

use eap_proto::MethodType;

use crate::{MethodError, RelayChannel};

/// Role of the authenticator instance that owns the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InstanceRole {
    /// Regular authenticator
    #[default]
    Server,
    /// Authenticator half of a relay that also runs a peer towards the real
    /// server
    RelayServer,
}

/// Hooks provided by the host authenticator.
pub trait SessionCallbacks: Send + Sync {
    /// Text sent in Identity requests, `None` for an empty prompt.
    fn identity_request_text(&self) -> Option<Vec<u8>> {
        None
    }

    /// Receive a human readable event for the host's session log.
    fn log_event(&self, message: &str) {
        let _ = message;
    }
}

/// Identity reported by the peer.
///
/// Always backed by an allocation of at least one byte, including for an
/// empty identity.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    bytes: Vec<u8>,
}

impl Identity {
    /// Copy `src` into a new buffer.
    pub fn copy_from(src: &[u8]) -> Result<Self, TryReserveError> {
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(src.len().max(1))?;
        bytes.extend_from_slice(src);
        Ok(Self { bytes })
    }

    /// Identity bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Identity length.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the peer sent an empty identity.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Size of the backing allocation.
    pub fn allocated(&self) -> usize {
        self.bytes.capacity()
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Identity").field(&crate::diag::escape(&self.bytes)).finish()
    }
}

impl PartialEq<[u8]> for Identity {
    fn eq(&self, other: &[u8]) -> bool {
        self.bytes == other
    }
}

/// Session context shared by the methods run for one peer.
#[derive(Clone, Default)]
pub struct ServerSession {
    role: InstanceRole,
    current_method: Option<MethodType>,
    identity: Option<Identity>,
    update_user: bool,
    identity_limit: Option<usize>,
    callbacks: Option<Arc<dyn SessionCallbacks>>,
    relay_channel: Option<Arc<dyn RelayChannel>>,
}

impl ServerSession {
    /// Create a session for a regular authenticator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the role of the owning instance.
    #[must_use]
    pub fn with_role(mut self, role: InstanceRole) -> Self {
        self.role = role;
        self
    }

    /// Refuse to store identities longer than `max` bytes.
    #[must_use]
    pub fn with_identity_limit(mut self, max: usize) -> Self {
        self.identity_limit = Some(max);
        self
    }

    /// Attach host callbacks.
    #[must_use]
    pub fn with_callbacks(mut self, callbacks: Arc<dyn SessionCallbacks>) -> Self {
        self.callbacks = Some(callbacks);
        self
    }

    /// Attach the channel to the inner method run by the relay's peer half.
    #[must_use]
    pub fn with_relay_channel(mut self, channel: Arc<dyn RelayChannel>) -> Self {
        self.relay_channel = Some(channel);
        self
    }

    /// Role of the owning instance.
    pub fn role(&self) -> InstanceRole {
        self.role
    }

    /// Method currently selected for the session.
    pub fn current_method(&self) -> Option<MethodType> {
        self.current_method
    }

    /// Record the method the authenticator selected.
    pub fn set_current_method(&mut self, method_type: MethodType) {
        self.current_method = Some(method_type);
    }

    /// Identity received so far.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Whether the identity changed after the user was first looked up.
    pub fn update_user(&self) -> bool {
        self.update_user
    }

    /// Acknowledge an identity change after redoing the user lookup.
    pub fn clear_update_user(&mut self) {
        self.update_user = false;
    }

    /// Replace the stored identity with a copy of `src`.
    ///
    /// Any previous identity is released first and flags the session for a
    /// new user lookup. When the copy cannot be stored the session is left
    /// without an identity.
    ///
    /// # Errors
    ///
    /// - `IdentityTooLong` if `src` exceeds the session's identity limit
    /// - `IdentityAllocation` if the buffer cannot be reserved
    pub fn replace_identity(&mut self, src: &[u8]) -> Result<(), MethodError> {
        if self.identity.take().is_some() {
            self.update_user = true;
        }
        let len = src.len();
        if let Some(max) = self.identity_limit.filter(|&max| len > max) {
            return Err(MethodError::IdentityTooLong { len, max });
        }
        let identity = Identity::copy_from(src)
            .map_err(|source| MethodError::IdentityAllocation { len, source })?;
        self.identity = Some(identity);
        Ok(())
    }

    /// Prompt text for Identity requests, if the host provides one.
    pub fn identity_request_text(&self) -> Option<Vec<u8>> {
        self.callbacks.as_ref().and_then(|callbacks| callbacks.identity_request_text())
    }

    /// Forward an event to the host's session log.
    pub fn log_event(&self, message: &str) {
        if let Some(callbacks) = &self.callbacks {
            callbacks.log_event(message);
        }
    }

    /// Channel to the relay's inner method, if attached.
    pub fn relay_channel(&self) -> Option<&dyn RelayChannel> {
        self.relay_channel.as_deref()
    }
}

impl fmt::Debug for ServerSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerSession")
            .field("role", &self.role)
            .field("current_method", &self.current_method)
            .field("identity", &self.identity)
            .field("update_user", &self.update_user)
            .field("identity_limit", &self.identity_limit)
            .field("callbacks", &self.callbacks.is_some())
            .field("relay_channel", &self.relay_channel.is_some())
            .finish()
    }
}
