//! Method registry.
//!
//! The authenticator looks methods up by the (vendor, type) pair found in a
//! peer's response, and by name when reading its own configuration.

use std::{collections::BTreeMap, sync::Arc};

use eap_proto::{MethodType, Vendor};
use tracing::debug;

use crate::{IdentityMethod, METHOD_INTERFACE_VERSION, MethodError, RelayCountdown, ServerMethod};

/// Registered server methods keyed by (vendor, type).
#[derive(Debug, Default)]
pub struct MethodRegistry {
    methods: BTreeMap<(Vendor, MethodType), Arc<dyn ServerMethod>>,
}

impl MethodRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a method.
    ///
    /// # Errors
    ///
    /// - `InterfaceVersion` if the method targets another interface version
    /// - `DuplicateMethod` if the (vendor, type) pair or the name is taken
    pub fn register(&mut self, method: Arc<dyn ServerMethod>) -> Result<(), MethodError> {
        let name = method.name();
        let vendor = method.vendor();
        let method_type = method.method_type();

        let found = method.interface_version();
        if found != METHOD_INTERFACE_VERSION {
            return Err(MethodError::InterfaceVersion {
                name,
                expected: METHOD_INTERFACE_VERSION,
                found,
            });
        }

        let key = (vendor, method_type);
        if self.methods.contains_key(&key) || self.get_by_name(name).is_some() {
            return Err(MethodError::DuplicateMethod { name, vendor, method_type });
        }

        debug!(name, %vendor, %method_type, "registered server method");
        self.methods.insert(key, method);
        Ok(())
    }

    /// Look up a method by (vendor, type).
    pub fn get(&self, vendor: Vendor, method_type: MethodType) -> Option<Arc<dyn ServerMethod>> {
        self.methods.get(&(vendor, method_type)).cloned()
    }

    /// Look up a method by name, ignoring ASCII case.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn ServerMethod>> {
        self.methods.values().find(|method| method.name().eq_ignore_ascii_case(name)).cloned()
    }

    /// Names of all registered methods in (vendor, type) order.
    pub fn names(&self) -> Vec<&'static str> {
        self.methods.values().map(|method| method.name()).collect()
    }

    /// Number of registered methods.
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Whether no method is registered.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

/// Register the Identity method, with the relay delay when `relay` is given.
pub fn register_identity(
    registry: &mut MethodRegistry,
    relay: Option<RelayCountdown>,
) -> Result<(), MethodError> {
    let method = match relay {
        Some(countdown) => IdentityMethod::with_relay(countdown),
        None => IdentityMethod::new(),
    };
    registry.register(Arc::new(method))
}
