//! Host callbacks that record what a method reports.

use std::sync::{Mutex, PoisonError};

use eap_server::SessionCallbacks;

/// Session callbacks with a fixed prompt and an in-memory event log.
#[derive(Debug, Default)]
pub struct RecordingHost {
    prompt: Option<Vec<u8>>,
    events: Mutex<Vec<String>>,
}

impl RecordingHost {
    /// Host without an identity prompt.
    pub fn new() -> Self {
        Self::default()
    }

    /// Host that sends `prompt` in Identity requests.
    pub fn with_prompt(prompt: impl Into<Vec<u8>>) -> Self {
        Self { prompt: Some(prompt.into()), events: Mutex::new(Vec::new()) }
    }

    /// Events logged so far.
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl SessionCallbacks for RecordingHost {
    fn identity_request_text(&self) -> Option<Vec<u8>> {
        self.prompt.clone()
    }

    fn log_event(&self, message: &str) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(message.to_string());
    }
}
