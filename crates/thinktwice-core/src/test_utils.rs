//! Test utilities for thinktwice-core
//!
//! A [`Messenger`] that records outgoing messages instead of calling a
//! provider, with optional scripted failures.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::messaging::{AccountStatus, Messenger, SentMessage, DEFAULT_WHATSAPP_FROM};

/// Recording messenger for server and integration tests
#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<(String, String)>>,
    fail_with: Option<String>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every send fails with this provider message
    pub fn failing(message: &str) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_with: Some(message.to_string()),
        }
    }

    /// Messages sent so far as (to, body)
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    fn sender(&self) -> &str {
        DEFAULT_WHATSAPP_FROM
    }

    async fn send_whatsapp(&self, to: &str, body: &str) -> Result<SentMessage> {
        if let Some(ref message) = self.fail_with {
            return Err(Error::Messaging(message.clone()));
        }

        let mut sent = self
            .sent
            .lock()
            .map_err(|_| Error::Messaging("recorder poisoned".into()))?;
        sent.push((to.to_string(), body.to_string()));

        Ok(SentMessage {
            sid: format!("SM{:032}", sent.len()),
            status: "queued".to_string(),
        })
    }

    async fn account_status(&self) -> Result<AccountStatus> {
        if let Some(ref message) = self.fail_with {
            return Err(Error::Messaging(message.clone()));
        }
        Ok(AccountStatus {
            status: "active".to_string(),
            friendly_name: Some("Test Account".to_string()),
        })
    }
}
