//! WhatsApp alerts through Twilio
//!
//! The [`Messenger`] trait is the seam between the HTTP layer and the
//! provider. The process entry point builds one messenger (usually
//! [`TwilioMessenger::from_env`]) and hands it to the server; tests inject a
//! recording implementation instead.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Default Twilio WhatsApp sandbox sender
pub const DEFAULT_WHATSAPP_FROM: &str = "whatsapp:+14155238886";

/// Twilio rejects longer WhatsApp bodies
pub const MAX_MESSAGE_LEN: usize = 4096;

/// Minimum digits in a phone number (country code + subscriber number)
pub const MIN_PHONE_DIGITS: usize = 10;

const TWILIO_API_BASE: &str = "https://api.twilio.com";

/// A message accepted by the provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SentMessage {
    pub sid: String,
    pub status: String,
}

/// Provider account details, used as a connectivity check
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountStatus {
    pub status: String,
    pub friendly_name: Option<String>,
}

/// Outbound messaging collaborator
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Sender address messages go out from
    fn sender(&self) -> &str;

    /// Send a WhatsApp message. `to` must already be a `whatsapp:+...` address.
    async fn send_whatsapp(&self, to: &str, body: &str) -> Result<SentMessage>;

    /// Fetch account status from the provider
    async fn account_status(&self) -> Result<AccountStatus>;
}

/// How a provider error should be reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFailure {
    InvalidRecipient,
    NotAuthorized,
    Other,
}

/// Classify a provider error message
pub fn classify_provider_error(message: &str) -> ProviderFailure {
    let lowered = message.to_lowercase();
    if lowered.contains("not a valid whatsapp") {
        ProviderFailure::InvalidRecipient
    } else if lowered.contains("not authorized") {
        ProviderFailure::NotAuthorized
    } else {
        ProviderFailure::Other
    }
}

/// A phone number needs at least [`MIN_PHONE_DIGITS`] digits once formatting is stripped
pub fn validate_phone_number(phone: &str) -> bool {
    phone.chars().filter(|c| c.is_ascii_digit()).count() >= MIN_PHONE_DIGITS
}

/// Validate a message body, returning a user-facing reason on failure
pub fn validate_message(body: &str) -> std::result::Result<(), String> {
    let body = body.trim();
    if body.is_empty() {
        return Err("Message text is required".to_string());
    }
    if body.chars().count() > MAX_MESSAGE_LEN {
        return Err(format!(
            "Message must be {} characters or less",
            MAX_MESSAGE_LEN
        ));
    }
    Ok(())
}

/// Normalize a phone number to a `whatsapp:+<digits>` address
pub fn whatsapp_address(phone: &str) -> String {
    let phone = phone.trim();
    if phone.starts_with("whatsapp:") {
        return phone.to_string();
    }
    if phone.starts_with('+') {
        format!("whatsapp:{}", phone)
    } else {
        format!("whatsapp:+{}", phone)
    }
}

#[derive(Debug, Deserialize)]
struct TwilioError {
    message: Option<String>,
    code: Option<i64>,
}

/// Twilio REST API client
#[derive(Clone)]
pub struct TwilioMessenger {
    http_client: Client,
    base_url: String,
    account_sid: String,
    auth_token: String,
    from: String,
}

impl TwilioMessenger {
    pub fn new(account_sid: &str, auth_token: &str, from: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: TWILIO_API_BASE.to_string(),
            account_sid: account_sid.to_string(),
            auth_token: auth_token.to_string(),
            from: from.to_string(),
        }
    }

    /// Point the client at a different API host
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Create from `TWILIO_ACCOUNT_SID`, `TWILIO_AUTH_TOKEN` and `TWILIO_WHATSAPP_FROM`.
    ///
    /// Returns `None` when credentials are missing.
    pub fn from_env() -> Option<Self> {
        let sid = std::env::var("TWILIO_ACCOUNT_SID").ok().filter(|s| !s.is_empty());
        let token = std::env::var("TWILIO_AUTH_TOKEN").ok().filter(|s| !s.is_empty());
        let (Some(sid), Some(token)) = (sid, token) else {
            warn!("Twilio credentials not configured; WhatsApp alerts are disabled");
            return None;
        };
        let from = std::env::var("TWILIO_WHATSAPP_FROM")
            .unwrap_or_else(|_| DEFAULT_WHATSAPP_FROM.to_string());
        Some(Self::new(&sid, &token, &from))
    }

    fn account_url(&self) -> String {
        format!("{}/2010-04-01/Accounts/{}", self.base_url, self.account_sid)
    }

    async fn read_error(response: reqwest::Response) -> Error {
        let status = response.status();
        let detail = match response.json::<TwilioError>().await {
            Ok(TwilioError {
                message: Some(message),
                code,
            }) => match code {
                Some(code) => format!("{} (code {})", message, code),
                None => message,
            },
            _ => format!("Twilio returned {}", status),
        };
        Error::Messaging(detail)
    }
}

#[async_trait]
impl Messenger for TwilioMessenger {
    fn sender(&self) -> &str {
        &self.from
    }

    async fn send_whatsapp(&self, to: &str, body: &str) -> Result<SentMessage> {
        let params = [("From", self.from.as_str()), ("To", to), ("Body", body)];

        let response = self
            .http_client
            .post(format!("{}/Messages.json", self.account_url()))
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let sent: SentMessage = response.json().await?;
        debug!(sid = %sent.sid, status = %sent.status, "WhatsApp message accepted");
        Ok(sent)
    }

    async fn account_status(&self) -> Result<AccountStatus> {
        let response = self
            .http_client
            .get(format!("{}.json", self.account_url()))
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_phone_number() {
        assert!(validate_phone_number("+91 98765 43210"));
        assert!(validate_phone_number("9876543210"));
        assert!(!validate_phone_number("+1 555 0100"));
        assert!(!validate_phone_number(""));
    }

    #[test]
    fn test_whatsapp_address() {
        assert_eq!(whatsapp_address("+919876543210"), "whatsapp:+919876543210");
        assert_eq!(whatsapp_address("919876543210"), "whatsapp:+919876543210");
        assert_eq!(
            whatsapp_address("whatsapp:+919876543210"),
            "whatsapp:+919876543210"
        );
    }

    #[test]
    fn test_validate_message() {
        assert!(validate_message("You crossed 80% of your food budget").is_ok());
        assert!(validate_message("   ").is_err());
        assert!(validate_message(&"x".repeat(MAX_MESSAGE_LEN)).is_ok());
        assert!(validate_message(&"x".repeat(MAX_MESSAGE_LEN + 1)).is_err());
    }

    #[test]
    fn test_classify_provider_error() {
        assert_eq!(
            classify_provider_error("Twilio could not find a Channel with the specified From address; 'To' number is not a valid WhatsApp number"),
            ProviderFailure::InvalidRecipient
        );
        assert_eq!(
            classify_provider_error("Account is not authorized to send"),
            ProviderFailure::NotAuthorized
        );
        assert_eq!(
            classify_provider_error("Service unavailable"),
            ProviderFailure::Other
        );
    }

    #[test]
    fn test_base_url_trimmed() {
        let messenger =
            TwilioMessenger::new("AC123", "token", DEFAULT_WHATSAPP_FROM).with_base_url("http://localhost:9000/");
        assert_eq!(
            messenger.account_url(),
            "http://localhost:9000/2010-04-01/Accounts/AC123"
        );
        assert_eq!(messenger.sender(), DEFAULT_WHATSAPP_FROM);
    }
}
