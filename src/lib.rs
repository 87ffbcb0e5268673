//! Typed Rust client for the Twilio REST API.
//!
//! The crate follows three layers: a domain layer of strong types (no I/O), a transport
//! layer for wire-format quirks (form encoding, JSON decoding, JWT and HMAC signing), and a
//! small client layer orchestrating requests.
//!
//! Besides REST calls it covers Twilio's two signed credentials:
//! - [`AccessToken`]: HS256 JWTs carrying [`Grant`]s for the client SDKs,
//! - [`webhook::validate`]: `X-Twilio-Signature` checks for inbound webhooks.
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use twilio_typed::{Credentials, TwilioClient, VideoGrant};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = Credentials::new("AC...", "auth-token")?.with_api_key("SK...", "secret")?;
//! let client = TwilioClient::new(credentials);
//!
//! let jwt = client
//!     .new_access_token()?
//!     .with_identity("alice")
//!     .valid_for(Duration::from_secs(3600))
//!     .with_grant(VideoGrant::new().room("standup"))?
//!     .to_jwt()?;
//! # let _ = jwt;
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
mod transport;
pub mod webhook;

pub use client::{ApiKey, Credentials, TwilioClient, TwilioClientBuilder, TwilioError};
pub use domain::{
    AccessToken, AccessTokenError, AccountSid, ApiException, ApiKeySecret, ApiKeySid, AuthToken,
    CustomGrant, Grant, MessageBody, MessageResponse, MessageSid, MessageStatus, PhoneNumber,
    RawPhoneNumber, SendMessage, SendOptions, Sender, UnixTimestamp, ValidationError, VideoGrant,
    VoiceGrant,
};
pub use transport::ACCESS_TOKEN_CONTENT_TYPE;
pub use webhook::{FormFields, SIGNATURE_HEADER, WebhookError, WebhookRequest};
