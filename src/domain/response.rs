use std::fmt;

use crate::domain::value::MessageSid;

/// Delivery status of a message.
///
/// Unknown values are preserved as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageStatus {
    Accepted,
    Scheduled,
    Queued,
    Sending,
    Sent,
    Delivered,
    Undelivered,
    Failed,
    Receiving,
    Received,
    Read,
    Canceled,
    Other(String),
}

impl MessageStatus {
    pub fn from_wire(value: &str) -> Self {
        match value {
            "accepted" => Self::Accepted,
            "scheduled" => Self::Scheduled,
            "queued" => Self::Queued,
            "sending" => Self::Sending,
            "sent" => Self::Sent,
            "delivered" => Self::Delivered,
            "undelivered" => Self::Undelivered,
            "failed" => Self::Failed,
            "receiving" => Self::Receiving,
            "received" => Self::Received,
            "read" => Self::Read,
            "canceled" => Self::Canceled,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Returns `true` once the message will not change status anymore.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            Self::Delivered
                | Self::Undelivered
                | Self::Failed
                | Self::Received
                | Self::Read
                | Self::Canceled
        )
    }
}

/// Message resource as returned by create and fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageResponse {
    pub sid: MessageSid,
    pub account_sid: String,
    pub messaging_service_sid: Option<String>,
    pub to: String,
    pub from: Option<String>,
    pub body: String,
    pub status: MessageStatus,
    pub direction: Option<String>,
    pub num_segments: Option<u32>,
    pub num_media: Option<u32>,
    pub price: Option<String>,
    pub price_unit: Option<String>,
    pub error_code: Option<i64>,
    pub error_message: Option<String>,
    pub date_created: Option<String>,
    pub date_updated: Option<String>,
    pub date_sent: Option<String>,
    pub api_version: Option<String>,
    pub uri: Option<String>,
}

/// Error document Twilio returns with non-success HTTP statuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiException {
    /// HTTP status echoed in the body.
    pub status: u16,
    pub message: String,
    /// Twilio error code (see `more_info`).
    pub code: Option<i64>,
    pub more_info: Option<String>,
}

impl fmt::Display for ApiException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: status code: {}", self.message, self.status)?;
        if let Some(code) = self.code {
            write!(f, ", error code: {code}")?;
        }
        if let Some(more_info) = self.more_info.as_deref() {
            write!(f, ", info: {more_info}")?;
        }
        Ok(())
    }
}
