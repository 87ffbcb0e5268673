use crate::domain::validation::ValidationError;
use crate::domain::value::{
    ApplicationSid, CallbackUrl, MessageBody, MessagingServiceSid, RawPhoneNumber,
};

/// Maximum number of `MediaUrl` values accepted per message.
pub const MAX_MEDIA_URLS: usize = 10;

/// Who a message is sent from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sender {
    /// A Twilio number or alphanumeric sender (`From`).
    From(RawPhoneNumber),
    /// A messaging service that picks the sender (`MessagingServiceSid`).
    MessagingService(MessagingServiceSid),
}

/// What Twilio keeps of the addresses in message logs (`AddressRetention`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressRetention {
    Retain,
    Obfuscate,
}

impl AddressRetention {
    pub const FIELD: &'static str = "AddressRetention";

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Retain => "retain",
            Self::Obfuscate => "obfuscate",
        }
    }
}

/// What Twilio keeps of the message content in message logs (`ContentRetention`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentRetention {
    Retain,
    Discard,
}

impl ContentRetention {
    pub const FIELD: &'static str = "ContentRetention";

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Retain => "retain",
            Self::Discard => "discard",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    pub status_callback: Option<CallbackUrl>,
    pub application_sid: Option<ApplicationSid>,
    pub address_retention: Option<AddressRetention>,
    pub content_retention: Option<ContentRetention>,
}

/// Create-message request for the Messages resource (SMS, MMS or WhatsApp).
#[derive(Debug, Clone)]
pub struct SendMessage {
    to: RawPhoneNumber,
    sender: Sender,
    body: MessageBody,
    media_urls: Vec<CallbackUrl>,
    options: SendOptions,
}

impl SendMessage {
    /// Plain text message.
    pub fn sms(to: RawPhoneNumber, sender: Sender, body: MessageBody, options: SendOptions) -> Self {
        Self {
            to,
            sender,
            body,
            media_urls: Vec::new(),
            options,
        }
    }

    /// Multimedia message with `1..=MAX_MEDIA_URLS` media attachments.
    pub fn mms(
        to: RawPhoneNumber,
        sender: Sender,
        body: MessageBody,
        media_urls: Vec<CallbackUrl>,
        options: SendOptions,
    ) -> Result<Self, ValidationError> {
        if media_urls.is_empty() {
            return Err(ValidationError::Empty { field: "MediaUrl" });
        }
        if media_urls.len() > MAX_MEDIA_URLS {
            return Err(ValidationError::TooManyMediaUrls {
                max: MAX_MEDIA_URLS,
                actual: media_urls.len(),
            });
        }
        Ok(Self {
            to,
            sender,
            body,
            media_urls,
            options,
        })
    }

    /// WhatsApp message; both addresses get the `whatsapp:` prefix.
    pub fn whatsapp(
        to: &RawPhoneNumber,
        from: &RawPhoneNumber,
        body: MessageBody,
        options: SendOptions,
    ) -> Self {
        Self::sms(to.whatsapp(), Sender::From(from.whatsapp()), body, options)
    }

    pub fn to(&self) -> &RawPhoneNumber {
        &self.to
    }

    pub fn sender(&self) -> &Sender {
        &self.sender
    }

    pub fn body(&self) -> &MessageBody {
        &self.body
    }

    pub fn media_urls(&self) -> &[CallbackUrl] {
        &self.media_urls
    }

    pub fn options(&self) -> &SendOptions {
        &self.options
    }
}
