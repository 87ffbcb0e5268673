//! Typed views over common webhook payloads.
//!
//! Decode only after [`super::validate`] has accepted the request.

use serde::Deserialize;

use super::{FormFields, WebhookError};

/// Incoming SMS/MMS/WhatsApp message webhook.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InboundMessage {
    pub message_sid: String,
    pub account_sid: String,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub messaging_service_sid: Option<String>,
    #[serde(default)]
    pub num_segments: Option<String>,
    #[serde(default)]
    num_media: Option<String>,
    /// `MediaUrl0..MediaUrl{NumMedia-1}`, in order.
    #[serde(skip)]
    pub media_urls: Vec<String>,
}

impl InboundMessage {
    pub fn from_form(form: &FormFields) -> Result<Self, WebhookError> {
        let mut message: Self = form.decode()?;
        message.media_urls = (0..message.num_media())
            .filter_map(|idx| form.get(&format!("MediaUrl{idx}")).map(str::to_owned))
            .collect();
        Ok(message)
    }

    /// Number of attached media items (`NumMedia`), `0` when absent or unparsable.
    pub fn num_media(&self) -> usize {
        self.num_media
            .as_deref()
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(0)
    }
}

/// JSON carried in the `interactionData` field of proxy webhooks.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InteractionData {
    #[serde(default)]
    pub body: String,
}

fn parse_interaction_data(raw: &str) -> Result<InteractionData, WebhookError> {
    Ok(serde_json::from_str(raw)?)
}

/// Proxy `InterceptCallbackUrl` webhook, fired before each interaction.
///
/// Answering with HTTP 403 blocks the interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProxyInterceptCallback {
    pub interaction_sid: String,
    pub interaction_session_sid: String,
    pub interaction_service_sid: String,
    pub interaction_account_sid: String,
    pub interaction_type: String,
    pub interaction_data: String,
    pub interaction_date_created: String,
    pub interaction_date_updated: String,
    pub inbound_participant_sid: String,
    pub inbound_resource_sid: String,
    pub inbound_resource_status: String,
    pub inbound_resource_type: String,
    pub inbound_resource_url: String,
}

impl ProxyInterceptCallback {
    pub fn interaction_data(&self) -> Result<InteractionData, WebhookError> {
        parse_interaction_data(&self.interaction_data)
    }
}

/// Proxy `CallbackUrl` webhook, informational, fired after each interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProxyCallback {
    pub interaction_sid: String,
    pub interaction_session_sid: String,
    pub interaction_service_sid: String,
    pub interaction_account_sid: String,
    pub interaction_type: String,
    pub interaction_data: String,
    pub interaction_date_created: String,
    pub interaction_date_updated: String,
    pub inbound_participant_sid: String,
    pub inbound_resource_sid: String,
    pub inbound_resource_status: String,
    pub inbound_resource_type: String,
    pub inbound_resource_url: String,
    pub outbound_participant_sid: String,
    pub outbound_resource_sid: String,
    pub outbound_resource_status: String,
    pub outbound_resource_type: String,
    pub outbound_resource_url: String,
}

impl ProxyCallback {
    pub fn interaction_data(&self) -> Result<InteractionData, WebhookError> {
        parse_interaction_data(&self.interaction_data)
    }
}
