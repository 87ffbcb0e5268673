//! Grants carried in the `grants` claim of an access token.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::validation::ValidationError;

/// Key of the identity entry in the `grants` claim. No grant may use it as its name.
pub const IDENTITY_CLAIM: &str = "identity";

/// A capability bundle embedded in an access token.
///
/// Each variant maps to exactly one canonical name, which becomes its key in the
/// `grants` claim. Use [`Grant::Custom`] for grant kinds this crate has no type for.
#[derive(Debug, Clone, PartialEq)]
pub enum Grant {
    Video(VideoGrant),
    Voice(VoiceGrant),
    Custom(CustomGrant),
}

impl Grant {
    /// Canonical name of this grant (its key in the `grants` claim).
    pub fn name(&self) -> &str {
        match self {
            Self::Video(_) => VideoGrant::NAME,
            Self::Voice(_) => VoiceGrant::NAME,
            Self::Custom(custom) => custom.name(),
        }
    }

    /// Serialize the grant attributes into their claim object.
    ///
    /// Unset or empty optional attributes are omitted.
    pub fn to_claim(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            Self::Video(video) => serde_json::to_value(video),
            Self::Voice(voice) => serde_json::to_value(voice),
            Self::Custom(custom) => Ok(serde_json::Value::Object(custom.attributes.clone())),
        }
    }
}

impl From<VideoGrant> for Grant {
    fn from(value: VideoGrant) -> Self {
        Self::Video(value)
    }
}

impl From<VoiceGrant> for Grant {
    fn from(value: VoiceGrant) -> Self {
        Self::Voice(value)
    }
}

impl From<CustomGrant> for Grant {
    fn from(value: CustomGrant) -> Self {
        Self::Custom(value)
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}

/// Permission to use Programmable Video, optionally scoped to one room.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VideoGrant {
    #[serde(skip_serializing_if = "is_blank")]
    room: Option<String>,
}

impl VideoGrant {
    pub const NAME: &'static str = "video";

    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the grant to a single room (name or SID).
    pub fn room(mut self, room: impl Into<String>) -> Self {
        self.room = Some(room.into());
        self
    }

    pub fn room_name(&self) -> Option<&str> {
        self.room.as_deref()
    }
}

/// Permission to use Programmable Voice from a client SDK.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VoiceGrant {
    #[serde(skip_serializing_if = "Option::is_none")]
    incoming: Option<IncomingGrant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outgoing: Option<OutgoingGrant>,
    #[serde(skip_serializing_if = "is_blank")]
    endpoint_id: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    push_credential_sid: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IncomingGrant {
    pub allow: bool,
}

/// Outgoing call permission: the TwiML application to run and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingGrant {
    pub application_sid: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, serde_json::Value>,
}

impl VoiceGrant {
    pub const NAME: &'static str = "voice";

    pub fn new() -> Self {
        Self::default()
    }

    /// Allow the client to receive incoming calls.
    pub fn allow_incoming(mut self) -> Self {
        self.incoming = Some(IncomingGrant { allow: true });
        self
    }

    /// Allow outgoing calls through the given TwiML application.
    pub fn outgoing(mut self, application_sid: impl Into<String>) -> Self {
        self.outgoing = Some(OutgoingGrant {
            application_sid: application_sid.into(),
            params: BTreeMap::new(),
        });
        self
    }

    /// Add a parameter passed to the outgoing TwiML application.
    ///
    /// Has no effect unless [`VoiceGrant::outgoing`] was called first.
    pub fn outgoing_param(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        if let Some(outgoing) = self.outgoing.as_mut() {
            outgoing.params.insert(key.into(), value.into());
        }
        self
    }

    pub fn endpoint_id(mut self, endpoint_id: impl Into<String>) -> Self {
        self.endpoint_id = Some(endpoint_id.into());
        self
    }

    pub fn push_credential_sid(mut self, sid: impl Into<String>) -> Self {
        self.push_credential_sid = Some(sid.into());
        self
    }

    pub fn incoming_grant(&self) -> Option<&IncomingGrant> {
        self.incoming.as_ref()
    }

    pub fn outgoing_grant(&self) -> Option<&OutgoingGrant> {
        self.outgoing.as_ref()
    }
}

/// Grant kind without a dedicated type: a canonical name plus a raw attribute object.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomGrant {
    name: String,
    attributes: serde_json::Map<String, serde_json::Value>,
}

impl CustomGrant {
    pub const FIELD: &'static str = "grant name";

    /// Create a custom grant.
    ///
    /// The name must be non-empty after trimming and must not be `identity`.
    pub fn new(
        name: impl Into<String>,
        attributes: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        if trimmed == IDENTITY_CLAIM {
            return Err(ValidationError::ReservedGrantName {
                name: trimmed.to_owned(),
            });
        }
        Ok(Self {
            name: trimmed.to_owned(),
            attributes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.attributes
    }
}
