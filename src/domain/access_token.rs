use std::time::Duration;

use crate::domain::grant::Grant;
use crate::domain::validation::ValidationError;
use crate::domain::value::{AccountSid, ApiKeySecret, ApiKeySid, UnixTimestamp};

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`AccessToken::to_jwt`].
///
/// A token must not be handed to a client when either of these is returned.
pub enum AccessTokenError {
    /// The token configuration is invalid (e.g. the validity window is inverted).
    #[error("invalid access token: {0}")]
    Validation(#[from] ValidationError),

    /// A grant could not be serialized into its claim object.
    #[error("grant serialization failed: {0}")]
    Claims(#[from] serde_json::Error),

    /// Header/claims encoding or HMAC signing failed.
    #[error("signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone)]
/// Short-lived credential that authorizes a client SDK.
///
/// Build one per client session, attach grants, then call [`AccessToken::to_jwt`] once
/// and hand the resulting string to the SDK.
///
/// Invariants:
/// - `expires_at` is strictly after `not_before` when both are set (checked on signing),
/// - at most one grant per canonical name (checked when the grant is added).
pub struct AccessToken {
    account_sid: AccountSid,
    api_key_sid: ApiKeySid,
    api_key_secret: ApiKeySecret,
    not_before: Option<UnixTimestamp>,
    expires_at: Option<UnixTimestamp>,
    grants: Vec<Grant>,
    identity: Option<String>,
}

impl AccessToken {
    pub fn new(
        account_sid: AccountSid,
        api_key_sid: ApiKeySid,
        api_key_secret: ApiKeySecret,
    ) -> Self {
        Self {
            account_sid,
            api_key_sid,
            api_key_secret,
            not_before: None,
            expires_at: None,
            grants: Vec::new(),
            identity: None,
        }
    }

    /// Set the identity of the client the token is issued to.
    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    pub fn with_not_before(mut self, not_before: UnixTimestamp) -> Self {
        self.not_before = Some(not_before);
        self
    }

    pub fn with_expires_at(mut self, expires_at: UnixTimestamp) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Make the token valid from now for `ttl`, rounded up to whole seconds.
    ///
    /// A zero `ttl` yields an empty window, which [`AccessToken::to_jwt`] rejects.
    pub fn valid_for(self, ttl: Duration) -> Self {
        let now = UnixTimestamp::now();
        let seconds = ttl
            .as_secs()
            .saturating_add(u64::from(ttl.subsec_nanos() > 0));
        self.with_not_before(now)
            .with_expires_at(now.plus_seconds(seconds))
    }

    /// Attach a grant.
    ///
    /// Returns [`ValidationError::DuplicateGrant`] if a grant with the same canonical name
    /// is already attached.
    pub fn add_grant(&mut self, grant: impl Into<Grant>) -> Result<&mut Self, ValidationError> {
        let grant = grant.into();
        if self.grants.iter().any(|existing| existing.name() == grant.name()) {
            return Err(ValidationError::DuplicateGrant {
                name: grant.name().to_owned(),
            });
        }
        self.grants.push(grant);
        Ok(self)
    }

    /// Owned variant of [`AccessToken::add_grant`] for builder-style chains.
    pub fn with_grant(mut self, grant: impl Into<Grant>) -> Result<Self, ValidationError> {
        self.add_grant(grant)?;
        Ok(self)
    }

    pub fn account_sid(&self) -> &AccountSid {
        &self.account_sid
    }

    pub fn api_key_sid(&self) -> &ApiKeySid {
        &self.api_key_sid
    }

    pub(crate) fn api_key_secret(&self) -> &ApiKeySecret {
        &self.api_key_secret
    }

    pub fn not_before(&self) -> Option<UnixTimestamp> {
        self.not_before
    }

    pub fn expires_at(&self) -> Option<UnixTimestamp> {
        self.expires_at
    }

    pub fn grants(&self) -> &[Grant] {
        &self.grants
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Check the validity window.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let (Some(not_before), Some(expires_at)) = (self.not_before, self.expires_at) {
            if expires_at <= not_before {
                return Err(ValidationError::InvalidTokenWindow {
                    not_before: not_before.value(),
                    expires_at: expires_at.value(),
                });
            }
        }
        Ok(())
    }

    /// Sign the token into a compact HS256 JWT keyed by the API key secret.
    pub fn to_jwt(&self) -> Result<String, AccessTokenError> {
        self.validate()?;
        crate::transport::encode_access_token_jwt(self)
    }
}
