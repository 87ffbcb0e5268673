use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::Serialize;

use crate::domain::{AccessToken, AccessTokenError, IDENTITY_CLAIM};

/// `cty` header value marking a Twilio signed-grant token.
pub const ACCESS_TOKEN_CONTENT_TYPE: &str = "twilio-fpa;v=1";

static LAST_TOKEN_NANOS: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Serialize)]
struct AccessTokenClaims<'a> {
    jti: String,
    iss: &'a str,
    sub: &'a str,
    nbf: u64,
    exp: u64,
    grants: serde_json::Map<String, serde_json::Value>,
}

/// Wall-clock nanoseconds, bumped so that no two calls in this process return the same value.
fn next_token_suffix() -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX))
        .unwrap_or_default();
    let previous = LAST_TOKEN_NANOS
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last.saturating_add(1)))
        })
        .unwrap_or_else(|last| last);
    now.max(previous.saturating_add(1))
}

fn grants_claim(
    token: &AccessToken,
) -> Result<serde_json::Map<String, serde_json::Value>, serde_json::Error> {
    let mut grants = serde_json::Map::new();
    grants.insert(
        IDENTITY_CLAIM.to_owned(),
        serde_json::Value::String(token.identity().unwrap_or_default().to_owned()),
    );
    for grant in token.grants() {
        grants.insert(grant.name().to_owned(), grant.to_claim()?);
    }
    Ok(grants)
}

pub fn encode_access_token_jwt(token: &AccessToken) -> Result<String, AccessTokenError> {
    let api_key_sid = token.api_key_sid().as_str();
    let claims = AccessTokenClaims {
        jti: format!("{api_key_sid}-{}", next_token_suffix()),
        iss: api_key_sid,
        sub: token.account_sid().as_str(),
        nbf: token.not_before().map(|ts| ts.value()).unwrap_or(0),
        exp: token.expires_at().map(|ts| ts.value()).unwrap_or(0),
        grants: grants_claim(token)?,
    };

    let mut header = Header::new(Algorithm::HS256);
    header.typ = Some("JWT".to_owned());
    header.cty = Some(ACCESS_TOKEN_CONTENT_TYPE.to_owned());

    let key = EncodingKey::from_secret(token.api_key_secret().as_str().as_bytes());
    let jwt = jsonwebtoken::encode(&header, &claims, &key).map_err(AccessTokenError::Signing)?;

    tracing::debug!(jti = %claims.jti, grants = token.grants().len(), "signed access token");
    Ok(jwt)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use jsonwebtoken::{DecodingKey, Validation};
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::{
        AccountSid, ApiKeySecret, ApiKeySid, CustomGrant, UnixTimestamp, VideoGrant, VoiceGrant,
    };

    const T: u64 = 1_700_000_000;

    fn token(secret: &str) -> AccessToken {
        AccessToken::new(
            AccountSid::new("AC123").unwrap(),
            ApiKeySid::new("SK123").unwrap(),
            ApiKeySecret::new(secret).unwrap(),
        )
        .with_not_before(UnixTimestamp::new(T))
        .with_expires_at(UnixTimestamp::new(T + 3600))
    }

    fn lenient_validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        validation
    }

    fn decode(jwt: &str, secret: &str) -> jsonwebtoken::errors::Result<jsonwebtoken::TokenData<Value>> {
        jsonwebtoken::decode::<Value>(
            jwt,
            &DecodingKey::from_secret(secret.as_bytes()),
            &lenient_validation(),
        )
    }

    #[test]
    fn signed_video_token_decodes_to_supplied_claims() {
        let jwt = token("secret")
            .with_grant(VideoGrant::new().room("room42"))
            .unwrap()
            .to_jwt()
            .unwrap();

        let data = decode(&jwt, "secret").unwrap();
        assert_eq!(data.header.alg, Algorithm::HS256);
        assert_eq!(data.header.typ.as_deref(), Some("JWT"));
        assert_eq!(data.header.cty.as_deref(), Some(ACCESS_TOKEN_CONTENT_TYPE));

        let claims = data.claims;
        assert_eq!(claims["iss"], "SK123");
        assert_eq!(claims["sub"], "AC123");
        assert_eq!(claims["nbf"], T);
        assert_eq!(claims["exp"], T + 3600);
        assert_eq!(claims["grants"]["identity"], "");
        assert_eq!(claims["grants"]["video"]["room"], "room42");
        assert!(claims["jti"].as_str().unwrap().starts_with("SK123-"));
    }

    #[test]
    fn token_verifies_with_default_validation_when_not_expired() {
        let now = UnixTimestamp::now();
        let jwt = token("secret")
            .with_not_before(now)
            .with_expires_at(now.plus_seconds(3600))
            .with_identity("alice")
            .to_jwt()
            .unwrap();

        let data = jsonwebtoken::decode::<Value>(
            &jwt,
            &DecodingKey::from_secret(b"secret"),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();
        assert_eq!(data.claims["grants"], json!({ "identity": "alice" }));
    }

    #[test]
    fn header_segment_is_exact() {
        let jwt = token("secret").to_jwt().unwrap();
        let header = jwt.split('.').next().unwrap();
        let raw = URL_SAFE_NO_PAD.decode(header).unwrap();
        assert_eq!(
            String::from_utf8(raw).unwrap(),
            r#"{"typ":"JWT","alg":"HS256","cty":"twilio-fpa;v=1"}"#
        );
    }

    #[test]
    fn compact_form_has_three_segments_without_padding() {
        let jwt = token("secret").to_jwt().unwrap();
        assert_eq!(jwt.split('.').count(), 3);
        assert!(!jwt.contains('='));
        assert!(!jwt.contains(char::is_whitespace));
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let jwt = token("secret").to_jwt().unwrap();
        assert!(decode(&jwt, "other").is_err());
    }

    #[test]
    fn tampered_claims_fail_verification() {
        let jwt = token("secret")
            .with_grant(VideoGrant::new().room("room42"))
            .unwrap()
            .to_jwt()
            .unwrap();
        let mut segments = jwt.split('.').map(str::to_owned).collect::<Vec<_>>();
        let claims = segments[1].as_bytes().to_vec();

        for idx in 0..claims.len() {
            let mut tampered = claims.clone();
            tampered[idx] = if tampered[idx] == b'A' { b'B' } else { b'A' };
            segments[1] = String::from_utf8(tampered).unwrap();
            assert!(
                decode(&segments.join("."), "secret").is_err(),
                "tampering byte {idx} was not detected"
            );
        }
    }

    #[test]
    fn unset_window_is_encoded_as_zero() {
        let jwt = AccessToken::new(
            AccountSid::new("AC123").unwrap(),
            ApiKeySid::new("SK123").unwrap(),
            ApiKeySecret::new("secret").unwrap(),
        )
        .to_jwt()
        .unwrap();
        let claims = decode(&jwt, "secret").unwrap().claims;
        assert_eq!(claims["nbf"], 0);
        assert_eq!(claims["exp"], 0);
    }

    #[test]
    fn every_grant_lands_under_its_canonical_name() {
        let mut attributes = serde_json::Map::new();
        attributes.insert("service_sid".to_owned(), json!("IS1"));
        let jwt = token("secret")
            .with_identity("bob")
            .with_grant(VoiceGrant::new().allow_incoming().outgoing("AP1"))
            .and_then(|t| t.with_grant(VideoGrant::new()))
            .and_then(|t| t.with_grant(CustomGrant::new("chat", attributes).unwrap()))
            .unwrap()
            .to_jwt()
            .unwrap();

        let grants = decode(&jwt, "secret").unwrap().claims["grants"].clone();
        assert_eq!(
            grants,
            json!({
                "identity": "bob",
                "voice": {
                    "incoming": { "allow": true },
                    "outgoing": { "application_sid": "AP1" }
                },
                "video": {},
                "chat": { "service_sid": "IS1" }
            })
        );
    }

    #[test]
    fn token_ids_are_unique_across_threads() {
        let handles = (0..4)
            .map(|_| {
                std::thread::spawn(|| (0..250).map(|_| next_token_suffix()).collect::<Vec<_>>())
            })
            .collect::<Vec<_>>();
        let mut seen = HashSet::new();
        for handle in handles {
            for suffix in handle.join().unwrap() {
                assert!(seen.insert(suffix), "duplicate suffix {suffix}");
            }
        }
    }
}
