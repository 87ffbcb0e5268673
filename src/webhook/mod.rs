//! Inbound webhook authentication and decoding.
//!
//! Twilio signs every webhook with `X-Twilio-Signature`: the base64 HMAC-SHA1, keyed by the
//! account auth token, of the full request URL followed (for `POST`) by the canonical form of
//! the posted fields. [`validate`] recomputes that signature and compares it in constant time.
//!
//! The URL must be exactly the one Twilio called, including scheme, host, port, path and
//! query string. Behind a proxy, reconstruct it from your public endpoint configuration
//! rather than from the incoming `Host` header.
//!
//! ```rust
//! use twilio_typed::AuthToken;
//! use twilio_typed::webhook::{self, FormFields, WebhookRequest};
//!
//! let token = AuthToken::new("tok")?;
//! let form = [("Body", "hi"), ("From", "+1555")].into_iter().collect::<FormFields>();
//! let unsigned = WebhookRequest::new(reqwest::Method::POST).with_form(form);
//! let signature = webhook::expected_signature(&unsigned, "https://example.com/hook", &token);
//!
//! let request = unsigned.with_signature(signature);
//! assert!(webhook::validate(&request, "https://example.com/hook", &token).is_ok());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod payload;

use std::borrow::Cow;
use std::collections::HashMap;

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use serde::de::DeserializeOwned;

use crate::domain::AuthToken;

pub use payload::{InboundMessage, InteractionData, ProxyCallback, ProxyInterceptCallback};

/// Header carrying the request signature.
pub const SIGNATURE_HEADER: &str = "X-Twilio-Signature";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The signature is missing or does not match; the request must be rejected.
    #[error("this request was spoofed")]
    Spoofed,

    /// The `application/x-www-form-urlencoded` body could not be parsed.
    #[error("malformed form body: {reason}")]
    MalformedForm { reason: &'static str },

    /// The form fields do not match the requested payload type.
    #[error("webhook payload could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Posted form fields: every key maps to its values in the order they were posted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    fields: HashMap<String, Vec<String>>,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `application/x-www-form-urlencoded` body.
    ///
    /// Fails on non UTF-8 input, on `%` escapes that are not followed by two hex digits and
    /// on escaped bytes that do not decode to UTF-8.
    pub fn parse(body: &[u8]) -> Result<Self, WebhookError> {
        let text = std::str::from_utf8(body).map_err(|_| WebhookError::MalformedForm {
            reason: "body is not valid UTF-8",
        })?;
        if !has_valid_escapes(text.as_bytes()) {
            return Err(WebhookError::MalformedForm {
                reason: "invalid percent escape",
            });
        }

        let mut fields = Self::new();
        for pair in text.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            fields.append(decode_component(key)?, decode_component(value)?);
        }
        Ok(fields)
    }

    /// Add a value after any existing values of `key`.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(key.into()).or_default().push(value.into());
    }

    /// First value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values of `key`, in posted order.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.fields.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Keys in unspecified order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Sorted-key concatenation of all keys and values, the form part of the signing input.
    pub fn canonical_form(&self) -> String {
        crate::transport::canonical_form(self)
    }

    /// Deserialize the fields into `T`, using the first value of every key.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, WebhookError> {
        let object = self
            .fields
            .iter()
            .filter_map(|(key, values)| {
                values
                    .first()
                    .map(|value| (key.clone(), serde_json::Value::String(value.clone())))
            })
            .collect::<serde_json::Map<_, _>>();
        Ok(serde_json::from_value(serde_json::Value::Object(object))?)
    }
}

impl<K, V> FromIterator<(K, V)> for FormFields
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (key, value) in iter {
            fields.append(key, value);
        }
        fields
    }
}

fn decode_component(raw: &str) -> Result<String, WebhookError> {
    let spaced = raw.replace('+', " ");
    percent_encoding::percent_decode_str(&spaced)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|_| WebhookError::MalformedForm {
            reason: "escaped bytes are not valid UTF-8",
        })
}

fn has_valid_escapes(bytes: &[u8]) -> bool {
    let mut idx = 0;
    while idx < bytes.len() {
        if bytes[idx] == b'%' {
            match bytes.get(idx + 1..idx + 3) {
                Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => idx += 3,
                _ => return false,
            }
        } else {
            idx += 1;
        }
    }
    true
}

/// The parts of an inbound HTTP request that take part in signature validation.
#[derive(Debug, Clone)]
pub struct WebhookRequest {
    method: Method,
    form: FormFields,
    signature: Option<String>,
}

impl WebhookRequest {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            form: FormFields::new(),
            signature: None,
        }
    }

    /// Posted form fields. Ignored for methods other than `POST`.
    pub fn with_form(mut self, form: FormFields) -> Self {
        self.form = form;
        self
    }

    /// Value of the [`SIGNATURE_HEADER`] header.
    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    /// Build from a raw request.
    ///
    /// The body is parsed as a form only for a `POST` whose `Content-Type` is
    /// `application/x-www-form-urlencoded`; any other body contributes no fields.
    pub fn from_parts(
        method: Method,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<Self, WebhookError> {
        let form = if method == Method::POST && is_form_content(headers) {
            FormFields::parse(body)?
        } else {
            FormFields::new()
        };
        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        Ok(Self {
            method,
            form,
            signature,
        })
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn form(&self) -> &FormFields {
        &self.form
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }
}

fn is_form_content(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|media_type| media_type.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

fn signing_input(request: &WebhookRequest, url: &str) -> String {
    if request.method == Method::POST {
        let mut input = url.to_owned();
        input.push_str(&request.form.canonical_form());
        input
    } else {
        url.to_owned()
    }
}

/// The signature Twilio would attach to `request` when calling `url`.
pub fn expected_signature(request: &WebhookRequest, url: &str, auth_token: &AuthToken) -> String {
    crate::transport::sign_hmac_sha1(auth_token.as_str().as_bytes(), &signing_input(request, url))
}

/// Check that `request` was signed by Twilio for `url` with `auth_token`.
///
/// A missing or empty signature header is rejected like any other mismatch.
pub fn validate(
    request: &WebhookRequest,
    url: &str,
    auth_token: &AuthToken,
) -> Result<(), WebhookError> {
    let signature = request.signature().unwrap_or_default();
    let input = signing_input(request, url);
    if crate::transport::verify_hmac_sha1(auth_token.as_str().as_bytes(), &input, signature) {
        Ok(())
    } else {
        tracing::debug!(
            method = %request.method,
            url,
            has_signature = !signature.is_empty(),
            "rejected webhook with invalid signature"
        );
        Err(WebhookError::Spoofed)
    }
}
