//! Client layer: orchestrates transport calls and maps transport ↔ domain.

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{
    AccessToken, AccountSid, ApiException, ApiKeySecret, ApiKeySid, AuthToken, MessageResponse,
    MessageSid, SendMessage, ValidationError,
};
use crate::webhook::{WebhookError, WebhookRequest};

const DEFAULT_BASE_URL: &str = "https://api.twilio.com/2010-04-01";

const ENV_ACCOUNT_SID: &str = "TWILIO_ACCOUNT_SID";
const ENV_AUTH_TOKEN: &str = "TWILIO_AUTH_TOKEN";
const ENV_API_KEY: &str = "TWILIO_API_KEY";
const ENV_API_SECRET: &str = "TWILIO_API_SECRET";

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: String,
}

trait HttpTransport: Send + Sync {
    fn post_form<'a>(
        &'a self,
        url: &'a str,
        credentials: &'a Credentials,
        params: Vec<(String, String)>,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;

    fn get<'a>(
        &'a self,
        url: &'a str,
        credentials: &'a Credentials,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn post_form<'a>(
        &'a self,
        url: &'a str,
        credentials: &'a Credentials,
        params: Vec<(String, String)>,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let response = self
                .client
                .post(url)
                .basic_auth(
                    credentials.account_sid.as_str(),
                    Some(credentials.auth_token.as_str()),
                )
                .form(&params)
                .send()
                .await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }

    fn get<'a>(
        &'a self,
        url: &'a str,
        credentials: &'a Credentials,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let response = self
                .client
                .get(url)
                .basic_auth(
                    credentials.account_sid.as_str(),
                    Some(credentials.auth_token.as_str()),
                )
                .send()
                .await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}

#[derive(Debug, Clone)]
/// API key used to sign access tokens.
pub struct ApiKey {
    pub sid: ApiKeySid,
    pub secret: ApiKeySecret,
}

#[derive(Debug, Clone)]
/// Account credentials.
///
/// The account SID and auth token authenticate REST calls and webhook signatures. The
/// optional API key is only needed to issue access tokens.
pub struct Credentials {
    account_sid: AccountSid,
    auth_token: AuthToken,
    api_key: Option<ApiKey>,
}

impl Credentials {
    /// Validate and combine an account SID and auth token.
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            account_sid: AccountSid::new(account_sid)?,
            auth_token: AuthToken::new(auth_token)?,
            api_key: None,
        })
    }

    /// Attach an API key (SID + secret) for access token issuance.
    pub fn with_api_key(
        mut self,
        sid: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        self.api_key = Some(ApiKey {
            sid: ApiKeySid::new(sid)?,
            secret: ApiKeySecret::new(secret)?,
        });
        Ok(self)
    }

    /// Read credentials from `TWILIO_ACCOUNT_SID`, `TWILIO_AUTH_TOKEN` and, optionally,
    /// `TWILIO_API_KEY` + `TWILIO_API_SECRET`.
    pub fn from_env() -> Result<Self, TwilioError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, TwilioError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or(TwilioError::MissingEnv { name })
        };

        let credentials = Self::new(required(ENV_ACCOUNT_SID)?, required(ENV_AUTH_TOKEN)?)?;
        let api_key = lookup(ENV_API_KEY).filter(|value| !value.is_empty());
        let api_secret = lookup(ENV_API_SECRET).filter(|value| !value.is_empty());
        match (api_key, api_secret) {
            (Some(sid), Some(secret)) => Ok(credentials.with_api_key(sid, secret)?),
            (None, None) => Ok(credentials),
            (Some(_), None) => Err(TwilioError::MissingEnv {
                name: ENV_API_SECRET,
            }),
            (None, Some(_)) => Err(TwilioError::MissingEnv { name: ENV_API_KEY }),
        }
    }

    pub fn account_sid(&self) -> &AccountSid {
        &self.account_sid
    }

    pub fn auth_token(&self) -> &AuthToken {
        &self.auth_token
    }

    pub fn api_key(&self) -> Option<&ApiKey> {
        self.api_key.as_ref()
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`TwilioClient`].
///
/// This error preserves:
/// - HTTP-level failures (transport failures, non-success status without an error document),
/// - API-level failures (the Twilio error document),
/// - validation/parse/configuration failures.
pub enum TwilioError {
    /// HTTP client / transport failure (DNS, TLS, timeouts, etc).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// Non-successful HTTP status code whose body is not a Twilio error document.
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: u16, body: Option<String> },

    /// Twilio returned its error document.
    #[error("API error: {0}")]
    Api(ApiException),

    /// Response body could not be parsed as the expected format.
    #[error("parse error: {0}")]
    Parse(#[source] Box<dyn StdError + Send + Sync>),

    /// A required environment variable is missing or empty.
    #[error("missing environment variable {name}")]
    MissingEnv { name: &'static str },

    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Clone)]
/// Builder for [`TwilioClient`].
///
/// Use this when you need to customize the base URL, timeout, or user-agent.
pub struct TwilioClientBuilder {
    credentials: Credentials,
    base_url: String,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl TwilioClientBuilder {
    /// Create a builder with the default base URL and no timeout/user-agent override.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: None,
            user_agent: None,
        }
    }

    /// Override the versioned API base URL (`https://api.twilio.com/2010-04-01`).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Set an HTTP client timeout applied to the entire request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build a [`TwilioClient`].
    pub fn build(self) -> Result<TwilioClient, TwilioError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|err| TwilioError::Transport(Box::new(err)))?;

        Ok(TwilioClient {
            credentials: self.credentials,
            base_url: self.base_url,
            http: Arc::new(ReqwestTransport { client }),
        })
    }
}

#[derive(Clone)]
/// High-level Twilio client.
///
/// Holds the account credentials and issues authenticated requests against
/// `https://api.twilio.com/2010-04-01` by default. It also issues access tokens and
/// validates webhooks with the same credentials.
pub struct TwilioClient {
    credentials: Credentials,
    base_url: String,
    http: Arc<dyn HttpTransport>,
}

impl TwilioClient {
    /// Create a client using the default base URL.
    ///
    /// For more customization, use [`TwilioClient::builder`].
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: DEFAULT_BASE_URL.to_owned(),
            http: Arc::new(ReqwestTransport {
                client: reqwest::Client::new(),
            }),
        }
    }

    /// Create a client from the `TWILIO_*` environment variables.
    ///
    /// See [`Credentials::from_env`].
    pub fn from_env() -> Result<Self, TwilioError> {
        Ok(Self::new(Credentials::from_env()?))
    }

    /// Start building a client with custom settings.
    pub fn builder(credentials: Credentials) -> TwilioClientBuilder {
        TwilioClientBuilder::new(credentials)
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Start an access token signed with the configured API key.
    ///
    /// Returns [`ValidationError::MissingApiKey`] when no API key is configured.
    pub fn new_access_token(&self) -> Result<AccessToken, ValidationError> {
        let api_key = self
            .credentials
            .api_key
            .as_ref()
            .ok_or(ValidationError::MissingApiKey)?;
        Ok(AccessToken::new(
            self.credentials.account_sid.clone(),
            api_key.sid.clone(),
            api_key.secret.clone(),
        ))
    }

    /// Validate an inbound webhook against this account's auth token.
    ///
    /// See [`crate::webhook::validate`].
    pub fn validate_webhook(&self, request: &WebhookRequest, url: &str) -> Result<(), WebhookError> {
        crate::webhook::validate(request, url, &self.credentials.auth_token)
    }

    /// Send an SMS, MMS or WhatsApp message.
    ///
    /// Errors:
    /// - [`TwilioError::Api`] when Twilio rejects the message (e.g. invalid `To` number),
    /// - [`TwilioError::HttpStatus`] for other non-201 responses,
    /// - [`TwilioError::Parse`] when the created message cannot be decoded.
    pub async fn send_message(&self, request: SendMessage) -> Result<MessageResponse, TwilioError> {
        let url = format!(
            "{}/Accounts/{}/Messages.json",
            self.base_url,
            self.credentials.account_sid.as_str()
        );
        let params = crate::transport::encode_send_message_form(&request);

        tracing::debug!(url = %url, to = request.to().raw(), "sending message");
        let response = self
            .http
            .post_form(&url, &self.credentials, params)
            .await
            .map_err(TwilioError::Transport)?;

        if response.status != 201 {
            return Err(error_from_response(response));
        }

        crate::transport::decode_message_json_response(&response.body)
            .map_err(|err| TwilioError::Parse(Box::new(err)))
    }

    /// Fetch a message, e.g. to check its delivery status.
    pub async fn get_message(&self, sid: &MessageSid) -> Result<MessageResponse, TwilioError> {
        let url = format!(
            "{}/Accounts/{}/Messages/{}.json",
            self.base_url,
            self.credentials.account_sid.as_str(),
            sid.as_str()
        );

        tracing::debug!(url = %url, "fetching message");
        let response = self
            .http
            .get(&url, &self.credentials)
            .await
            .map_err(TwilioError::Transport)?;

        if response.status != 200 {
            return Err(error_from_response(response));
        }

        crate::transport::decode_message_json_response(&response.body)
            .map_err(|err| TwilioError::Parse(Box::new(err)))
    }
}

fn error_from_response(response: HttpResponse) -> TwilioError {
    tracing::warn!(status = response.status, "Twilio returned a non-success status");
    if let Ok(exception) = crate::transport::decode_exception_json_response(&response.body) {
        return TwilioError::Api(exception);
    }
    let body = if response.body.trim().is_empty() {
        None
    } else {
        Some(response.body)
    };
    TwilioError::HttpStatus {
        status: response.status,
        body,
    }
}
