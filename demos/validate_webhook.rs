//! Validate a captured webhook: `validate_webhook <url> <signature> [form-body]`.
//!
//! Without a form body the request is treated as a GET.

use std::io;

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use twilio_typed::webhook::InboundMessage;
use twilio_typed::{SIGNATURE_HEADER, TwilioClient, WebhookRequest};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(url), Some(signature)) = (args.next(), args.next()) else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "usage: validate_webhook <url> <signature> [form-body]",
        )
        .into());
    };
    let body = args.next();

    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_bytes(SIGNATURE_HEADER.as_bytes())?,
        HeaderValue::from_str(&signature)?,
    );
    let method = if body.is_some() {
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        Method::POST
    } else {
        Method::GET
    };
    let request =
        WebhookRequest::from_parts(method, &headers, body.unwrap_or_default().as_bytes())?;

    let client = TwilioClient::from_env()?;
    client.validate_webhook(&request, &url)?;
    println!("signature ok");

    if let Ok(message) = InboundMessage::from_form(request.form()) {
        println!("message {} from {}: {}", message.message_sid, message.from, message.body);
    }
    Ok(())
}
