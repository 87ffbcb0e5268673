use serde::Deserialize;

use super::price::{TransportCount, TransportPrice};
use crate::domain::{
    AddressRetention, ApiException, ApplicationSid, CallbackUrl, ContentRetention, MessageBody,
    MessageResponse, MessageSid, MessageStatus, MessagingServiceSid, RawPhoneNumber, SendMessage,
    Sender,
};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response contains an empty message sid")]
    EmptyMessageSid,
}

#[derive(Debug, Clone, Deserialize)]
struct MessageJsonResponse {
    sid: String,
    account_sid: String,
    #[serde(default)]
    messaging_service_sid: Option<String>,
    to: String,
    #[serde(default)]
    from: Option<String>,
    #[serde(default)]
    body: Option<String>,
    status: String,
    #[serde(default)]
    direction: Option<String>,
    #[serde(default)]
    num_segments: TransportCount,
    #[serde(default)]
    num_media: TransportCount,
    #[serde(default)]
    price: TransportPrice,
    #[serde(default)]
    price_unit: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    date_created: Option<String>,
    #[serde(default)]
    date_updated: Option<String>,
    #[serde(default)]
    date_sent: Option<String>,
    #[serde(default)]
    api_version: Option<String>,
    #[serde(default)]
    uri: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ExceptionJsonResponse {
    status: u16,
    message: String,
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    more_info: Option<String>,
}

pub fn encode_send_message_form(request: &SendMessage) -> Vec<(String, String)> {
    let mut params = vec![
        (RawPhoneNumber::FIELD.to_owned(), request.to().raw().to_owned()),
        (MessageBody::FIELD.to_owned(), request.body().as_str().to_owned()),
    ];

    match request.sender() {
        Sender::From(from) => params.push(("From".to_owned(), from.raw().to_owned())),
        Sender::MessagingService(sid) => {
            params.push((MessagingServiceSid::FIELD.to_owned(), sid.as_str().to_owned()));
        }
    }

    for media_url in request.media_urls() {
        params.push(("MediaUrl".to_owned(), media_url.as_str().to_owned()));
    }

    let options = request.options();
    if let Some(callback) = options.status_callback.as_ref() {
        params.push((CallbackUrl::FIELD.to_owned(), callback.as_str().to_owned()));
    }
    if let Some(application_sid) = options.application_sid.as_ref() {
        params.push((
            ApplicationSid::FIELD.to_owned(),
            application_sid.as_str().to_owned(),
        ));
    }
    if let Some(retention) = options.address_retention {
        params.push((
            AddressRetention::FIELD.to_owned(),
            retention.as_str().to_owned(),
        ));
    }
    if let Some(retention) = options.content_retention {
        params.push((
            ContentRetention::FIELD.to_owned(),
            retention.as_str().to_owned(),
        ));
    }

    params
}

pub fn decode_message_json_response(json: &str) -> Result<MessageResponse, TransportError> {
    let parsed: MessageJsonResponse = serde_json::from_str(json)?;
    let sid = MessageSid::new(parsed.sid).map_err(|_| TransportError::EmptyMessageSid)?;

    Ok(MessageResponse {
        sid,
        account_sid: parsed.account_sid,
        messaging_service_sid: parsed.messaging_service_sid,
        to: parsed.to,
        from: parsed.from,
        body: parsed.body.unwrap_or_default(),
        status: MessageStatus::from_wire(&parsed.status),
        direction: parsed.direction,
        num_segments: parsed.num_segments.into_option(),
        num_media: parsed.num_media.into_option(),
        price: parsed.price.into_option(),
        price_unit: parsed.price_unit,
        error_code: parsed.error_code,
        error_message: parsed.error_message,
        date_created: parsed.date_created,
        date_updated: parsed.date_updated,
        date_sent: parsed.date_sent,
        api_version: parsed.api_version,
        uri: parsed.uri,
    })
}

pub fn decode_exception_json_response(json: &str) -> Result<ApiException, TransportError> {
    let parsed: ExceptionJsonResponse = serde_json::from_str(json)?;
    Ok(ApiException {
        status: parsed.status,
        message: parsed.message,
        code: parsed.code,
        more_info: parsed.more_info,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SendOptions;

    fn to() -> RawPhoneNumber {
        RawPhoneNumber::new("+14155552671").unwrap()
    }

    #[test]
    fn encode_sms_form_includes_required_fields() {
        let request = SendMessage::sms(
            to(),
            Sender::From(RawPhoneNumber::new("+14155550000").unwrap()),
            MessageBody::new("hello").unwrap(),
            SendOptions::default(),
        );

        let params = encode_send_message_form(&request);
        assert_eq!(
            params,
            vec![
                ("To".to_owned(), "+14155552671".to_owned()),
                ("Body".to_owned(), "hello".to_owned()),
                ("From".to_owned(), "+14155550000".to_owned()),
            ]
        );
    }

    #[test]
    fn encode_mms_form_repeats_media_url_and_options() {
        let request = SendMessage::mms(
            to(),
            Sender::MessagingService(MessagingServiceSid::new("MG123").unwrap()),
            MessageBody::new("pics").unwrap(),
            vec![
                CallbackUrl::new("https://example.com/a.png").unwrap(),
                CallbackUrl::new("https://example.com/b.png").unwrap(),
            ],
            SendOptions {
                status_callback: Some(CallbackUrl::new("https://example.com/status").unwrap()),
                application_sid: Some(ApplicationSid::new("AP123").unwrap()),
                address_retention: Some(AddressRetention::Obfuscate),
                content_retention: Some(ContentRetention::Discard),
            },
        )
        .unwrap();

        let params = encode_send_message_form(&request);
        let media = params
            .iter()
            .filter(|(k, _)| k == "MediaUrl")
            .map(|(_, v)| v.as_str())
            .collect::<Vec<_>>();
        assert_eq!(
            media,
            ["https://example.com/a.png", "https://example.com/b.png"]
        );
        assert!(params.contains(&("MessagingServiceSid".to_owned(), "MG123".to_owned())));
        assert!(params.contains(&(
            "StatusCallback".to_owned(),
            "https://example.com/status".to_owned()
        )));
        assert!(params.contains(&("ApplicationSid".to_owned(), "AP123".to_owned())));
        assert!(params.contains(&("AddressRetention".to_owned(), "obfuscate".to_owned())));
        assert!(params.contains(&("ContentRetention".to_owned(), "discard".to_owned())));
        assert!(!params.iter().any(|(k, _)| k == "From"));
    }

    #[test]
    fn decode_message_response_maps_fields() {
        let json = r#"
        {
          "sid": "SM123",
          "account_sid": "AC123",
          "messaging_service_sid": null,
          "to": "+14155552671",
          "from": "+14155550000",
          "body": "hello",
          "status": "queued",
          "direction": "outbound-api",
          "num_segments": "1",
          "num_media": "0",
          "price": null,
          "price_unit": "USD",
          "error_code": null,
          "error_message": null,
          "date_created": "Thu, 30 Jul 2015 20:12:31 +0000",
          "date_updated": "Thu, 30 Jul 2015 20:12:33 +0000",
          "date_sent": null,
          "api_version": "2010-04-01",
          "uri": "/2010-04-01/Accounts/AC123/Messages/SM123.json"
        }
        "#;

        let response = decode_message_json_response(json).unwrap();
        assert_eq!(response.sid.as_str(), "SM123");
        assert_eq!(response.status, MessageStatus::Queued);
        assert_eq!(response.num_segments, Some(1));
        assert_eq!(response.num_media, Some(0));
        assert_eq!(response.price, None);
        assert_eq!(response.price_unit.as_deref(), Some("USD"));
        assert_eq!(response.from.as_deref(), Some("+14155550000"));
        assert!(response.date_sent.is_none());
    }

    #[test]
    fn decode_message_response_keeps_error_details() {
        let json = r#"
        {
          "sid": "SM999",
          "account_sid": "AC123",
          "to": "+14155552671",
          "status": "undelivered",
          "price": "-0.00750",
          "error_code": 30003,
          "error_message": "Unreachable destination handset"
        }
        "#;

        let response = decode_message_json_response(json).unwrap();
        assert_eq!(response.status, MessageStatus::Undelivered);
        assert_eq!(response.price.as_deref(), Some("-0.00750"));
        assert_eq!(response.error_code, Some(30003));
        assert_eq!(response.body, "");
    }

    #[test]
    fn decode_message_response_accepts_null_or_missing_body() {
        let json =
            r#"{"sid": "SM1", "account_sid": "AC1", "to": "+1", "status": "queued", "body": null}"#;
        assert_eq!(decode_message_json_response(json).unwrap().body, "");

        let json = r#"{"sid": "SM1", "account_sid": "AC1", "to": "+1", "status": "queued"}"#;
        assert_eq!(decode_message_json_response(json).unwrap().body, "");
    }

    #[test]
    fn decode_message_response_rejects_empty_sid() {
        let json = r#"{"sid": " ", "account_sid": "AC1", "to": "+1", "status": "sent"}"#;
        assert!(matches!(
            decode_message_json_response(json),
            Err(TransportError::EmptyMessageSid)
        ));
    }

    #[test]
    fn decode_exception_parses_error_document() {
        let json = r#"
        {
          "code": 21211,
          "message": "The 'To' number 5551234 is not a valid phone number.",
          "more_info": "https://www.twilio.com/docs/errors/21211",
          "status": 400
        }
        "#;
        let exc = decode_exception_json_response(json).unwrap();
        assert_eq!(exc.status, 400);
        assert_eq!(exc.code, Some(21211));
        assert!(exc.message.contains("not a valid phone number"));
    }

    #[test]
    fn decode_exception_rejects_non_exception_body() {
        assert!(decode_exception_json_response("<html>Bad Gateway</html>").is_err());
        assert!(decode_exception_json_response(r#"{"foo": 1}"#).is_err());
    }
}
