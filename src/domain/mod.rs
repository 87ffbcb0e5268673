//! Domain layer: strong types with validation and invariants (no I/O).

mod access_token;
mod grant;
mod request;
mod response;
mod validation;
mod value;

pub use access_token::{AccessToken, AccessTokenError};
pub use grant::{
    CustomGrant, Grant, IDENTITY_CLAIM, IncomingGrant, OutgoingGrant, VideoGrant, VoiceGrant,
};
pub use request::{
    AddressRetention, ContentRetention, MAX_MEDIA_URLS, SendMessage, SendOptions, Sender,
};
pub use response::{ApiException, MessageResponse, MessageStatus};
pub use validation::ValidationError;
pub use value::{
    AccountSid, ApiKeySecret, ApiKeySid, ApplicationSid, AuthToken, CallbackUrl, MessageBody,
    MessageSid, MessagingServiceSid, PhoneNumber, RawPhoneNumber, UnixTimestamp,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_sid_rejects_empty() {
        assert!(matches!(
            AccountSid::new("   "),
            Err(ValidationError::Empty {
                field: AccountSid::FIELD
            })
        ));
    }

    #[test]
    fn secrets_reject_empty_but_keep_whitespace() {
        assert!(matches!(
            ApiKeySecret::new(""),
            Err(ValidationError::Empty {
                field: ApiKeySecret::FIELD
            })
        ));
        assert!(AuthToken::new("").is_err());
        assert_eq!(AuthToken::new(" tok ").unwrap().as_str(), " tok ");
    }

    #[test]
    fn secrets_are_redacted_in_debug_output() {
        let token = AuthToken::new("hunter2").unwrap();
        assert_eq!(format!("{token:?}"), "AuthToken([REDACTED])");
    }

    #[test]
    fn phone_number_parses_with_region_and_trims() {
        let pn = PhoneNumber::parse(Some(phonenumber::country::Id::US), " 415 555 2671 ").unwrap();
        assert_eq!(pn.raw(), "415 555 2671");
        assert_eq!(pn.e164(), "+14155552671");
    }

    #[test]
    fn raw_phone_number_from_phone_number_uses_e164() {
        let pn = PhoneNumber::parse(None, "+14155552671").unwrap();
        let raw: RawPhoneNumber = pn.into();
        assert_eq!(raw.raw(), "+14155552671");
    }

    #[test]
    fn whatsapp_prefix_is_applied_once() {
        let raw = RawPhoneNumber::new("+14155552671").unwrap();
        let wa = raw.whatsapp();
        assert_eq!(wa.raw(), "whatsapp:+14155552671");
        assert!(wa.is_whatsapp());
        assert_eq!(wa.whatsapp(), wa);
    }

    #[test]
    fn callback_url_requires_http_scheme() {
        assert!(CallbackUrl::new("https://example.com/status").is_ok());
        assert!(matches!(
            CallbackUrl::new("ftp://example.com/status"),
            Err(ValidationError::InvalidUrl { .. })
        ));
        assert!(matches!(
            CallbackUrl::new("not a url"),
            Err(ValidationError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn mms_media_limit_is_enforced() {
        let to = RawPhoneNumber::new("+14155552671").unwrap();
        let from = Sender::From(RawPhoneNumber::new("+14155550000").unwrap());
        let body = MessageBody::new("pic").unwrap();
        let url = CallbackUrl::new("https://example.com/a.png").unwrap();

        let err = SendMessage::mms(
            to.clone(),
            from.clone(),
            body.clone(),
            vec![url.clone(); MAX_MEDIA_URLS + 1],
            SendOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::TooManyMediaUrls { .. }));

        let err = SendMessage::mms(to, from, body, Vec::new(), SendOptions::default()).unwrap_err();
        assert!(matches!(err, ValidationError::Empty { .. }));
    }

    #[test]
    fn whatsapp_request_prefixes_both_addresses() {
        let to = RawPhoneNumber::new("+14155552671").unwrap();
        let from = RawPhoneNumber::new("+14155550000").unwrap();
        let request = SendMessage::whatsapp(
            &to,
            &from,
            MessageBody::new("hi").unwrap(),
            SendOptions::default(),
        );
        assert_eq!(request.to().raw(), "whatsapp:+14155552671");
        assert_eq!(
            request.sender(),
            &Sender::From(RawPhoneNumber::new("whatsapp:+14155550000").unwrap())
        );
    }

    #[test]
    fn message_status_maps_known_and_unknown_values() {
        assert_eq!(MessageStatus::from_wire("delivered"), MessageStatus::Delivered);
        assert!(MessageStatus::from_wire("delivered").is_final());
        assert!(!MessageStatus::from_wire("queued").is_final());
        assert_eq!(
            MessageStatus::from_wire("partially_delivered"),
            MessageStatus::Other("partially_delivered".to_owned())
        );
    }

    #[test]
    fn api_exception_display_includes_code_and_info() {
        let exc = ApiException {
            status: 400,
            message: "The 'To' number is not a valid phone number.".to_owned(),
            code: Some(21211),
            more_info: Some("https://www.twilio.com/docs/errors/21211".to_owned()),
        };
        assert_eq!(
            exc.to_string(),
            "The 'To' number is not a valid phone number.: status code: 400, error code: 21211, info: https://www.twilio.com/docs/errors/21211"
        );
    }
}
