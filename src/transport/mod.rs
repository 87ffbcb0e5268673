//! Transport layer: HTTP and wire-format details (serialization/deserialization, signing).

mod canonical;
mod jwt;
mod messages;
mod price;
mod signature;

pub use canonical::canonical_form;
pub use jwt::{ACCESS_TOKEN_CONTENT_TYPE, encode_access_token_jwt};
pub use messages::{
    decode_exception_json_response, decode_message_json_response, encode_send_message_form,
};
pub use signature::{sign_hmac_sha1, verify_hmac_sha1};
