use serde::Deserialize;
use serde::de::Error as DeError;

/// Price-like value returned by Twilio as a JSON string, a JSON number, or `null`.
///
/// For numbers, the raw JSON token is preserved to avoid formatting drift
/// (`-0.00750` remains `"-0.00750"` instead of becoming `"-0.0075"`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportPrice(Option<String>);

impl TransportPrice {
    pub fn into_option(self) -> Option<String> {
        self.0
    }
}

impl<'de> Deserialize<'de> for TransportPrice {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw: Box<serde_json::value::RawValue> = Deserialize::deserialize(deserializer)?;
        let token = raw.get();

        match token.as_bytes().first().copied() {
            Some(b'"') => {
                let parsed = serde_json::from_str::<String>(token).map_err(D::Error::custom)?;
                Ok(Self(Some(parsed)))
            }
            Some(b'-' | b'0'..=b'9') => Ok(Self(Some(token.to_owned()))),
            Some(b'n') if token == "null" => Ok(Self(None)),
            _ => Err(D::Error::custom(
                "expected price field to be JSON string, number or null",
            )),
        }
    }
}

/// Count returned by Twilio as a JSON string (`"1"`) or number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportCount(Option<u32>);

impl TransportCount {
    pub fn into_option(self) -> Option<u32> {
        self.0
    }
}

impl<'de> Deserialize<'de> for TransportCount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Number(u32),
            String(String),
            Null,
        }

        match Wire::deserialize(deserializer)? {
            Wire::Number(value) => Ok(Self(Some(value))),
            Wire::String(value) => value
                .trim()
                .parse::<u32>()
                .map(|value| Self(Some(value)))
                .map_err(|_| D::Error::custom(format!("invalid count: {value}"))),
            Wire::Null => Ok(Self(None)),
        }
    }
}
