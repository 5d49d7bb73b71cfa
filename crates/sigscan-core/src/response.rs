//! Captured HTTP response evaluated by the match engine.

use std::collections::HashMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// An already-fetched HTTP response.
///
/// Header names are stored exactly as received and looked up case-sensitively.
/// A name may carry several values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct HttpResponse {
    pub status_code: u16,
    #[serde(default, with = "body_text")]
    pub body: Bytes,
    #[serde(default)]
    pub header: HashMap<String, Vec<String>>,
}

impl HttpResponse {
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            ..Self::default()
        }
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Append a value for `name`, keeping earlier values for the same name.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.header
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }

    pub fn header_values(&self, name: &str) -> Option<&[String]> {
        self.header.get(name).map(Vec::as_slice)
    }
}

/// Bodies are written as text when they are valid UTF-8 and as a byte
/// sequence otherwise. Either form is accepted when reading.
mod body_text {
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Body {
        Text(String),
        Raw(Vec<u8>),
    }

    pub fn serialize<S: Serializer>(body: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        match std::str::from_utf8(body) {
            Ok(text) => serializer.serialize_str(text),
            Err(_) => body.as_ref().serialize(serializer),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        Ok(match Body::deserialize(deserializer)? {
            Body::Text(text) => Bytes::from(text),
            Body::Raw(raw) => Bytes::from(raw),
        })
    }
}
