//! Body encodings for the content-negotiated helpers.

use crate::{ClientError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// JSON media type.
pub const MEDIA_JSON: &str = "application/json";

/// XML media type.
pub const MEDIA_XML: &str = "application/xml";

/// A serialization format paired with its media type.
pub trait Codec: Send + Sync {
    /// Media type used for the default `Accept` and `Content-Type` headers.
    fn media_type(&self) -> &'static str;

    /// Serialize a request body.
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>>;

    /// Deserialize a response body.
    fn decode<T: DeserializeOwned>(&self, body: &[u8]) -> Result<T>;
}

/// JSON via `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json;

impl Codec for Json {
    fn media_type(&self) -> &'static str {
        MEDIA_JSON
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| ClientError::encode(MEDIA_JSON, e))
    }

    fn decode<T: DeserializeOwned>(&self, body: &[u8]) -> Result<T> {
        serde_json::from_slice(body).map_err(|e| ClientError::decode(MEDIA_JSON, e))
    }
}

/// XML via `quick-xml`. The root element is named after the serialized type.
#[derive(Debug, Clone, Copy, Default)]
pub struct Xml;

impl Codec for Xml {
    fn media_type(&self) -> &'static str {
        MEDIA_XML
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        quick_xml::se::to_string(value)
            .map(String::into_bytes)
            .map_err(|e| ClientError::encode(MEDIA_XML, e))
    }

    fn decode<T: DeserializeOwned>(&self, body: &[u8]) -> Result<T> {
        quick_xml::de::from_reader(body).map_err(|e| ClientError::decode(MEDIA_XML, e))
    }
}
