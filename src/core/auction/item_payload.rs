// Opaque item payloads.
//
// The host serializes its item type into bytes; the core only stores and
// returns them. On disk the bytes are base64 text.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("Invalid base64 payload: {0}")]
    Encoding(String),

    #[error("Item could not be encoded: {0}")]
    Encode(String),

    #[error("Item could not be decoded: {0}")]
    Decode(String),
}

/// Serialized host item, treated as an uninterpreted byte blob.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPayload(Vec<u8>);

impl ItemPayload {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }

    /// Decode stored text. Line breaks are ignored so wrapped legacy data loads.
    pub fn from_base64(text: &str) -> Result<Self, PayloadError> {
        let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        STANDARD
            .decode(compact)
            .map(Self)
            .map_err(|e| PayloadError::Encoding(e.to_string()))
    }

    /// Like `from_base64`, but a corrupt row becomes an empty payload so one
    /// bad listing doesn't break a whole page.
    pub fn from_base64_lossy(text: &str) -> Self {
        Self::from_base64(text).unwrap_or_else(|e| {
            tracing::warn!("Discarding unreadable item payload: {}", e);
            Self::default()
        })
    }
}

/// Host-side conversion between its item type and payload bytes.
pub trait ItemCodec {
    type Item;

    fn encode(&self, item: &Self::Item) -> Result<ItemPayload, PayloadError>;

    fn decode(&self, payload: &ItemPayload) -> Result<Self::Item, PayloadError>;

    /// Stand-in shown when a payload can't be decoded.
    fn placeholder(&self) -> Self::Item;

    fn decode_or_placeholder(&self, payload: &ItemPayload) -> Self::Item {
        match self.decode(payload) {
            Ok(item) => item,
            Err(e) => {
                tracing::warn!("Using placeholder item: {}", e);
                self.placeholder()
            }
        }
    }
}
