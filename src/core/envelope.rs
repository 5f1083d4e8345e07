use crate::traits::{Frame, LiveboardError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A typed wire message: a required `type` tag plus opaque payload fields
///
/// The tag is the dispatch key; everything else is consumer-defined and
/// passed through untouched. Both inbound and outbound frames use this
/// shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Dispatch tag
    #[serde(rename = "type")]
    pub tag: String,

    /// Remaining fields of the message object
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Envelope {
    /// Create an envelope with the given tag and an empty payload
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            payload: Map::new(),
        }
    }

    /// Add a payload field (builder style)
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Get a payload field
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Parse an inbound frame into an envelope.
    ///
    /// # Errors
    /// `LiveboardError::Parse` when the frame is not a JSON object with a
    /// string `type` field. The connection survives; the frame is dropped.
    pub fn from_frame(frame: &Frame) -> Result<Self> {
        let parsed = match frame {
            Frame::Text(text) => serde_json::from_str(text),
            Frame::Binary(bytes) => serde_json::from_slice(bytes),
        };
        parsed.map_err(|e| LiveboardError::Parse(e.to_string()))
    }

    /// Serialize the envelope into an outbound text frame
    pub fn to_frame(&self) -> Result<Frame> {
        serde_json::to_string(self)
            .map(Frame::Text)
            .map_err(|e| LiveboardError::Parse(e.to_string()))
    }
}
