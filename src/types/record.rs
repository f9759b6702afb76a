use serde::{Deserialize, Deserializer};
use serde_json::Value;

// Raw shape of one JSONL log line. Every field is optional; the normalizer
// decides what is usable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub message_id: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub request_id: Option<String>,
    #[serde(rename = "requestId", default, deserialize_with = "non_empty_string")]
    pub request_id_camel: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "non_empty_string")]
    pub record_type: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub model: Option<String>,
    #[serde(rename = "Model", default, deserialize_with = "non_empty_string")]
    pub model_capitalized: Option<String>,
    pub message: Option<RawMessage>,
    pub usage: Option<RawUsage>,
    pub request: Option<RawRequest>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMessage {
    #[serde(default, deserialize_with = "non_empty_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub role: Option<String>,
    pub usage: Option<RawUsage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawUsage {
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
    pub cache_creation_input_tokens: Option<u64>,
    pub cache_read_input_tokens: Option<u64>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRequest {
    #[serde(default, deserialize_with = "non_empty_string")]
    pub model: Option<String>,
}

impl RawRecord {
    /// Usage object, preferring the message-level one
    pub fn usage(&self) -> Option<&RawUsage> {
        self.message
            .as_ref()
            .and_then(|m| m.usage.as_ref())
            .or(self.usage.as_ref())
    }

    /// First non-empty model identifier across the known locations
    pub fn model(&self) -> Option<&str> {
        let message_level = self.message.as_ref().and_then(|m| m.model.as_deref());
        let usage_level = self.usage().and_then(|u| u.model.as_deref());
        let request_level = self.request.as_ref().and_then(|r| r.model.as_deref());

        message_level
            .or(self.model.as_deref())
            .or(self.model_capitalized.as_deref())
            .or(usage_level)
            .or(request_level)
    }

    pub fn message_id(&self) -> Option<&str> {
        self.message
            .as_ref()
            .and_then(|m| m.id.as_deref())
            .or(self.id.as_deref())
            .or(self.message_id.as_deref())
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id_camel
            .as_deref()
            .or(self.request_id.as_deref())
    }

    pub fn role(&self) -> Option<&str> {
        self.message
            .as_ref()
            .and_then(|m| m.role.as_deref())
            .or(self.role.as_deref())
            .or(self.record_type.as_deref())
    }
}

// Accepts any JSON value; keeps it only when it is a non-empty string.
fn non_empty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}
