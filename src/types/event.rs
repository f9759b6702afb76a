use super::ids::{MessageId, ProjectLabel, RequestId, UniqueHash};
use super::pricing::TokenUsage;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Usage-bearing records are responses unless they say otherwise
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("user") => Role::User,
            _ => Role::Assistant,
        }
    }
}

/// One validated, usage-bearing record
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: Option<MessageId>,
    pub correlation_id: RequestId,
    pub timestamp: DateTime<Utc>,
    pub role: Role,
    pub model: Option<String>,
    pub project: Option<ProjectLabel>,
    pub usage: Option<TokenUsage>,
}

impl Event {
    /// Dedup key; events without a message id are never treated as duplicates
    pub fn unique_hash(&self) -> Option<UniqueHash> {
        self.id
            .as_ref()
            .map(|id| UniqueHash::from_ids(id, &self.correlation_id))
    }

    /// Input + output tokens, zero when the event has no usage
    #[inline]
    pub fn billed_tokens(&self) -> u64 {
        self.usage.map(|u| u.billed_tokens()).unwrap_or(0)
    }

    /// Whether the event carries any quota-relevant consumption
    #[inline]
    pub fn is_billable(&self) -> bool {
        self.usage.is_some_and(|u| u.is_billable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse(Some("user")), Role::User);
        assert_eq!(Role::parse(Some("USER")), Role::User);
        assert_eq!(Role::parse(Some("assistant")), Role::Assistant);
        assert_eq!(Role::parse(None), Role::Assistant);
    }

    #[test]
    fn test_unique_hash_requires_id() {
        let event = Event {
            id: None,
            correlation_id: RequestId::from("req"),
            timestamp: Utc::now(),
            role: Role::Assistant,
            model: None,
            project: None,
            usage: None,
        };
        assert!(event.unique_hash().is_none());
        assert_eq!(event.billed_tokens(), 0);
        assert!(!event.is_billable());

        let event = Event {
            id: Some(MessageId::from("msg")),
            ..event
        };
        assert_eq!(event.unique_hash().unwrap().as_str(), "msg:req");
    }
}
