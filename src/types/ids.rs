use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the inner string value
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume self and return the inner String
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_newtype!(
    /// Provider-assigned message identifier
    MessageId
);

string_newtype!(
    /// Originating request identifier, the second half of the dedup key
    RequestId
);

string_newtype!(
    /// Name of the project directory an event was read from
    ProjectLabel
);

/// Compound dedup key, `message_id:request_id`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniqueHash(String);

impl UniqueHash {
    pub fn from_ids(message_id: &MessageId, request_id: &RequestId) -> Self {
        let mut key =
            String::with_capacity(message_id.as_str().len() + request_id.as_str().len() + 1);
        key.push_str(message_id.as_str());
        key.push(':');
        key.push_str(request_id.as_str());
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<(&MessageId, &RequestId)> for UniqueHash {
    fn from((message_id, request_id): (&MessageId, &RequestId)) -> Self {
        Self::from_ids(message_id, request_id)
    }
}

impl fmt::Display for UniqueHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
