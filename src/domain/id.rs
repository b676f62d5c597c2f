//! Domain ID Types with NewType Pattern
//!
//! This module provides type-safe wrappers for domain identifiers to prevent
//! ID mixing errors at compile time. Each ID type implements Display, FromStr,
//! Debug, Serialize, and Deserialize. A listener ID never flows where a
//! target-group ID is expected, which is exactly the kind of wiring mistake
//! a topology builder must rule out.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Macro to generate NewType ID wrappers with all required traits
macro_rules! domain_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Create an ID from an existing string
            pub fn from_string(s: String) -> Self {
                Self(s)
            }

            /// Get the inner string value
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Convert to inner string value
            pub fn into_string(self) -> String {
                self.0
            }

            /// Parse and validate a UUID string
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                Uuid::parse_str(s)?;
                Ok(Self(s.to_string()))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

domain_id! {
    /// Identifier for a network (address space)
    NetworkId
}

domain_id! {
    /// Identifier for a subnet within a network
    SubnetId
}

domain_id! {
    /// Identifier for a security boundary (allow-rule set)
    BoundaryId
}

domain_id! {
    /// Identifier for a private service endpoint
    EndpointId
}

domain_id! {
    /// Identifier for a load-balancer listener
    ListenerId
}

domain_id! {
    /// Identifier for a target group
    TargetGroupId
}

domain_id! {
    /// Identifier for a workload replica
    ReplicaId
}

domain_id! {
    /// Identifier for a public-bridge private link
    LinkId
}
