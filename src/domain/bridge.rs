//! Public bridge domain types
//!
//! A private link lets the managed public HTTP front door forward traffic
//! into the internal listener as a trusted peer, with one wildcard route
//! capturing every sub-path under any HTTP method. The forward preserves
//! the original method and full path unmodified.

use crate::domain::id::{LinkId, ListenerId, SubnetId};
use crate::domain::routing::PathPattern;
use crate::errors::{GangwayError, Result};
use serde::{Deserialize, Serialize};

/// HTTP methods a bridge route accepts
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodSet {
    /// Any HTTP method
    #[default]
    Any,

    /// An explicit method list
    Methods(Vec<String>),
}

impl MethodSet {
    /// Whether the set admits the given method
    pub fn admits(&self, method: &str) -> bool {
        match self {
            MethodSet::Any => true,
            MethodSet::Methods(methods) => methods.iter().any(|m| m.eq_ignore_ascii_case(method)),
        }
    }

    /// Route-definition rendering (`ANY` for the full set)
    pub fn as_route_string(&self) -> String {
        match self {
            MethodSet::Any => "ANY".to_string(),
            MethodSet::Methods(methods) => methods.join(","),
        }
    }
}

/// The private link between the public front door and the internal listener
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivateLink {
    pub id: LinkId,
    pub name: String,

    /// Isolated subnets the link's network interfaces live in
    pub subnet_ids: Vec<SubnetId>,

    /// The listener the link forwards to (non-owning reference; the
    /// listener must already exist with its default action configured)
    pub listener_id: ListenerId,
}

/// A (path-pattern, method-set) pair bound to exactly one link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeRoute {
    pub pattern: PathPattern,
    pub methods: MethodSet,
    pub link_id: LinkId,
}

impl BridgeRoute {
    /// Route-definition key, e.g. `ANY /{proxy+}`
    pub fn route_key(&self) -> String {
        format!("{} {}", self.methods.as_route_string(), self.pattern.as_pattern_string())
    }
}

/// The public bridge: one link, one wildcard route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicBridge {
    pub link: PrivateLink,
    pub routes: Vec<BridgeRoute>,
}

impl PublicBridge {
    /// Build the bridge over the given subnets, forwarding to the given
    /// listener. Exactly one route is declared: wildcard path, any method.
    pub fn build(
        name: impl Into<String>,
        subnet_ids: Vec<SubnetId>,
        listener_id: ListenerId,
    ) -> Result<Self> {
        if subnet_ids.is_empty() {
            return Err(GangwayError::validation(
                "public bridge requires at least one isolated subnet",
            ));
        }
        let link = PrivateLink { id: LinkId::new(), name: name.into(), subnet_ids, listener_id };
        let routes = vec![BridgeRoute {
            pattern: PathPattern::Any,
            methods: MethodSet::Any,
            link_id: link.id.clone(),
        }];
        Ok(Self { link, routes })
    }

    /// What the internal listener observes for a request arriving at the
    /// public endpoint: the method and full sub-path, unmodified.
    pub fn forward<'a>(&self, method: &'a str, path: &'a str) -> Option<(&'a str, &'a str)> {
        self.routes
            .iter()
            .any(|route| route.methods.admits(method) && route.pattern.matches(path))
            .then_some((method, path))
    }
}
