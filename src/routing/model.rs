//! Proxy intents and their control-plane representation.

use serde::{Deserialize, Serialize};

use crate::routing::id::derive_id;

/// Handler name the control plane uses for reverse proxying.
pub const REVERSE_PROXY_HANDLER: &str = "reverse_proxy";

/// A desired host → upstream mapping.
///
/// Created by a management request or projected from workload labels.
/// The `id` is informational on input; identity always comes from `derive_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyIntent {
    #[serde(default)]
    pub id: String,
    /// Dial target, `host:port`.
    pub upstream: String,
    /// Hostname pattern.
    #[serde(rename = "match")]
    pub host_match: String,
}

impl ProxyIntent {
    pub fn new(host_match: impl Into<String>, upstream: impl Into<String>) -> Self {
        let host_match = host_match.into();
        Self {
            id: derive_id(&host_match),
            upstream: upstream.into(),
            host_match,
        }
    }

    /// Project into a routing rule with a single reverse-proxy handler.
    pub fn to_routing_rule(&self) -> RoutingRule {
        RoutingRule {
            id: derive_id(&self.host_match),
            handle: vec![Handle {
                handler: REVERSE_PROXY_HANDLER.to_string(),
                upstreams: vec![Upstream {
                    dial: self.upstream.clone(),
                }],
            }],
            matchers: vec![HostMatch {
                host: vec![self.host_match.clone()],
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upstream {
    pub dial: String,
}

/// One handler in a route's chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handle {
    pub handler: String,
    #[serde(default)]
    pub upstreams: Vec<Upstream>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostMatch {
    #[serde(default)]
    pub host: Vec<String>,
}

/// Control-plane route: identifier, match predicates and handler chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingRule {
    #[serde(rename = "@id", default)]
    pub id: String,
    #[serde(default)]
    pub handle: Vec<Handle>,
    #[serde(rename = "match", default)]
    pub matchers: Vec<HostMatch>,
}

impl RoutingRule {
    /// Reconstruct the intent this rule represents.
    ///
    /// Only reverse-proxy rules qualify. Rules with several matches or
    /// upstreams surface their first host and first upstream only.
    pub fn to_intent(&self) -> Option<ProxyIntent> {
        let handle = self.handle.first()?;
        if handle.handler != REVERSE_PROXY_HANDLER {
            return None;
        }
        let upstream = handle.upstreams.first()?;
        let host = self.matchers.first()?.host.first()?;

        Some(ProxyIntent {
            id: self.id.clone(),
            upstream: upstream.dial.clone(),
            host_match: host.clone(),
        })
    }
}

/// A named server in the control plane: listen addresses and ordered routes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerRoutes {
    #[serde(default)]
    pub listen: Vec<String>,
    #[serde(default)]
    pub routes: Vec<RoutingRule>,
}

impl ServerRoutes {
    /// Empty server listening on the given addresses.
    pub fn bootstrap(listen: &[String]) -> Self {
        Self {
            listen: listen.to_vec(),
            routes: Vec::new(),
        }
    }
}
