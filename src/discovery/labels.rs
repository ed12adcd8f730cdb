//! Label projection: workload metadata → proxy intent.

use crate::discovery::runtime::Workload;
use crate::routing::ProxyIntent;

/// Fully qualified label names under a prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelKeys {
    pub enable: String,
    pub name: String,
    pub port: String,
}

impl LabelKeys {
    pub fn new(prefix: &str) -> Self {
        Self {
            enable: format!("{prefix}.enable"),
            name: format!("{prefix}.name"),
            port: format!("{prefix}.port"),
        }
    }
}

/// Project one workload, or `None` if it is not opted in or has no usable port.
///
/// - host: `<name label | primary name>.<domain>`
/// - upstream: `localhost:<port label | first published port>`
pub fn project_workload(workload: &Workload, keys: &LabelKeys, domain: &str) -> Option<ProxyIntent> {
    if workload.labels.get(&keys.enable).map(String::as_str) != Some("true") {
        return None;
    }

    let Some(name) = workload.labels.get(&keys.name).or(workload.name.as_ref()) else {
        tracing::warn!(labels = ?workload.labels, "Workload has no name, skipping");
        return None;
    };

    let port = match workload.labels.get(&keys.port) {
        Some(raw) => match raw.trim().parse::<u16>() {
            Ok(port) => Some(port),
            Err(_) => {
                tracing::warn!(workload = %name, port = %raw, "Invalid port label, using first published port");
                workload.published_ports.first().copied()
            }
        },
        None => workload.published_ports.first().copied(),
    };
    let Some(port) = port else {
        tracing::warn!(workload = %name, "Workload has no port exposed, skipping");
        return None;
    };

    Some(ProxyIntent::new(
        format!("{name}.{domain}"),
        format!("localhost:{port}"),
    ))
}
