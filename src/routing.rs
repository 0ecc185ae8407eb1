//! Routing evaluator: ingress existence, routing rule validation, and the
//! live connectivity probe.

use crate::ledger::{Ledger, ReportSink};
use crate::provider::{ClusterStateProvider, HttpProbe, ProviderError};
use crate::snapshot::IngressSnapshot;
use std::sync::Arc;
use tracing::debug;

/// Status codes that prove the request was routed and answered, regardless of
/// semantic success.
const ROUTED_STATUSES: [u16; 4] = [200, 301, 302, 404];

/// Whether a response status counts as "reachable" for the connectivity probe.
#[must_use]
pub fn is_routed_status(code: u16) -> bool {
    ROUTED_STATUSES.contains(&code)
}

pub struct RoutingEvaluator<'a> {
    ledger: Ledger,
    cluster: &'a dyn ClusterStateProvider,
    probe: &'a dyn HttpProbe,
    /// Entry point probed with each host as the routing key.
    ingress_url: String,
}

impl<'a> RoutingEvaluator<'a> {
    #[must_use]
    pub fn new(
        sink: Arc<dyn ReportSink>,
        cluster: &'a dyn ClusterStateProvider,
        probe: &'a dyn HttpProbe,
        ingress_url: impl Into<String>,
    ) -> Self {
        Self {
            ledger: Ledger::new(sink),
            cluster,
            probe,
            ingress_url: ingress_url.into(),
        }
    }

    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    #[must_use]
    pub fn into_ledger(self) -> Ledger {
        self.ledger
    }

    /// Ingress existence: fetch the ingress list and record whether any
    /// resources are present. Returns the (possibly empty) list.
    pub async fn check_ingress_exists(&mut self, namespace: &str) -> Vec<IngressSnapshot> {
        self.ledger.section("Ingress Configuration Check");
        match self.cluster.list_ingresses(namespace).await {
            Ok(ingresses) => {
                if ingresses.is_empty() {
                    self.ledger
                        .record("Ingress Existence", false, "No ingress resources found");
                } else {
                    self.ledger.record(
                        "Ingress Existence",
                        true,
                        format!("Found {} ingress resource(s)", ingresses.len()),
                    );
                }
                ingresses
            }
            Err(ProviderError::Fetch(err)) => {
                debug!(%err, "ingress fetch failed");
                self.ledger
                    .record("Get Ingress", false, "Cannot retrieve ingress resources");
                Vec::new()
            }
            Err(ProviderError::Decode(err)) => {
                debug!(%err, "ingress decode failed");
                self.ledger
                    .record("Parse Ingress Data", false, "Invalid JSON response");
                Vec::new()
            }
        }
    }

    /// Routing rule validation: every (ingress, rule, path) triple must point
    /// at an existing backend service. One outcome per path, named after the
    /// ingress; verdict is the AND across all paths.
    pub async fn check_routing_rules(&mut self, ingresses: &[IngressSnapshot]) -> bool {
        self.ledger.section("Ingress Routing Test");
        let mut all_passed = true;
        for ingress in ingresses {
            for rule in &ingress.rules {
                for path in &rule.paths {
                    let routing_info = format!(
                        "Host: {}, Path: {} → Service: {}:{}",
                        rule.derived_host(),
                        path.derived_path(),
                        path.backend_service,
                        path.port_display()
                    );
                    if self.cluster.service_exists(&path.backend_service).await {
                        self.ledger.record(
                            format!("Ingress Route: {}", ingress.name),
                            true,
                            routing_info,
                        );
                    } else {
                        self.ledger.record(
                            format!("Ingress Route: {}", ingress.name),
                            false,
                            format!("{routing_info} - Backend service not found"),
                        );
                        all_passed = false;
                    }
                }
            }
        }
        all_passed
    }

    /// Connectivity probe: one request per distinct derived host, in
    /// first-encounter order, against the ingress entry point. A response in
    /// [`ROUTED_STATUSES`] counts as reachable; a transport failure records
    /// the underlying error text.
    pub async fn check_connectivity(&mut self, ingresses: &[IngressSnapshot]) -> bool {
        self.ledger.section("Ingress HTTP Connectivity Test");

        let mut hosts: Vec<&str> = Vec::new();
        for ingress in ingresses {
            for rule in &ingress.rules {
                let host = rule.derived_host();
                if !hosts.contains(&host) {
                    hosts.push(host);
                }
            }
        }

        let mut all_passed = true;
        for host in hosts {
            match self.probe.get(&self.ingress_url, host).await {
                Ok(code) => {
                    let routed = is_routed_status(code);
                    self.ledger.record(
                        format!("HTTP Request: {host}"),
                        routed,
                        format!("Status: {code}"),
                    );
                    all_passed &= routed;
                }
                Err(ProviderError::Fetch(err) | ProviderError::Decode(err)) => {
                    self.ledger.record(
                        format!("HTTP Request: {host}"),
                        false,
                        format!("Connection failed: {err}"),
                    );
                    all_passed = false;
                }
            }
        }
        all_passed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routed_status_set() {
        // Exactly {200, 301, 302, 404} count as routed
        assert!(is_routed_status(200));
        assert!(is_routed_status(301));
        assert!(is_routed_status(302));
        assert!(is_routed_status(404));

        assert!(!is_routed_status(201));
        assert!(!is_routed_status(303));
        assert!(!is_routed_status(403));
        assert!(!is_routed_status(500));
        assert!(!is_routed_status(502));
        assert!(!is_routed_status(503));
    }
}
