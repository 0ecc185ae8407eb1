//! Health evaluator: control-plane liveness, pod readiness, probe
//! configuration, and service endpoint checks.
//!
//! Every check converts collaborator failures into recorded outcomes and
//! returns a verdict; nothing propagates past a check boundary. Per-pod and
//! per-container results are always recorded in full — only the combined
//! verdict short-circuits to false.

use crate::ledger::{Ledger, ReportSink};
use crate::provider::{ClusterStateProvider, ProcessStatusProvider, ProviderError};
use std::sync::Arc;
use tracing::debug;

pub struct HealthEvaluator<'a> {
    ledger: Ledger,
    status: &'a dyn ProcessStatusProvider,
    cluster: &'a dyn ClusterStateProvider,
}

impl<'a> HealthEvaluator<'a> {
    #[must_use]
    pub fn new(
        sink: Arc<dyn ReportSink>,
        status: &'a dyn ProcessStatusProvider,
        cluster: &'a dyn ClusterStateProvider,
    ) -> Self {
        Self {
            ledger: Ledger::new(sink),
            status,
            cluster,
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

    /// Control-plane liveness: the service status text is `active`.
    pub async fn check_control_plane(&mut self) -> bool {
        self.ledger.section("K3s Service Health Check");
        match self.status.control_plane_status().await {
            Ok(raw) => {
                let status = raw.trim();
                let active = status == "active";
                self.ledger
                    .record("K3s Service Running", active, format!("Status: {status}"));
                active
            }
            Err(err) => {
                self.ledger.record("K3s Service Running", false, err.to_string());
                false
            }
        }
    }

    /// Pod readiness: every pod must be `Running` with a `True` ready
    /// condition. One outcome per pod; verdict is the AND across all pods.
    pub async fn check_pods_ready(&mut self, namespace: &str) -> bool {
        self.ledger.section("Pod Readiness Check");
        let pods = match self.cluster.list_pods(namespace).await {
            Ok(pods) => pods,
            Err(ProviderError::Fetch(err)) => {
                debug!(%err, "pod fetch failed");
                self.ledger
                    .record("Get Pods", false, "Failed to retrieve pod information");
                return false;
            }
            Err(ProviderError::Decode(err)) => {
                debug!(%err, "pod decode failed");
                self.ledger.record("Parse Pod Data", false, "Invalid JSON response");
                return false;
            }
        };

        if pods.is_empty() {
            self.ledger
                .record("Pod Existence", false, "No pods found in cluster");
            return false;
        }

        let mut all_ready = true;
        for pod in &pods {
            let ready = pod.is_ready();
            self.ledger.record(
                format!("Pod Ready: {}", pod.name),
                ready,
                format!("Phase: {}, Ready: {}", pod.phase, pod.ready_status()),
            );
            all_ready &= ready;
        }
        all_ready
    }

    /// Probe configuration: every container should declare both a liveness
    /// and a readiness probe. Missing probes fail the entry (and the verdict)
    /// but are advisory; the details string carries that distinction.
    pub async fn check_probe_configuration(&mut self, namespace: &str) -> bool {
        self.ledger.section("Liveness/Readiness Probe Check");
        let pods = match self.cluster.list_pods(namespace).await {
            Ok(pods) => pods,
            Err(ProviderError::Fetch(err)) => {
                debug!(%err, "probe fetch failed");
                self.ledger
                    .record("Get Pod Probes", false, "Cannot retrieve probe configuration");
                return false;
            }
            Err(ProviderError::Decode(err)) => {
                debug!(%err, "probe decode failed");
                self.ledger.record("Parse Pod Data", false, "Invalid JSON response");
                return false;
            }
        };

        let mut all_configured = true;
        for pod in &pods {
            for container in &pod.containers {
                let configured = container.has_both_probes();
                let probe_status = format!(
                    "Liveness: {}, Readiness: {}",
                    container.has_liveness_probe, container.has_readiness_probe
                );
                let details = if configured {
                    probe_status
                } else {
                    format!("{probe_status} - Probes recommended for production")
                };
                self.ledger.record(
                    format!("Probes: {}/{}", pod.name, container.name),
                    configured,
                    details,
                );
                all_configured &= configured;
            }
        }
        all_configured
    }

    /// Service endpoints: every non-reserved service must have at least one
    /// active endpoint address.
    pub async fn check_service_endpoints(&mut self, namespace: &str) -> bool {
        self.ledger.section("Service Endpoints Check");
        let services = match self.cluster.list_services(namespace).await {
            Ok(services) => services,
            Err(ProviderError::Fetch(err)) => {
                debug!(%err, "service fetch failed");
                self.ledger
                    .record("Get Services", false, "Cannot retrieve services");
                return false;
            }
            Err(ProviderError::Decode(err)) => {
                debug!(%err, "service decode failed");
                self.ledger
                    .record("Parse Service Data", false, "Invalid JSON response");
                return false;
            }
        };

        let mut all_healthy = true;
        for service in services.iter().filter(|service| !service.is_reserved()) {
            match self.cluster.get_endpoints(&service.name, namespace).await {
                Ok(endpoints) => {
                    let healthy = endpoints.has_active_endpoints();
                    self.ledger.record(
                        format!("Service Endpoints: {}", service.name),
                        healthy,
                        format!("Active endpoints: {}", endpoints.endpoint_count()),
                    );
                    all_healthy &= healthy;
                }
                Err(err) => {
                    debug!(%err, service = %service.name, "endpoint fetch failed");
                    self.ledger.record(
                        format!("Service Endpoints: {}", service.name),
                        false,
                        "Cannot get endpoints",
                    );
                    all_healthy = false;
                }
            }
        }
        all_healthy
    }
}
