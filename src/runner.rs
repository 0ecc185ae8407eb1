//! Run controller: sequences every check and produces the final report.

use crate::health::HealthEvaluator;
use crate::ledger::ReportSink;
use crate::provider::{ClusterStateProvider, HttpProbe, ProcessStatusProvider};
use crate::report::{self, Report};
use crate::routing::RoutingEvaluator;
use std::sync::Arc;

/// Run-wide settings.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Namespace inspected by every check.
    pub namespace: String,
    /// Ingress entry point probed for connectivity.
    pub ingress_url: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            namespace: "default".to_string(),
            ingress_url: "http://localhost:80".to_string(),
        }
    }
}

/// Drives health checks, then routing checks, then aggregation.
pub struct Runner<'a> {
    config: RunConfig,
    status: &'a dyn ProcessStatusProvider,
    cluster: &'a dyn ClusterStateProvider,
    probe: &'a dyn HttpProbe,
    sink: Arc<dyn ReportSink>,
}

impl<'a> Runner<'a> {
    #[must_use]
    pub fn new(
        config: RunConfig,
        status: &'a dyn ProcessStatusProvider,
        cluster: &'a dyn ClusterStateProvider,
        probe: &'a dyn HttpProbe,
        sink: Arc<dyn ReportSink>,
    ) -> Self {
        Self {
            config,
            status,
            cluster,
            probe,
            sink,
        }
    }

    /// Run every check in order and aggregate the ledgers.
    ///
    /// When no ingress resources exist, routing validation and the
    /// connectivity probe are skipped entirely; their outcomes simply never
    /// appear in the totals.
    pub async fn run(&self) -> Report {
        let namespace = &self.config.namespace;

        let mut health = HealthEvaluator::new(self.sink.clone(), self.status, self.cluster);
        health.check_control_plane().await;
        health.check_pods_ready(namespace).await;
        health.check_probe_configuration(namespace).await;
        health.check_service_endpoints(namespace).await;

        let mut routing = RoutingEvaluator::new(
            self.sink.clone(),
            self.cluster,
            self.probe,
            self.config.ingress_url.clone(),
        );
        let ingresses = routing.check_ingress_exists(namespace).await;
        if !ingresses.is_empty() {
            routing.check_routing_rules(&ingresses).await;
            routing.check_connectivity(&ingresses).await;
        }

        let health_ledger = health.into_ledger();
        let routing_ledger = routing.into_ledger();
        let report = report::aggregate(&[
            ("Health Checks", &health_ledger),
            ("Routing Tests", &routing_ledger),
        ]);
        self.sink.report(&report);
        report
    }
}
