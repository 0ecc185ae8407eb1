//! Production collaborators: `systemctl`/`kubectl` shell-outs and the
//! reqwest-backed connectivity probe.
//!
//! All JSON from `kubectl -o json` is decoded here, once, into the typed
//! snapshots in [`crate::snapshot`]; the evaluators never see raw JSON.

use crate::provider::{
    ClusterStateProvider, HttpProbe, ProcessStatusProvider, ProviderError, ProviderResult,
};
use crate::snapshot::{
    ConditionStatus, ContainerSpec, EndpointSnapshot, EndpointSubset, IngressRule,
    IngressSnapshot, PathRule, PodPhase, PodSnapshot, ServiceSnapshot,
};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Upper bound on any single kubectl/systemctl invocation.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound on a single connectivity probe request.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Run a command to completion under [`COMMAND_TIMEOUT`], returning stdout.
/// Non-zero exit is a fetch failure carrying stderr.
async fn run_command(program: &str, args: &[&str]) -> ProviderResult<String> {
    debug!(program, ?args, "running command");
    let output = tokio::time::timeout(COMMAND_TIMEOUT, Command::new(program).args(args).output())
        .await
        .map_err(|_| {
            ProviderError::Fetch(format!(
                "{program} timed out after {}s",
                COMMAND_TIMEOUT.as_secs()
            ))
        })?
        .map_err(|err| ProviderError::Fetch(format!("failed to execute {program}: {err}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ProviderError::Fetch(format!(
            "{program} exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn decode<T: serde::de::DeserializeOwned>(json: &str) -> ProviderResult<T> {
    serde_json::from_str(json).map_err(|err| ProviderError::Decode(err.to_string()))
}

// =============================================================================
// Control-plane status via systemctl
// =============================================================================

/// Reads the control-plane service state via `systemctl is-active`.
pub struct SystemctlStatus {
    unit: String,
}

impl SystemctlStatus {
    #[must_use]
    pub fn new(unit: impl Into<String>) -> Self {
        Self { unit: unit.into() }
    }
}

#[async_trait]
impl ProcessStatusProvider for SystemctlStatus {
    async fn control_plane_status(&self) -> ProviderResult<String> {
        // `systemctl is-active` exits non-zero for inactive units while still
        // printing the state, so the exit code is not consulted here.
        let output = tokio::time::timeout(
            COMMAND_TIMEOUT,
            Command::new("systemctl")
                .args(["is-active", &self.unit])
                .output(),
        )
        .await
        .map_err(|_| {
            ProviderError::Fetch(format!(
                "systemctl timed out after {}s",
                COMMAND_TIMEOUT.as_secs()
            ))
        })?
        .map_err(|err| ProviderError::Fetch(format!("failed to execute systemctl: {err}")))?;

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

// =============================================================================
// Cluster state via kubectl -o json
// =============================================================================

/// Wire types for the slices of kubectl JSON this harness reads. Everything
/// optional in the platform's schema is optional here, with defaults applied
/// during conversion to snapshots.
#[derive(Deserialize)]
struct ObjectList<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Deserialize)]
struct WireMeta {
    name: String,
}

#[derive(Deserialize)]
struct WirePod {
    metadata: WireMeta,
    #[serde(default)]
    status: WirePodStatus,
    #[serde(default)]
    spec: WirePodSpec,
}

#[derive(Deserialize, Default)]
struct WirePodStatus {
    #[serde(default)]
    phase: Option<String>,
    #[serde(default)]
    conditions: Vec<WireCondition>,
}

#[derive(Deserialize)]
struct WireCondition {
    #[serde(rename = "type")]
    kind: String,
    status: String,
}

#[derive(Deserialize, Default)]
struct WirePodSpec {
    #[serde(default)]
    containers: Vec<WireContainer>,
}

#[derive(Deserialize)]
struct WireContainer {
    name: String,
    #[serde(default, rename = "livenessProbe")]
    liveness_probe: Option<serde_json::Value>,
    #[serde(default, rename = "readinessProbe")]
    readiness_probe: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct WireService {
    metadata: WireMeta,
}

#[derive(Deserialize)]
struct WireEndpoints {
    metadata: WireMeta,
    #[serde(default)]
    subsets: Vec<WireSubset>,
}

#[derive(Deserialize, Default)]
struct WireSubset {
    #[serde(default)]
    addresses: Vec<WireAddress>,
}

#[derive(Deserialize)]
struct WireAddress {
    ip: String,
}

#[derive(Deserialize)]
struct WireIngress {
    metadata: WireMeta,
    #[serde(default)]
    spec: WireIngressSpec,
}

#[derive(Deserialize, Default)]
struct WireIngressSpec {
    #[serde(default)]
    rules: Vec<WireIngressRule>,
}

#[derive(Deserialize)]
struct WireIngressRule {
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    http: Option<WireHttpPaths>,
}

#[derive(Deserialize, Default)]
struct WireHttpPaths {
    #[serde(default)]
    paths: Vec<WirePath>,
}

#[derive(Deserialize)]
struct WirePath {
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    backend: WireBackend,
}

#[derive(Deserialize, Default)]
struct WireBackend {
    #[serde(default)]
    service: Option<WireBackendService>,
}

#[derive(Deserialize)]
struct WireBackendService {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    port: Option<WireBackendPort>,
}

#[derive(Deserialize)]
struct WireBackendPort {
    #[serde(default)]
    number: Option<i32>,
}

impl From<WirePod> for PodSnapshot {
    fn from(pod: WirePod) -> Self {
        let phase = pod
            .status
            .phase
            .as_deref()
            .map_or(PodPhase::Unknown, PodPhase::parse);
        let ready_condition = pod
            .status
            .conditions
            .iter()
            .find(|condition| condition.kind == "Ready")
            .map(|condition| ConditionStatus::parse(&condition.status));
        let containers = pod
            .spec
            .containers
            .into_iter()
            .map(|container| ContainerSpec {
                name: container.name,
                has_liveness_probe: container.liveness_probe.is_some(),
                has_readiness_probe: container.readiness_probe.is_some(),
            })
            .collect();
        Self {
            name: pod.metadata.name,
            phase,
            ready_condition,
            containers,
        }
    }
}

impl From<WireEndpoints> for EndpointSnapshot {
    fn from(endpoints: WireEndpoints) -> Self {
        Self {
            service_name: endpoints.metadata.name,
            subsets: endpoints
                .subsets
                .into_iter()
                .map(|subset| EndpointSubset {
                    addresses: subset
                        .addresses
                        .into_iter()
                        .map(|address| address.ip)
                        .collect(),
                })
                .collect(),
        }
    }
}

impl From<WireIngress> for IngressSnapshot {
    fn from(ingress: WireIngress) -> Self {
        let rules = ingress
            .spec
            .rules
            .into_iter()
            .map(|rule| IngressRule {
                host: rule.host,
                paths: rule
                    .http
                    .unwrap_or_default()
                    .paths
                    .into_iter()
                    .map(|path| {
                        let service = path.backend.service;
                        let backend_service = service
                            .as_ref()
                            .and_then(|svc| svc.name.clone())
                            .unwrap_or_else(|| "unknown".to_string());
                        let backend_port = service
                            .and_then(|svc| svc.port)
                            .and_then(|port| port.number);
                        PathRule {
                            path: path.path,
                            backend_service,
                            backend_port,
                        }
                    })
                    .collect(),
            })
            .collect();
        Self {
            name: ingress.metadata.name,
            rules,
        }
    }
}

/// Cluster state provider backed by `kubectl get ... -o json`.
#[derive(Debug, Default, Clone, Copy)]
pub struct KubectlProvider;

impl KubectlProvider {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ClusterStateProvider for KubectlProvider {
    async fn list_pods(&self, namespace: &str) -> ProviderResult<Vec<PodSnapshot>> {
        let json = run_command("kubectl", &["get", "pods", "-n", namespace, "-o", "json"]).await?;
        let list: ObjectList<WirePod> = decode(&json)?;
        Ok(list.items.into_iter().map(Into::into).collect())
    }

    async fn list_services(&self, namespace: &str) -> ProviderResult<Vec<ServiceSnapshot>> {
        let json =
            run_command("kubectl", &["get", "services", "-n", namespace, "-o", "json"]).await?;
        let list: ObjectList<WireService> = decode(&json)?;
        Ok(list
            .items
            .into_iter()
            .map(|service| ServiceSnapshot {
                name: service.metadata.name,
            })
            .collect())
    }

    async fn get_endpoints(
        &self,
        service: &str,
        namespace: &str,
    ) -> ProviderResult<EndpointSnapshot> {
        let json = run_command(
            "kubectl",
            &["get", "endpoints", service, "-n", namespace, "-o", "json"],
        )
        .await?;
        let endpoints: WireEndpoints = decode(&json)?;
        Ok(endpoints.into())
    }

    async fn list_ingresses(&self, namespace: &str) -> ProviderResult<Vec<IngressSnapshot>> {
        let json =
            run_command("kubectl", &["get", "ingress", "-n", namespace, "-o", "json"]).await?;
        let list: ObjectList<WireIngress> = decode(&json)?;
        Ok(list.items.into_iter().map(Into::into).collect())
    }

    async fn service_exists(&self, name: &str) -> bool {
        run_command("kubectl", &["get", "service", name, "-o", "json"])
            .await
            .is_ok()
    }
}

// =============================================================================
// Connectivity probe via reqwest
// =============================================================================

/// HTTP probe with a bounded per-request timeout and no retries.
pub struct ReqwestProbe {
    client: reqwest::Client,
}

impl ReqwestProbe {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(PROBE_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }
}

impl Default for ReqwestProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpProbe for ReqwestProbe {
    async fn get(&self, url: &str, host: &str) -> ProviderResult<u16> {
        debug!(url, host, "probing ingress entry point");
        let response = self
            .client
            .get(url)
            .header(reqwest::header::HOST, host)
            .send()
            .await
            .map_err(|err| ProviderError::Fetch(err.to_string()))?;
        Ok(response.status().as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_pod_with_ready_condition() {
        let json = r#"{
            "items": [{
                "metadata": {"name": "web-0"},
                "status": {
                    "phase": "Running",
                    "conditions": [
                        {"type": "Initialized", "status": "True"},
                        {"type": "Ready", "status": "True"}
                    ]
                },
                "spec": {
                    "containers": [
                        {"name": "app", "livenessProbe": {"httpGet": {"path": "/healthz"}}},
                        {"name": "sidecar"}
                    ]
                }
            }]
        }"#;
        let list: ObjectList<WirePod> = decode(json).unwrap();
        let pods: Vec<PodSnapshot> = list.items.into_iter().map(Into::into).collect();

        assert_eq!(pods.len(), 1);
        let pod = &pods[0];
        assert_eq!(pod.name, "web-0");
        assert_eq!(pod.phase, PodPhase::Running);
        assert_eq!(pod.ready_condition, Some(ConditionStatus::True));
        assert!(pod.is_ready());

        assert_eq!(pod.containers.len(), 2);
        assert!(pod.containers[0].has_liveness_probe);
        assert!(!pod.containers[0].has_readiness_probe);
        assert!(!pod.containers[1].has_liveness_probe);
    }

    #[test]
    fn test_decode_pod_missing_phase_and_conditions() {
        let json = r#"{
            "items": [{"metadata": {"name": "stuck-0"}, "status": {}, "spec": {}}]
        }"#;
        let list: ObjectList<WirePod> = decode(json).unwrap();
        let pod: PodSnapshot = list.items.into_iter().next().unwrap().into();
        assert_eq!(pod.phase, PodPhase::Unknown);
        assert_eq!(pod.ready_condition, None);
        assert!(!pod.is_ready());
    }

    #[test]
    fn test_decode_endpoints_without_subsets() {
        let json = r#"{"metadata": {"name": "web"}}"#;
        let endpoints: EndpointSnapshot = decode::<WireEndpoints>(json).unwrap().into();
        assert_eq!(endpoints.service_name, "web");
        assert!(!endpoints.has_active_endpoints());
        assert_eq!(endpoints.endpoint_count(), 0);
    }

    #[test]
    fn test_decode_endpoints_counts_addresses() {
        let json = r#"{
            "metadata": {"name": "web"},
            "subsets": [
                {"addresses": [{"ip": "10.42.0.5"}, {"ip": "10.42.0.6"}]},
                {}
            ]
        }"#;
        let endpoints: EndpointSnapshot = decode::<WireEndpoints>(json).unwrap().into();
        assert!(endpoints.has_active_endpoints());
        assert_eq!(endpoints.endpoint_count(), 2);
    }

    #[test]
    fn test_decode_ingress_with_defaults() {
        let json = r#"{
            "items": [{
                "metadata": {"name": "edge"},
                "spec": {
                    "rules": [
                        {
                            "host": "app.local",
                            "http": {"paths": [{
                                "path": "/",
                                "backend": {"service": {"name": "web", "port": {"number": 80}}}
                            }]}
                        },
                        {
                            "http": {"paths": [{"backend": {}}]}
                        }
                    ]
                }
            }]
        }"#;
        let list: ObjectList<WireIngress> = decode(json).unwrap();
        let ingress: IngressSnapshot = list.items.into_iter().next().unwrap().into();

        assert_eq!(ingress.name, "edge");
        assert_eq!(ingress.rules.len(), 2);

        let first = &ingress.rules[0];
        assert_eq!(first.derived_host(), "app.local");
        assert_eq!(first.paths[0].derived_path(), "/");
        assert_eq!(first.paths[0].backend_service, "web");
        assert_eq!(first.paths[0].port_display(), "80");

        let second = &ingress.rules[1];
        assert_eq!(second.derived_host(), "default-backend");
        assert_eq!(second.paths[0].derived_path(), "/");
        assert_eq!(second.paths[0].backend_service, "unknown");
        assert_eq!(second.paths[0].port_display(), "unknown");
    }

    #[test]
    fn test_decode_failure_is_decode_error() {
        let result: ProviderResult<ObjectList<WirePod>> = decode("not json");
        assert!(matches!(result, Err(ProviderError::Decode(_))));
    }
}
