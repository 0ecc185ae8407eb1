//! Typed snapshots of orchestration-platform state.
//!
//! Read-only, point-in-time views decoded once at the collaborator boundary
//! (see [`crate::kubectl`]). Optional fields carry documented defaults, so
//! evaluators operate on fully-typed data with no defensive lookups.

use std::fmt;

/// Host used for ingress rules that declare no host.
pub const DEFAULT_BACKEND_HOST: &str = "default-backend";

/// Path used for ingress path rules that declare no path.
pub const DEFAULT_PATH: &str = "/";

/// The platform's own internal service, excluded from endpoint checks.
pub const RESERVED_SERVICE: &str = "kubernetes";

/// Pod lifecycle phase as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl PodPhase {
    /// Parse a phase string; anything unrecognized is `Unknown`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Pending" => Self::Pending,
            "Running" => Self::Running,
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for PodPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "Pending",
            Self::Running => "Running",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// Three-valued status of a pod condition, as the platform reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl ConditionStatus {
    /// Parse a condition status string; anything unrecognized is `Unknown`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "True" => Self::True,
            "False" => Self::False,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::True => "True",
            Self::False => "False",
            Self::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// Probe configuration of one container within a pod spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub name: String,
    pub has_liveness_probe: bool,
    pub has_readiness_probe: bool,
}

impl ContainerSpec {
    /// Both probe kinds are present.
    #[must_use]
    pub fn has_both_probes(&self) -> bool {
        self.has_liveness_probe && self.has_readiness_probe
    }
}

/// Point-in-time view of one pod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodSnapshot {
    pub name: String,
    pub phase: PodPhase,
    /// Status of the `Ready` condition, when the platform reported one.
    pub ready_condition: Option<ConditionStatus>,
    pub containers: Vec<ContainerSpec>,
}

impl PodSnapshot {
    /// A pod is ready iff it is `Running` and its `Ready` condition is `True`.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.phase == PodPhase::Running && self.ready_condition == Some(ConditionStatus::True)
    }

    /// Ready condition status for display; `Unknown` when absent.
    #[must_use]
    pub fn ready_status(&self) -> ConditionStatus {
        self.ready_condition.unwrap_or(ConditionStatus::Unknown)
    }
}

/// Point-in-time view of one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSnapshot {
    pub name: String,
}

impl ServiceSnapshot {
    /// The platform's internal service is never endpoint-checked.
    #[must_use]
    pub fn is_reserved(&self) -> bool {
        self.name == RESERVED_SERVICE
    }
}

/// Addresses behind one endpoint subset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointSubset {
    pub addresses: Vec<String>,
}

/// Point-in-time view of a service's endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointSnapshot {
    pub service_name: String,
    pub subsets: Vec<EndpointSubset>,
}

impl EndpointSnapshot {
    /// At least one subset holds at least one address.
    #[must_use]
    pub fn has_active_endpoints(&self) -> bool {
        self.subsets.iter().any(|subset| !subset.addresses.is_empty())
    }

    /// Total address count across all subsets.
    #[must_use]
    pub fn endpoint_count(&self) -> usize {
        self.subsets.iter().map(|subset| subset.addresses.len()).sum()
    }
}

/// One backend path within an ingress rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRule {
    /// Declared path, when present; defaults to [`DEFAULT_PATH`].
    pub path: Option<String>,
    pub backend_service: String,
    pub backend_port: Option<i32>,
}

impl PathRule {
    /// Declared path or the `/` default.
    #[must_use]
    pub fn derived_path(&self) -> &str {
        self.path.as_deref().unwrap_or(DEFAULT_PATH)
    }

    /// Backend port for display; `unknown` when the rule declares none.
    #[must_use]
    pub fn port_display(&self) -> String {
        self.backend_port
            .map_or_else(|| "unknown".to_string(), |port| port.to_string())
    }
}

/// One host rule within an ingress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngressRule {
    /// Declared host, when present; defaults to [`DEFAULT_BACKEND_HOST`].
    pub host: Option<String>,
    pub paths: Vec<PathRule>,
}

impl IngressRule {
    /// Declared host or the default-backend fallback.
    #[must_use]
    pub fn derived_host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_BACKEND_HOST)
    }
}

/// Point-in-time view of one ingress resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngressSnapshot {
    pub name: String,
    pub rules: Vec<IngressRule>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pod(phase: PodPhase, ready: Option<ConditionStatus>) -> PodSnapshot {
        PodSnapshot {
            name: "web-0".to_string(),
            phase,
            ready_condition: ready,
            containers: vec![],
        }
    }

    #[test]
    fn test_pod_readiness_invariant() {
        // Ready iff Running with a True ready condition
        assert!(pod(PodPhase::Running, Some(ConditionStatus::True)).is_ready());

        assert!(!pod(PodPhase::Running, Some(ConditionStatus::False)).is_ready());
        assert!(!pod(PodPhase::Running, Some(ConditionStatus::Unknown)).is_ready());
        assert!(!pod(PodPhase::Running, None).is_ready());
        assert!(!pod(PodPhase::Pending, Some(ConditionStatus::True)).is_ready());
        assert!(!pod(PodPhase::Failed, Some(ConditionStatus::True)).is_ready());
    }

    #[test]
    fn test_ready_status_defaults_to_unknown() {
        assert_eq!(pod(PodPhase::Running, None).ready_status(), ConditionStatus::Unknown);
        assert_eq!(
            pod(PodPhase::Running, Some(ConditionStatus::False)).ready_status(),
            ConditionStatus::False
        );
    }

    #[test]
    fn test_phase_parse() {
        assert_eq!(PodPhase::parse("Running"), PodPhase::Running);
        assert_eq!(PodPhase::parse("Pending"), PodPhase::Pending);
        assert_eq!(PodPhase::parse("Succeeded"), PodPhase::Succeeded);
        assert_eq!(PodPhase::parse("Failed"), PodPhase::Failed);
        assert_eq!(PodPhase::parse("CrashLoopBackOff"), PodPhase::Unknown);
        assert_eq!(PodPhase::parse(""), PodPhase::Unknown);
    }

    #[test]
    fn test_condition_status_parse() {
        assert_eq!(ConditionStatus::parse("True"), ConditionStatus::True);
        assert_eq!(ConditionStatus::parse("False"), ConditionStatus::False);
        assert_eq!(ConditionStatus::parse("true"), ConditionStatus::Unknown);
        assert_eq!(ConditionStatus::parse(""), ConditionStatus::Unknown);
    }

    #[test]
    fn test_endpoint_activity() {
        let empty = EndpointSnapshot {
            service_name: "web".to_string(),
            subsets: vec![],
        };
        assert!(!empty.has_active_endpoints());
        assert_eq!(empty.endpoint_count(), 0);

        let hollow = EndpointSnapshot {
            service_name: "web".to_string(),
            subsets: vec![EndpointSubset { addresses: vec![] }],
        };
        assert!(!hollow.has_active_endpoints());
        assert_eq!(hollow.endpoint_count(), 0);

        let active = EndpointSnapshot {
            service_name: "web".to_string(),
            subsets: vec![
                EndpointSubset { addresses: vec![] },
                EndpointSubset {
                    addresses: vec!["10.42.0.5".to_string(), "10.42.0.6".to_string()],
                },
            ],
        };
        assert!(active.has_active_endpoints());
        assert_eq!(active.endpoint_count(), 2);
    }

    #[test]
    fn test_ingress_defaults() {
        let rule = IngressRule { host: None, paths: vec![] };
        assert_eq!(rule.derived_host(), "default-backend");

        let named = IngressRule {
            host: Some("app.local".to_string()),
            paths: vec![],
        };
        assert_eq!(named.derived_host(), "app.local");

        let path = PathRule {
            path: None,
            backend_service: "web".to_string(),
            backend_port: None,
        };
        assert_eq!(path.derived_path(), "/");
        assert_eq!(path.port_display(), "unknown");

        let full = PathRule {
            path: Some("/api".to_string()),
            backend_service: "web".to_string(),
            backend_port: Some(80),
        };
        assert_eq!(full.derived_path(), "/api");
        assert_eq!(full.port_display(), "80");
    }

    #[test]
    fn test_reserved_service() {
        assert!(ServiceSnapshot { name: "kubernetes".to_string() }.is_reserved());
        assert!(!ServiceSnapshot { name: "web".to_string() }.is_reserved());
    }
}
