//! Collaborator contracts the evaluators depend on.
//!
//! The core never talks to a transport directly; it consumes these traits.
//! Production implementations live in [`crate::kubectl`]; tests supply fakes.

use crate::snapshot::{EndpointSnapshot, IngressSnapshot, PodSnapshot, ServiceSnapshot};
use async_trait::async_trait;
use thiserror::Error;

/// Failure at the collaborator boundary.
///
/// Invariant violations in decoded data are not errors; evaluators record
/// those as failing outcomes.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// The collaborator could not retrieve the data (timeout, transport
    /// error, non-zero exit).
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// Data was retrieved but not in the expected shape.
    #[error("decode failed: {0}")]
    Decode(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Reports the control-plane service's process state.
#[async_trait]
pub trait ProcessStatusProvider: Send + Sync {
    /// Raw status text, e.g. `active` or `inactive`. Callers trim it.
    async fn control_plane_status(&self) -> ProviderResult<String>;
}

/// Read-only access to cluster state, decoded into snapshots.
#[async_trait]
pub trait ClusterStateProvider: Send + Sync {
    async fn list_pods(&self, namespace: &str) -> ProviderResult<Vec<PodSnapshot>>;

    async fn list_services(&self, namespace: &str) -> ProviderResult<Vec<ServiceSnapshot>>;

    async fn get_endpoints(
        &self,
        service: &str,
        namespace: &str,
    ) -> ProviderResult<EndpointSnapshot>;

    async fn list_ingresses(&self, namespace: &str) -> ProviderResult<Vec<IngressSnapshot>>;

    /// Whether a service with this name resolves for ingress backends.
    async fn service_exists(&self, name: &str) -> bool;
}

/// Issues one bounded HTTP request per call; never retries.
#[async_trait]
pub trait HttpProbe: Send + Sync {
    /// GET `url` with `host` as the routing key (`Host` header); returns the
    /// response status code.
    async fn get(&self, url: &str, host: &str) -> ProviderResult<u16>;
}
