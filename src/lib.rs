//! K3s cluster QA harness library.
//!
//! Verifies the health and routing of a freshly provisioned single-node
//! cluster: control-plane service state, pod readiness, probe configuration,
//! service endpoints, and ingress routing, then aggregates every recorded
//! outcome into a coverage report.
//!
//! The verification engine ([`health`], [`routing`], [`ledger`], [`report`],
//! [`runner`]) is pure with respect to cluster access: it depends only on the
//! collaborator traits in [`provider`]. The production collaborators in
//! [`kubectl`] shell out to `systemctl`/`kubectl` and probe HTTP with
//! `reqwest`.

pub mod health;
pub mod kubectl;
pub mod ledger;
pub mod provider;
pub mod report;
pub mod routing;
pub mod runner;
pub mod snapshot;
