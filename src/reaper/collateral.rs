//! Supporting objects fetched once per invocation.

use super::client::ResourceClient;
use super::kind::{Collateral, ResourceKind};
use super::scope::NamespaceScope;
use crate::error::Result;
use k8s_openapi::api::apps::v1::ReplicaSet;
use k8s_openapi::api::core::v1::{PersistentVolumeClaim, Pod, PodSpec, ServiceAccount};
use std::collections::BTreeSet;

/// Snapshot of the objects the determiner cross-references. Never mutated
/// after [`CollateralSet::fetch`] returns.
#[derive(Debug, Clone, Default)]
pub struct CollateralSet {
    pub pods: Vec<Pod>,
    pub replica_sets: Vec<ReplicaSet>,
    pub service_accounts: Vec<ServiceAccount>,
    pub claims: Vec<PersistentVolumeClaim>,
}

/// Resolve the collateral a set of kinds depends on.
///
/// With `scan_replica_sets` off, ReplicaSet templates are not consulted.
pub fn required_collateral(
    kinds: &BTreeSet<ResourceKind>,
    scan_replica_sets: bool,
) -> BTreeSet<Collateral> {
    kinds
        .iter()
        .flat_map(|kind| kind.collateral().iter().copied())
        .filter(|c| scan_replica_sets || *c != Collateral::ReplicaSets)
        .collect()
}

impl CollateralSet {
    /// List every required collateral kind. Any failure aborts the whole
    /// fetch; a partial snapshot is never returned.
    pub async fn fetch<C>(
        client: &C,
        scope: &NamespaceScope,
        required: &BTreeSet<Collateral>,
    ) -> Result<Self>
    where
        C: ResourceClient + ?Sized,
    {
        let mut set = CollateralSet::default();
        for collateral in required {
            log::debug!("Listing {} in {}", collateral, scope);
            match collateral {
                Collateral::Pods => set.pods = client.list_pods(scope).await?,
                Collateral::ReplicaSets => set.replica_sets = client.list_replica_sets(scope).await?,
                Collateral::ServiceAccounts => {
                    set.service_accounts = client.list_service_accounts(scope).await?
                }
                Collateral::PersistentVolumeClaims => {
                    set.claims = client.list_persistent_volume_claims(scope).await?
                }
            }
        }
        log::debug!(
            "Collateral: {} pods, {} replicasets, {} serviceaccounts, {} claims",
            set.pods.len(),
            set.replica_sets.len(),
            set.service_accounts.len(),
            set.claims.len()
        );
        Ok(set)
    }

    /// Specs of the listed Pods.
    pub fn pod_specs(&self) -> impl Iterator<Item = &PodSpec> {
        self.pods.iter().filter_map(|pod| pod.spec.as_ref())
    }

    /// Pod specs of Pods and ReplicaSet templates.
    pub fn workload_specs(&self) -> impl Iterator<Item = &PodSpec> {
        let templates = self.replica_sets.iter().filter_map(|rs| {
            rs.spec
                .as_ref()?
                .template
                .as_ref()?
                .spec
                .as_ref()
        });
        self.pod_specs().chain(templates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reaper::fake::FakeResourceClient;
    use serde_json::json;

    fn kinds(kinds: &[ResourceKind]) -> BTreeSet<ResourceKind> {
        kinds.iter().copied().collect()
    }

    #[test]
    fn test_required_collateral() {
        assert!(required_collateral(&kinds(&[ResourceKind::Pod, ResourceKind::Job]), true).is_empty());

        let cm = required_collateral(&kinds(&[ResourceKind::ConfigMap]), true);
        assert_eq!(
            cm,
            BTreeSet::from([Collateral::Pods, Collateral::ReplicaSets])
        );

        let cm = required_collateral(&kinds(&[ResourceKind::ConfigMap]), false);
        assert_eq!(cm, BTreeSet::from([Collateral::Pods]));

        let pv = required_collateral(&kinds(&[ResourceKind::PersistentVolume]), true);
        assert_eq!(pv, BTreeSet::from([Collateral::PersistentVolumeClaims]));

        let secrets = required_collateral(
            &kinds(&[ResourceKind::Secret, ResourceKind::PodDisruptionBudget]),
            true,
        );
        assert!(secrets.contains(&Collateral::ServiceAccounts));
        assert!(!secrets.contains(&Collateral::PersistentVolumeClaims));
    }

    #[tokio::test]
    async fn test_fetch_lists_only_required() {
        let client = FakeResourceClient::default();
        let scope = NamespaceScope::Namespace("default".to_string());

        CollateralSet::fetch(&client, &scope, &BTreeSet::from([Collateral::Pods]))
            .await
            .unwrap();
        assert_eq!(client.listed(), vec![Collateral::Pods]);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_fatal() {
        let client = FakeResourceClient {
            fail_lists: true,
            ..Default::default()
        };
        let scope = NamespaceScope::All;
        let result = CollateralSet::fetch(
            &client,
            &scope,
            &BTreeSet::from([Collateral::Pods, Collateral::ServiceAccounts]),
        )
        .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_workload_specs_include_templates() {
        let set = CollateralSet {
            pods: vec![
                serde_json::from_value(json!({
                    "metadata": { "name": "p" },
                    "spec": { "containers": [] }
                }))
                .unwrap(),
                serde_json::from_value(json!({ "metadata": { "name": "no-spec" } })).unwrap(),
            ],
            replica_sets: vec![
                serde_json::from_value(json!({
                    "metadata": { "name": "rs" },
                    "spec": {
                        "selector": {},
                        "template": { "spec": { "containers": [] } }
                    }
                }))
                .unwrap(),
            ],
            ..Default::default()
        };
        assert_eq!(set.pod_specs().count(), 1);
        assert_eq!(set.workload_specs().count(), 2);
    }
}
