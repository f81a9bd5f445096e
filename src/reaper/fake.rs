//! In-memory [`ResourceClient`] for tests.

use super::client::{Lookup, ObjectCoordinates, ResourceClient};
use super::kind::Collateral;
use super::scope::NamespaceScope;
use crate::error::{ReapError, Result};
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::ReplicaSet;
use k8s_openapi::api::core::v1::{PersistentVolumeClaim, Pod, ServiceAccount};
use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeResourceClient {
    pub pods: Vec<Pod>,
    pub replica_sets: Vec<ReplicaSet>,
    pub service_accounts: Vec<ServiceAccount>,
    pub claims: Vec<PersistentVolumeClaim>,
    /// Objects `get_object` reports as found.
    pub objects: HashSet<ObjectCoordinates>,
    pub fail_lists: bool,
    pub fail_lookups: bool,
    pub(crate) listed: Mutex<Vec<Collateral>>,
    pub(crate) lookups: Mutex<usize>,
}

impl FakeResourceClient {
    /// Collateral kinds listed so far, in call order.
    pub fn listed(&self) -> Vec<Collateral> {
        self.listed.lock().unwrap().clone()
    }

    pub fn lookups(&self) -> usize {
        *self.lookups.lock().unwrap()
    }

    fn record<T: Clone>(&self, collateral: Collateral, items: &[T]) -> Result<Vec<T>> {
        self.listed.lock().unwrap().push(collateral);
        if self.fail_lists {
            return Err(ReapError::Io(std::io::Error::other(format!(
                "listing {collateral} is forbidden"
            ))));
        }
        Ok(items.to_vec())
    }
}

#[async_trait]
impl ResourceClient for FakeResourceClient {
    async fn list_pods(&self, _scope: &NamespaceScope) -> Result<Vec<Pod>> {
        self.record(Collateral::Pods, &self.pods)
    }

    async fn list_replica_sets(&self, _scope: &NamespaceScope) -> Result<Vec<ReplicaSet>> {
        self.record(Collateral::ReplicaSets, &self.replica_sets)
    }

    async fn list_service_accounts(&self, _scope: &NamespaceScope) -> Result<Vec<ServiceAccount>> {
        self.record(Collateral::ServiceAccounts, &self.service_accounts)
    }

    async fn list_persistent_volume_claims(
        &self,
        _scope: &NamespaceScope,
    ) -> Result<Vec<PersistentVolumeClaim>> {
        self.record(Collateral::PersistentVolumeClaims, &self.claims)
    }

    async fn get_object(&self, target: &ObjectCoordinates) -> Result<Lookup> {
        *self.lookups.lock().unwrap() += 1;
        target.api_resource()?;
        if self.fail_lookups {
            return Err(ReapError::Io(std::io::Error::other("connection refused")));
        }
        if self.objects.contains(target) {
            Ok(Lookup::Found)
        } else {
            Ok(Lookup::NotFound)
        }
    }
}
