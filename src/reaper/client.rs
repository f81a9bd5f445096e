//! Cluster access used by the determiner.
//!
//! [`ResourceClient`] is the only way the determiner reaches the cluster:
//! three collateral lists plus one get-by-coordinates lookup. The
//! kube-backed implementation is [`KubeResourceClient`].

use super::scope::NamespaceScope;
use crate::error::{ReapError, Result};
use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use k8s_openapi::api::apps::v1::ReplicaSet;
use k8s_openapi::api::core::v1::{PersistentVolumeClaim, Pod, ServiceAccount};
use kube::api::{Api, ListParams};
use kube::core::{ApiResource, DynamicObject, GroupVersionKind};
use kube::{Client, Resource};
use serde::de::DeserializeOwned;
use std::fmt::Debug;

/// Outcome of a lookup that reached the API server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Found,
    NotFound,
}

/// Identifies an arbitrary namespaced object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectCoordinates {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    pub namespace: String,
}

impl ObjectCoordinates {
    /// Resolve group, version and plural resource name. The plural is
    /// guessed from the kind, so no discovery round-trip is needed.
    pub fn api_resource(&self) -> Result<ApiResource> {
        let (group, version) = split_api_version(&self.api_version)?;
        let gvk = GroupVersionKind::gvk(group, version, &self.kind);
        Ok(ApiResource::from_gvk(&gvk))
    }
}

/// Split `group/version` (or a bare core `version`).
pub fn split_api_version(api_version: &str) -> Result<(&str, &str)> {
    let invalid = || ReapError::InvalidApiVersion(api_version.to_string());
    let (group, version) = match api_version.split_once('/') {
        Some((group, version)) if !group.is_empty() => (group, version),
        Some(_) => return Err(invalid()),
        None => ("", api_version),
    };
    if version.is_empty() || version.contains('/') {
        return Err(invalid());
    }
    Ok((group, version))
}

#[async_trait]
pub trait ResourceClient: Send + Sync {
    async fn list_pods(&self, scope: &NamespaceScope) -> Result<Vec<Pod>>;

    async fn list_replica_sets(&self, scope: &NamespaceScope) -> Result<Vec<ReplicaSet>>;

    async fn list_service_accounts(&self, scope: &NamespaceScope) -> Result<Vec<ServiceAccount>>;

    async fn list_persistent_volume_claims(
        &self,
        scope: &NamespaceScope,
    ) -> Result<Vec<PersistentVolumeClaim>>;

    /// A missing object is `Ok(Lookup::NotFound)`; transport and permission
    /// failures are errors.
    async fn get_object(&self, target: &ObjectCoordinates) -> Result<Lookup>;
}

/// [`ResourceClient`] backed by a live cluster.
#[derive(Clone)]
pub struct KubeResourceClient {
    client: Client,
}

impl KubeResourceClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn list<K>(&self, scope: &NamespaceScope) -> Result<Vec<K>>
    where
        K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
            + Clone
            + Debug
            + DeserializeOwned,
    {
        let api: Api<K> = match scope.namespace() {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        };
        let list = api.list(&ListParams::default()).await?;
        Ok(list.items)
    }
}

#[async_trait]
impl ResourceClient for KubeResourceClient {
    async fn list_pods(&self, scope: &NamespaceScope) -> Result<Vec<Pod>> {
        self.list(scope).await
    }

    async fn list_replica_sets(&self, scope: &NamespaceScope) -> Result<Vec<ReplicaSet>> {
        self.list(scope).await
    }

    async fn list_service_accounts(&self, scope: &NamespaceScope) -> Result<Vec<ServiceAccount>> {
        self.list(scope).await
    }

    async fn list_persistent_volume_claims(
        &self,
        scope: &NamespaceScope,
    ) -> Result<Vec<PersistentVolumeClaim>> {
        self.list(scope).await
    }

    async fn get_object(&self, target: &ObjectCoordinates) -> Result<Lookup> {
        let ar = target.api_resource()?;
        let api: Api<DynamicObject> =
            Api::namespaced_with(self.client.clone(), &target.namespace, &ar);

        log::trace!(
            "Looking up {}/{} ({}) in namespace/{}",
            ar.plural,
            target.name,
            ar.api_version,
            target.namespace
        );
        match api.get_opt(&target.name).await? {
            Some(_) => Ok(Lookup::Found),
            None => Ok(Lookup::NotFound),
        }
    }
}
