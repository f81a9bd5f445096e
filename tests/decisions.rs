//! Decisions made through the public API with an in-memory cluster.

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::ReplicaSet;
use k8s_openapi::api::core::v1::{PersistentVolumeClaim, Pod, ServiceAccount};
use kube::core::DynamicObject;
use kubectl_reap::ReapError;
use kubectl_reap::reaper::{
    DeterminerOptions, Lookup, NamespaceScope, ObjectCoordinates, ResourceClient, ResourceKind,
    UsageDeterminer,
};
use serde_json::json;

#[derive(Default)]
struct StaticCluster {
    pods: Vec<Pod>,
    replica_sets: Vec<ReplicaSet>,
    service_accounts: Vec<ServiceAccount>,
    claims: Vec<PersistentVolumeClaim>,
    objects: Vec<ObjectCoordinates>,
}

#[async_trait]
impl ResourceClient for StaticCluster {
    async fn list_pods(&self, _: &NamespaceScope) -> kubectl_reap::Result<Vec<Pod>> {
        Ok(self.pods.clone())
    }

    async fn list_replica_sets(&self, _: &NamespaceScope) -> kubectl_reap::Result<Vec<ReplicaSet>> {
        Ok(self.replica_sets.clone())
    }

    async fn list_service_accounts(
        &self,
        _: &NamespaceScope,
    ) -> kubectl_reap::Result<Vec<ServiceAccount>> {
        Ok(self.service_accounts.clone())
    }

    async fn list_persistent_volume_claims(
        &self,
        _: &NamespaceScope,
    ) -> kubectl_reap::Result<Vec<PersistentVolumeClaim>> {
        Ok(self.claims.clone())
    }

    async fn get_object(&self, target: &ObjectCoordinates) -> kubectl_reap::Result<Lookup> {
        Ok(if self.objects.contains(target) {
            Lookup::Found
        } else {
            Lookup::NotFound
        })
    }
}

fn object(value: serde_json::Value) -> DynamicObject {
    serde_json::from_value(value).unwrap()
}

fn scope() -> NamespaceScope {
    NamespaceScope::Namespace("apps".to_string())
}

fn cluster() -> StaticCluster {
    let pod: Pod = serde_json::from_value(json!({
        "metadata": { "name": "web-0", "namespace": "apps", "labels": { "app": "web" } },
        "spec": {
            "serviceAccountName": "web",
            "containers": [{
                "name": "web",
                "envFrom": [{ "configMapRef": { "name": "web-env" } }]
            }],
            "volumes": [{ "name": "data", "persistentVolumeClaim": { "claimName": "web-data" } }]
        },
        "status": { "phase": "Running" }
    }))
    .unwrap();
    let replica_set: ReplicaSet = serde_json::from_value(json!({
        "metadata": { "name": "worker-5d8f", "namespace": "apps" },
        "spec": {
            "selector": { "matchLabels": { "app": "worker" } },
            "template": { "spec": { "containers": [{
                "name": "worker",
                "env": [{ "name": "TOKEN", "valueFrom": {
                    "secretKeyRef": { "name": "worker-token", "key": "token" }
                } }]
            }] } }
        }
    }))
    .unwrap();
    let service_account: ServiceAccount = serde_json::from_value(json!({
        "metadata": { "name": "web", "namespace": "apps" },
        "secrets": [{ "name": "registry" }]
    }))
    .unwrap();

    StaticCluster {
        pods: vec![pod],
        replica_sets: vec![replica_set],
        service_accounts: vec![service_account],
        objects: vec![ObjectCoordinates {
            api_version: "apps/v1".to_string(),
            kind: "Deployment".to_string(),
            name: "web".to_string(),
            namespace: "apps".to_string(),
        }],
        ..Default::default()
    }
}

async fn determiner(kinds: &[ResourceKind]) -> UsageDeterminer<StaticCluster> {
    UsageDeterminer::new(cluster(), &scope(), kinds, DeterminerOptions::default())
        .await
        .unwrap()
}

#[tokio::test]
async fn config_maps_and_secrets() {
    let determiner = determiner(&[ResourceKind::ConfigMap, ResourceKind::Secret]).await;

    let used_cm = object(json!({
        "apiVersion": "v1", "kind": "ConfigMap",
        "metadata": { "name": "web-env", "namespace": "apps" }
    }));
    let stale_cm = object(json!({
        "apiVersion": "v1", "kind": "ConfigMap",
        "metadata": { "name": "old-env", "namespace": "apps" }
    }));
    assert!(!determiner.decide_object(used_cm).await.unwrap());
    assert!(determiner.decide_object(stale_cm).await.unwrap());

    for (name, unused) in [("worker-token", false), ("registry", false), ("leaked", true)] {
        let secret = object(json!({
            "apiVersion": "v1", "kind": "Secret",
            "metadata": { "name": name, "namespace": "apps" }
        }));
        assert_eq!(determiner.decide_object(secret).await.unwrap(), unused, "{name}");
    }
}

#[tokio::test]
async fn disruption_budgets_and_autoscalers() {
    let determiner = determiner(&[
        ResourceKind::PodDisruptionBudget,
        ResourceKind::HorizontalPodAutoscaler,
    ])
    .await;

    let selecting = object(json!({
        "apiVersion": "policy/v1", "kind": "PodDisruptionBudget",
        "metadata": { "name": "web", "namespace": "apps" },
        "spec": { "selector": { "matchLabels": { "app": "web" } } }
    }));
    let orphaned = object(json!({
        "apiVersion": "policy/v1", "kind": "PodDisruptionBudget",
        "metadata": { "name": "api", "namespace": "apps" },
        "spec": { "selector": { "matchLabels": { "app": "api" } } }
    }));
    assert!(!determiner.decide_object(selecting).await.unwrap());
    assert!(determiner.decide_object(orphaned).await.unwrap());

    let hpa = |target: &str| {
        object(json!({
            "apiVersion": "autoscaling/v2", "kind": "HorizontalPodAutoscaler",
            "metadata": { "name": target, "namespace": "apps" },
            "spec": {
                "maxReplicas": 3,
                "scaleTargetRef": { "apiVersion": "apps/v1", "kind": "Deployment", "name": target }
            }
        }))
    };
    assert!(!determiner.decide_object(hpa("web")).await.unwrap());
    assert!(determiner.decide_object(hpa("gone")).await.unwrap());
}

#[tokio::test]
async fn unprepared_and_unsupported_kinds() {
    let determiner = determiner(&[ResourceKind::Pod]).await;

    let cm = object(json!({
        "apiVersion": "v1", "kind": "ConfigMap",
        "metadata": { "name": "web-env", "namespace": "apps" }
    }));
    assert!(matches!(
        determiner.decide_object(cm).await,
        Err(ReapError::KindNotPrepared { .. })
    ));

    let deployment = object(json!({
        "apiVersion": "apps/v1", "kind": "Deployment",
        "metadata": { "name": "web", "namespace": "apps" }
    }));
    assert!(matches!(
        determiner.decide_object(deployment).await,
        Err(ReapError::UnsupportedKind { .. })
    ));
}
