//! Reference extraction: which ConfigMaps, Secrets and claims are in use.

use super::collateral::CollateralSet;
use super::kind::ResourceKind;
use k8s_openapi::api::core::v1::{Container, PodSpec, ServiceAccount};
use std::collections::{BTreeSet, HashSet};

/// Referenced names per dependency kind.
///
/// A name present here is referenced by at least one scanned workload.
/// Absence only means no scanned workload referenced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageIndex {
    pub config_maps: HashSet<String>,
    pub secrets: HashSet<String>,
    pub claims: HashSet<String>,
}

impl UsageIndex {
    /// Build only the name sets the given kinds consult.
    pub fn build(collateral: &CollateralSet, kinds: &BTreeSet<ResourceKind>) -> Self {
        let mut index = UsageIndex::default();
        if kinds.contains(&ResourceKind::ConfigMap) {
            index.config_maps = used_config_maps(collateral.workload_specs());
        }
        if kinds.contains(&ResourceKind::Secret) {
            index.secrets = used_secrets(collateral.workload_specs(), &collateral.service_accounts);
        }
        if kinds.contains(&ResourceKind::PersistentVolumeClaim) {
            index.claims = used_claims(collateral.pod_specs());
        }
        log::debug!(
            "Usage index: {} configmaps, {} secrets, {} claims referenced",
            index.config_maps.len(),
            index.secrets.len(),
            index.claims.len()
        );
        index
    }
}

/// Names referenced through env, envFrom, volumes and projected volumes.
pub fn used_config_maps<'a>(specs: impl IntoIterator<Item = &'a PodSpec>) -> HashSet<String> {
    let mut used = HashSet::new();

    for spec in specs {
        for container in containers(spec) {
            for env_from in container.env_from.iter().flatten() {
                if let Some(source) = &env_from.config_map_ref {
                    insert(&mut used, &source.name);
                }
            }
            for env in container.env.iter().flatten() {
                if let Some(selector) = env.value_from.as_ref().and_then(|v| v.config_map_key_ref.as_ref()) {
                    insert(&mut used, &selector.name);
                }
            }
        }

        for volume in spec.volumes.iter().flatten() {
            if let Some(source) = &volume.config_map {
                insert(&mut used, &source.name);
            }
            let projections = volume.projected.as_ref().and_then(|p| p.sources.as_ref());
            for projection in projections.into_iter().flatten() {
                if let Some(source) = &projection.config_map {
                    insert(&mut used, &source.name);
                }
            }
        }
    }

    used
}

/// Same shapes as ConfigMaps, plus image pull secrets and ServiceAccount
/// secrets.
pub fn used_secrets<'a>(
    specs: impl IntoIterator<Item = &'a PodSpec>,
    service_accounts: &[ServiceAccount],
) -> HashSet<String> {
    let mut used = HashSet::new();

    for spec in specs {
        for pull_secret in spec.image_pull_secrets.iter().flatten() {
            insert(&mut used, &pull_secret.name);
        }

        for container in containers(spec) {
            for env_from in container.env_from.iter().flatten() {
                if let Some(source) = &env_from.secret_ref {
                    insert(&mut used, &source.name);
                }
            }
            for env in container.env.iter().flatten() {
                if let Some(selector) = env.value_from.as_ref().and_then(|v| v.secret_key_ref.as_ref()) {
                    insert(&mut used, &selector.name);
                }
            }
        }

        for volume in spec.volumes.iter().flatten() {
            if let Some(source) = &volume.secret {
                insert(&mut used, &source.secret_name);
            }
            let projections = volume.projected.as_ref().and_then(|p| p.sources.as_ref());
            for projection in projections.into_iter().flatten() {
                if let Some(source) = &projection.secret {
                    insert(&mut used, &source.name);
                }
            }
        }
    }

    for sa in service_accounts {
        for secret in sa.secrets.iter().flatten() {
            insert(&mut used, &secret.name);
        }
    }

    used
}

/// Claim names mounted as volumes.
pub fn used_claims<'a>(specs: impl IntoIterator<Item = &'a PodSpec>) -> HashSet<String> {
    let mut used = HashSet::new();
    for spec in specs {
        for volume in spec.volumes.iter().flatten() {
            if let Some(source) = &volume.persistent_volume_claim {
                insert(&mut used, &source.claim_name);
            }
        }
    }
    used
}

fn containers(spec: &PodSpec) -> impl Iterator<Item = &Container> {
    spec.containers
        .iter()
        .chain(spec.init_containers.iter().flatten())
}

/// Reference names are plain strings on some API types and optional on
/// others. Empty names are never recorded.
trait ReferenceName {
    fn reference_name(&self) -> Option<&str>;
}

impl ReferenceName for String {
    fn reference_name(&self) -> Option<&str> {
        Some(self.as_str()).filter(|n| !n.is_empty())
    }
}

impl ReferenceName for Option<String> {
    fn reference_name(&self) -> Option<&str> {
        self.as_deref().filter(|n| !n.is_empty())
    }
}

fn insert(used: &mut HashSet<String>, name: &impl ReferenceName) {
    if let Some(name) = name.reference_name() {
        used.insert(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::Pod;
    use serde_json::{Value, json};

    fn spec(value: Value) -> PodSpec {
        serde_json::from_value(value).unwrap()
    }

    fn names(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn full_spec() -> PodSpec {
        spec(json!({
            "imagePullSecrets": [{ "name": "registry" }],
            "initContainers": [{
                "name": "init",
                "envFrom": [{ "configMapRef": { "name": "cm-init" } }]
            }],
            "containers": [{
                "name": "app",
                "envFrom": [
                    { "configMapRef": { "name": "cm-envfrom" } },
                    { "secretRef": { "name": "secret-envfrom" } }
                ],
                "env": [
                    { "name": "A", "valueFrom": { "configMapKeyRef": { "name": "cm-env", "key": "a" } } },
                    { "name": "B", "valueFrom": { "secretKeyRef": { "name": "secret-env", "key": "b" } } },
                    { "name": "C", "value": "plain" }
                ]
            }],
            "volumes": [
                { "name": "v1", "configMap": { "name": "cm-volume" } },
                { "name": "v2", "secret": { "secretName": "secret-volume" } },
                { "name": "v3", "projected": { "sources": [
                    { "configMap": { "name": "cm-projected" } },
                    { "secret": { "name": "secret-projected" } },
                    { "serviceAccountToken": { "path": "token" } }
                ] } },
                { "name": "v4", "persistentVolumeClaim": { "claimName": "data" } },
                { "name": "v5", "emptyDir": {} }
            ]
        }))
    }

    #[test]
    fn test_used_config_maps() {
        let spec = full_spec();
        assert_eq!(
            used_config_maps([&spec]),
            names(&["cm-init", "cm-envfrom", "cm-env", "cm-volume", "cm-projected"])
        );
    }

    #[test]
    fn test_used_secrets_include_service_accounts() {
        let spec = full_spec();
        let sa: ServiceAccount = serde_json::from_value(json!({
            "metadata": { "name": "default" },
            "secrets": [{ "name": "default-token" }, {}]
        }))
        .unwrap();

        assert_eq!(
            used_secrets([&spec], &[sa]),
            names(&[
                "registry",
                "secret-envfrom",
                "secret-env",
                "secret-volume",
                "secret-projected",
                "default-token",
            ])
        );
    }

    #[test]
    fn test_used_claims() {
        let spec = full_spec();
        assert_eq!(used_claims([&spec]), names(&["data"]));
    }

    #[test]
    fn test_duplicates_collapse() {
        let a = spec(json!({ "containers": [], "volumes": [{ "name": "x", "configMap": { "name": "shared" } }] }));
        let b = spec(json!({ "containers": [{ "name": "c", "envFrom": [{ "configMapRef": { "name": "shared" } }] }] }));
        assert_eq!(used_config_maps([&a, &b]), names(&["shared"]));
    }

    #[test]
    fn test_index_builds_only_requested_sets() {
        let pod: Pod = serde_json::from_value(json!({
            "metadata": { "name": "web" },
            "spec": full_spec()
        }))
        .unwrap();
        let collateral = CollateralSet {
            pods: vec![pod],
            ..Default::default()
        };

        let index = UsageIndex::build(&collateral, &BTreeSet::from([ResourceKind::ConfigMap]));
        assert!(index.config_maps.contains("cm-volume"));
        assert!(index.secrets.is_empty());
        assert!(index.claims.is_empty());

        let index = UsageIndex::build(
            &collateral,
            &BTreeSet::from([ResourceKind::PersistentVolumeClaim, ResourceKind::Secret]),
        );
        assert!(index.config_maps.is_empty());
        assert!(index.secrets.contains("registry"));
        assert!(index.claims.contains("data"));
    }

    #[test]
    fn test_claims_ignore_replica_set_templates() {
        let collateral = CollateralSet {
            replica_sets: vec![serde_json::from_value(json!({
                "metadata": { "name": "rs" },
                "spec": {
                    "selector": {},
                    "template": { "spec": full_spec() }
                }
            }))
            .unwrap()],
            ..Default::default()
        };

        let index = UsageIndex::build(
            &collateral,
            &BTreeSet::from([ResourceKind::PersistentVolumeClaim, ResourceKind::ConfigMap]),
        );
        assert!(index.claims.is_empty());
        assert!(index.config_maps.contains("cm-projected"));
    }
}
