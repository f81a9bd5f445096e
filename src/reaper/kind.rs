//! The closed set of resource kinds the reaper knows how to judge.

use crate::error::{ReapError, Result};
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{
    ConfigMap, PersistentVolume, PersistentVolumeClaim, Pod, Secret,
};
use k8s_openapi::api::policy::v1::PodDisruptionBudget;
use kube::core::ApiResource;
use std::fmt;
use std::str::FromStr;

/// Supporting data a kind needs before any of its candidates can be judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collateral {
    Pods,
    ReplicaSets,
    ServiceAccounts,
    PersistentVolumeClaims,
}

impl fmt::Display for Collateral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Collateral::Pods => "pods",
            Collateral::ReplicaSets => "replicasets",
            Collateral::ServiceAccounts => "serviceaccounts",
            Collateral::PersistentVolumeClaims => "persistentvolumeclaims",
        })
    }
}

/// Resource kinds that can be reaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKind {
    Pod,
    ConfigMap,
    Secret,
    PersistentVolume,
    PersistentVolumeClaim,
    Job,
    PodDisruptionBudget,
    HorizontalPodAutoscaler,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 8] = [
        ResourceKind::Pod,
        ResourceKind::ConfigMap,
        ResourceKind::Secret,
        ResourceKind::PersistentVolume,
        ResourceKind::PersistentVolumeClaim,
        ResourceKind::Job,
        ResourceKind::PodDisruptionBudget,
        ResourceKind::HorizontalPodAutoscaler,
    ];

    /// The API `kind` string.
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Pod => "Pod",
            ResourceKind::ConfigMap => "ConfigMap",
            ResourceKind::Secret => "Secret",
            ResourceKind::PersistentVolume => "PersistentVolume",
            ResourceKind::PersistentVolumeClaim => "PersistentVolumeClaim",
            ResourceKind::Job => "Job",
            ResourceKind::PodDisruptionBudget => "PodDisruptionBudget",
            ResourceKind::HorizontalPodAutoscaler => "HorizontalPodAutoscaler",
        }
    }

    /// Match an exact API `kind` string, as found in an object's type meta.
    pub fn from_kind(kind: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == kind)
    }

    /// Match a kubectl-style resource type: singular, plural or short name,
    /// case-insensitive.
    pub fn from_alias(alias: &str) -> Option<Self> {
        let alias = alias.trim().to_ascii_lowercase();
        let kind = match alias.as_str() {
            "po" | "pod" | "pods" => ResourceKind::Pod,
            "cm" | "configmap" | "configmaps" => ResourceKind::ConfigMap,
            "secret" | "secrets" => ResourceKind::Secret,
            "pv" | "persistentvolume" | "persistentvolumes" => ResourceKind::PersistentVolume,
            "pvc" | "persistentvolumeclaim" | "persistentvolumeclaims" => {
                ResourceKind::PersistentVolumeClaim
            }
            "job" | "jobs" | "jobs.batch" => ResourceKind::Job,
            "pdb" | "poddisruptionbudget" | "poddisruptionbudgets" => {
                ResourceKind::PodDisruptionBudget
            }
            "hpa" | "horizontalpodautoscaler" | "horizontalpodautoscalers" => {
                ResourceKind::HorizontalPodAutoscaler
            }
            _ => return None,
        };
        Some(kind)
    }

    /// Collateral that must be listed before candidates of this kind can be
    /// judged.
    pub fn collateral(self) -> &'static [Collateral] {
        match self {
            ResourceKind::ConfigMap => &[Collateral::Pods, Collateral::ReplicaSets],
            ResourceKind::Secret => &[
                Collateral::Pods,
                Collateral::ReplicaSets,
                Collateral::ServiceAccounts,
            ],
            ResourceKind::PersistentVolumeClaim | ResourceKind::PodDisruptionBudget => {
                &[Collateral::Pods]
            }
            ResourceKind::PersistentVolume => &[Collateral::PersistentVolumeClaims],
            ResourceKind::Pod | ResourceKind::Job | ResourceKind::HorizontalPodAutoscaler => &[],
        }
    }

    /// PersistentVolumes are the only cluster-scoped kind.
    pub fn is_namespaced(self) -> bool {
        !matches!(self, ResourceKind::PersistentVolume)
    }

    pub fn api_resource(self) -> ApiResource {
        match self {
            ResourceKind::Pod => ApiResource::erase::<Pod>(&()),
            ResourceKind::ConfigMap => ApiResource::erase::<ConfigMap>(&()),
            ResourceKind::Secret => ApiResource::erase::<Secret>(&()),
            ResourceKind::PersistentVolume => ApiResource::erase::<PersistentVolume>(&()),
            ResourceKind::PersistentVolumeClaim => {
                ApiResource::erase::<PersistentVolumeClaim>(&())
            }
            ResourceKind::Job => ApiResource::erase::<Job>(&()),
            ResourceKind::PodDisruptionBudget => ApiResource::erase::<PodDisruptionBudget>(&()),
            ResourceKind::HorizontalPodAutoscaler => {
                ApiResource::erase::<HorizontalPodAutoscaler>(&())
            }
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = ReapError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_alias(s).ok_or_else(|| ReapError::UnknownResourceType(s.to_string()))
    }
}
