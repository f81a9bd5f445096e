//! Objects under consideration for deletion.

use super::kind::ResourceKind;
use crate::error::{ReapError, Result};
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::{
    ConfigMap, PersistentVolume, PersistentVolumeClaim, Pod, Secret,
};
use k8s_openapi::api::policy::v1::PodDisruptionBudget;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::core::DynamicObject;
use serde::de::DeserializeOwned;

/// A single object, typed by its kind.
#[derive(Debug, Clone)]
pub enum Candidate {
    Pod(Pod),
    ConfigMap(ConfigMap),
    Secret(Secret),
    PersistentVolume(PersistentVolume),
    PersistentVolumeClaim(PersistentVolumeClaim),
    Job(Job),
    PodDisruptionBudget(PodDisruptionBudget),
    HorizontalPodAutoscaler(HorizontalPodAutoscaler),
}

impl Candidate {
    /// Decode an untyped object into its typed variant.
    ///
    /// The object must carry type meta. A kind outside [`ResourceKind`]
    /// yields [`ReapError::UnsupportedKind`].
    pub fn from_dynamic(object: DynamicObject) -> Result<Self> {
        let kind = object
            .types
            .as_ref()
            .map(|t| t.kind.clone())
            .unwrap_or_default();
        let name = object.metadata.name.clone().unwrap_or_default();

        let Some(resource_kind) = ResourceKind::from_kind(&kind) else {
            return Err(ReapError::UnsupportedKind { kind, name });
        };

        let value = serde_json::to_value(&object).map_err(|source| ReapError::Decode {
            kind: kind.clone(),
            name: name.clone(),
            source,
        })?;

        let candidate = match resource_kind {
            ResourceKind::Pod => Candidate::Pod(decode(value, &kind, &name)?),
            ResourceKind::ConfigMap => Candidate::ConfigMap(decode(value, &kind, &name)?),
            ResourceKind::Secret => Candidate::Secret(decode(value, &kind, &name)?),
            ResourceKind::PersistentVolume => {
                Candidate::PersistentVolume(decode(value, &kind, &name)?)
            }
            ResourceKind::PersistentVolumeClaim => {
                Candidate::PersistentVolumeClaim(decode(value, &kind, &name)?)
            }
            ResourceKind::Job => Candidate::Job(decode(value, &kind, &name)?),
            ResourceKind::PodDisruptionBudget => {
                Candidate::PodDisruptionBudget(decode(value, &kind, &name)?)
            }
            ResourceKind::HorizontalPodAutoscaler => {
                Candidate::HorizontalPodAutoscaler(decode(value, &kind, &name)?)
            }
        };
        Ok(candidate)
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Candidate::Pod(_) => ResourceKind::Pod,
            Candidate::ConfigMap(_) => ResourceKind::ConfigMap,
            Candidate::Secret(_) => ResourceKind::Secret,
            Candidate::PersistentVolume(_) => ResourceKind::PersistentVolume,
            Candidate::PersistentVolumeClaim(_) => ResourceKind::PersistentVolumeClaim,
            Candidate::Job(_) => ResourceKind::Job,
            Candidate::PodDisruptionBudget(_) => ResourceKind::PodDisruptionBudget,
            Candidate::HorizontalPodAutoscaler(_) => ResourceKind::HorizontalPodAutoscaler,
        }
    }

    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            Candidate::Pod(o) => &o.metadata,
            Candidate::ConfigMap(o) => &o.metadata,
            Candidate::Secret(o) => &o.metadata,
            Candidate::PersistentVolume(o) => &o.metadata,
            Candidate::PersistentVolumeClaim(o) => &o.metadata,
            Candidate::Job(o) => &o.metadata,
            Candidate::PodDisruptionBudget(o) => &o.metadata,
            Candidate::HorizontalPodAutoscaler(o) => &o.metadata,
        }
    }

    pub fn name(&self) -> &str {
        self.metadata().name.as_deref().unwrap_or_default()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.metadata().namespace.as_deref()
    }
}

fn decode<K: DeserializeOwned>(value: serde_json::Value, kind: &str, name: &str) -> Result<K> {
    serde_json::from_value(value).map_err(|source| ReapError::Decode {
        kind: kind.to_string(),
        name: name.to_string(),
        source,
    })
}
