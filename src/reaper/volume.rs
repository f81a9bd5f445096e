//! PersistentVolume / PersistentVolumeClaim compatibility.

use super::quantity::parse_quantity;
use k8s_openapi::api::core::v1::{PersistentVolume, PersistentVolumeClaim};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::{BTreeMap, HashSet};

/// Legacy annotation that takes precedence over `spec.storageClassName`.
pub const BETA_STORAGE_CLASS_ANNOTATION: &str = "volume.beta.kubernetes.io/storage-class";

const RESOURCE_STORAGE: &str = "storage";
const VOLUME_MODE_FILESYSTEM: &str = "Filesystem";

/// Decides whether a volume could serve a claim.
pub trait VolumeMatcher: Send + Sync {
    fn satisfies(&self, volume: &PersistentVolume, claim: &PersistentVolumeClaim) -> bool;
}

impl<F> VolumeMatcher for F
where
    F: Fn(&PersistentVolume, &PersistentVolumeClaim) -> bool + Send + Sync,
{
    fn satisfies(&self, volume: &PersistentVolume, claim: &PersistentVolumeClaim) -> bool {
        self(volume, claim)
    }
}

/// Capacity, storage class, volume mode and access modes must all agree.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapacityPolicyMatcher;

impl VolumeMatcher for CapacityPolicyMatcher {
    fn satisfies(&self, volume: &PersistentVolume, claim: &PersistentVolumeClaim) -> bool {
        check_volume_satisfy_claim(volume, claim)
    }
}

pub fn check_volume_satisfy_claim(
    volume: &PersistentVolume,
    claim: &PersistentVolumeClaim,
) -> bool {
    capacity_satisfies_request(volume, claim)
        && storage_class_matches(volume, claim)
        && volume_mode_matches(volume, claim)
        && access_modes_match(volume, claim)
}

/// The volume must be strictly larger than the request; equal sizes do not
/// satisfy.
fn capacity_satisfies_request(volume: &PersistentVolume, claim: &PersistentVolumeClaim) -> bool {
    let capacity = volume.spec.as_ref().and_then(|s| s.capacity.as_ref());
    let requests = claim
        .spec
        .as_ref()
        .and_then(|s| s.resources.as_ref())
        .and_then(|r| r.requests.as_ref());

    storage_size(capacity) > storage_size(requests)
}

/// Missing or unparsable sizes count as zero.
fn storage_size(resources: Option<&BTreeMap<String, Quantity>>) -> i128 {
    let Some(quantity) = resources.and_then(|r| r.get(RESOURCE_STORAGE)) else {
        return 0;
    };
    parse_quantity(&quantity.0).unwrap_or_else(|e| {
        log::debug!("Ignoring storage quantity: {}", e);
        0
    })
}

fn storage_class_matches(volume: &PersistentVolume, claim: &PersistentVolumeClaim) -> bool {
    let requested = claim
        .metadata
        .annotations
        .as_ref()
        .and_then(|a| a.get(BETA_STORAGE_CLASS_ANNOTATION))
        .map(String::as_str)
        .or_else(|| claim.spec.as_ref()?.storage_class_name.as_deref())
        .unwrap_or_default();

    let offered = volume
        .metadata
        .annotations
        .as_ref()
        .and_then(|a| a.get(BETA_STORAGE_CLASS_ANNOTATION))
        .map(String::as_str)
        .or_else(|| volume.spec.as_ref()?.storage_class_name.as_deref())
        .unwrap_or_default();

    requested == offered
}

fn volume_mode_matches(volume: &PersistentVolume, claim: &PersistentVolumeClaim) -> bool {
    let requested = claim
        .spec
        .as_ref()
        .and_then(|s| s.volume_mode.as_deref())
        .unwrap_or(VOLUME_MODE_FILESYSTEM);
    let offered = volume
        .spec
        .as_ref()
        .and_then(|s| s.volume_mode.as_deref())
        .unwrap_or(VOLUME_MODE_FILESYSTEM);

    requested == offered
}

/// Every requested mode must be offered; the volume may offer more.
fn access_modes_match(volume: &PersistentVolume, claim: &PersistentVolumeClaim) -> bool {
    let offered: HashSet<&str> = volume
        .spec
        .as_ref()
        .and_then(|s| s.access_modes.as_ref())
        .into_iter()
        .flatten()
        .map(String::as_str)
        .collect();

    claim
        .spec
        .as_ref()
        .and_then(|s| s.access_modes.as_ref())
        .into_iter()
        .flatten()
        .all(|mode| offered.contains(mode.as_str()))
}
