//! The usage determiner: decides whether a candidate should be deleted.
//!
//! # Lifecycle
//!
//! 1. [`UsageDeterminer::new`] receives every kind that will be judged,
//!    resolves which collateral those kinds need and lists it once.
//! 2. The usage index is built from that collateral.
//! 3. [`UsageDeterminer::decide`] is called once per candidate. Only the
//!    HorizontalPodAutoscaler rule touches the network.
//!
//! Nothing is mutated after construction, so `decide` may be called from
//! several tasks at once through a shared reference.

use super::candidate::Candidate;
use super::client::{Lookup, ObjectCoordinates, ResourceClient};
use super::collateral::{CollateralSet, required_collateral};
use super::kind::ResourceKind;
use super::scope::NamespaceScope;
use super::selector::Selector;
use super::usage::UsageIndex;
use super::volume::{CapacityPolicyMatcher, VolumeMatcher};
use crate::error::{ReapError, Result};
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::{PersistentVolume, Pod};
use k8s_openapi::api::policy::v1::PodDisruptionBudget;
use kube::core::DynamicObject;
use std::collections::BTreeSet;

const POD_PHASE_RUNNING: &str = "Running";

/// Options that shape collateral fetching.
#[derive(Debug, Clone)]
pub struct DeterminerOptions {
    /// Also treat ReplicaSet pod templates as referencing ConfigMaps and
    /// Secrets.
    pub scan_replica_sets: bool,
}

impl Default for DeterminerOptions {
    fn default() -> Self {
        Self {
            scan_replica_sets: true,
        }
    }
}

pub struct UsageDeterminer<C, M = CapacityPolicyMatcher> {
    client: C,
    matcher: M,
    prepared: BTreeSet<ResourceKind>,
    collateral: CollateralSet,
    index: UsageIndex,
}

impl<C: ResourceClient> UsageDeterminer<C> {
    /// Fetch the collateral `kinds` depend on and build the usage index.
    ///
    /// Any listing failure fails construction.
    pub async fn new(
        client: C,
        scope: &NamespaceScope,
        kinds: &[ResourceKind],
        options: DeterminerOptions,
    ) -> Result<Self> {
        let prepared: BTreeSet<ResourceKind> = kinds.iter().copied().collect();
        let required = required_collateral(&prepared, options.scan_replica_sets);

        let collateral = CollateralSet::fetch(&client, scope, &required).await?;
        let index = UsageIndex::build(&collateral, &prepared);

        Ok(Self {
            client,
            matcher: CapacityPolicyMatcher,
            prepared,
            collateral,
            index,
        })
    }
}

impl<C: ResourceClient, M: VolumeMatcher> UsageDeterminer<C, M> {
    /// Swap the PersistentVolume matching strategy.
    pub fn with_matcher<N: VolumeMatcher>(self, matcher: N) -> UsageDeterminer<C, N> {
        UsageDeterminer {
            client: self.client,
            matcher,
            prepared: self.prepared,
            collateral: self.collateral,
            index: self.index,
        }
    }

    /// Returns `true` if the candidate is unused and should be deleted.
    ///
    /// Fails with [`ReapError::KindNotPrepared`] for a kind that was not
    /// passed to [`UsageDeterminer::new`]; its index would be empty and every
    /// object would look unused.
    pub async fn decide(&self, candidate: &Candidate) -> Result<bool> {
        let kind = candidate.kind();
        if !self.prepared.contains(&kind) {
            return Err(ReapError::KindNotPrepared {
                kind: kind.to_string(),
                name: candidate.name().to_string(),
            });
        }

        let delete = match candidate {
            Candidate::Pod(pod) => !is_running(pod),
            Candidate::ConfigMap(_) => !self.index.config_maps.contains(candidate.name()),
            Candidate::Secret(_) => !self.index.secrets.contains(candidate.name()),
            Candidate::PersistentVolumeClaim(_) => !self.index.claims.contains(candidate.name()),
            Candidate::PersistentVolume(volume) => !self.satisfies_any_claim(volume),
            Candidate::Job(job) => job
                .status
                .as_ref()
                .is_some_and(|s| s.completion_time.is_some()),
            Candidate::PodDisruptionBudget(pdb) => !self.targets_any_pod(pdb)?,
            Candidate::HorizontalPodAutoscaler(hpa) => !self.scale_target_exists(hpa).await?,
        };

        log::trace!(
            "{}/{}: {}",
            kind,
            candidate.name(),
            if delete { "unused" } else { "in use" }
        );
        Ok(delete)
    }

    /// Decode an untyped object and decide on it.
    pub async fn decide_object(&self, object: DynamicObject) -> Result<bool> {
        let candidate = Candidate::from_dynamic(object)?;
        self.decide(&candidate).await
    }

    fn satisfies_any_claim(&self, volume: &PersistentVolume) -> bool {
        self.collateral
            .claims
            .iter()
            .any(|claim| self.matcher.satisfies(volume, claim))
    }

    fn targets_any_pod(&self, pdb: &PodDisruptionBudget) -> Result<bool> {
        let selector = pdb.spec.as_ref().and_then(|s| s.selector.as_ref());
        let selector =
            Selector::from_label_selector(selector).map_err(|e| ReapError::InvalidSelector {
                name: pdb.metadata.name.clone().unwrap_or_default(),
                reason: e.to_string(),
            })?;
        Ok(selector.matches_any_pod(&self.collateral.pods))
    }

    async fn scale_target_exists(&self, hpa: &HorizontalPodAutoscaler) -> Result<bool> {
        let name = hpa.metadata.name.clone().unwrap_or_default();
        let missing = |field| ReapError::MissingField {
            kind: ResourceKind::HorizontalPodAutoscaler.to_string(),
            name: name.clone(),
            field,
        };

        let target = &hpa
            .spec
            .as_ref()
            .ok_or_else(|| missing("spec"))?
            .scale_target_ref;
        let coordinates = ObjectCoordinates {
            api_version: target
                .api_version
                .clone()
                .ok_or_else(|| missing("spec.scaleTargetRef.apiVersion"))?,
            kind: target.kind.clone(),
            name: target.name.clone(),
            namespace: hpa
                .metadata
                .namespace
                .clone()
                .ok_or_else(|| missing("metadata.namespace"))?,
        };

        Ok(self.client.get_object(&coordinates).await? == Lookup::Found)
    }
}

fn is_running(pod: &Pod) -> bool {
    pod.status.as_ref().and_then(|s| s.phase.as_deref()) == Some(POD_PHASE_RUNNING)
}
