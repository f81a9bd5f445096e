//! Usage determination for Kubernetes resources.
//!
//! Given the kinds targeted by an invocation, the reaper lists only the
//! collateral those kinds depend on (Pods, ReplicaSets, ServiceAccounts,
//! PersistentVolumeClaims), derives which names are referenced, and then
//! judges each candidate object:
//!
//! | Kind | Deleted when |
//! |------|--------------|
//! | Pod | phase is not `Running` |
//! | ConfigMap | not referenced by any Pod or ReplicaSet template |
//! | Secret | not referenced by any Pod, ReplicaSet template or ServiceAccount |
//! | PersistentVolumeClaim | not mounted by any Pod |
//! | PersistentVolume | satisfies no listed claim |
//! | Job | has a completion time |
//! | PodDisruptionBudget | selects no Pod |
//! | HorizontalPodAutoscaler | scale target does not exist |
//!
//! # Example
//!
//! ```rust,ignore
//! use kubectl_reap::reaper::{KubeResourceClient, NamespaceScope, ResourceKind, UsageDeterminer};
//!
//! let kinds = [ResourceKind::ConfigMap];
//! let scope = NamespaceScope::Namespace("default".into());
//! let determiner = UsageDeterminer::new(
//!     KubeResourceClient::new(client),
//!     &scope,
//!     &kinds,
//!     Default::default(),
//! )
//! .await?;
//! let unused = determiner.decide(&candidate).await?;
//! ```

pub mod candidate;
pub mod candidates;
pub mod client;
pub mod collateral;
pub mod determiner;
pub mod kind;
pub mod quantity;
pub mod scope;
pub mod selector;
pub mod usage;
pub mod volume;

#[cfg(test)]
pub(crate) mod fake;

pub use candidate::Candidate;
pub use candidates::{CandidateLister, CandidatePage, PageOptions, PageSource, admits};
pub use client::{KubeResourceClient, Lookup, ObjectCoordinates, ResourceClient};
pub use collateral::{CollateralSet, required_collateral};
pub use determiner::{DeterminerOptions, UsageDeterminer};
pub use kind::{Collateral, ResourceKind};
pub use quantity::{QuantityError, parse_quantity};
pub use scope::NamespaceScope;
pub use selector::{Selector, SelectorError};
pub use usage::UsageIndex;
pub use volume::{CapacityPolicyMatcher, VolumeMatcher, check_volume_satisfy_claim};
