use crate::reaper::candidates::DEFAULT_PAGE_SIZE;
use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReapConfig {
    /// Namespace whose objects are never deleted
    pub system_namespace: String,
    /// Chunk size used when listing candidates (0 disables chunking)
    pub page_size: u32,
    /// Treat ReplicaSet pod templates as referencing ConfigMaps and Secrets
    pub scan_replica_sets: bool,
}

impl Default for ReapConfig {
    fn default() -> Self {
        Self {
            system_namespace: "kube-system".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            scan_replica_sets: true,
        }
    }
}
