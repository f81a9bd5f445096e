//! Paginated listing of candidates.

use super::candidate::Candidate;
use super::kind::ResourceKind;
use super::scope::NamespaceScope;
use crate::error::Result;
use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::Client;
use kube::api::{Api, ListParams};
use kube::core::{DynamicObject, ObjectList, TypeMeta};

pub const DEFAULT_PAGE_SIZE: u32 = 500;

/// One page of candidates and the token for the next page, if any.
#[derive(Debug, Default)]
pub struct CandidatePage {
    pub candidates: Vec<Candidate>,
    pub continue_token: Option<String>,
}

/// Server-side filtering and chunking of candidate lists.
#[derive(Debug, Clone)]
pub struct PageOptions {
    /// Zero disables chunking.
    pub page_size: u32,
    pub label_selector: Option<String>,
    pub field_selector: Option<String>,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            label_selector: None,
            field_selector: None,
        }
    }
}

impl PageOptions {
    pub fn list_params(&self, continue_token: Option<&str>) -> ListParams {
        let mut params = ListParams::default();
        if self.page_size > 0 {
            params = params.limit(self.page_size);
        }
        if let Some(token) = continue_token {
            params = params.continue_token(token);
        }
        if let Some(labels) = self.label_selector.as_deref().filter(|s| !s.is_empty()) {
            params = params.labels(labels);
        }
        if let Some(fields) = self.field_selector.as_deref().filter(|s| !s.is_empty()) {
            params = params.fields(fields);
        }
        params
    }
}

/// Where candidate pages come from.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn list_objects(
        &self,
        kind: ResourceKind,
        scope: &NamespaceScope,
        params: &ListParams,
    ) -> Result<ObjectList<DynamicObject>>;
}

#[async_trait]
impl PageSource for Client {
    async fn list_objects(
        &self,
        kind: ResourceKind,
        scope: &NamespaceScope,
        params: &ListParams,
    ) -> Result<ObjectList<DynamicObject>> {
        let ar = kind.api_resource();
        let api: Api<DynamicObject> = match scope.namespace() {
            Some(ns) if kind.is_namespaced() => Api::namespaced_with(self.clone(), ns, &ar),
            _ => Api::all_with(self.clone(), &ar),
        };
        Ok(api.list(params).await?)
    }
}

/// Lists candidates of the requested kinds.
///
/// Objects in the system namespace are dropped here, before any caller can
/// see them, whatever the scope.
#[derive(Clone)]
pub struct CandidateLister<S = Client> {
    source: S,
    scope: NamespaceScope,
    system_namespace: String,
    options: PageOptions,
}

impl<S: PageSource> CandidateLister<S> {
    pub fn new(
        source: S,
        scope: NamespaceScope,
        system_namespace: impl Into<String>,
        options: PageOptions,
    ) -> Self {
        Self {
            source,
            scope,
            system_namespace: system_namespace.into(),
            options,
        }
    }

    /// Fetch one page of `kind`.
    pub async fn list_page(
        &self,
        kind: ResourceKind,
        continue_token: Option<&str>,
    ) -> Result<CandidatePage> {
        let list = self
            .source
            .list_objects(kind, &self.scope, &self.options.list_params(continue_token))
            .await?;
        let ar = kind.api_resource();

        let mut candidates = Vec::with_capacity(list.items.len());
        for mut object in list.items {
            if !admits(&self.system_namespace, &object.metadata) {
                log::debug!(
                    "Skipping {}/{} in system namespace",
                    kind,
                    object.metadata.name.as_deref().unwrap_or_default()
                );
                continue;
            }
            // List items usually arrive without type meta.
            object.types.get_or_insert_with(|| TypeMeta {
                api_version: ar.api_version.clone(),
                kind: ar.kind.clone(),
            });
            candidates.push(Candidate::from_dynamic(object)?);
        }

        Ok(CandidatePage {
            candidates,
            continue_token: list.metadata.continue_.filter(|t| !t.is_empty()),
        })
    }
}

/// Whether an object may be presented as a candidate at all.
pub fn admits(system_namespace: &str, metadata: &ObjectMeta) -> bool {
    metadata.namespace.as_deref() != Some(system_namespace)
}
