//! Handler for the reap command.
//!
//! Connects to the cluster, prepares a determiner for the requested kinds,
//! then walks every candidate page and deletes what the determiner reports
//! as unused.

use crate::config::ReapConfig;
use crate::error::{ReapError, Result};
use crate::reaper::{
    Candidate, CandidateLister, DeterminerOptions, KubeResourceClient, NamespaceScope,
    PageOptions, ResourceKind, UsageDeterminer,
};
use colored::Colorize;
use kube::Client;
use kube::api::{Api, DeleteParams, DynamicObject};

/// Options for a single reap run
#[derive(Debug, Clone, Default)]
pub struct ReapOptions {
    pub resources: Vec<ResourceKind>,
    pub namespace: Option<String>,
    pub all_namespaces: bool,
    pub label_selector: Option<String>,
    pub field_selector: Option<String>,
    /// Overrides the configured page size
    pub chunk_size: Option<u32>,
    pub quiet: bool,
}

/// Summary of a finished run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReapSummary {
    pub inspected: usize,
    pub deleted: usize,
}

pub async fn handle_reap(options: ReapOptions, config: &ReapConfig) -> Result<ReapSummary> {
    let _ = rustls::crypto::ring::default_provider().install_default();

    tokio::select! {
        result = run(&options, config) => result,
        _ = tokio::signal::ctrl_c() => {
            log::warn!("Canceling execution...");
            Err(ReapError::Cancelled)
        }
    }
}

async fn run(options: &ReapOptions, config: &ReapConfig) -> Result<ReapSummary> {
    let client = Client::try_default().await?;
    let scope = resolve_scope(options, client.default_namespace());
    let kinds = dedup_kinds(&options.resources);
    log::info!("Reaping {} in {}", join_kinds(&kinds), scope);

    let determiner = UsageDeterminer::new(
        KubeResourceClient::new(client.clone()),
        &scope,
        &kinds,
        DeterminerOptions {
            scan_replica_sets: config.scan_replica_sets,
        },
    )
    .await?;

    let lister = CandidateLister::new(
        client.clone(),
        scope.clone(),
        config.system_namespace.clone(),
        page_options(options, config),
    );

    let mut summary = ReapSummary::default();
    for kind in kinds {
        let mut token: Option<String> = None;
        loop {
            let page = lister.list_page(kind, token.as_deref()).await?;
            for candidate in &page.candidates {
                summary.inspected += 1;
                if !determiner.decide(candidate).await? {
                    log::debug!("{}/{} is in use", kind, candidate.name());
                    continue;
                }
                delete(&client, candidate).await?;
                summary.deleted += 1;
                if !options.quiet {
                    println!("{}", deletion_line(candidate).green());
                }
            }
            match page.continue_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }
    }

    log::info!(
        "Inspected {} objects, deleted {}",
        summary.inspected,
        summary.deleted
    );
    Ok(summary)
}

async fn delete(client: &Client, candidate: &Candidate) -> Result<()> {
    let ar = candidate.kind().api_resource();
    let api: Api<DynamicObject> = match candidate.namespace() {
        Some(ns) => Api::namespaced_with(client.clone(), ns, &ar),
        None => Api::all_with(client.clone(), &ar),
    };
    api.delete(candidate.name(), &DeleteParams::default()).await?;
    Ok(())
}

/// `-A` wins, then an explicit namespace, then the kubeconfig context.
pub fn resolve_scope(options: &ReapOptions, context_namespace: &str) -> NamespaceScope {
    if options.all_namespaces {
        return NamespaceScope::All;
    }
    let namespace = options
        .namespace
        .as_deref()
        .filter(|ns| !ns.is_empty())
        .unwrap_or(context_namespace);
    NamespaceScope::Namespace(namespace.to_string())
}

pub fn page_options(options: &ReapOptions, config: &ReapConfig) -> PageOptions {
    PageOptions {
        page_size: options.chunk_size.unwrap_or(config.page_size),
        label_selector: options.label_selector.clone(),
        field_selector: options.field_selector.clone(),
    }
}

fn dedup_kinds(kinds: &[ResourceKind]) -> Vec<ResourceKind> {
    let mut unique = Vec::with_capacity(kinds.len());
    for kind in kinds {
        if !unique.contains(kind) {
            unique.push(*kind);
        }
    }
    unique
}

fn join_kinds(kinds: &[ResourceKind]) -> String {
    kinds
        .iter()
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

fn deletion_line(candidate: &Candidate) -> String {
    format!(
        "{}/{} deleted",
        candidate.kind().as_str().to_lowercase(),
        candidate.name()
    )
}
