use crate::reaper::ResourceKind;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kubectl-reap")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Delete unused Kubernetes resources")]
#[command(long_about = "Deletes resources nothing depends on: ConfigMaps and Secrets no Pod references, \
claims no Pod mounts, volumes no claim could bind, finished Pods and Jobs, \
disruption budgets that select nothing and autoscalers whose target is gone.")]
pub struct Cli {
    /// Resource types to reap (e.g. cm,secret or pvc pv)
    #[arg(value_name = "TYPE", required = true, value_delimiter = ',', value_parser = parse_kind)]
    pub resources: Vec<ResourceKind>,

    /// Namespace to operate in (defaults to the kubeconfig context namespace)
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Operate across all namespaces
    #[arg(short = 'A', long, conflicts_with = "namespace")]
    pub all_namespaces: bool,

    /// Label selector applied when listing candidates
    #[arg(short = 'l', long, value_name = "SELECTOR")]
    pub selector: Option<String>,

    /// Field selector applied when listing candidates
    #[arg(long, value_name = "SELECTOR")]
    pub field_selector: Option<String>,

    /// Candidates fetched per list request (0 disables chunking)
    #[arg(long, value_name = "N")]
    pub chunk_size: Option<u32>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

fn parse_kind(value: &str) -> std::result::Result<ResourceKind, String> {
    value.parse::<ResourceKind>().map_err(|e| e.to_string())
}

impl Cli {
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}
