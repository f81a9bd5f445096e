use clap::Parser;
use kubectl_reap::{cli::Cli, config, handlers};
use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> kubectl_reap::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    cli.init_logging();

    // Load configuration
    let config = config::load_config(cli.config.as_deref())?;

    let options = handlers::ReapOptions {
        resources: cli.resources,
        namespace: cli.namespace,
        all_namespaces: cli.all_namespaces,
        label_selector: cli.selector,
        field_selector: cli.field_selector,
        chunk_size: cli.chunk_size,
        quiet: cli.quiet,
    };

    handlers::handle_reap(options, &config).await?;
    Ok(())
}
