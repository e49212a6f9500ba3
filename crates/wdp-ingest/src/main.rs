//! WDP Ingest - Wikipedia dump ingestion tool

use anyhow::Result;
use clap::Parser;
use std::io::Write;
use tracing::info;
use wdp_common::logging::{init_logging, LogConfig, LogLevel};
use wdp_ingest::config::PipelineConfig;
use wdp_ingest::pipeline::DumpPipeline;
use wdp_ingest::transform::PassthroughCleaner;

#[derive(Parser, Debug)]
#[command(name = "wdp-ingest")]
#[command(author, version, about = "Wikipedia dump ingestion tool")]
struct Cli {
    /// Pipeline step to run
    #[command(subcommand)]
    step: Step,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Parser, Debug)]
enum Step {
    /// Resolve the dump manifest into download descriptors
    Resolve {
        /// Manifest to use instead of the cache/network chain
        /// (bundled resource name or filesystem path)
        #[arg(short, long)]
        file_list: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbose flag
    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("wdp-ingest".to_string())
        .build();

    // Merge with environment variables (they take precedence)
    let log_config = LogConfig::from_env().unwrap_or(log_config);

    init_logging(&log_config)?;

    let config = PipelineConfig::from_env();
    let pipeline = DumpPipeline::new(config, PassthroughCleaner)?;

    match cli.step {
        Step::Resolve { file_list } => {
            info!("Resolving dump manifest");
            let descriptors = pipeline.resolve_descriptors(file_list.as_deref()).await?;

            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            for descriptor in &descriptors {
                serde_json::to_writer(&mut out, descriptor)?;
                writeln!(out)?;
            }
        },
    }

    info!("Ingestion complete");
    Ok(())
}
