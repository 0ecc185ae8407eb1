//! K3s QA harness CLI
//!
//! Validates a freshly provisioned or upgraded single-node cluster before it
//! is declared production-ready: control-plane state, pod readiness, probe
//! configuration, service endpoints, and ingress routing. Exits 0 only when
//! every recorded check passed.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use k3s_qa::kubectl::{KubectlProvider, ReqwestProbe, SystemctlStatus};
use k3s_qa::ledger::{ConsoleSink, ReportSink, SilentSink};
use k3s_qa::runner::{RunConfig, Runner};
use std::sync::Arc;

/// Cluster health and ingress routing verification harness
#[derive(Parser)]
#[command(name = "k3s-qa")]
#[command(about = "Verify K3s cluster health and ingress routing")]
#[command(version)]
struct Cli {
    /// Namespace to inspect
    #[arg(long, default_value = "default")]
    namespace: String,

    /// Ingress entry point for connectivity probes
    #[arg(long, default_value = "http://localhost:80")]
    ingress_url: String,

    /// Control-plane systemd unit
    #[arg(long, default_value = "k3s")]
    unit: String,

    /// Output format (text or json)
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing if verbose
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("k3s_qa=debug")
            .init();
    }

    // An unparseable entry point means no probe can ever be constructed;
    // this is the one failure that terminates before any check runs.
    let _: reqwest::Url = cli
        .ingress_url
        .parse()
        .context("invalid --ingress-url")?;

    let sink: Arc<dyn ReportSink> = match cli.format {
        OutputFormat::Text => {
            let divider = "=".repeat(60);
            println!("{}", divider.blue());
            println!("{}", "K3s Platform QA Test Suite".blue());
            println!("{}", divider.blue());
            Arc::new(ConsoleSink)
        }
        OutputFormat::Json => Arc::new(SilentSink),
    };

    let status = SystemctlStatus::new(cli.unit);
    let cluster = KubectlProvider::new();
    let probe = ReqwestProbe::new();

    let config = RunConfig {
        namespace: cli.namespace,
        ingress_url: cli.ingress_url,
    };
    let runner = Runner::new(config, &status, &cluster, &probe, sink);
    let report = runner.run().await;

    if matches!(cli.format, OutputFormat::Json) {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    std::process::exit(report.exit_code());
}
