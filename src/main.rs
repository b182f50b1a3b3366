//! artreq - registry artifact requirement extractor
//!
//! Reads the engine version a rules file requires and the plugin API version
//! a compiled plugin requires, and prints them as `{name, version}` pairs.

mod scan;

use anyhow::Context;
use artreq_config::{Config, OutputFormat};
use artreq_plugins::SharedLibraryLoader;
use clap::{Parser, Subcommand};
use scan::{ArtifactKind, Extractor};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// artreq - Extract artifact requirements
#[derive(Parser, Debug)]
#[command(name = "artreq")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file path
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Output format (json or text)
    #[arg(short = 'f', long, global = true)]
    format: Option<OutputFormat>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the engine version required by rules files
    Rules {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Extract the plugin API version required by plugin shared objects
    Plugin {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Extract requirements of every artifact under a directory
    Scan { dir: PathBuf },
    /// Print the effective configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| {
                format!(
                    "artreq={0},artreq_core={0},artreq_plugins={0},artreq_config={0}",
                    log_level
                )
            }),
        ))
        .init();

    tracing::debug!("Starting artreq v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(format) = args.format {
        config.output.format = format;
    }

    let loader =
        SharedLibraryLoader::with_framework_api_version(&config.plugins.framework_api_version)
            .with_context(|| {
                format!(
                    "invalid plugins.framework_api_version {:?}",
                    config.plugins.framework_api_version
                )
            })?;
    let extractor = Extractor::new(loader, config.scan.clone());

    let report = match args.command {
        Command::Rules { paths } => extractor.extract_all(ArtifactKind::Rules, &paths),
        Command::Plugin { paths } => extractor.extract_all(ArtifactKind::Plugin, &paths),
        Command::Scan { dir } => {
            anyhow::ensure!(dir.is_dir(), "{:?} is not a directory", dir);
            extractor.scan_dir(&dir)
        }
        Command::Config => {
            print!("{}", config.to_toml()?);
            return Ok(());
        }
    };

    let stdout = std::io::stdout();
    report.render(config.output.format, config.output.pretty, &mut stdout.lock())?;

    if report.has_failures() {
        tracing::debug!("{} artifact(s) failed", report.failures.len());
        std::process::exit(1);
    }

    Ok(())
}
