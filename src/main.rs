//! sca-core: package identity, SBOM ingestion and vulnerability matching.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sca_core::{
    cli,
    config::{load_or_default, AdvisoryConfig, DetectionConfig, OutputConfig, ScaConfig},
    pipeline::exit_codes,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sca-core")]
#[command(version)]
#[command(about = "Package identity, SBOM ingestion and vulnerability matching", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Success
    1  Vulnerabilities found (with --fail-on-vuln)
    3  Error occurred

EXAMPLES:
    # Canonical identifier of a package record
    sca-core purl '{\"name\":\"bash\",\"version\":\"5.2\"}' --type deb --os-family debian --os-name 12

    # Decode an identifier
    sca-core decode 'pkg:npm/lodash@4.17.20'

    # Scan an SPDX document
    sca-core scan image.spdx.json --advisories advisories.json")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit compact JSON instead of pretty-printed
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments for the `purl` subcommand
#[derive(Parser)]
struct PurlArgs {
    /// Package record as JSON (`-` reads stdin)
    package_json: String,

    /// Package type (apk, deb, rpm, npm, pypi, maven, ...) or application type (eks, pip, ...)
    #[arg(short = 't', long = "type")]
    pkg_type: String,

    /// OS family of the artifact (debian, redhat, alpine, ...)
    #[arg(long)]
    os_family: Option<String>,

    /// OS release name (e.g. 12.1)
    #[arg(long)]
    os_name: Option<String>,

    /// Repository digest of the image (repeatable)
    #[arg(long = "repo-digest")]
    repo_digests: Vec<String>,

    /// Image architecture
    #[arg(long)]
    arch: Option<String>,
}

/// Arguments for the `scan` subcommand
#[derive(Parser)]
struct ScanArgs {
    /// SPDX document (JSON or tag-value)
    sbom: PathBuf,

    /// JSON advisory database
    #[arg(short, long, env = "SCA_CORE_ADVISORIES")]
    advisories: Option<PathBuf>,

    /// Package types to exclude from matching (comma-separated)
    #[arg(long, value_delimiter = ',')]
    skip: Vec<String>,

    /// Match packages sequentially
    #[arg(long)]
    sequential: bool,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,

    /// Exit with code 1 if any vulnerability is found
    #[arg(long)]
    fail_on_vuln: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a package record into its canonical identifier
    Purl(PurlArgs),

    /// Decode a canonical identifier into a package record
    Decode {
        /// Identifier text, e.g. pkg:npm/lodash@4.17.20
        purl: String,
    },

    /// Reconstruct the package tree of an SPDX document
    Sbom {
        /// SPDX document (JSON or tag-value)
        sbom: PathBuf,

        /// Output file path (stdout if not specified)
        #[arg(short = 'O', long)]
        output_file: Option<PathBuf>,
    },

    /// Match the packages of an SPDX document against an advisory database
    Scan(ScanArgs),

    /// Configuration file management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print current effective configuration (merged from defaults + file)
    Show,
    /// Generate an example .sca-core.yaml in the current directory
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let (file_config, loaded_from) = load_or_default(cli.config.as_deref());
    if let Some(path) = &loaded_from {
        tracing::debug!("Loaded config from {}", path.display());
    }

    match cli.command {
        Commands::Purl(args) => cli::run_purl(cli::EncodeArgs {
            pkg_type: args.pkg_type,
            package_json: args.package_json,
            os_family: args.os_family,
            os_name: args.os_name,
            repo_digests: args.repo_digests,
            arch: args.arch,
        }),

        Commands::Decode { purl } => {
            cli::run_decode(&purl, file_config.output.pretty && !cli.compact)
        }

        Commands::Sbom { sbom, output_file } => {
            let output = OutputConfig {
                pretty: file_config.output.pretty && !cli.compact,
                file: output_file.or(file_config.output.file),
            };
            cli::run_sbom(&sbom, &output)
        }

        Commands::Scan(args) => {
            let overrides = ScaConfig {
                advisories: AdvisoryConfig {
                    db_path: args.advisories,
                },
                detection: DetectionConfig {
                    skip_ecosystems: args.skip,
                    parallel: !args.sequential,
                },
                output: OutputConfig {
                    pretty: !cli.compact,
                    file: args.output_file,
                },
            };
            let mut config = file_config;
            config.merge(&overrides);

            match cli::run_scan(args.sbom, &config, args.fail_on_vuln) {
                Ok(exit_codes::SUCCESS) => Ok(()),
                Ok(code) => std::process::exit(code),
                Err(e) => {
                    eprintln!("Error: {e:#}");
                    std::process::exit(exit_codes::ERROR);
                }
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                if let Some(path) = &loaded_from {
                    eprintln!("# Loaded from: {}", path.display());
                } else {
                    eprintln!("# No config file found; showing defaults");
                }
                let yaml = serde_yaml_ng::to_string(&file_config)
                    .context("failed to serialize config")?;
                print!("{yaml}");
                Ok(())
            }
            ConfigAction::Init => {
                let target = std::env::current_dir()
                    .context("cannot determine current directory")?
                    .join(".sca-core.yaml");
                if target.exists() {
                    anyhow::bail!(
                        "{} already exists. Remove it first to re-initialize.",
                        target.display()
                    );
                }
                std::fs::write(&target, sca_core::config::generate_example_config())
                    .with_context(|| format!("failed to write {}", target.display()))?;
                eprintln!("Created {}", target.display());
                Ok(())
            }
        },
    }
}
