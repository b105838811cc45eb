//! ChainProposal CLI: describe MCMS and timelock proposals before signing.
//!
//! # Commands
//! ```
//! chainproposal describe  --proposal <file.json> [--timelock] [--format text|markdown|json] [--abi "Type Version=path"]...
//! chainproposal renderers
//! chainproposal chains
//! ```

use anyhow::{Context, Result};
use chainproposal_observability::init_tracing;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd_describe;
mod config;

use config::DescribeConfig;

#[derive(Parser)]
#[command(
    name = "chainproposal",
    about = "Human-readable descriptions of MCMS / timelock proposals",
    long_about = "
ChainProposal CLI: decode every call of a multisig or timelock proposal,
annotate it with address-book and chain context, and render a report
a signer can review.

ENVIRONMENT VARIABLES:
  RUST_LOG    Overrides the configured log filter
",
    version
)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// YAML config file (environment, ABIs, address book, logging)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode, analyze and render a proposal file
    Describe {
        /// Path to the proposal JSON
        #[arg(short, long)]
        proposal: PathBuf,
        /// Treat the file as a timelock proposal (auto-detected otherwise)
        #[arg(long)]
        timelock: bool,
        /// Renderer ID (text, markdown, json)
        #[arg(short, long)]
        format: Option<String>,
        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// JSON address book
        #[arg(long)]
        addresses: Option<PathBuf>,
        /// Environment name shown in the report
        #[arg(long)]
        environment: Option<String>,
        /// Domain name shown in the report
        #[arg(long)]
        domain: Option<String>,
        /// ABI for a contract type: "RBACTimelock 1.0.0=abis/timelock.json"
        #[arg(long = "abi", value_name = "TYPE VERSION=PATH")]
        abis: Vec<String>,
    },

    /// List available renderers
    Renderers,

    /// List known chain selectors
    Chains,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => DescribeConfig::load(path)?,
        None => DescribeConfig::default(),
    };
    if cli.verbose {
        config.log.level = "debug".into();
    }
    init_tracing(&config.log).context("initialise logging")?;

    match cli.command {
        Commands::Describe {
            proposal,
            timelock,
            format,
            output,
            addresses,
            environment,
            domain,
            abis,
        } => {
            if let Some(format) = format {
                config.renderer = format;
            }
            if let Some(addresses) = addresses {
                config.addresses = Some(addresses);
            }
            if let Some(environment) = environment {
                config.environment = environment;
            }
            if let Some(domain) = domain {
                config.domain = domain;
            }
            for abi in &abis {
                let (key, path) = abi
                    .split_once('=')
                    .with_context(|| format!("--abi '{abi}' must look like 'Type Version=path'"))?;
                config.abis.insert(key.trim().to_string(), PathBuf::from(path.trim()));
            }
            cmd_describe::run(&config, &proposal, timelock, output.as_deref()).await
        }

        Commands::Renderers => cmd_renderers(),

        Commands::Chains => cmd_chains(&config),
    }
}

fn cmd_renderers() -> Result<()> {
    let registry = chainproposal_render::RendererRegistry::with_builtin();
    println!("Renderers:");
    for id in registry.list() {
        println!("  {id}");
    }
    Ok(())
}

fn cmd_chains(config: &DescribeConfig) -> Result<()> {
    let chains = config.known_chains();
    println!("{} known chains:", chains.len());
    for (selector, name) in chains.iter() {
        println!("  {selector:>20}  {name}");
    }
    Ok(())
}
