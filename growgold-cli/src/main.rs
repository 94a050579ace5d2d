use anyhow::Context;
use clap::{Parser, Subcommand};
use growgold_access::{DirectoryBuilder, DirectoryPresets, MemoryAuditSink, SubAdminDirectory};
use growgold_cli::{commands, CliResult, CreateArgs, Output, TracingConfig, TracingFormat};
use std::path::PathBuf;

/// Manage Grow Gold sub-admins and their module permissions
#[derive(Debug, Parser)]
#[command(name = "growgold", version, about)]
struct Cli {
    /// Module catalog JSON file (defaults to the built-in catalog and demo records)
    #[arg(long, global = true, env = "GROWGOLD_CATALOG")]
    catalog: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = TracingFormat::Compact)]
    log_format: TracingFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List manageable modules and their actions
    Modules,

    /// Normalize a raw permission object against the catalog
    Normalize {
        /// JSON such as '{"faq": {"view": true}}'
        json: String,
    },

    /// Show the sub-admin directory
    Directory {
        #[arg(long)]
        json: bool,
    },

    /// Create a sub-admin
    Create(CreateArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    growgold_cli::init_subscriber_with_config(TracingConfig {
        format: cli.log_format,
        ..Default::default()
    })
    .context("failed to install tracing subscriber")?;

    match run(cli).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(err.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<Output> {
    let directory = open_directory(cli.catalog)?;

    match cli.command {
        Command::Modules => commands::modules(directory.catalog()),
        Command::Normalize { json } => commands::normalize_json(directory.catalog(), &json),
        Command::Directory { json } => commands::directory(&directory, json).await,
        Command::Create(args) => commands::create(&directory, args).await,
    }
}

/// Demo records on the built-in catalog, or an empty directory on a custom one
fn open_directory(catalog: Option<PathBuf>) -> CliResult<SubAdminDirectory> {
    let directory = match catalog {
        Some(path) => DirectoryBuilder::new()
            .catalog_file(path)?
            .audit(MemoryAuditSink::new())
            .build()?,
        None => DirectoryPresets::demo()?,
    };
    Ok(directory)
}
