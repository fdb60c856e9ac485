use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use pgcluster_core::config::{PartialConfig, ResolvedConfig};

#[derive(Parser)]
#[command(name = "pgcluster")]
#[command(about = "Inspect and resolve pgcluster cluster configuration", long_about = None)]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Print single-line JSON instead of pretty JSON
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Print the configuration used when nothing is stored
    Defaults,
    /// Resolve a partial configuration file against the defaults
    Resolve {
        /// Partial configuration JSON file ("-" for stdin)
        file: PathBuf,
    },
    /// Decode and validate a partial configuration file
    Validate {
        /// Partial configuration JSON file ("-" for stdin)
        file: PathBuf,
    },
    /// Apply a patch over a stored partial configuration
    Patch {
        /// Stored partial configuration ("-" for stdin)
        base: PathBuf,

        /// Patch containing only the fields to change
        patch: PathBuf,

        /// Print the resolved configuration instead of the patched partial
        #[arg(long)]
        resolve: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(format!(
            "pgcluster={0},pgcluster_core={0}",
            cli.log_level
        ))
    })
    .context("Invalid log level")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Defaults => print_json(&ResolvedConfig::new_default(), cli.compact)?,
        Commands::Resolve { file } => {
            let partial = read_partial(&file)?;
            let resolved = partial.to_resolved()?;
            tracing::debug!(
                overridden = partial.set_field_count(),
                "Resolved {}",
                file.display()
            );
            print_json(&resolved, cli.compact)?;
        }
        Commands::Validate { file } => {
            let partial = read_partial(&file)?;
            tracing::info!(
                "{} is valid ({} fields set)",
                file.display(),
                partial.set_field_count()
            );
            println!("ok");
        }
        Commands::Patch {
            base,
            patch,
            resolve,
        } => {
            let base = read_partial(&base)?;
            let patch = read_partial(&patch)?;
            let patched = base.apply_patch(&patch)?;
            if resolve {
                print_json(&patched.to_resolved()?, cli.compact)?;
            } else {
                print_json(&patched, cli.compact)?;
            }
        }
    }

    Ok(())
}

fn read_partial(path: &Path) -> Result<PartialConfig> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("Failed to read configuration from stdin")?;
        return PartialConfig::from_json_slice(&buf).context("Invalid configuration on stdin");
    }

    PartialConfig::from_file(path)
        .with_context(|| format!("Invalid configuration in {}", path.display()))
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let out = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", out);
    Ok(())
}
