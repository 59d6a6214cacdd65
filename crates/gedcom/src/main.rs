mod commands;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Inspect lineage-linked GEDCOM grammars.
#[derive(Parser)]
#[command(version)]
struct Options {
    /// Log grammar parsing and tree building at debug level.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a grammar and report the first error.
    Check { path: Utf8PathBuf },
    /// List the structures of a grammar with their variations.
    Structures { path: Utf8PathBuf },
    /// Print the normalized definition of a structure.
    Show {
        path: Utf8PathBuf,
        structure: String,
        /// Only the variation selected by this line id.
        #[arg(long)]
        tag: Option<String>,
    },
    /// Print the smallest document a structure admits.
    Skeleton {
        path: Utf8PathBuf,
        structure: String,
        /// Variation to start from.
        #[arg(long)]
        tag: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let options = Options::parse();

    let filter = if options.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    match options.command {
        Command::Check { path } => commands::check(&path),
        Command::Structures { path } => commands::structures(&path),
        Command::Show { path, structure, tag } => commands::show(&path, &structure, tag.as_deref()),
        Command::Skeleton { path, structure, tag } => {
            commands::skeleton(&path, &structure, tag.as_deref())
        }
    }
}
