//! docweave CLI: render word-processor templates against JSON data.
//!
//! Provides three commands: `render`, `preprocess` and `list`.
//!
//! Each command works on [`docweave_core::template::DocumentTemplate`] handles; the
//! `.docx` variant comes from [`docweave_docx`].

mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "docweave",
    about = "Render .docx report templates against JSON data",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to docweave.config.json (optional; defaults apply when absent)
    #[arg(long, global = true, default_value = "docweave.config.json", env = "DOCWEAVE_CONFIG")]
    config: PathBuf,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template with a JSON data context
    Render {
        /// Template file (.docx)
        template: PathBuf,

        /// JSON file holding the data context
        #[arg(long, short)]
        data: PathBuf,

        /// Output path (default: <template stem>.out.docx)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Show the document markup after directive repair
    Preprocess {
        /// Template file (.docx)
        template: PathBuf,

        /// Write the markup here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Load every template in a directory and list them
    List {
        /// Template directory (default: template_dir from the config)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG, when set, overrides -v
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Render {
            template,
            data,
            output,
        } => {
            commands::render::run(&cli.config, &template, &data, output.as_deref())?;
        }
        Commands::Preprocess { template, output } => {
            commands::preprocess::run(&cli.config, &template, output.as_deref())?;
        }
        Commands::List { dir } => {
            commands::list::run(&cli.config, dir.as_deref())?;
        }
    }

    Ok(())
}
