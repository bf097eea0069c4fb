//! gs1conv - GS1 script converter
//!
//! Command-line front end over the conversion entry points.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gs1conv_core::ConvertOptions;
use gs1conv_scripting::{convert_with_split, recover_original, Converter};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gs1conv")]
#[command(about = "Convert GS1 scripts to event-callback code")]
#[command(version)]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert one script section
    Convert {
        /// GS1 source file
        file: PathBuf,

        /// Generate client-side code
        #[arg(long)]
        client: bool,

        /// Options file (key = value text, or .json)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert a script with server and client sections, embedding the source
    Split {
        file: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract the source embedded in converted output
    Recover {
        file: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Convert { file, client, config, output } => {
            let options = load_options(config.as_deref())?.with_client_side(client);
            let source = read_source(&file).await?;
            info!("Converting {}", file.display());
            let code = Converter::convert_string(&source, options);
            write_output(output.as_deref(), &code).await?;
        }
        Command::Split { file, config, output } => {
            let options = load_options(config.as_deref())?;
            let source = read_source(&file).await?;
            info!("Converting {} with client-side split", file.display());
            let code = convert_with_split(&source, options);
            write_output(output.as_deref(), &code).await?;
        }
        Command::Recover { file, output } => {
            let text = read_source(&file).await?;
            let original = recover_original(&text);
            if original.is_empty() {
                warn!("No embedded source found in {}", file.display());
            }
            write_output(output.as_deref(), &original).await?;
        }
    }

    Ok(())
}

fn load_options(path: Option<&Path>) -> Result<ConvertOptions> {
    let options = match path {
        Some(path) => gs1conv_config::load_from_file(path)
            .with_context(|| format!("Failed to load options from {}", path.display()))?,
        None => ConvertOptions::default(),
    };
    gs1conv_config::display(&options);
    Ok(options)
}

async fn read_source(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

async fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            tokio::fs::write(path, text)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}
