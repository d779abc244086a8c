mod fetch;
mod grid;
mod parser;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use grid::Grid;
use settings::Settings;

#[derive(Parser)]
#[command(
    name = "grid_decoder",
    about = "Reveal the message hidden in a published character table",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    #[command(flatten)]
    source: SourceArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a document and print the revealed grid (default)
    Decode(SourceArgs),
    /// Print the extracted entries, one JSON object per line
    Entries(SourceArgs),
}

#[derive(Args)]
struct SourceArgs {
    /// Document URL (default: GRID_URL or the configured url)
    url: Option<String>,
    /// Read a saved copy of the document instead of fetching it
    #[arg(short, long, conflicts_with = "url")]
    file: Option<PathBuf>,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load().context("Failed to load configuration")?;
    info!(settings_loaded = ?settings, msg = "Starting grid decoder");

    match cli.command.unwrap_or(Commands::Decode(cli.source)) {
        Commands::Decode(source) => {
            let text = load_document(&settings, &source)?;
            let entries = parser::decode_document(&text);
            let grid = Grid::assemble_within(&entries, settings.limits());
            if grid.is_empty() {
                println!("No grid to display.");
                return Ok(());
            }
            info!(
                entries = entries.len(),
                width = grid.width(),
                height = grid.height(),
                "Decoded grid"
            );
            println!("{}", grid);
            Ok(())
        }
        Commands::Entries(source) => {
            let text = load_document(&settings, &source)?;
            for entry in parser::decode_document(&text) {
                println!("{}", serde_json::to_string(&entry)?);
            }
            Ok(())
        }
    }
}

fn load_document(settings: &Settings, source: &SourceArgs) -> Result<String> {
    if let Some(path) = &source.file {
        return Ok(fetch::read_document(path)?);
    }
    let url = source.url.as_deref().unwrap_or(&settings.url);
    let client = fetch::build_client(settings)?;
    fetch::fetch_document(&client, url).context("Error fetching document")
}
