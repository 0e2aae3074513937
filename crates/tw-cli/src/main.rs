//! CLI frontend for the Taleweaver story compiler.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tw",
    about = "Taleweaver: turn a story document into a playable branching novel",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a story document into a self-contained HTML player
    Build {
        /// Story document
        #[arg(short, long, default_value = "Story.txt")]
        input: PathBuf,

        /// Output HTML file
        #[arg(short, long, default_value = "Interactive_novel.html")]
        output: PathBuf,
    },

    /// Compile a story document and report diagnostics only
    Check {
        /// Story document
        #[arg(short, long, default_value = "Story.txt")]
        input: PathBuf,
    },

    /// List the scenes of a story
    Scenes {
        /// Story document or generated HTML player
        #[arg(short, long, default_value = "Story.txt")]
        input: PathBuf,
    },

    /// Print the story data as JSON
    Export {
        /// Story document
        #[arg(short, long, default_value = "Story.txt")]
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Play a story in the terminal
    Play {
        /// Story document or generated HTML player
        #[arg(short, long, default_value = "Story.txt")]
        input: PathBuf,

        /// File holding save slots between sessions
        #[arg(long, default_value = ".taleweaver-saves.json")]
        saves: PathBuf,
    },
}

fn main() {
    // Compiler warnings are already rendered as diagnostics.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,tw_dsl=error")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Build { input, output } => commands::build::run(&input, &output),
        Commands::Check { input } => commands::check::run(&input),
        Commands::Scenes { input } => commands::scenes::run(&input),
        Commands::Export { input, output } => commands::export::run(&input, output.as_deref()),
        Commands::Play { input, saves } => commands::play::run(&input, &saves),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
