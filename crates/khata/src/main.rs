use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use khata::commands;

#[derive(Parser)]
#[command(name = "khata")]
#[command(
  about = "Khata - Transaction Chat Assistant\nKeyword-routed answers with a semantic retrieval fallback over a purchase ledger"
)]
#[command(version)]
struct Cli {
  /// Path to the transactions JSON file (overrides KHATA_DATA_FILE and the
  /// ~/.khata/transactions.json default)
  #[arg(long, global = true)]
  data: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Start an interactive chat session
  Chat,
  /// Ask a single question and print the answer
  Ask {
    /// The question (words are joined with spaces)
    #[arg(required = true)]
    question: Vec<String>,
  },
  /// Print the loaded transactions
  Data,
  /// Show monthly spend totals
  Analytics,
  /// Print the synthesized retrieval corpus sentences
  Corpus,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let data = cli.data.as_deref();

  match cli.command {
    Commands::Chat => commands::chat(data)?,
    Commands::Ask { question } => commands::ask(data, &question)?,
    Commands::Data => commands::show_data(data)?,
    Commands::Analytics => commands::analytics(data)?,
    Commands::Corpus => commands::show_corpus(data)?,
  }

  Ok(())
}
