use anyhow::{Context, Result};
use colored::*;
use std::io::{BufRead, Write};
use std::path::Path;

use crate::corpus::Corpus;
use crate::engine::ChatEngine;
use crate::transaction::{self, format_amount, Ledger};

#[cfg(feature = "neural")]
use crate::model::OnnxEmbeddingModel;
#[cfg(not(feature = "neural"))]
use crate::model::LexicalEmbeddingModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
  User,
  Assistant,
}

/// One visible turn of the conversation. Session-owned, append-only,
/// discarded when the process exits.
#[derive(Debug, Clone)]
pub struct ChatMessage {
  pub role: Role,
  pub content: String,
}

fn load_ledger(data: Option<&Path>) -> Result<Ledger> {
  let path = transaction::data_file_path(data)?;
  let ledger = Ledger::load(&path).with_context(|| "failed to load the transaction ledger")?;
  Ok(ledger)
}

#[cfg(feature = "neural")]
fn build_engine(data: Option<&Path>) -> Result<ChatEngine<OnnxEmbeddingModel>> {
  ChatEngine::new(load_ledger(data)?, OnnxEmbeddingModel::new()?)
}

#[cfg(not(feature = "neural"))]
fn build_engine(data: Option<&Path>) -> Result<ChatEngine<LexicalEmbeddingModel>> {
  ChatEngine::new(load_ledger(data)?, LexicalEmbeddingModel::new())
}

/// One-shot question: print the engine's answer and exit.
pub fn ask(data: Option<&Path>, question: &[String]) -> Result<()> {
  let mut engine = build_engine(data)?;
  let query = question.join(" ");

  println!("{}", engine.respond(&query)?);
  Ok(())
}

/// Interactive chat session over stdin. `/history` replays the questions
/// asked so far, `/quit` (or end of input) leaves.
pub fn chat(data: Option<&Path>) -> Result<()> {
  let mut engine = build_engine(data)?;
  let mut log: Vec<ChatMessage> = Vec::new();

  println!("{}", "🤖 khata - ask about purchases, spending, or products".bold());
  println!("{}", "type /history to review questions, /quit to leave".dimmed());

  let stdin = std::io::stdin();
  let mut reader = stdin.lock();

  loop {
    print!("{} ", "you>".green().bold());
    std::io::stdout().flush()?;

    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
      break;
    }

    let query = line.trim();
    if query.is_empty() {
      continue;
    }

    match query {
      "/quit" | "/exit" => break,
      "/history" => {
        for message in log.iter().filter(|m| m.role == Role::User) {
          println!("- {}", message.content.dimmed());
        }
        continue;
      }
      _ => {}
    }

    log.push(ChatMessage { role: Role::User, content: query.to_string() });
    let answer = engine.respond(query)?;

    println!("{} {}", "khata>".cyan().bold(), answer);
    log.push(ChatMessage { role: Role::Assistant, content: answer });
  }

  Ok(())
}

/// Print the loaded transactions as rows.
pub fn show_data(data: Option<&Path>) -> Result<()> {
  let ledger = load_ledger(data)?;

  if ledger.is_empty() {
    println!("No transactions loaded");
    return Ok(());
  }

  for t in ledger.transactions() {
    println!(
      "{}  {}  {}  ₹{}",
      t.date.to_string().dimmed(),
      t.customer.cyan(),
      t.product.yellow(),
      format_amount(t.amount)
    );
  }

  Ok(())
}

/// Monthly spend totals, sorted by month.
pub fn analytics(data: Option<&Path>) -> Result<()> {
  let ledger = load_ledger(data)?;

  if ledger.is_empty() {
    println!("No transactions loaded");
    return Ok(());
  }

  println!("{}", "📊 Monthly spend".bold());
  for (month, total) in ledger.monthly_totals() {
    println!("{}  ₹{}", month.cyan(), format_amount(total));
  }

  Ok(())
}

/// Print the synthesized retrieval sentences, one per line. Sentence
/// synthesis needs no encoder, so this stays cheap.
pub fn show_corpus(data: Option<&Path>) -> Result<()> {
  let ledger = load_ledger(data)?;

  for sentence in Corpus::synthesize(&ledger) {
    println!("{sentence}");
  }

  Ok(())
}
