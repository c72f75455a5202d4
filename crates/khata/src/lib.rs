//! Khata - Transaction Chat Assistant
//!
//! Answers natural-language questions about a fixed purchase ledger using
//! keyword-rule intent routing, with an embedding-similarity retrieval
//! fallback for everything the rules do not cover.

pub mod commands;
pub mod corpus;
pub mod engine;
pub mod intent;
pub mod model;
pub mod retriever;
pub mod router;
pub mod similarity;
pub mod transaction;
