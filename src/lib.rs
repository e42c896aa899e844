//! justask: natural-language Q&A over a demand/capacity database.
//!
//! Each question is routed to one of two answer paths: text-to-SQL
//! (generate one statement against the relational schema, execute it,
//! explain the rows) or semantic retrieval (fan out a vector search
//! across the configured collections and synthesize the top hits into
//! an answer).

pub mod config;
pub mod embed;
pub mod error;
pub mod llm;
pub mod models;
pub mod prompt;
pub mod rag;
pub mod retrieve;
pub mod router;
pub mod schema;
pub mod sqlgen;
