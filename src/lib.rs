//! # Course Ingest
//!
//! Turns uploaded documents (PDF, plain text, EPUB) into structured courses:
//! a title, a description, and an ordered list of chapters with summaries and
//! word counts.
//!
//! Chaptering asks a language model for a JSON chapter plan, validates and
//! repairs what comes back, and falls back to deterministic word-window
//! chunking when the model is disabled, fails, or answers with garbage. Title
//! and description generation fall back to the file name and a fixed string.
//! Only unreadable input or a storage failure can fail an ingest.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌────────────────┐   ┌──────────┐
//! │  Detect  │──▶│  Extract  │──▶│ Chapter (AI or │──▶│  Store   │
//! │ by name  │   │ PDF/TXT/  │   │ fallback) +    │   │ SQLite / │
//! └──────────┘   │   EPUB    │   │ title/descr.   │   │ memory   │
//!                └───────────┘   └────────────────┘   └────┬─────┘
//!                                                          │
//!                                   ┌──────────────────────┤
//!                                   ▼                      ▼
//!                              ┌──────────┐          ┌──────────┐
//!                              │   CLI    │          │   HTTP   │
//!                              └──────────┘          └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! course-ingest init
//! course-ingest ingest ./rust-book.epub --user alice
//! course-ingest courses --user alice
//! course-ingest serve
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`error`] | Ingestion and chaptering error taxonomy |
//! | [`detect`] | File type detection by extension |
//! | [`extract`] | Text extraction per file type (PDF, TXT, EPUB) |
//! | [`llm`] | Text generation providers |
//! | [`chapter`] | AI chaptering with validation and fallback |
//! | [`chunk`] | Deterministic fallback chunker |
//! | [`summarize`] | Course title and description |
//! | [`ingest`] | Pipeline orchestration |
//! | [`store`] | Course storage trait and in-memory store |
//! | [`sqlite_store`] | SQLite course store |
//! | [`get`] | CLI course retrieval |
//! | [`server`] | HTTP API |
//! | [`logging`] | Tracing subscriber setup |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod chapter;
pub mod chunk;
pub mod config;
pub mod db;
pub mod detect;
pub mod error;
pub mod extract;
pub mod get;
pub mod ingest;
pub mod llm;
pub mod logging;
pub mod migrate;
pub mod models;
pub mod server;
pub mod sqlite_store;
pub mod store;
pub mod summarize;
