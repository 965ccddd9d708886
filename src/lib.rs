//! # GossipAI
//!
//! Client for the GossipAI conversation analysis service: submit a chat as
//! text, screenshots or a recording and get back emotions, an AI-judge score
//! and subtle cues, optionally tuned by a preset.
//!
//! ## Modules
//!
//! - [`client`]: REST client, base URL handling, demo-mode outcomes
//! - [`models`]: request and response types
//! - [`session`]: persisted token and preferences
//! - [`upload`]: files and ordered screenshot batches
//! - [`history`]: local search, score bands and sorting
//! - [`progress`]: milestone-driven analysis progress
//! - [`report`]: plain-text report rendering
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gossipai::{ApiClient, ClientConfig, FileStore, Session, TextAnalysisRequest};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(FileStore::open("session.json"));
//!     let session = Arc::new(Session::restore(store)?);
//!     let client = ApiClient::new(ClientConfig::default(), session)?;
//!
//!     client.login("ana@example.com", "secret").await?;
//!
//!     let outcome = client
//!         .analyze_text(TextAnalysisRequest::new("A: hi!\nB: hey, long time"))
//!         .await?;
//!     println!("{}", gossipai::report::render(outcome.get()));
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod demo;
pub mod history;
pub mod models;
pub mod progress;
pub mod report;
pub mod session;
pub mod upload;

// Re-export top-level types for convenience
pub use client::{
    AnalysisOptions, ApiClient, ApiError, ApiResult, BaseUrl, ClientConfig, Outcome, Submission,
    TextAnalysisRequest, UnauthorizedHandler, DEFAULT_API_URL,
};

pub use config::{ApiConfig, Config, ConfigError, LoggingConfig, SessionConfig};

pub use history::{HistoryFilter, HistorySort, ScoreBand};

pub use models::{AnalysisCard, AnalysisResult, HistoryDetail, HistoryItem, Preset, User};

pub use progress::{AnalysisProgress, Milestone, ProgressTracker, Stage};

pub use session::{
    FileStore, KeyValueStore, MemoryStore, Preferences, PreferencesError, Session, StoreError,
};

pub use upload::{FileKind, UploadBatch, UploadError, UploadFile, MAX_BATCH_FILES};
