//! Analysis API client
//!
//! Typed access to the GossipAI backend: authentication, conversation
//! analysis, history, presets and the chat assistant. Calls that can fall
//! back to demo data return an [`Outcome`] so callers always know which
//! they got.

mod api;
mod base_url;
mod error;
mod outcome;

pub use api::{
    AnalysisOptions, ApiClient, ClientConfig, Submission, TextAnalysisRequest,
    UnauthorizedHandler,
};
pub use base_url::{BaseUrl, DEFAULT_API_URL};
pub use error::{ApiError, ApiResult};
pub use outcome::Outcome;
