//! `skill-http` is an async HTTP client for the IVK Skill rating API.
//!
//! The crate wraps the two skill operations with built-in retry and API key
//! authentication:
//! - [`SkillClient::submit_match_result`]
//! - [`SkillClient::compute_pre_match`]
//!
//! Each operation is offered in three call styles backed by a single retry
//! engine, so retry counts, backoff timing and surfaced errors are identical
//! across all of them:
//! - async methods that suspend on the caller's runtime,
//! - `*_blocking` methods that drive the call on the current thread,
//! - `*_task` methods that start the call on a background runtime and
//!   return a [`CallTask`] handle immediately.
//!
//! ```no_run
//! use skill_http::{MatchResultRequest, SkillClient, TeamResult};
//!
//! # async fn run() -> skill_http::Result<()> {
//! let client = SkillClient::builder()
//!     .api_key("your-api-key")
//!     .environment("staging")
//!     .build()?;
//!
//! let result = client
//!     .submit_match_result(
//!         "your-model-id",
//!         &MatchResultRequest {
//!             match_id: "match-42".to_owned(),
//!             player_sessions: Vec::new(),
//!             teams: vec![
//!                 TeamResult {
//!                     team_id: "blue".to_owned(),
//!                     rank: 1,
//!                     players: vec!["p1".to_owned()],
//!                 },
//!                 TeamResult {
//!                     team_id: "red".to_owned(),
//!                     rank: 2,
//!                     players: vec!["p2".to_owned()],
//!                 },
//!             ],
//!         },
//!     )
//!     .await?;
//!
//! println!("{} ratings updated", result.ratings.len());
//! client.shutdown();
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod models;
mod retry;
mod runtime;
mod task;

pub use client::{
    SkillClient, SkillClientBuilder, API_KEY_HEADER, DEFAULT_BASE_URL, DEFAULT_ENVIRONMENT,
};
pub use config::RetryConfig;
pub use error::SkillError;
pub use models::{
    MatchResultRequest, MatchResultResponse, PlayerRating, PlayerSession, PreMatchRequest,
    PreMatchResponse, TeamLineup, TeamPrediction, TeamResult,
};
pub use task::CallTask;

pub type Result<T> = std::result::Result<T, SkillError>;
