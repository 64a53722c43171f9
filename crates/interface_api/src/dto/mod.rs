//! Request and response bodies

pub mod scoring;

pub use scoring::{BatchScoreRequest, BatchScoreResponse, ScoreClaimRequest, MAX_BATCH_SIZE};
