//! Scoring pipeline handlers.

mod score_response;

pub use score_response::ScoreResponseHandler;
