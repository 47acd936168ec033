//! Scoring domain module.
//!
//! Turns a judged response into persisted records: one immutable
//! `ScoreRecord` per scored answer, plus one `DimensionScore` per skill
//! dimension the answer's criteria touch. The judging itself is delegated
//! to the external scoring oracle behind a port.
//!
//! # Events
//!
//! - `DrillScored` - Published after scores are persisted

mod dimension_score;
mod errors;
mod events;
mod grader;
mod score_record;

pub use dimension_score::{DimensionScore, ScoreValue};
pub use errors::ScoringError;
pub use events::DrillScored;
pub use grader::Grader;
pub use score_record::{CriterionOutcomes, ScoreRecord};
