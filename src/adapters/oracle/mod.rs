//! Scoring oracle adapters.
//!
//! `HttpScoringOracle` talks to the real oracle service; the mock runs
//! tests and local development without one.

pub mod http_oracle;
pub mod mock_oracle;

pub use http_oracle::{HttpScoringOracle, OracleConfig};
pub use mock_oracle::MockScoringOracle;
