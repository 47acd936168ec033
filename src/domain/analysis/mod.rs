//! Analysis module. Statistical read side over scored responses.
//!
//! Everything here is pure: classifiers and calculators take committed
//! dimension scores plus an explicit evaluation instant and return
//! derived views. Stores and clocks live behind ports, not here.
//!
//! # Components
//!
//! - `PatternClassifier` - blind spot / slipping / improving / stable calls
//! - `TrendCalculator` - fixed-length weekly failure-rate trend
//! - `AccessGate` - data-sufficiency and tier gating
//! - `InsightsReport` - the assembled read model, shaped by the gate

mod classifier;
mod errors;
mod gate;
mod report;
mod thresholds;
mod trend;

pub use classifier::{DimensionPattern, PatternClassifier, PatternKind};
pub use errors::AnalysisError;
pub use gate::{AccessGate, GateDecision};
pub use report::{InsightsReport, TeaserSummary};
pub use thresholds::AnalysisThresholds;
pub use trend::{TrendBucket, TrendCalculator};
