//! Catalog module - static training reference data.
//!
//! The catalog defines what can be practiced and how it is judged: the
//! criteria vocabulary, drill type rubrics, phase mappings, skill
//! dimensions, and per-mode drill scripts with level tables. It is loaded
//! once at startup and injected as immutable configuration.

mod criterion;
mod drill;
mod phase;
mod registry;

pub use criterion::{
    CriterionKey, CriterionKind, CriterionSpec, CriterionValue, DimensionCriterion, DimensionKey,
    DimensionSpec, Polarity,
};
pub use drill::{DrillSpec, DrillType, InputKind, ModeKey, ModeSpec};
pub use phase::{DrillPhase, PhaseMapping};
pub use registry::{CatalogError, CriteriaRegistry};
