//! Evaluation criteria and skill dimension reference types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Key identifying an evaluation criterion (e.g., "hedging", "filler_phrases").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CriterionKey(String);

impl CriterionKey {
    /// Creates a criterion key from a string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CriterionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CriterionKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Key identifying a skill dimension (e.g., "authority", "brevity").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DimensionKey(String);

impl DimensionKey {
    /// Creates a dimension key from a string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DimensionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DimensionKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// What kind of outcome a criterion produces when evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionKind {
    /// The criterion either triggered or it did not.
    Boolean,
    /// The criterion counts occurrences (e.g., filler phrases).
    Count,
}

/// Evaluated outcome for a single criterion.
///
/// Closed variant set so exhaustiveness is compiler-checked; the oracle
/// must produce one of these shapes per criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CriterionValue {
    /// Outcome of a boolean criterion.
    Flag(bool),
    /// Outcome of a count criterion.
    Count(u32),
}

impl CriterionValue {
    /// Returns true if the behavior was observed at all.
    ///
    /// A boolean criterion occurred when flagged; a count criterion
    /// occurred when the count is non-zero.
    pub fn occurred(&self) -> bool {
        match self {
            CriterionValue::Flag(flagged) => *flagged,
            CriterionValue::Count(n) => *n > 0,
        }
    }

    /// Returns true if this outcome counts as a violation under the given
    /// polarity.
    ///
    /// A negative criterion violates by occurring; a positive criterion
    /// violates by not occurring.
    pub fn violates(&self, polarity: Polarity) -> bool {
        match polarity {
            Polarity::Negative => self.occurred(),
            Polarity::Positive => !self.occurred(),
        }
    }

    /// Returns true if the value shape matches the declared kind.
    pub fn matches_kind(&self, kind: CriterionKind) -> bool {
        matches!(
            (self, kind),
            (CriterionValue::Flag(_), CriterionKind::Boolean)
                | (CriterionValue::Count(_), CriterionKind::Count)
        )
    }
}

/// Whether a criterion argues for or against a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// The behavior should be present; its absence is the violation.
    Positive,
    /// The behavior should be absent; its presence is the violation.
    Negative,
}

/// Static definition of one evaluation criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionSpec {
    /// Stable key referenced by drill types and dimensions.
    pub key: CriterionKey,

    /// Human-readable label.
    pub label: String,

    /// Outcome shape the oracle must produce.
    pub kind: CriterionKind,

    /// Universal criteria are evaluated for every scored response.
    #[serde(default)]
    pub universal: bool,
}

/// Membership of a criterion in a dimension, with its polarity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionCriterion {
    pub key: CriterionKey,
    pub polarity: Polarity,
}

/// Static definition of one skill dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionSpec {
    /// Stable key used in score records and analysis output.
    pub key: DimensionKey,

    /// Human-readable label.
    pub label: String,

    /// Grouping category (e.g., "presence", "delivery").
    pub category: String,

    /// What this dimension measures.
    pub description: String,

    /// Member criteria and their polarity for this dimension.
    pub criteria: Vec<DimensionCriterion>,

    /// Inactive dimensions are kept for history but never classified.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl DimensionSpec {
    /// Returns the polarity of a member criterion, if the criterion belongs
    /// to this dimension.
    pub fn polarity_of(&self, key: &CriterionKey) -> Option<Polarity> {
        self.criteria
            .iter()
            .find(|c| &c.key == key)
            .map(|c| c.polarity)
    }

    /// Returns true if any member criterion appears in the given set.
    pub fn touches_any(&self, keys: &[CriterionKey]) -> bool {
        self.criteria.iter().any(|c| keys.contains(&c.key))
    }
}
