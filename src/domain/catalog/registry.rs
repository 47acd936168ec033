//! The criteria registry: static configuration tying drills, criteria,
//! phases, and dimensions together.
//!
//! Loaded once at process start (from YAML or the built-in catalog) into an
//! immutable structure that is injected wherever lookups are needed, so
//! tests can swap the whole table set.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;

use super::{
    CriterionKey, CriterionSpec, DimensionKey, DimensionSpec, DrillPhase, DrillType, InputKind,
    ModeKey, ModeSpec, PhaseMapping,
};

/// Catalog embedded in the binary; used when no catalog file is configured.
static BUILTIN: Lazy<CriteriaRegistry> = Lazy::new(|| {
    CriteriaRegistry::from_yaml_str(include_str!("catalog.yaml"))
        .expect("Built-in catalog must be valid")
});

/// Errors raised while loading or validating a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid catalog: {0}")]
    Invalid(String),
}

/// Immutable mapping of drill types, phases, dimensions, and mode scripts.
///
/// All lookups treat unknown keys as absent rather than errors; the scoring
/// pipeline turns absent lookups into no-ops.
#[derive(Debug, Clone, Deserialize)]
pub struct CriteriaRegistry {
    /// Every criterion the oracle can be asked to judge.
    criteria: Vec<CriterionSpec>,

    /// Drill type → type-specific criterion keys (universal keys excluded).
    drill_types: HashMap<DrillType, Vec<CriterionKey>>,

    /// Drill phase → scoring mapping. Non-scorable phases map to a null
    /// drill type.
    phases: HashMap<DrillPhase, PhaseMapping>,

    /// Skill dimensions and their member criteria.
    dimensions: Vec<DimensionSpec>,

    /// Practice modes with their drill scripts and level tables.
    modes: HashMap<ModeKey, ModeSpec>,
}

impl CriteriaRegistry {
    /// Returns the catalog embedded in the binary.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Parses and validates a catalog from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let registry: CriteriaRegistry = serde_yaml::from_str(yaml)?;
        registry.validate()?;
        Ok(registry)
    }

    /// Loads and validates a catalog from a YAML file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&contents)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Criterion lookups
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the spec for a criterion key.
    pub fn criterion(&self, key: &CriterionKey) -> Option<&CriterionSpec> {
        self.criteria.iter().find(|c| &c.key == key)
    }

    /// Returns the criteria evaluated for every scored response.
    pub fn universal_criteria(&self) -> Vec<&CriterionSpec> {
        self.criteria.iter().filter(|c| c.universal).collect()
    }

    /// Returns the full criteria set for a drill type: the universal
    /// criteria unioned with the type-specific ones, universal first.
    ///
    /// Returns None for an unknown drill type; callers treat that as a
    /// scoring no-op.
    pub fn criteria_for_drill_type(&self, drill_type: &DrillType) -> Option<Vec<&CriterionSpec>> {
        let specific = self.drill_types.get(drill_type)?;

        let mut seen: HashSet<&CriterionKey> = HashSet::new();
        let mut result = Vec::new();
        for spec in self.universal_criteria() {
            if seen.insert(&spec.key) {
                result.push(spec);
            }
        }
        for key in specific {
            if let Some(spec) = self.criterion(key) {
                if seen.insert(&spec.key) {
                    result.push(spec);
                }
            }
        }
        Some(result)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Phase lookups
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the scoring mapping for a phase, or None for unmapped phases.
    pub fn mapping_for_phase(&self, phase: &DrillPhase) -> Option<&PhaseMapping> {
        self.phases.get(phase)
    }

    /// Resolves a phase to its scorable drill type and iteration flag.
    ///
    /// Returns None when the phase is unmapped or maps to a null drill
    /// type; in both cases no scoring job may be enqueued.
    pub fn scoring_target(&self, phase: &DrillPhase) -> Option<(&DrillType, bool)> {
        let mapping = self.phases.get(phase)?;
        mapping
            .drill_type
            .as_ref()
            .map(|drill_type| (drill_type, mapping.is_iteration))
    }

    /// Returns the retry phase for a drill type, when the catalog defines
    /// one. Retry prompt cards are tagged with this phase so the scores
    /// they produce carry the iteration flag.
    pub fn iteration_phase_for(&self, drill_type: &DrillType) -> Option<&DrillPhase> {
        self.phases
            .iter()
            .find(|(_, mapping)| {
                mapping.is_iteration && mapping.drill_type.as_ref() == Some(drill_type)
            })
            .map(|(phase, _)| phase)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Dimension lookups
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns all configured dimensions, active or not.
    pub fn dimensions(&self) -> &[DimensionSpec] {
        &self.dimensions
    }

    /// Returns the spec for a dimension key.
    pub fn dimension(&self, key: &DimensionKey) -> Option<&DimensionSpec> {
        self.dimensions.iter().find(|d| &d.key == key)
    }

    /// Returns the active dimensions whose member criteria intersect the
    /// given criterion set.
    pub fn dimensions_for_criteria(&self, keys: &[CriterionKey]) -> Vec<&DimensionSpec> {
        self.dimensions
            .iter()
            .filter(|d| d.active && d.touches_any(keys))
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mode lookups
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the spec for a practice mode.
    pub fn mode(&self, key: &ModeKey) -> Option<&ModeSpec> {
        self.modes.get(key)
    }

    /// Returns all configured mode keys.
    pub fn mode_keys(&self) -> Vec<&ModeKey> {
        self.modes.keys().collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Validation
    // ─────────────────────────────────────────────────────────────────────────

    /// Checks internal consistency of the catalog.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut keys: HashSet<&CriterionKey> = HashSet::new();
        for spec in &self.criteria {
            if !keys.insert(&spec.key) {
                return Err(CatalogError::Invalid(format!(
                    "duplicate criterion key '{}'",
                    spec.key
                )));
            }
        }

        if !self.criteria.iter().any(|c| c.universal) {
            return Err(CatalogError::Invalid(
                "catalog declares no universal criteria".to_string(),
            ));
        }

        for (drill_type, criteria) in &self.drill_types {
            for key in criteria {
                if self.criterion(key).is_none() {
                    return Err(CatalogError::Invalid(format!(
                        "drill type '{}' references unknown criterion '{}'",
                        drill_type, key
                    )));
                }
            }
        }

        for (phase, mapping) in &self.phases {
            if let Some(drill_type) = &mapping.drill_type {
                if !self.drill_types.contains_key(drill_type) {
                    return Err(CatalogError::Invalid(format!(
                        "phase '{}' maps to unknown drill type '{}'",
                        phase, drill_type
                    )));
                }
            }
        }

        let mut dimension_keys: HashSet<&DimensionKey> = HashSet::new();
        for dimension in &self.dimensions {
            if !dimension_keys.insert(&dimension.key) {
                return Err(CatalogError::Invalid(format!(
                    "duplicate dimension key '{}'",
                    dimension.key
                )));
            }
            if dimension.criteria.is_empty() {
                return Err(CatalogError::Invalid(format!(
                    "dimension '{}' has no member criteria",
                    dimension.key
                )));
            }
            for member in &dimension.criteria {
                if self.criterion(&member.key).is_none() {
                    return Err(CatalogError::Invalid(format!(
                        "dimension '{}' references unknown criterion '{}'",
                        dimension.key, member.key
                    )));
                }
            }
        }

        for (mode_key, mode) in &self.modes {
            if mode.level_thresholds.is_empty() {
                return Err(CatalogError::Invalid(format!(
                    "mode '{}' has an empty level threshold table",
                    mode_key
                )));
            }
            if mode.max_level == 0 {
                return Err(CatalogError::Invalid(format!(
                    "mode '{}' must allow at least level 1",
                    mode_key
                )));
            }
            for (index, drill) in mode.drills.iter().enumerate() {
                if drill.position as usize != index {
                    return Err(CatalogError::Invalid(format!(
                        "mode '{}' drill '{}' is at position {} but listed at index {}",
                        mode_key, drill.key, drill.position, index
                    )));
                }
                if !self.drill_types.contains_key(&drill.drill_type) {
                    return Err(CatalogError::Invalid(format!(
                        "drill '{}' uses unknown drill type '{}'",
                        drill.key, drill.drill_type
                    )));
                }
                match self.phases.get(&drill.phase) {
                    None => {
                        return Err(CatalogError::Invalid(format!(
                            "drill '{}' uses unmapped phase '{}'",
                            drill.key, drill.phase
                        )));
                    }
                    Some(mapping) if mapping.drill_type.as_ref() != Some(&drill.drill_type) => {
                        return Err(CatalogError::Invalid(format!(
                            "drill '{}' phase '{}' maps to a different drill type",
                            drill.key, drill.phase
                        )));
                    }
                    Some(_) => {}
                }
                if drill.input == InputKind::MultipleChoice && drill.choices.len() < 2 {
                    return Err(CatalogError::Invalid(format!(
                        "multiple choice drill '{}' needs at least two choices",
                        drill.key
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Default for CriteriaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_catalog_is_valid() {
        let registry = CriteriaRegistry::builtin();
        assert!(registry.validate().is_ok());
    }

    #[test]
    fn builtin_catalog_has_universal_criteria() {
        let registry = CriteriaRegistry::builtin();
        let universal: Vec<&str> = registry
            .universal_criteria()
            .iter()
            .map(|c| c.key.as_str())
            .collect();

        for expected in [
            "hedging",
            "filler_phrases",
            "word_limit_exceeded",
            "apology",
            "overlong",
            "too_short",
        ] {
            assert!(universal.contains(&expected), "missing {}", expected);
        }
    }

    #[test]
    fn criteria_for_drill_type_includes_universal_set() {
        let registry = CriteriaRegistry::builtin();
        let criteria = registry
            .criteria_for_drill_type(&DrillType::from("direct_ask"))
            .unwrap();
        let keys: Vec<&str> = criteria.iter().map(|c| c.key.as_str()).collect();

        assert!(keys.contains(&"hedging"));
        assert!(keys.contains(&"direct_request"));
        assert!(!criteria.is_empty());
    }

    #[test]
    fn every_builtin_drill_type_has_nonempty_criteria() {
        let registry = CriteriaRegistry::builtin();
        for drill_type in registry.drill_types.keys() {
            let criteria = registry.criteria_for_drill_type(drill_type).unwrap();
            assert!(!criteria.is_empty(), "drill type {} is empty", drill_type);
        }
    }

    #[test]
    fn unknown_drill_type_returns_none() {
        let registry = CriteriaRegistry::builtin();
        assert!(registry
            .criteria_for_drill_type(&DrillType::from("no_such_type"))
            .is_none());
    }

    #[test]
    fn every_builtin_phase_resolves() {
        let registry = CriteriaRegistry::builtin();
        for (phase, mapping) in &registry.phases {
            match registry.scoring_target(phase) {
                Some((drill_type, _)) => {
                    assert_eq!(mapping.drill_type.as_ref(), Some(drill_type));
                }
                None => assert!(mapping.drill_type.is_none(), "phase {} lost mapping", phase),
            }
        }
    }

    #[test]
    fn non_scorable_phases_map_to_null_drill_type() {
        let registry = CriteriaRegistry::builtin();
        for phase in ["Reflection", "Session Complete"] {
            let mapping = registry
                .mapping_for_phase(&DrillPhase::from(phase))
                .unwrap_or_else(|| panic!("phase {} unmapped", phase));
            assert!(mapping.drill_type.is_none());
            assert!(registry.scoring_target(&DrillPhase::from(phase)).is_none());
        }
    }

    #[test]
    fn retry_phases_carry_iteration_flag() {
        let registry = CriteriaRegistry::builtin();
        let (_, is_iteration) = registry
            .scoring_target(&DrillPhase::from("Opening Ask (Retry)"))
            .unwrap();
        assert!(is_iteration);

        let (_, is_iteration) = registry
            .scoring_target(&DrillPhase::from("Opening Ask"))
            .unwrap();
        assert!(!is_iteration);
    }

    #[test]
    fn unmapped_phase_is_not_scorable() {
        let registry = CriteriaRegistry::builtin();
        assert!(registry
            .scoring_target(&DrillPhase::from("Improvised Phase"))
            .is_none());
    }

    #[test]
    fn iteration_phase_resolves_per_drill_type() {
        let registry = CriteriaRegistry::builtin();
        let phase = registry
            .iteration_phase_for(&DrillType::from("direct_ask"))
            .unwrap();
        assert_eq!(phase.as_str(), "Opening Ask (Retry)");

        assert!(registry
            .iteration_phase_for(&DrillType::from("no_such_type"))
            .is_none());
    }

    #[test]
    fn dimensions_for_criteria_finds_intersecting_dimensions() {
        let registry = CriteriaRegistry::builtin();
        let dims = registry.dimensions_for_criteria(&[CriterionKey::from("hedging")]);
        assert!(dims.iter().any(|d| d.key.as_str() == "authority"));
    }

    #[test]
    fn dimensions_for_criteria_empty_input_matches_nothing() {
        let registry = CriteriaRegistry::builtin();
        assert!(registry.dimensions_for_criteria(&[]).is_empty());
    }

    #[test]
    fn mode_lookup_and_drill_order() {
        let registry = CriteriaRegistry::builtin();
        let mode = registry.mode(&ModeKey::from("assertiveness")).unwrap();

        assert!(mode.drill_count() >= 2);
        for (index, drill) in mode.drills.iter().enumerate() {
            assert_eq!(drill.position as usize, index);
        }
    }

    #[test]
    fn unknown_mode_returns_none() {
        let registry = CriteriaRegistry::builtin();
        assert!(registry.mode(&ModeKey::from("interpretive_dance")).is_none());
    }

    #[test]
    fn load_from_path_round_trips() {
        let yaml = include_str!("catalog.yaml");
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let registry = CriteriaRegistry::load_from_path(file.path()).unwrap();
        assert!(!registry.dimensions().is_empty());
    }

    #[test]
    fn load_from_missing_path_is_io_error() {
        let result = CriteriaRegistry::load_from_path("/no/such/catalog.yaml");
        assert!(matches!(result, Err(CatalogError::Io { .. })));
    }

    #[test]
    fn catalog_with_unknown_criterion_reference_fails_validation() {
        let yaml = concat!(
            "criteria:\n",
            "  - key: hedging\n",
            "    label: Hedging\n",
            "    kind: boolean\n",
            "    universal: true\n",
            "drill_types:\n",
            "  direct_ask: [nonexistent]\n",
            "phases: {}\n",
            "dimensions: []\n",
            "modes: {}\n",
        );
        let result = CriteriaRegistry::from_yaml_str(yaml);
        assert!(matches!(result, Err(CatalogError::Invalid(_))));
    }

    #[test]
    fn catalog_without_universal_criteria_fails_validation() {
        let yaml = concat!(
            "criteria:\n",
            "  - key: direct_request\n",
            "    label: Direct request\n",
            "    kind: boolean\n",
            "drill_types: {}\n",
            "phases: {}\n",
            "dimensions: []\n",
            "modes: {}\n",
        );
        let result = CriteriaRegistry::from_yaml_str(yaml);
        assert!(matches!(result, Err(CatalogError::Invalid(_))));
    }
}
