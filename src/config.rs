//! Spatial pooler configuration.
//!
//! `SpatialPoolerConfig` is a plain serde value. The engine validates it at
//! construction and on every update; a rejected update leaves the active
//! configuration untouched.
//!
//! # Example
//!
//! ```rust
//! use sparsepool::{PoolerMode, SpatialPoolerConfig};
//!
//! let config = SpatialPoolerConfig {
//!     input_width: 1024,
//!     column_count: 2048,
//!     sparsity_ratio: 0.02,
//!     learning_enabled: false,
//!     mode: PoolerMode::Deterministic,
//!     ..Default::default()
//! };
//! config.validate().unwrap();
//! assert_eq!(config.target_winners(), 41);
//!
//! let json = config.to_json().unwrap();
//! let restored = SpatialPoolerConfig::from_json(&json).unwrap();
//! assert_eq!(config, restored);
//! ```

use crate::topology::WrapMode;
use crate::{PoolerError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Lowest `sparsity_ratio` accepted by validation.
pub const SPARSITY_RATIO_MIN: f64 = 0.02;

/// Highest `sparsity_ratio` accepted by validation.
pub const SPARSITY_RATIO_MAX: f64 = 0.05;

/// Lower edge of the biologically plausible sparsity band.
pub const BIOLOGICAL_SPARSITY_MIN: f64 = 0.015;

/// Relative tolerance around the target sparsity before a result is flagged.
pub const SPARSITY_TOLERANCE: f64 = 0.1;

/// Seed used in deterministic mode when none is configured.
pub const DEFAULT_SEED: u64 = 42;

/// How the engine is allowed to use randomness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolerMode {
    /// Fixed seed for receptive fields, lowest-index tie-breaking.
    #[default]
    Deterministic,
    /// Seeded (or entropy-seeded) receptive fields and random tie-breaking.
    Randomized,
}

/// Parameters of one spatial pooler instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialPoolerConfig {
    /// Width of the input SDR
    pub input_width: u32,
    /// Number of columns in the pool
    pub column_count: u32,
    /// Receptive field radius in input bits
    pub potential_radius: u32,
    /// Fraction of the receptive field sampled as potential synapses
    pub potential_pct: f64,
    /// Permanence at or above which a synapse is connected
    pub connected_permanence: f64,
    /// Permanence increment for synapses on active input bits
    pub permanence_increment: f64,
    /// Permanence decrement for synapses on inactive input bits
    pub permanence_decrement: f64,
    /// Minimum raw overlap for a column to compete
    pub min_overlap_threshold: u32,
    /// Target fraction of winning columns
    pub sparsity_ratio: f64,
    /// Minimum raw overlap for a column to be considered stimulated
    pub stimulus_threshold: u32,
    /// Compete across the whole pool instead of within neighborhoods
    pub global_inhibition: bool,
    /// Neighborhood radius (in columns) for local inhibition and boosting
    pub inhibition_radius: u32,
    /// Target winner density inside each local neighborhood
    pub local_area_density: f64,
    /// Window of the duty cycle moving averages
    pub duty_cycle_period: u32,
    /// Steepness of the boost curve (0 disables boosting)
    pub boost_strength: f64,
    /// Upper bound on boost factors
    pub max_boost: f64,
    /// Apply Hebbian learning and homeostasis after each cycle
    pub learning_enabled: bool,
    pub mode: PoolerMode,
    /// Treat input and column spaces as rings
    pub wrap_around: bool,
    /// RNG seed; deterministic mode falls back to [`DEFAULT_SEED`]
    pub seed: Option<u64>,
    /// Fraction of potential synapses that start connected
    pub init_connected_pct: f64,
}

impl Default for SpatialPoolerConfig {
    fn default() -> Self {
        Self {
            input_width: 1024,
            column_count: 2048,
            potential_radius: 256,
            potential_pct: 0.5,
            connected_permanence: 0.2,
            permanence_increment: 0.05,
            permanence_decrement: 0.008,
            min_overlap_threshold: 1,
            sparsity_ratio: 0.02,
            stimulus_threshold: 1,
            global_inhibition: true,
            inhibition_radius: 64,
            local_area_density: 0.02,
            duty_cycle_period: 1000,
            boost_strength: 2.0,
            max_boost: 10.0,
            learning_enabled: true,
            mode: PoolerMode::Deterministic,
            wrap_around: true,
            seed: None,
            init_connected_pct: 0.5,
        }
    }
}

/// Outcome of an `update_configuration` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigUpdate {
    /// Whether the new configuration was committed
    pub applied: bool,
    /// Whether the column pool has to be (or was) rebuilt
    pub requires_reinitialization: bool,
    /// Names of the fields that differ from the active configuration
    pub changed_fields: Vec<&'static str>,
}

/// Fields whose change invalidates the allocated receptive fields.
const STRUCTURAL_FIELDS: &[&str] = &[
    "input_width",
    "column_count",
    "potential_radius",
    "potential_pct",
    "connected_permanence",
    "init_connected_pct",
    "wrap_around",
    "mode",
    "seed",
];

fn check_finite(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PoolerError::config(field, format!("must be finite, got {}", value)))
    }
}

fn check_closed(field: &'static str, value: f64, lo: f64, hi: f64) -> Result<()> {
    check_finite(field, value)?;
    if value < lo || value > hi {
        return Err(PoolerError::config(
            field,
            format!("must be within [{}, {}], got {}", lo, hi, value),
        ));
    }
    Ok(())
}

fn check_left_open(field: &'static str, value: f64, lo: f64, hi: f64) -> Result<()> {
    check_finite(field, value)?;
    if value <= lo || value > hi {
        return Err(PoolerError::config(
            field,
            format!("must be within ({}, {}], got {}", lo, hi, value),
        ));
    }
    Ok(())
}

fn check_positive(field: &'static str, value: u32) -> Result<()> {
    if value == 0 {
        return Err(PoolerError::config(field, "must be > 0"));
    }
    Ok(())
}

impl SpatialPoolerConfig {
    /// Check every field, returning the first violation.
    pub fn validate(&self) -> Result<()> {
        check_positive("input_width", self.input_width)?;
        check_positive("column_count", self.column_count)?;
        check_positive("potential_radius", self.potential_radius)?;
        check_left_open("potential_pct", self.potential_pct, 0.0, 1.0)?;
        check_closed("connected_permanence", self.connected_permanence, 0.0, 1.0)?;
        check_left_open("permanence_increment", self.permanence_increment, 0.0, 1.0)?;
        check_left_open("permanence_decrement", self.permanence_decrement, 0.0, 1.0)?;
        check_closed(
            "sparsity_ratio",
            self.sparsity_ratio,
            SPARSITY_RATIO_MIN,
            SPARSITY_RATIO_MAX,
        )?;
        check_closed(
            "local_area_density",
            self.local_area_density,
            SPARSITY_RATIO_MIN,
            SPARSITY_RATIO_MAX,
        )?;
        if !self.global_inhibition {
            check_positive("inhibition_radius", self.inhibition_radius)?;
        }
        check_positive("duty_cycle_period", self.duty_cycle_period)?;
        check_finite("boost_strength", self.boost_strength)?;
        if self.boost_strength < 0.0 {
            return Err(PoolerError::config(
                "boost_strength",
                format!("must be >= 0, got {}", self.boost_strength),
            ));
        }
        check_finite("max_boost", self.max_boost)?;
        if self.max_boost < 1.0 {
            return Err(PoolerError::config(
                "max_boost",
                format!("must be >= 1, got {}", self.max_boost),
            ));
        }
        check_closed("init_connected_pct", self.init_connected_pct, 0.0, 1.0)?;
        if self.target_winners() == 0 {
            return Err(PoolerError::config(
                "column_count",
                format!(
                    "{} columns at sparsity {} selects no winners",
                    self.column_count, self.sparsity_ratio
                ),
            ));
        }
        Ok(())
    }

    /// Number of winners under global inhibition.
    pub fn target_winners(&self) -> usize {
        (self.column_count as f64 * self.sparsity_ratio).round() as usize
    }

    /// Whether `sparsity` lies within [`SPARSITY_TOLERANCE`] of `sparsity_ratio`.
    ///
    /// Both inhibition modes are held to the same pool-wide target.
    pub fn within_tolerance(&self, sparsity: f64) -> bool {
        (sparsity - self.sparsity_ratio).abs() <= self.sparsity_ratio * SPARSITY_TOLERANCE
    }

    /// Raw overlap a column needs before it may compete.
    ///
    /// Never below 1: boosting cannot promote a column without stimulus.
    pub fn stimulus_floor(&self) -> u32 {
        self.min_overlap_threshold.max(self.stimulus_threshold).max(1)
    }

    #[inline]
    pub fn wrap_mode(&self) -> WrapMode {
        WrapMode::from(self.wrap_around)
    }

    /// Names of the fields that differ between `self` and `other`.
    pub fn changed_fields(&self, other: &Self) -> Vec<&'static str> {
        let (current, next) = (self, other);
        let mut changed = Vec::new();
        macro_rules! diff {
            ($($field:ident),* $(,)?) => {
                $(
                    if current.$field != next.$field {
                        changed.push(stringify!($field));
                    }
                )*
            };
        }
        diff!(
            input_width,
            column_count,
            potential_radius,
            potential_pct,
            connected_permanence,
            permanence_increment,
            permanence_decrement,
            min_overlap_threshold,
            sparsity_ratio,
            stimulus_threshold,
            global_inhibition,
            inhibition_radius,
            local_area_density,
            duty_cycle_period,
            boost_strength,
            max_boost,
            learning_enabled,
            mode,
            wrap_around,
            seed,
            init_connected_pct,
        );
        changed
    }

    /// Whether moving from `self` to `other` requires rebuilding the pool.
    pub fn requires_reinitialization(&self, other: &Self) -> bool {
        self.changed_fields(other)
            .iter()
            .any(|field| STRUCTURAL_FIELDS.contains(field))
    }

    /// Serialize to a pretty JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON. Missing fields take their defaults.
    ///
    /// The result is not validated; the engine validates on use.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the configuration as JSON to `path`.
    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read a JSON configuration from `path`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        SpatialPoolerConfig::default().validate().unwrap();
    }

    #[test]
    fn test_sparsity_bounds() {
        let mut config = SpatialPoolerConfig::default();
        config.sparsity_ratio = 0.15;
        assert_eq!(config.validate().unwrap_err().field(), Some("sparsity_ratio"));

        config.sparsity_ratio = 0.019;
        assert_eq!(config.validate().unwrap_err().field(), Some("sparsity_ratio"));

        config.sparsity_ratio = 0.05;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_permanence_bounds() {
        let config = SpatialPoolerConfig {
            connected_permanence: 1.5,
            ..Default::default()
        };
        assert_eq!(
            config.validate().unwrap_err().field(),
            Some("connected_permanence")
        );

        let config = SpatialPoolerConfig {
            permanence_increment: 0.0,
            ..Default::default()
        };
        assert_eq!(
            config.validate().unwrap_err().field(),
            Some("permanence_increment")
        );

        let config = SpatialPoolerConfig {
            permanence_decrement: f64::NAN,
            ..Default::default()
        };
        assert_eq!(
            config.validate().unwrap_err().field(),
            Some("permanence_decrement")
        );
    }

    #[test]
    fn test_zero_sizes_rejected() {
        let config = SpatialPoolerConfig {
            input_width: 0,
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().field(), Some("input_width"));

        let config = SpatialPoolerConfig {
            column_count: 0,
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().field(), Some("column_count"));
    }

    #[test]
    fn test_too_few_columns_for_any_winner() {
        let config = SpatialPoolerConfig {
            column_count: 10,
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().field(), Some("column_count"));
    }

    #[test]
    fn test_local_inhibition_needs_radius() {
        let config = SpatialPoolerConfig {
            global_inhibition: false,
            inhibition_radius: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate().unwrap_err().field(),
            Some("inhibition_radius")
        );
    }

    #[test]
    fn test_local_density_bounds() {
        for density in [0.01, 0.1, 0.5] {
            let config = SpatialPoolerConfig {
                global_inhibition: false,
                local_area_density: density,
                ..Default::default()
            };
            assert_eq!(
                config.validate().unwrap_err().field(),
                Some("local_area_density")
            );
        }

        let config = SpatialPoolerConfig {
            global_inhibition: false,
            local_area_density: 0.05,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tolerance_ignores_local_density() {
        let config = SpatialPoolerConfig {
            global_inhibition: false,
            local_area_density: 0.05,
            ..Default::default()
        };
        assert!(config.within_tolerance(0.02));
        assert!(config.within_tolerance(0.0215));
        assert!(!config.within_tolerance(0.0229));
        assert!(!config.within_tolerance(0.05));
    }

    #[test]
    fn test_boost_bounds() {
        let config = SpatialPoolerConfig {
            max_boost: 0.5,
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().field(), Some("max_boost"));

        let config = SpatialPoolerConfig {
            boost_strength: -1.0,
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err().field(), Some("boost_strength"));
    }

    #[test]
    fn test_target_winners() {
        let config = SpatialPoolerConfig {
            column_count: 2048,
            sparsity_ratio: 0.02,
            ..Default::default()
        };
        assert_eq!(config.target_winners(), 41);
    }

    #[test]
    fn test_stimulus_floor() {
        let mut config = SpatialPoolerConfig {
            min_overlap_threshold: 0,
            stimulus_threshold: 0,
            ..Default::default()
        };
        assert_eq!(config.stimulus_floor(), 1);

        config.stimulus_threshold = 3;
        config.min_overlap_threshold = 2;
        assert_eq!(config.stimulus_floor(), 3);
    }

    #[test]
    fn test_changed_fields_and_reinit() {
        let base = SpatialPoolerConfig::default();

        let tuned = SpatialPoolerConfig {
            boost_strength: 5.0,
            learning_enabled: false,
            ..base.clone()
        };
        assert_eq!(
            base.changed_fields(&tuned),
            vec!["boost_strength", "learning_enabled"]
        );
        assert!(!base.requires_reinitialization(&tuned));

        let resized = SpatialPoolerConfig {
            column_count: 4096,
            ..base.clone()
        };
        assert_eq!(base.changed_fields(&resized), vec!["column_count"]);
        assert!(base.requires_reinitialization(&resized));
    }

    #[test]
    fn test_json_missing_fields_default() {
        let config = SpatialPoolerConfig::from_json(r#"{"column_count": 4096, "mode": "randomized"}"#)
            .unwrap();
        assert_eq!(config.column_count, 4096);
        assert_eq!(config.mode, PoolerMode::Randomized);
        assert_eq!(config.input_width, 1024);
    }

    #[test]
    fn test_json_garbage() {
        let err = SpatialPoolerConfig::from_json("{not json").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Serialization);
    }
}
