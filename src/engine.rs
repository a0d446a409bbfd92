//! SpatialPoolingEngine - the pooling cycle and its shared state.
//!
//! One engine owns one [`ColumnPool`] and runs the full cycle for each
//! input:
//!
//! ```text
//! EncoderOutput -> validate -> overlap -> inhibition -> (learning) -> ProcessingResult
//! ```
//!
//! # Concurrency
//!
//! The pool and its RNG sit behind a single `parking_lot::Mutex`, held for
//! the whole cycle, so concurrent `process()` calls are serialized and each
//! one sees the effects of the previous. The configuration is an
//! `Arc<SpatialPoolerConfig>` behind an `RwLock` and is always swapped as a
//! whole; metrics sit behind their own `RwLock`. Whenever both are needed,
//! the pool lock is taken first.
//!
//! # Example
//!
//! ```rust
//! use sparsepool::{EncoderOutput, SpatialPoolerConfig, SpatialPoolingEngine};
//!
//! let config = SpatialPoolerConfig {
//!     learning_enabled: false,
//!     ..Default::default()
//! };
//! let engine = SpatialPoolingEngine::new(config).unwrap();
//!
//! let input = EncoderOutput::new(1024, (0..=200).step_by(10).collect());
//! let result = engine.process(&input).unwrap();
//!
//! assert!(result.active_columns.len() <= 41);
//! assert_eq!(result.normalized_sdr.width(), 2048);
//! assert!(!result.learning_occurred);
//! ```

use crate::column::ColumnStats;
use crate::config::{ConfigUpdate, PoolerMode, DEFAULT_SEED};
use crate::inhibition::{Inhibition, TieBreak};
use crate::learning::LearningUpdater;
use crate::metrics::{BoostFactorStats, HealthReport, HealthStatus, PoolerMetrics};
use crate::overlap::OverlapScorer;
use crate::sdr::{EncoderOutput, Sdr};
use crate::{ColumnPool, PoolerError, Result, SpatialPoolerConfig};
use parking_lot::{Mutex, RwLock};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace, warn};

/// Lifecycle state of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum EngineState {
    /// Column pool not (yet) allocated
    Uninitialized = 0,
    /// Idle and accepting input
    Ready = 1,
    /// A pooling cycle is running
    Processing = 2,
}

impl EngineState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => EngineState::Ready,
            2 => EngineState::Processing,
            _ => EngineState::Uninitialized,
        }
    }
}

/// Output of one pooling cycle. Owned by the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingResult {
    /// Winners as an SDR over the column space
    pub normalized_sdr: Sdr,
    /// Winning column indices, ascending
    pub active_columns: Vec<u32>,
    /// Boosted overlap of every column
    pub overlap_scores: Vec<f64>,
    /// Raw (unboosted) overlap of every column
    pub raw_overlaps: Vec<u32>,
    /// Boost factors used to score this input
    pub boost_factors_snapshot: Vec<f64>,
    /// Fraction of columns that won
    pub sparsity_level: f64,
    /// Whether `sparsity_level` is within tolerance of the target density
    pub sparsity_within_tolerance: bool,
    pub learning_occurred: bool,
    pub processing_time: Duration,
}

/// Everything the pooling cycle mutates.
struct PoolState {
    pool: ColumnPool,
    rng: StdRng,
}

impl PoolState {
    fn allocate(config: &SpatialPoolerConfig) -> Self {
        let mut rng = seed_rng(config);
        let pool = ColumnPool::new(config, &mut rng);
        Self { pool, rng }
    }
}

/// RNG for a freshly allocated pool.
fn seed_rng(config: &SpatialPoolerConfig) -> StdRng {
    match (config.mode, config.seed) {
        (PoolerMode::Deterministic, seed) => StdRng::seed_from_u64(seed.unwrap_or(DEFAULT_SEED)),
        (PoolerMode::Randomized, Some(seed)) => StdRng::seed_from_u64(seed),
        (PoolerMode::Randomized, None) => StdRng::from_entropy(),
    }
}

fn check_width(config: &SpatialPoolerConfig, actual: u32) -> Result<()> {
    if actual != config.input_width {
        return Err(PoolerError::InputWidthMismatch {
            expected: config.input_width,
            actual,
        });
    }
    Ok(())
}

/// A spatial pooler instance.
pub struct SpatialPoolingEngine {
    state: AtomicU8,
    pool: Mutex<PoolState>,
    config: RwLock<Arc<SpatialPoolerConfig>>,
    metrics: RwLock<PoolerMetrics>,
}

impl SpatialPoolingEngine {
    /// Validate `config` and allocate the column pool.
    pub fn new(config: SpatialPoolerConfig) -> Result<Self> {
        if let Err(err) = config.validate() {
            warn!(target: "sparsepool", error = %err, "Rejected spatial pooler configuration");
            return Err(err);
        }

        let state = PoolState::allocate(&config);
        info!(
            target: "sparsepool",
            input_width = config.input_width,
            column_count = config.column_count,
            mode = ?config.mode,
            global_inhibition = config.global_inhibition,
            "Spatial pooler initialized"
        );

        Ok(Self {
            state: AtomicU8::new(EngineState::Ready as u8),
            pool: Mutex::new(state),
            config: RwLock::new(Arc::new(config)),
            metrics: RwLock::new(PoolerMetrics::new()),
        })
    }

    #[inline]
    pub fn state(&self) -> EngineState {
        EngineState::from_u8(self.state.load(Ordering::Acquire))
    }

    #[inline]
    fn set_state(&self, state: EngineState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Pool one encoder output.
    ///
    /// Malformed input is rejected before any column state is touched.
    pub fn process(&self, input: &EncoderOutput) -> Result<ProcessingResult> {
        self.process_with(|config| {
            check_width(config, input.width)?;
            input.to_sdr()
        })
    }

    /// Pool an already normalized SDR.
    pub fn process_sdr(&self, input: &Sdr) -> Result<ProcessingResult> {
        self.process_with(|config| {
            check_width(config, input.width())?;
            if input.is_empty() {
                return Err(PoolerError::EmptyInput);
            }
            Ok(input.clone())
        })
    }

    fn process_with<F>(&self, normalize: F) -> Result<ProcessingResult>
    where
        F: FnOnce(&SpatialPoolerConfig) -> Result<Sdr>,
    {
        let start = Instant::now();
        let mut guard = self.pool.lock();
        let config = self.config.read().clone();

        self.set_state(EngineState::Processing);
        let outcome = normalize(&config).and_then(|sdr| run_cycle(&mut guard, &config, &sdr));
        self.set_state(EngineState::Ready);
        drop(guard);

        let elapsed = start.elapsed();
        let mut metrics = self.metrics.write();
        match outcome {
            Ok((mut result, boosted_columns)) => {
                result.processing_time = elapsed;
                metrics.record_success(
                    result.sparsity_level,
                    result.sparsity_within_tolerance,
                    boosted_columns,
                    elapsed,
                );
                if !result.sparsity_within_tolerance {
                    debug!(
                        target: "sparsepool",
                        sparsity = result.sparsity_level,
                        sparsity_ratio = config.sparsity_ratio,
                        "Output sparsity outside tolerance"
                    );
                }
                Ok(result)
            }
            Err(err) => {
                metrics.record_error(err.kind());
                match &err {
                    PoolerError::Processing(_) => {
                        error!(target: "sparsepool", error = %err, "Pooling cycle failed")
                    }
                    _ => warn!(target: "sparsepool", error = %err, "Rejected input"),
                }
                Err(err)
            }
        }
    }

    /// Snapshot of the active configuration.
    pub fn get_configuration(&self) -> SpatialPoolerConfig {
        self.config.read().as_ref().clone()
    }

    /// Validate and (unless `validate_only`) commit a new configuration.
    ///
    /// An invalid configuration is rejected as a whole and the active one is
    /// left untouched. A committed change to a structural field rebuilds the
    /// column pool, discarding learned state.
    pub fn update_configuration(
        &self,
        new_config: SpatialPoolerConfig,
        validate_only: bool,
    ) -> Result<ConfigUpdate> {
        if let Err(err) = new_config.validate() {
            self.metrics.write().record_error(err.kind());
            warn!(target: "sparsepool", error = %err, "Rejected configuration update");
            return Err(err);
        }

        let mut guard = self.pool.lock();
        let current = self.config.read().clone();
        let changed_fields = current.changed_fields(&new_config);
        let requires_reinitialization = current.requires_reinitialization(&new_config);

        if validate_only {
            debug!(
                target: "sparsepool",
                changed = ?changed_fields,
                requires_reinitialization,
                "Validated configuration update"
            );
            return Ok(ConfigUpdate {
                applied: false,
                requires_reinitialization,
                changed_fields,
            });
        }

        if requires_reinitialization {
            self.set_state(EngineState::Uninitialized);
            *guard = PoolState::allocate(&new_config);
            self.set_state(EngineState::Ready);
        } else {
            clamp_boost_factors(&mut guard.pool, &new_config);
        }
        *self.config.write() = Arc::new(new_config);
        drop(guard);

        info!(
            target: "sparsepool",
            changed = ?changed_fields,
            reinitialized = requires_reinitialization,
            "Configuration updated"
        );
        Ok(ConfigUpdate {
            applied: true,
            requires_reinitialization,
            changed_fields,
        })
    }

    pub fn get_metrics(&self) -> PoolerMetrics {
        self.metrics.read().clone()
    }

    pub fn reset_metrics(&self) {
        *self.metrics.write() = PoolerMetrics::new();
        debug!(target: "sparsepool", "Metrics reset");
    }

    /// Structural self-check.
    pub fn health_check(&self) -> HealthReport {
        let guard = self.pool.lock();
        let config = self.config.read().clone();
        let pool = &guard.pool;

        let mut issues = Vec::new();

        let pool_allocated = !pool.is_empty()
            && pool.len() == config.column_count as usize
            && pool.input_width() == config.input_width as usize;
        if !pool_allocated {
            issues.push(format!(
                "column pool is {}x{}, configuration expects {}x{}",
                pool.len(),
                pool.input_width(),
                config.column_count,
                config.input_width
            ));
        }

        let config_valid = match config.validate() {
            Ok(()) => true,
            Err(err) => {
                issues.push(err.to_string());
                false
            }
        };

        let max_boost = config.max_boost;
        let boost_factors_in_range = pool
            .columns()
            .iter()
            .all(|c| c.boost_factor().is_finite() && (1.0..=max_boost).contains(&c.boost_factor()));
        if !boost_factors_in_range {
            issues.push(format!("boost factors outside [1, {}]", max_boost));
        }

        let processing_errors = self.metrics.read().processing_errors;
        if processing_errors > 0 {
            issues.push(format!("{} pooling cycles failed", processing_errors));
        }

        let status = if !pool_allocated || !config_valid {
            HealthStatus::Unhealthy
        } else if !boost_factors_in_range || processing_errors > 0 {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        HealthReport {
            status,
            state: self.state(),
            pool_allocated,
            config_valid,
            boost_factors_in_range,
            column_count: pool.len(),
            input_width: pool.input_width(),
            memory_usage: pool.memory_usage(),
            issues,
        }
    }

    /// Min / max / mean of the current boost factors.
    pub fn boost_factor_stats(&self) -> BoostFactorStats {
        BoostFactorStats::from_factors(&self.pool.lock().pool.boost_factors())
    }

    /// Current boost factor of every column.
    pub fn boost_factors(&self) -> Vec<f64> {
        self.pool.lock().pool.boost_factors()
    }

    /// Summary of one column, or `None` when out of range.
    pub fn column_stats(&self, index: usize) -> Option<ColumnStats> {
        let guard = self.pool.lock();
        guard
            .pool
            .column(index)
            .map(|column| ColumnStats::from_column(index, column))
    }

    /// Number of columns in the allocated pool.
    pub fn column_count(&self) -> usize {
        self.pool.lock().pool.len()
    }
}

impl std::fmt::Debug for SpatialPoolingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialPoolingEngine")
            .field("state", &self.state())
            .field("config", &self.config.read())
            .finish_non_exhaustive()
    }
}

/// Keep boosts inside the bounds of a config committed without a rebuild.
fn clamp_boost_factors(pool: &mut ColumnPool, config: &SpatialPoolerConfig) {
    for column in pool.columns_mut() {
        column.boost_factor = if config.boost_strength <= 0.0 {
            1.0
        } else {
            column.boost_factor.clamp(1.0, config.max_boost)
        };
    }
}

/// One full pooling cycle over a validated input.
///
/// Returns the result (with `processing_time` unset) and, when learning ran,
/// the number of boosted columns.
fn run_cycle(
    state: &mut PoolState,
    config: &SpatialPoolerConfig,
    sdr: &Sdr,
) -> Result<(ProcessingResult, Option<usize>)> {
    let input = sdr.to_bitfield();
    let boost_factors_snapshot = state.pool.boost_factors();

    let scores = OverlapScorer::from_config(config).score(&state.pool, &input);
    let inhibition = Inhibition::from_config(config);
    let tie_break = match config.mode {
        PoolerMode::Deterministic => TieBreak::LowestIndex,
        PoolerMode::Randomized => TieBreak::random(scores.len(), &mut state.rng),
    };

    let winners = inhibition.select(&scores, &tie_break);
    let eligible = scores.eligible_count();
    if winners.is_empty() && eligible > 0 {
        return Err(PoolerError::Processing(format!(
            "inhibition selected no winners among {} eligible columns",
            eligible
        )));
    }

    let learning = if config.learning_enabled {
        let outcome =
            LearningUpdater::from_config(config).apply(&mut state.pool, &input, &scores, &winners, &inhibition);
        Some(outcome.boosted_columns)
    } else {
        None
    };

    let column_count = state.pool.len() as u32;
    let sparsity_level = winners.len() as f64 / column_count.max(1) as f64;
    let sparsity_within_tolerance = config.within_tolerance(sparsity_level);

    trace!(
        target: "sparsepool",
        input_bits = sdr.len(),
        eligible,
        winners = winners.len(),
        sparsity = sparsity_level,
        learning = learning.is_some(),
        "Pooling cycle complete"
    );

    let raw_overlaps = scores.raw().to_vec();
    let result = ProcessingResult {
        normalized_sdr: Sdr::from_sorted_unchecked(column_count, winners.clone()),
        active_columns: winners,
        overlap_scores: scores.into_boosted(),
        raw_overlaps,
        boost_factors_snapshot,
        sparsity_level,
        sparsity_within_tolerance,
        learning_occurred: learning.is_some(),
        processing_time: Duration::ZERO,
    };
    Ok((result, learning))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SpatialPoolerConfig {
        SpatialPoolerConfig {
            input_width: 128,
            column_count: 200,
            potential_radius: 16,
            sparsity_ratio: 0.05,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_is_ready() {
        let engine = SpatialPoolingEngine::new(small_config()).unwrap();
        assert_eq!(engine.state(), EngineState::Ready);
        assert_eq!(engine.column_count(), 200);
    }

    #[test]
    fn test_new_rejects_invalid() {
        let config = SpatialPoolerConfig {
            sparsity_ratio: 0.5,
            ..small_config()
        };
        let err = SpatialPoolingEngine::new(config).unwrap_err();
        assert_eq!(err.field(), Some("sparsity_ratio"));
    }

    #[test]
    fn test_width_mismatch() {
        let engine = SpatialPoolingEngine::new(small_config()).unwrap();
        let err = engine.process(&EncoderOutput::new(64, vec![1, 2])).unwrap_err();
        assert_eq!(
            err,
            PoolerError::InputWidthMismatch {
                expected: 128,
                actual: 64
            }
        );
        assert_eq!(engine.get_metrics().invalid_inputs, 1);
        assert_eq!(engine.state(), EngineState::Ready);
    }

    #[test]
    fn test_process_sdr_matches_process() {
        let config = SpatialPoolerConfig {
            learning_enabled: false,
            ..small_config()
        };
        let engine = SpatialPoolingEngine::new(config).unwrap();
        let bits: Vec<u32> = (0..128).step_by(4).collect();

        let a = engine.process(&EncoderOutput::new(128, bits.clone())).unwrap();
        let b = engine.process_sdr(&Sdr::new(128, bits).unwrap()).unwrap();
        assert_eq!(a.active_columns, b.active_columns);
        assert_eq!(a.overlap_scores, b.overlap_scores);
    }

    #[test]
    fn test_process_sdr_empty() {
        let engine = SpatialPoolingEngine::new(small_config()).unwrap();
        let err = engine.process_sdr(&Sdr::empty(128)).unwrap_err();
        assert_eq!(err, PoolerError::EmptyInput);
    }

    #[test]
    fn test_result_shapes() {
        let engine = SpatialPoolingEngine::new(small_config()).unwrap();
        let result = engine
            .process(&EncoderOutput::new(128, (0..64).collect()))
            .unwrap();

        assert_eq!(result.overlap_scores.len(), 200);
        assert_eq!(result.raw_overlaps.len(), 200);
        assert_eq!(result.boost_factors_snapshot.len(), 200);
        assert_eq!(result.normalized_sdr.active_bits(), &result.active_columns[..]);
        assert!(result.learning_occurred);
        assert_eq!(engine.get_metrics().learning_iterations, 1);
    }

    #[test]
    fn test_seed_rng_modes() {
        use rand::Rng;

        let det = SpatialPoolerConfig::default();
        let a: u64 = seed_rng(&det).gen();
        let b: u64 = StdRng::seed_from_u64(DEFAULT_SEED).gen();
        assert_eq!(a, b);

        let seeded = SpatialPoolerConfig {
            mode: PoolerMode::Randomized,
            seed: Some(7),
            ..Default::default()
        };
        let a: u64 = seed_rng(&seeded).gen();
        let b: u64 = seed_rng(&seeded).gen();
        assert_eq!(a, b);
    }

    #[test]
    fn test_lowering_max_boost_clamps() {
        let engine = SpatialPoolingEngine::new(small_config()).unwrap();
        engine.pool.lock().pool.columns_mut()[3].boost_factor = 8.0;

        let config = SpatialPoolerConfig {
            max_boost: 2.0,
            ..engine.get_configuration()
        };
        let update = engine.update_configuration(config, false).unwrap();
        assert!(update.applied);
        assert!(!update.requires_reinitialization);
        assert_eq!(engine.column_stats(3).unwrap().boost_factor, 2.0);
    }
}
