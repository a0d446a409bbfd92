//! Observational counters and health reporting for a spatial pooling engine.
//!
//! Metrics never feed back into pooling. They are updated after each
//! `process()` call (successful or not) and read through snapshots.

use crate::engine::EngineState;
use crate::error::ErrorKind;
use serde::Serialize;
use std::time::Duration;

/// Running counters for one engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PoolerMetrics {
    /// Successful `process()` calls
    pub total_processed: u64,
    /// Calls that applied the learning rule
    pub learning_iterations: u64,
    /// Sum over learning cycles of columns left with a boost above 1.0
    pub boosting_events: u64,
    /// Mean output sparsity over successful calls
    pub average_sparsity: f64,
    /// Successful calls whose sparsity fell outside the tolerance band
    pub sparsity_out_of_tolerance: u64,
    /// Rejected configuration updates
    pub config_errors: u64,
    /// Rejected inputs
    pub invalid_inputs: u64,
    /// Internal invariant violations
    pub processing_errors: u64,
    /// Wall time of the most recent successful call
    pub last_processing_time: Duration,
    /// Wall time summed over successful calls
    pub total_processing_time: Duration,
}

impl PoolerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed pooling cycle.
    pub fn record_success(
        &mut self,
        sparsity: f64,
        within_tolerance: bool,
        learning: Option<usize>,
        elapsed: Duration,
    ) {
        self.total_processed += 1;
        self.average_sparsity += (sparsity - self.average_sparsity) / self.total_processed as f64;
        if !within_tolerance {
            self.sparsity_out_of_tolerance += 1;
        }
        if let Some(boosted_columns) = learning {
            self.learning_iterations += 1;
            self.boosting_events += boosted_columns as u64;
        }
        self.last_processing_time = elapsed;
        self.total_processing_time += elapsed;
    }

    /// Record a failed call.
    pub fn record_error(&mut self, kind: ErrorKind) {
        match kind {
            ErrorKind::Config | ErrorKind::Serialization => self.config_errors += 1,
            ErrorKind::InvalidInput => self.invalid_inputs += 1,
            ErrorKind::Processing => self.processing_errors += 1,
        }
    }

    /// Failures recorded for `kind`.
    pub fn error_count(&self, kind: ErrorKind) -> u64 {
        match kind {
            ErrorKind::Config | ErrorKind::Serialization => self.config_errors,
            ErrorKind::InvalidInput => self.invalid_inputs,
            ErrorKind::Processing => self.processing_errors,
        }
    }

    pub fn average_processing_time(&self) -> Duration {
        if self.total_processed == 0 {
            return Duration::ZERO;
        }
        self.total_processing_time / self.total_processed.min(u32::MAX as u64) as u32
    }
}

/// Min / max / mean of a set of boost factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoostFactorStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl BoostFactorStats {
    /// Summarize `factors`; an empty slice reports the neutral boost.
    pub fn from_factors(factors: &[f64]) -> Self {
        if factors.is_empty() {
            return Self {
                min: 1.0,
                max: 1.0,
                mean: 1.0,
            };
        }
        let min = factors.iter().copied().fold(f64::INFINITY, f64::min);
        let max = factors.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = factors.iter().sum::<f64>() / factors.len() as f64;
        Self { min, max, mean }
    }
}

/// Overall verdict of a health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    /// Usable, but something needs attention
    Degraded,
    /// The engine cannot produce valid output
    Unhealthy,
}

/// Structural self-check of one engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub state: EngineState,
    /// Pool exists and is sized to the active configuration
    pub pool_allocated: bool,
    pub config_valid: bool,
    /// Every boost factor lies within `[1, max_boost]`
    pub boost_factors_in_range: bool,
    pub column_count: usize,
    pub input_width: usize,
    pub memory_usage: usize,
    pub issues: Vec<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}
