//! Sparsepool - HTM Spatial Pooler
//!
//! Sparsepool turns the sparse bit patterns produced by sensor encoders into
//! **normalized sparse distributed representations** (SDRs) over a fixed pool
//! of columns. Similar inputs map to overlapping outputs, dissimilar inputs
//! to nearly disjoint ones, and every output has close to the same sparsity.
//!
//! # Key Characteristics
//!
//! - Competitive inhibition (global or local) with a fixed winner budget
//! - Hebbian permanence learning on the winning columns
//! - Duty-cycle homeostasis through per-column boost factors
//! - Reproducible results from a seeded RNG
//!
//! # Architecture
//!
//! - **BitField**: dense bit storage used for input masks and connections
//! - **Sdr / EncoderOutput**: the input and output value types
//! - **ColumnPool**: columns with sampled receptive fields
//! - **OverlapScorer / Inhibition / LearningUpdater**: the three stages of a cycle
//! - **SpatialPoolingEngine**: owns a pool and runs the cycle, thread-safe
//! - **EngineRegistry**: independent engines keyed by instance ID
//!
//! # Examples
//!
//! ## Pooling an encoder output
//!
//! ```
//! use sparsepool::{EncoderOutput, SpatialPoolerConfig, SpatialPoolingEngine};
//!
//! let engine = SpatialPoolingEngine::new(SpatialPoolerConfig::default()).unwrap();
//!
//! let input = EncoderOutput::new(1024, (0..=200).step_by(10).collect());
//! let result = engine.process(&input).unwrap();
//!
//! assert!(result.sparsity_level <= 0.0201);
//! assert_eq!(engine.get_metrics().total_processed, 1);
//! ```
//!
//! ## Comparing SDRs
//!
//! ```
//! use sparsepool::Sdr;
//!
//! let a = Sdr::new(100, vec![1, 5, 9, 20]).unwrap();
//! let b = Sdr::new(100, vec![5, 9, 30, 40]).unwrap();
//!
//! assert_eq!(a.overlap(&b), 2);
//! assert_eq!(a.similarity(&b), 0.5);
//! ```
//!
//! # Logging
//!
//! Construction, configuration changes and rejected input are logged through
//! `tracing` under the `sparsepool` target; per-cycle detail is at `trace`
//! level. The crate never installs a subscriber.

// Module declarations
pub mod bitfield;
pub mod error;
pub mod utils;

// Value types and configuration
pub mod config;
pub mod sdr;
pub mod topology;

// Column state
pub mod column;
pub mod column_pool;

// Pooling stages
pub mod inhibition;
pub mod learning;
pub mod overlap;

// Engine
pub mod engine;
pub mod metrics;
pub mod registry;

// Re-exports for convenient access
pub use bitfield::{BitField, Word, BITS_PER_WORD};
pub use error::{ErrorKind, PoolerError, Result};

pub use config::{ConfigUpdate, PoolerMode, SpatialPoolerConfig};
pub use sdr::{EncoderOutput, Sdr};
pub use topology::{Span, Topology, WrapMode};

pub use column::{Column, ColumnStats, PERM_MAX, PERM_MIN};
pub use column_pool::ColumnPool;

pub use inhibition::{Inhibition, TieBreak};
pub use learning::{LearningOutcome, LearningUpdater};
pub use overlap::{OverlapScorer, OverlapScores};

pub use engine::{EngineState, ProcessingResult, SpatialPoolingEngine};
pub use metrics::{BoostFactorStats, HealthReport, HealthStatus, PoolerMetrics};
pub use registry::EngineRegistry;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = "Sparsepool";

/// Get version string
pub fn version() -> String {
    format!("{} v{}", NAME, VERSION)
}
