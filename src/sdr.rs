//! Sdr - immutable sparse distributed representation.
//!
//! An `Sdr` is a fixed-width bit vector stored as its sorted list of active
//! bit positions. It is built either by an upstream encoder (delivered as an
//! [`EncoderOutput`]) or by the engine when it normalizes the winning column
//! set into an output representation.
//!
//! # Invariants
//!
//! - `active_bits` is strictly increasing
//! - every active bit is `< width`
//!
//! Both are enforced at construction and never change afterwards: there are
//! no mutating methods.
//!
//! # Examples
//!
//! ```
//! use sparsepool::Sdr;
//!
//! let a = Sdr::new(100, vec![30, 10, 20, 10]).unwrap();
//! assert_eq!(a.active_bits(), &[10, 20, 30]);
//! assert!((a.sparsity() - 0.03).abs() < 1e-12);
//!
//! let b = Sdr::new(100, vec![20, 30, 40, 50]).unwrap();
//! assert_eq!(a.overlap(&b), 2);
//! assert!((a.similarity(&b) - 2.0 / 3.0).abs() < 1e-12);
//! ```

use crate::{BitField, PoolerError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Immutable sparse bit vector.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sdr {
    width: u32,
    active_bits: Vec<u32>,
}

impl Sdr {
    /// Build an SDR from an arbitrary list of active bits.
    ///
    /// The list is sorted and de-duplicated. Any index `>= width` is rejected
    /// with [`PoolerError::BitOutOfRange`].
    pub fn new(width: u32, mut bits: Vec<u32>) -> Result<Self> {
        if let Some(&index) = bits.iter().find(|&&b| b >= width) {
            return Err(PoolerError::BitOutOfRange { index, width });
        }
        bits.sort_unstable();
        bits.dedup();
        Ok(Self {
            width,
            active_bits: bits,
        })
    }

    /// An SDR of the given width with no active bits.
    pub fn empty(width: u32) -> Self {
        Self {
            width,
            active_bits: Vec::new(),
        }
    }

    /// Build from bits already known to be strictly increasing and in range.
    pub(crate) fn from_sorted_unchecked(width: u32, active_bits: Vec<u32>) -> Self {
        debug_assert!(active_bits.windows(2).all(|w| w[0] < w[1]));
        debug_assert!(active_bits.last().map_or(true, |&b| b < width));
        Self { width, active_bits }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Active bit positions in ascending order.
    #[inline]
    pub fn active_bits(&self) -> &[u32] {
        &self.active_bits
    }

    /// Number of active bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.active_bits.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.active_bits.is_empty()
    }

    /// Fraction of bits that are active (0.0 for a zero-width SDR).
    pub fn sparsity(&self) -> f64 {
        if self.width == 0 {
            0.0
        } else {
            self.active_bits.len() as f64 / self.width as f64
        }
    }

    /// Whether `bit` is active. O(log n).
    pub fn is_active(&self, bit: u32) -> bool {
        self.active_bits.binary_search(&bit).is_ok()
    }

    /// Number of active bits shared with `other`. O(n + m) sorted merge.
    pub fn overlap(&self, other: &Sdr) -> usize {
        let (a, b) = (&self.active_bits, &other.active_bits);
        let (mut i, mut j, mut count) = (0, 0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    count += 1;
                    i += 1;
                    j += 1;
                }
            }
        }
        count
    }

    /// Overlap normalized by the smaller of the two active counts.
    ///
    /// Returns 0.0 when either SDR is empty.
    pub fn similarity(&self, other: &Sdr) -> f64 {
        let denom = self.len().min(other.len());
        if denom == 0 {
            return 0.0;
        }
        self.overlap(other) as f64 / denom as f64
    }

    /// Expand into a dense [`BitField`] of `width` bits.
    pub fn to_bitfield(&self) -> BitField {
        BitField::from_acts(self.width as usize, &self.active_bits)
    }
}

impl fmt::Display for Sdr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sdr(width={}, active={:?})", self.width, self.active_bits)
    }
}

/// Raw output of an upstream sensor encoder.
///
/// `sparsity` is carried for compatibility with encoders that report it, but
/// it is never trusted: the engine recomputes it from `active_bits`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EncoderOutput {
    pub width: u32,
    pub active_bits: Vec<u32>,
    #[serde(default)]
    pub sparsity: f64,
}

impl EncoderOutput {
    /// Build an encoder output, filling in `sparsity` from the bits.
    pub fn new(width: u32, active_bits: Vec<u32>) -> Self {
        let sparsity = if width == 0 {
            0.0
        } else {
            active_bits.len() as f64 / width as f64
        };
        Self {
            width,
            active_bits,
            sparsity,
        }
    }

    /// Validate and normalize into an [`Sdr`].
    ///
    /// Rejects an empty bit list and any out-of-range index. Duplicate and
    /// unsorted bits are accepted and normalized away.
    pub fn to_sdr(&self) -> Result<Sdr> {
        if self.active_bits.is_empty() {
            return Err(PoolerError::EmptyInput);
        }
        Sdr::new(self.width, self.active_bits.clone())
    }
}

impl From<&Sdr> for EncoderOutput {
    fn from(sdr: &Sdr) -> Self {
        Self {
            width: sdr.width(),
            active_bits: sdr.active_bits().to_vec(),
            sparsity: sdr.sparsity(),
        }
    }
}
