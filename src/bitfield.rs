//! BitField - dense bit storage for input masks and column connections.
//!
//! The spatial pooler keeps two kinds of dense masks over the input space:
//!
//! - the current input, expanded once per `process()` call from its sparse
//!   active-bit list
//! - one "connected" mask per column, marking the input bits reached by a
//!   synapse whose permanence is at or above the connected threshold
//!
//! Overlap between a column and the input is then a word-level AND followed
//! by a popcount, which is what keeps a 2048-column cycle well under a
//! millisecond for 1024-bit inputs.
//!
//! # Design
//!
//! - Uses `BitVec<u32, Lsb0>` for storage (32-bit words, LSB-first ordering)
//! - Bits past `num_bits` in the last word are always zero, so word-level
//!   popcounts never over-count
//!
//! # Examples
//!
//! ```
//! use sparsepool::BitField;
//!
//! let mut input = BitField::new(1024);
//! input.set_acts(&[5, 10, 700]);
//!
//! let mut conns = BitField::new(1024);
//! conns.set_acts(&[10, 700, 900]);
//!
//! assert_eq!(input.num_similar(&conns), 2);
//! assert_eq!(input.get_acts(), vec![5, 10, 700]);
//! ```

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

/// Word type for bit storage (32-bit unsigned integer)
pub type Word = u32;

/// Number of bits per word
pub const BITS_PER_WORD: usize = 32;

/// Fixed-width dense bit array with word-level popcount operations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BitField {
    bv: BitVec<Word, Lsb0>,
}

impl BitField {
    /// Create a new BitField with `n` bits, all cleared.
    #[inline]
    pub fn new(n: usize) -> Self {
        Self {
            bv: BitVec::repeat(false, n),
        }
    }

    /// Create a BitField of `n` bits with the given positions set.
    ///
    /// Positions at or beyond `n` are ignored.
    pub fn from_acts(n: usize, acts: &[u32]) -> Self {
        let mut bf = Self::new(n);
        bf.set_acts(acts);
        bf
    }

    /// Total number of bits.
    #[inline(always)]
    pub fn num_bits(&self) -> usize {
        self.bv.len()
    }

    /// Number of backing words.
    #[inline(always)]
    pub fn num_words(&self) -> usize {
        self.bv.as_raw_slice().len()
    }

    /// Set bit `b` to 1.
    ///
    /// # Panics
    ///
    /// Panics in debug mode if `b >= num_bits`.
    #[inline]
    pub fn set_bit(&mut self, b: usize) {
        debug_assert!(b < self.bv.len(), "bit index {} out of bounds (length: {})", b, self.bv.len());
        self.bv.set(b, true);
    }

    /// Clear bit `b`.
    ///
    /// # Panics
    ///
    /// Panics in debug mode if `b >= num_bits`.
    #[inline]
    pub fn clear_bit(&mut self, b: usize) {
        debug_assert!(b < self.bv.len(), "bit index {} out of bounds (length: {})", b, self.bv.len());
        self.bv.set(b, false);
    }

    /// Read bit `b`. Out-of-range positions read as cleared.
    #[inline]
    pub fn get_bit(&self, b: usize) -> bool {
        self.bv.get(b).map(|bit| *bit).unwrap_or(false)
    }

    /// Set or clear bit `b`.
    #[inline]
    pub fn assign_bit(&mut self, b: usize, val: bool) {
        if val {
            self.set_bit(b);
        } else {
            self.clear_bit(b);
        }
    }

    /// Clear every bit.
    pub fn clear_all(&mut self) {
        self.bv.fill(false);
    }

    /// Replace the contents with exactly the given active positions.
    ///
    /// Positions at or beyond `num_bits` are ignored.
    pub fn set_acts(&mut self, idxs: &[u32]) {
        self.clear_all();
        let len = self.bv.len();
        for &idx in idxs {
            let idx = idx as usize;
            if idx < len {
                self.bv.set(idx, true);
            }
        }
    }

    /// Active positions in ascending order.
    pub fn get_acts(&self) -> Vec<u32> {
        let mut acts = Vec::with_capacity(self.num_set());
        for (word_idx, &word) in self.bv.as_raw_slice().iter().enumerate() {
            let mut w = word;
            while w != 0 {
                let bit = w.trailing_zeros() as usize;
                acts.push((word_idx * BITS_PER_WORD + bit) as u32);
                w &= w - 1;
            }
        }
        acts
    }

    /// Number of set bits.
    #[inline]
    pub fn num_set(&self) -> usize {
        self.bv.count_ones()
    }

    /// Number of bits set in both `self` and `other` (AND + popcount).
    ///
    /// # Panics
    ///
    /// Panics if the two fields have different word counts.
    #[inline]
    pub fn num_similar(&self, other: &BitField) -> usize {
        assert_eq!(
            self.num_words(),
            other.num_words(),
            "BitFields must have same word count"
        );

        self.bv
            .as_raw_slice()
            .iter()
            .zip(other.bv.as_raw_slice())
            .map(|(a, b)| (a & b).count_ones() as usize)
            .sum()
    }

    /// Approximate heap + inline size in bytes.
    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>() + self.num_words() * std::mem::size_of::<Word>()
    }
}

impl PartialEq for BitField {
    fn eq(&self, other: &Self) -> bool {
        self.bv.len() == other.bv.len() && self.bv.as_raw_slice() == other.bv.as_raw_slice()
    }
}

impl Eq for BitField {}
