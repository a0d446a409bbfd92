//! Overlap scoring.
//!
//! For each column, the raw overlap is the number of its connected synapses
//! whose input bit is active. The boosted overlap scales that by the
//! column's boost factor and is what inhibition ranks on.
//!
//! The stimulus floor is applied to the *raw* overlap: a column below it is
//! never eligible, whatever its boost. Boosting only reorders columns that
//! already see the input.

use crate::{BitField, ColumnPool, SpatialPoolerConfig};

/// Per-column scores for one input, frozen before inhibition runs.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapScores {
    raw: Vec<u32>,
    boosted: Vec<f64>,
    floor: u32,
}

impl OverlapScores {
    /// Build scores directly from raw overlaps and boost factors.
    pub fn from_parts(raw: Vec<u32>, boost_factors: &[f64], floor: u32) -> Self {
        assert_eq!(raw.len(), boost_factors.len(), "one boost factor per column");
        let boosted = raw
            .iter()
            .zip(boost_factors)
            .map(|(&o, &b)| o as f64 * b)
            .collect();
        Self {
            raw,
            boosted,
            floor: floor.max(1),
        }
    }

    #[inline]
    pub fn raw(&self) -> &[u32] {
        &self.raw
    }

    #[inline]
    pub fn boosted(&self) -> &[f64] {
        &self.boosted
    }

    #[inline]
    pub fn floor(&self) -> u32 {
        self.floor
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Whether `column` clears the stimulus floor.
    #[inline]
    pub fn is_eligible(&self, column: usize) -> bool {
        self.raw[column] >= self.floor
    }

    /// Number of columns that clear the stimulus floor.
    pub fn eligible_count(&self) -> usize {
        self.raw.iter().filter(|&&o| o >= self.floor).count()
    }

    pub fn into_boosted(self) -> Vec<f64> {
        self.boosted
    }
}

/// Computes overlap scores against a column pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapScorer {
    floor: u32,
}

impl OverlapScorer {
    pub fn new(floor: u32) -> Self {
        Self { floor: floor.max(1) }
    }

    pub fn from_config(config: &SpatialPoolerConfig) -> Self {
        Self::new(config.stimulus_floor())
    }

    #[inline]
    pub fn floor(&self) -> u32 {
        self.floor
    }

    /// Score every column of `pool` against the dense `input`.
    ///
    /// # Panics
    ///
    /// Panics if `input` is not as wide as the pool's input space.
    pub fn score(&self, pool: &ColumnPool, input: &BitField) -> OverlapScores {
        assert_eq!(
            input.num_bits(),
            pool.input_width(),
            "input width must match the pool"
        );

        let raw: Vec<u32> = pool.columns().iter().map(|c| c.overlap(input)).collect();
        let boosted = raw
            .iter()
            .zip(pool.columns())
            .map(|(&o, c)| o as f64 * c.boost_factor())
            .collect();

        OverlapScores {
            raw,
            boosted,
            floor: self.floor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Column;

    #[test]
    fn test_from_parts_boosts() {
        let scores = OverlapScores::from_parts(vec![0, 2, 5], &[4.0, 1.5, 1.0], 1);
        assert_eq!(scores.boosted(), &[0.0, 3.0, 5.0]);
        assert!(!scores.is_eligible(0));
        assert!(scores.is_eligible(1));
        assert_eq!(scores.eligible_count(), 2);
    }

    #[test]
    fn test_floor_never_zero() {
        let scores = OverlapScores::from_parts(vec![0, 1], &[1.0, 1.0], 0);
        assert_eq!(scores.floor(), 1);
        assert!(!scores.is_eligible(0));
        assert_eq!(OverlapScorer::new(0).floor(), 1);
    }

    #[test]
    fn test_floor_uses_raw_overlap() {
        // Column 0 has a large boost but only one raw overlap
        let scores = OverlapScores::from_parts(vec![1, 2], &[10.0, 1.0], 2);
        assert!(!scores.is_eligible(0));
        assert!(scores.is_eligible(1));
    }

    #[test]
    fn test_score_against_pool() {
        let config = SpatialPoolerConfig {
            input_width: 32,
            column_count: 50,
            ..Default::default()
        };
        let mut rng = <rand::rngs::StdRng as rand::SeedableRng>::seed_from_u64(5);
        let pool = ColumnPool::new(&config, &mut rng);
        let input = BitField::from_acts(32, &[0, 1, 2, 3, 4, 5, 6, 7]);

        let scores = OverlapScorer::from_config(&config).score(&pool, &input);
        assert_eq!(scores.len(), 50);
        for (c, column) in pool.columns().iter().enumerate() {
            let expected = (0..8).filter(|&b| column.is_connected(b)).count() as u32;
            assert_eq!(scores.raw()[c], expected);
        }
    }

    #[test]
    fn test_column_overlap_matches_scores() {
        let column = Column::new(8, vec![0, 1, 2], vec![0.5, 0.5, 0.1], 0.2);
        let input = BitField::from_acts(8, &[1, 2]);
        assert_eq!(column.overlap(&input), 1);
    }
}
