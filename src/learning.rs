//! Learning - Hebbian permanence updates and homeostatic boosting.
//!
//! Runs after a winner set has been fully computed, in three steps:
//!
//! 1. **Permanences** (winners only): synapses on active input bits gain
//!    `permanence_increment`, the rest lose `permanence_decrement`, clipped
//!    to `[0, 1]`.
//! 2. **Duty cycles** (every column): exponential moving averages over
//!    `duty_cycle_period` of "won this cycle" and "raw overlap cleared the
//!    stimulus floor this cycle".
//! 3. **Boost factors** (every column):
//!    `exp(boost_strength * (avg_duty - column_duty))` clamped to
//!    `[1, max_boost]`, where `avg_duty` is the pool-wide mean under global
//!    inhibition and the neighborhood mean under local inhibition.
//!
//! Columns that fire less often than their peers drift toward `max_boost`,
//! columns that fire more often settle at `1.0`.

use crate::inhibition::Inhibition;
use crate::overlap::OverlapScores;
use crate::{BitField, ColumnPool, SpatialPoolerConfig};

/// Summary of one learning pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LearningOutcome {
    /// Columns whose permanences were adapted
    pub adapted_columns: usize,
    /// Columns left with a boost factor above 1.0
    pub boosted_columns: usize,
}

/// Applies the learning rule to a column pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearningUpdater {
    increment: f64,
    decrement: f64,
    connected_permanence: f64,
    duty_cycle_period: f64,
    stimulus_floor: u32,
    boost_strength: f64,
    max_boost: f64,
}

impl LearningUpdater {
    pub fn from_config(config: &SpatialPoolerConfig) -> Self {
        Self {
            increment: config.permanence_increment,
            decrement: config.permanence_decrement,
            connected_permanence: config.connected_permanence,
            duty_cycle_period: config.duty_cycle_period.max(1) as f64,
            stimulus_floor: config.stimulus_floor(),
            boost_strength: config.boost_strength,
            max_boost: config.max_boost.max(1.0),
        }
    }

    /// Run all three learning steps for one cycle.
    pub fn apply(
        &self,
        pool: &mut ColumnPool,
        input: &BitField,
        scores: &OverlapScores,
        winners: &[u32],
        inhibition: &Inhibition,
    ) -> LearningOutcome {
        let adapted_columns = self.adapt_synapses(pool, input, winners);
        self.update_duty_cycles(pool, scores, winners);
        let boosted_columns = self.update_boost_factors(pool, inhibition);
        LearningOutcome {
            adapted_columns,
            boosted_columns,
        }
    }

    /// Hebbian update on the winning columns. Returns how many were adapted.
    pub fn adapt_synapses(&self, pool: &mut ColumnPool, input: &BitField, winners: &[u32]) -> usize {
        let columns = pool.columns_mut();
        let mut adapted = 0;
        for &w in winners {
            if let Some(column) = columns.get_mut(w as usize) {
                column.adapt(input, self.increment, self.decrement, self.connected_permanence);
                adapted += 1;
            }
        }
        adapted
    }

    /// Advance both duty cycle averages for every column.
    pub fn update_duty_cycles(&self, pool: &mut ColumnPool, scores: &OverlapScores, winners: &[u32]) {
        let period = self.duty_cycle_period;
        let decay = 1.0 - 1.0 / period;
        let step = 1.0 / period;

        let mut is_winner = vec![false; pool.len()];
        for &w in winners {
            if let Some(flag) = is_winner.get_mut(w as usize) {
                *flag = true;
            }
        }

        for (c, column) in pool.columns_mut().iter_mut().enumerate() {
            let overlapped = scores.raw().get(c).map_or(false, |&o| o >= self.stimulus_floor);
            column.active_duty_cycle =
                column.active_duty_cycle * decay + if is_winner[c] { step } else { 0.0 };
            column.overlap_duty_cycle =
                column.overlap_duty_cycle * decay + if overlapped { step } else { 0.0 };
        }
    }

    /// Recompute every boost factor. Returns how many exceed 1.0.
    pub fn update_boost_factors(&self, pool: &mut ColumnPool, inhibition: &Inhibition) -> usize {
        if self.boost_strength <= 0.0 {
            for column in pool.columns_mut() {
                column.boost_factor = 1.0;
            }
            return 0;
        }

        let duties = pool.active_duty_cycles();
        let n = duties.len();
        if n == 0 {
            return 0;
        }
        let global_avg = duties.iter().sum::<f64>() / n as f64;

        let mut boosted = 0;
        for (c, column) in pool.columns_mut().iter_mut().enumerate() {
            let avg = match inhibition.neighborhood(c, n) {
                Some(span) => span.iter().map(|nb| duties[nb]).sum::<f64>() / span.len().max(1) as f64,
                None => global_avg,
            };
            let boost = self.boost_for(avg, duties[c]);
            if boost > 1.0 {
                boosted += 1;
            }
            column.boost_factor = boost;
        }
        boosted
    }

    /// Boost for a column with duty cycle `duty` among peers averaging `avg`.
    #[inline]
    pub fn boost_for(&self, avg: f64, duty: f64) -> f64 {
        let boost = (self.boost_strength * (avg - duty)).exp();
        if boost.is_nan() {
            return 1.0;
        }
        boost.clamp(1.0, self.max_boost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config() -> SpatialPoolerConfig {
        SpatialPoolerConfig {
            input_width: 64,
            column_count: 100,
            potential_radius: 64,
            duty_cycle_period: 10,
            boost_strength: 10.0,
            max_boost: 3.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_only_winners_adapt() {
        let config = config();
        let mut pool = ColumnPool::new(&config, &mut StdRng::seed_from_u64(2));
        let before = pool.clone();
        let input = BitField::from_acts(64, &[1, 2, 3, 4, 5]);

        let updater = LearningUpdater::from_config(&config);
        assert_eq!(updater.adapt_synapses(&mut pool, &input, &[7, 42]), 2);

        for c in 0..pool.len() {
            let a: Vec<_> = before.column(c).unwrap().potential_synapses().collect();
            let b: Vec<_> = pool.column(c).unwrap().potential_synapses().collect();
            if c == 7 || c == 42 {
                assert_ne!(a, b, "winner {} should have adapted", c);
            } else {
                assert_eq!(a, b, "column {} should be untouched", c);
            }
        }
    }

    #[test]
    fn test_duty_cycle_moving_average() {
        let config = config();
        let mut pool = ColumnPool::new(&config, &mut StdRng::seed_from_u64(2));
        let updater = LearningUpdater::from_config(&config);

        let mut raw = vec![0u32; 100];
        raw[3] = 4;
        raw[5] = 2;
        let scores = OverlapScores::from_parts(raw, &vec![1.0; 100], 1);

        updater.update_duty_cycles(&mut pool, &scores, &[3]);
        assert_relative_eq!(pool.column(3).unwrap().active_duty_cycle(), 0.1);
        assert_relative_eq!(pool.column(3).unwrap().overlap_duty_cycle(), 0.1);
        assert_relative_eq!(pool.column(5).unwrap().active_duty_cycle(), 0.0);
        assert_relative_eq!(pool.column(5).unwrap().overlap_duty_cycle(), 0.1);

        updater.update_duty_cycles(&mut pool, &scores, &[]);
        assert_relative_eq!(pool.column(3).unwrap().active_duty_cycle(), 0.09, epsilon = 1e-12);
    }

    #[test]
    fn test_boost_curve() {
        let updater = LearningUpdater::from_config(&config());
        // Firing at the average: no boost
        assert_relative_eq!(updater.boost_for(0.05, 0.05), 1.0);
        // Firing more than average: clamped at 1
        assert_relative_eq!(updater.boost_for(0.05, 0.5), 1.0);
        // Firing less: exp(10 * 0.05)
        assert_relative_eq!(updater.boost_for(0.05, 0.0), (0.5f64).exp());
        // Starved: capped at max_boost
        assert_relative_eq!(updater.boost_for(1.0, 0.0), 3.0);
    }

    #[test]
    fn test_boost_disabled() {
        let config = SpatialPoolerConfig {
            boost_strength: 0.0,
            ..config()
        };
        let mut pool = ColumnPool::new(&config, &mut StdRng::seed_from_u64(2));
        pool.columns_mut()[0].boost_factor = 2.5;

        let updater = LearningUpdater::from_config(&config);
        let boosted = updater.update_boost_factors(&mut pool, &Inhibition::from_config(&config));
        assert_eq!(boosted, 0);
        assert!(pool.boost_factors().iter().all(|&b| b == 1.0));
    }

    #[test]
    fn test_starved_columns_get_boosted() {
        let config = config();
        let mut pool = ColumnPool::new(&config, &mut StdRng::seed_from_u64(2));
        for (c, column) in pool.columns_mut().iter_mut().enumerate() {
            column.active_duty_cycle = if c < 10 { 0.5 } else { 0.0 };
        }

        let updater = LearningUpdater::from_config(&config);
        let boosted = updater.update_boost_factors(&mut pool, &Inhibition::from_config(&config));

        // Pool average is 0.05
        assert_eq!(boosted, 90);
        assert_relative_eq!(pool.column(0).unwrap().boost_factor(), 1.0);
        assert_relative_eq!(pool.column(50).unwrap().boost_factor(), (0.5f64).exp());
    }

    #[test]
    fn test_local_boost_uses_neighborhood() {
        let config = SpatialPoolerConfig {
            global_inhibition: false,
            inhibition_radius: 2,
            wrap_around: false,
            ..config()
        };
        let mut pool = ColumnPool::new(&config, &mut StdRng::seed_from_u64(2));
        pool.columns_mut()[50].active_duty_cycle = 0.5;

        let updater = LearningUpdater::from_config(&config);
        updater.update_boost_factors(&mut pool, &Inhibition::from_config(&config));

        // Neighbors of 50 see an average of 0.1; far columns see 0
        assert_relative_eq!(pool.column(49).unwrap().boost_factor(), (1.0f64).exp().min(3.0));
        assert_relative_eq!(pool.column(90).unwrap().boost_factor(), 1.0);
        assert_relative_eq!(pool.column(50).unwrap().boost_factor(), 1.0);
    }
}
