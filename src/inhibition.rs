//! Inhibition - winner selection over frozen overlap scores.
//!
//! Two strategies share the same input (an [`OverlapScores`] snapshot) and
//! differ only in the scope of the competition:
//!
//! - [`Inhibition::Global`] ranks every eligible column and keeps the top
//!   `k = round(column_count * sparsity_ratio)`.
//! - [`Inhibition::Local`] lets a column win when fewer than `k_local`
//!   eligible neighbors within the inhibition radius rank ahead of it. The
//!   local winners are then capped at the same pool-wide `k`, keeping the
//!   highest ranked, so output sparsity never exceeds `sparsity_ratio`.
//!
//! Ranking is by boosted overlap, descending. Equal scores are ordered by a
//! [`TieBreak`]: lowest column index in deterministic mode, or a seeded
//! per-cycle permutation in randomized mode. Ineligible columns (raw
//! overlap below the stimulus floor) never win and never suppress anyone.

use crate::overlap::OverlapScores;
use crate::topology::{Span, Topology, WrapMode};
use crate::utils::shuffle_indices;
use crate::SpatialPoolerConfig;
use rand::Rng;
use std::cmp::Ordering;

/// Order among columns with equal boosted overlap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TieBreak {
    /// Lower column index ranks first.
    LowestIndex,
    /// `priority[c]` ranks first when lower; a permutation of `0..n`.
    Priority(Vec<u32>),
}

impl TieBreak {
    /// Random permutation over `n` columns drawn from `rng`.
    pub fn random<R: Rng>(n: usize, rng: &mut R) -> Self {
        let mut priority: Vec<u32> = (0..n as u32).collect();
        shuffle_indices(&mut priority, rng);
        TieBreak::Priority(priority)
    }

    #[inline]
    fn rank(&self, column: usize) -> u32 {
        match self {
            TieBreak::LowestIndex => column as u32,
            TieBreak::Priority(priority) => priority[column],
        }
    }
}

/// Winner selection strategy, chosen from the configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Inhibition {
    Global {
        num_active: usize,
    },
    Local {
        radius: usize,
        density: f64,
        wrap: WrapMode,
        num_active: usize,
    },
}

impl Inhibition {
    pub fn from_config(config: &SpatialPoolerConfig) -> Self {
        if config.global_inhibition {
            Inhibition::Global {
                num_active: config.target_winners(),
            }
        } else {
            Inhibition::Local {
                radius: config.inhibition_radius as usize,
                density: config.local_area_density,
                wrap: config.wrap_mode(),
                num_active: config.target_winners(),
            }
        }
    }

    /// Neighborhood used for local competition and local boost averages.
    ///
    /// `None` under global inhibition, where every column competes with
    /// every other.
    pub fn neighborhood(&self, column: usize, column_count: usize) -> Option<Span> {
        match *self {
            Inhibition::Global { .. } => None,
            Inhibition::Local { radius, wrap, .. } => {
                Some(Topology::neighborhood(column, column_count, radius, wrap))
            }
        }
    }

    /// Select winners. Returned indices are ascending.
    pub fn select(&self, scores: &OverlapScores, tie_break: &TieBreak) -> Vec<u32> {
        match *self {
            Inhibition::Global { num_active } => select_global(scores, num_active, tie_break),
            Inhibition::Local {
                density,
                num_active,
                ..
            } => {
                let winners = self.select_local(scores, density, tie_break);
                keep_top(scores, winners, num_active, tie_break)
            }
        }
    }

    fn select_local(&self, scores: &OverlapScores, density: f64, tie_break: &TieBreak) -> Vec<usize> {
        let n = scores.len();
        let mut winners = Vec::new();

        for c in 0..n {
            if !scores.is_eligible(c) {
                continue;
            }
            let span = match self.neighborhood(c, n) {
                Some(span) => span,
                None => continue,
            };
            let k_local = ((span.len() as f64 * density).round() as usize).max(1);

            let mut ahead = 0;
            for nb in span.iter() {
                if nb != c
                    && scores.is_eligible(nb)
                    && rank_order(scores, tie_break, nb, c) == Ordering::Less
                {
                    ahead += 1;
                    if ahead >= k_local {
                        break;
                    }
                }
            }

            if ahead < k_local {
                winners.push(c);
            }
        }

        winners
    }
}

/// `Less` when `a` ranks ahead of `b`.
#[inline]
fn rank_order(scores: &OverlapScores, tie_break: &TieBreak, a: usize, b: usize) -> Ordering {
    let boosted = scores.boosted();
    boosted[b]
        .total_cmp(&boosted[a])
        .then_with(|| tie_break.rank(a).cmp(&tie_break.rank(b)))
}

fn select_global(scores: &OverlapScores, num_active: usize, tie_break: &TieBreak) -> Vec<u32> {
    let candidates: Vec<usize> = (0..scores.len()).filter(|&c| scores.is_eligible(c)).collect();
    keep_top(scores, candidates, num_active, tie_break)
}

/// The `num_active` best ranked of `candidates`, ascending.
fn keep_top(
    scores: &OverlapScores,
    mut candidates: Vec<usize>,
    num_active: usize,
    tie_break: &TieBreak,
) -> Vec<u32> {
    let k = num_active.min(candidates.len());
    if k == 0 {
        return Vec::new();
    }

    if k < candidates.len() {
        candidates.select_nth_unstable_by(k - 1, |&a, &b| rank_order(scores, tie_break, a, b));
        candidates.truncate(k);
    }

    let mut winners: Vec<u32> = candidates.into_iter().map(|c| c as u32).collect();
    winners.sort_unstable();
    winners
}
