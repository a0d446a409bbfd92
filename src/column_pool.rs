//! ColumnPool - fixed array of columns with sampled receptive fields.
//!
//! The pool is allocated once per engine from a [`SpatialPoolerConfig`] and a
//! seeded RNG, so identical configurations with identical seeds reproduce
//! identical receptive fields.
//!
//! # Receptive field sampling
//!
//! 1. Map the column to the center of its stretch of input
//! 2. Take every input bit within `potential_radius` of that center
//!    (wrapping at the ends when `wrap_around` is set)
//! 3. Sample `potential_pct` of those bits without replacement
//! 4. Start `init_connected_pct` of the synapses just above the connected
//!    threshold and the rest somewhere below it

use crate::column::Column;
use crate::topology::Topology;
use crate::utils::sample_sorted;
use crate::SpatialPoolerConfig;
use rand::Rng;

/// Owned collection of columns for one engine.
#[derive(Clone, Debug)]
pub struct ColumnPool {
    columns: Vec<Column>,
    input_width: usize,
}

impl ColumnPool {
    /// Allocate a pool for `config`, drawing receptive fields from `rng`.
    ///
    /// `config` is expected to be validated.
    pub fn new<R: Rng>(config: &SpatialPoolerConfig, rng: &mut R) -> Self {
        let input_width = config.input_width as usize;
        let column_count = config.column_count as usize;
        let radius = config.potential_radius as usize;
        let wrap = config.wrap_mode();

        let mut columns = Vec::with_capacity(column_count);
        let mut field: Vec<u32> = Vec::with_capacity(input_width);

        for c in 0..column_count {
            let center = Topology::map_column_to_input(c, column_count, input_width);
            let span = Topology::neighborhood(center, input_width, radius, wrap);

            field.clear();
            field.extend(span.iter().map(|i| i as u32));

            let num_potential = ((field.len() as f64 * config.potential_pct).round() as usize).max(1);
            let potential = sample_sorted(&mut field, num_potential, rng);
            let permanences = potential
                .iter()
                .map(|_| initial_permanence(config, rng))
                .collect();

            columns.push(Column::new(
                input_width,
                potential,
                permanences,
                config.connected_permanence,
            ));
        }

        Self {
            columns,
            input_width,
        }
    }

    /// Number of columns.
    #[inline]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    #[inline]
    pub fn input_width(&self) -> usize {
        self.input_width
    }

    #[inline]
    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[inline]
    pub(crate) fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    /// Boost factor of every column, by index.
    pub fn boost_factors(&self) -> Vec<f64> {
        self.columns.iter().map(|c| c.boost_factor).collect()
    }

    /// Active duty cycle of every column, by index.
    pub fn active_duty_cycles(&self) -> Vec<f64> {
        self.columns.iter().map(|c| c.active_duty_cycle).collect()
    }

    /// Approximate memory footprint in bytes.
    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>() + self.columns.iter().map(Column::memory_usage).sum::<usize>()
    }
}

/// Draw the starting permanence of one potential synapse.
fn initial_permanence<R: Rng>(config: &SpatialPoolerConfig, rng: &mut R) -> f64 {
    let connected = config.connected_permanence;
    if rng.gen::<f64>() < config.init_connected_pct {
        (connected + rng.gen::<f64>() * config.permanence_increment / 4.0).min(1.0)
    } else {
        connected * rng.gen::<f64>()
    }
}
