//! Column - one competitive unit of the spatial pooler.
//!
//! A column owns a receptive field of potential synapses into the input
//! space. Each synapse has a permanence in `[0, 1]`; those at or above the
//! connected threshold form the column's connected mask, which is what the
//! overlap scorer reads.
//!
//! # Layout
//!
//! - `potential` - input bit addressed by each synapse, ascending
//! - `permanences` - permanence of each synapse, parallel to `potential`
//! - `connected` - dense mask over the input, kept in sync with `permanences`
//!
//! Duty cycles and the boost factor live alongside the synapses so that one
//! column can be inspected as a unit.

use crate::BitField;
use serde::Serialize;

/// Permanence lower bound
pub const PERM_MIN: f64 = 0.0;

/// Permanence upper bound
pub const PERM_MAX: f64 = 1.0;

/// A column with its receptive field and homeostatic state.
#[derive(Clone, Debug)]
pub struct Column {
    potential: Vec<u32>,
    permanences: Vec<f64>,
    connected: BitField,
    num_connected: usize,
    pub(crate) boost_factor: f64,
    pub(crate) active_duty_cycle: f64,
    pub(crate) overlap_duty_cycle: f64,
}

impl Column {
    /// Create a column over an input of `input_width` bits.
    ///
    /// `potential` must be strictly increasing and `permanences` parallel to
    /// it. Permanences are clipped into `[0, 1]`.
    pub fn new(
        input_width: usize,
        potential: Vec<u32>,
        permanences: Vec<f64>,
        connected_permanence: f64,
    ) -> Self {
        assert_eq!(
            potential.len(),
            permanences.len(),
            "potential and permanences must be parallel"
        );
        debug_assert!(potential.windows(2).all(|w| w[0] < w[1]));

        let mut column = Self {
            potential,
            permanences: permanences
                .into_iter()
                .map(|p| p.clamp(PERM_MIN, PERM_MAX))
                .collect(),
            connected: BitField::new(input_width),
            num_connected: 0,
            boost_factor: 1.0,
            active_duty_cycle: 0.0,
            overlap_duty_cycle: 0.0,
        };
        column.update_connected(connected_permanence);
        column
    }

    /// Rebuild the connected mask from the permanences.
    pub fn update_connected(&mut self, connected_permanence: f64) {
        self.connected.clear_all();
        self.num_connected = 0;
        for (&addr, &perm) in self.potential.iter().zip(&self.permanences) {
            if perm >= connected_permanence {
                self.connected.set_bit(addr as usize);
                self.num_connected += 1;
            }
        }
    }

    /// Count connected synapses whose input bit is set in `input`.
    #[inline]
    pub fn overlap(&self, input: &BitField) -> u32 {
        self.connected.num_similar(input) as u32
    }

    /// Hebbian update of every potential synapse.
    ///
    /// Synapses on active input bits gain `increment`, all others lose
    /// `decrement`; results are clipped to `[0, 1]` and the connected mask is
    /// refreshed incrementally.
    pub fn adapt(
        &mut self,
        input: &BitField,
        increment: f64,
        decrement: f64,
        connected_permanence: f64,
    ) {
        for (&addr, perm) in self.potential.iter().zip(self.permanences.iter_mut()) {
            let addr = addr as usize;
            let was_connected = *perm >= connected_permanence;

            *perm = if input.get_bit(addr) {
                (*perm + increment).min(PERM_MAX)
            } else {
                (*perm - decrement).max(PERM_MIN)
            };

            let is_connected = *perm >= connected_permanence;
            if is_connected != was_connected {
                self.connected.assign_bit(addr, is_connected);
                if is_connected {
                    self.num_connected += 1;
                } else {
                    self.num_connected -= 1;
                }
            }
        }
    }

    /// Potential synapses as `(input_bit, permanence)` pairs, ascending by bit.
    pub fn potential_synapses(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.potential.iter().copied().zip(self.permanences.iter().copied())
    }

    /// Permanence of the synapse on `input_bit`, if it is in the receptive field.
    pub fn permanence(&self, input_bit: u32) -> Option<f64> {
        self.potential
            .binary_search(&input_bit)
            .ok()
            .map(|i| self.permanences[i])
    }

    /// Whether `input_bit` is reached by a connected synapse.
    #[inline]
    pub fn is_connected(&self, input_bit: u32) -> bool {
        self.connected.get_bit(input_bit as usize)
    }

    #[inline]
    pub fn potential_count(&self) -> usize {
        self.potential.len()
    }

    #[inline]
    pub fn connected_count(&self) -> usize {
        self.num_connected
    }

    #[inline]
    pub fn boost_factor(&self) -> f64 {
        self.boost_factor
    }

    #[inline]
    pub fn active_duty_cycle(&self) -> f64 {
        self.active_duty_cycle
    }

    #[inline]
    pub fn overlap_duty_cycle(&self) -> f64 {
        self.overlap_duty_cycle
    }

    /// Approximate memory footprint in bytes.
    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.potential.capacity() * std::mem::size_of::<u32>()
            + self.permanences.capacity() * std::mem::size_of::<f64>()
            + self.connected.memory_usage()
    }
}

/// Read-only summary of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub index: usize,
    pub potential_count: usize,
    pub connected_count: usize,
    pub boost_factor: f64,
    pub active_duty_cycle: f64,
    pub overlap_duty_cycle: f64,
}

impl ColumnStats {
    pub fn from_column(index: usize, column: &Column) -> Self {
        Self {
            index,
            potential_count: column.potential_count(),
            connected_count: column.connected_count(),
            boost_factor: column.boost_factor,
            active_duty_cycle: column.active_duty_cycle,
            overlap_duty_cycle: column.overlap_duty_cycle,
        }
    }
}
