//! Topology helpers for one-dimensional input and column spaces.
//!
//! Both the input space and the column space are laid out on a line. A
//! column's receptive field is centered on the input position it maps to, and
//! local inhibition compares each column against the columns around it. Both
//! neighborhoods are computed here, optionally wrapping at the boundaries so
//! that the space behaves like a ring.

use serde::{Deserialize, Serialize};

/// How neighborhoods behave at the ends of the space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WrapMode {
    /// Neighborhoods are clipped at the boundaries.
    #[default]
    NoWrap,
    /// The space is a ring; neighborhoods continue on the other side.
    Wrap,
}

impl From<bool> for WrapMode {
    fn from(wrap_around: bool) -> Self {
        if wrap_around {
            WrapMode::Wrap
        } else {
            WrapMode::NoWrap
        }
    }
}

/// Contiguous run of positions in a (possibly wrapping) space.
///
/// Iterating yields each position exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    start: usize,
    len: usize,
    size: usize,
}

impl Span {
    /// Number of positions in the span.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate the positions, starting from the low edge.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        let Span { start, len, size } = *self;
        (0..len).map(move |offset| (start + offset) % size)
    }
}

/// Namespace for topology computations.
pub struct Topology;

impl Topology {
    /// Positions within `radius` of `center` (center included).
    ///
    /// # Examples
    ///
    /// ```
    /// use sparsepool::topology::{Topology, WrapMode};
    ///
    /// let clipped: Vec<_> = Topology::neighborhood(1, 10, 2, WrapMode::NoWrap).iter().collect();
    /// assert_eq!(clipped, vec![0, 1, 2, 3]);
    ///
    /// let ring: Vec<_> = Topology::neighborhood(1, 10, 2, WrapMode::Wrap).iter().collect();
    /// assert_eq!(ring, vec![9, 0, 1, 2, 3]);
    /// ```
    pub fn neighborhood(center: usize, size: usize, radius: usize, wrap: WrapMode) -> Span {
        debug_assert!(center < size, "center {} outside space of size {}", center, size);

        let diameter = radius.saturating_mul(2).saturating_add(1);
        if diameter >= size {
            return Span {
                start: 0,
                len: size,
                size,
            };
        }

        match wrap {
            WrapMode::Wrap => Span {
                start: (center + size - radius) % size,
                len: diameter,
                size,
            },
            WrapMode::NoWrap => {
                let lo = center.saturating_sub(radius);
                let hi = (center + radius).min(size - 1);
                Span {
                    start: lo,
                    len: hi - lo + 1,
                    size,
                }
            }
        }
    }

    /// Input position at the center of `column`'s receptive field.
    ///
    /// Columns are spread evenly across the input, each mapped to the middle
    /// of the input stretch it covers.
    pub fn map_column_to_input(column: usize, column_count: usize, input_width: usize) -> usize {
        debug_assert!(column < column_count);
        let ratio = input_width as f64 / column_count as f64;
        let center = ((column as f64 + 0.5) * ratio).floor() as usize;
        center.min(input_width.saturating_sub(1))
    }
}
