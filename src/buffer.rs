use crate::{Error, IndexOrder, Result};

use std::{
    fmt::Debug,
    ops::{Index, IndexMut},
};

/// Element type of an [`IndicatorBuffer`]: `f64` for declared outputs,
/// `i64` for integer state a step keeps on its own.
pub trait Scalar: Copy + Debug + PartialEq {
    /// Value given to slots created by [`IndicatorBuffer::resize`].
    const EMPTY: Self;
}

impl Scalar for f64 {
    const EMPTY: Self = f64::NAN;
}

impl Scalar for i64 {
    const EMPTY: Self = 0;
}

/// Role of a declared output buffer.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Default, Debug)]
pub enum BufferKind {
    /// Plotted indicator values.
    #[default]
    Data,
    /// Intermediate values kept between updates, not plotted.
    Calculations,
}

/// Owned, resizable series of computed values, one per bar.
///
/// Storage is always chronological; [`IndexOrder`] is applied at the
/// accessor boundary. New slots hold [`Scalar::EMPTY`] (`NaN`, or 0 for `i64`).
/// The shift is a display hint for plotting and has no effect on values.
///
/// # Example
///
/// ```
/// use quantedge_rates::{IndexOrder, IndicatorBuffer};
///
/// let mut buffer = IndicatorBuffer::<f64>::new();
/// buffer.resize(3);
/// buffer.set(2, 1.5).unwrap();
/// assert!(buffer.get(0).unwrap().is_nan());
///
/// buffer.set_order(IndexOrder::ReverseChronological);
/// assert_eq!(buffer.get(0), Ok(1.5));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IndicatorBuffer<T: Scalar = f64> {
    values: Vec<T>,
    shift: i32,
    order: IndexOrder,
    kind: BufferKind,
}

impl<T: Scalar> IndicatorBuffer<T> {
    /// Empty data buffer in chronological order with no shift.
    #[must_use]
    pub fn new() -> Self {
        Self::with_kind(BufferKind::Data)
    }

    #[must_use]
    pub fn with_kind(kind: BufferKind) -> Self {
        Self {
            values: Vec::new(),
            shift: 0,
            order: IndexOrder::Chronological,
            kind,
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> BufferKind {
        self.kind
    }

    /// Grows with [`Scalar::EMPTY`] or truncates to exactly `len` values.
    /// Existing values keep their chronological position.
    pub fn resize(&mut self, len: usize) {
        self.values.resize(len, T::EMPTY);
    }

    /// Plot offset in bars: positive draws ahead of the price axis.
    #[inline]
    #[must_use]
    pub fn shift(&self) -> i32 {
        self.shift
    }

    #[inline]
    pub fn set_shift(&mut self, shift: i32) {
        self.shift = shift;
    }

    #[inline]
    #[must_use]
    pub fn order(&self) -> IndexOrder {
        self.order
    }

    #[inline]
    pub fn set_order(&mut self, order: IndexOrder) {
        self.order = order;
    }

    /// Value at logical `index`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] for `index >= len()`.
    #[inline]
    pub fn get(&self, index: usize) -> Result<T> {
        self.position(index).map(|i| self.values[i])
    }

    /// Overwrites the value at logical `index`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] for `index >= len()`.
    #[inline]
    pub fn set(&mut self, index: usize, value: T) -> Result<()> {
        let i = self.position(index)?;
        self.values[i] = value;
        Ok(())
    }

    /// Values in chronological order, regardless of [`order`](Self::order).
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    #[inline]
    fn position(&self, index: usize) -> Result<usize> {
        let len = self.values.len();
        if index < len {
            Ok(self.order.resolve(index, len))
        } else {
            Err(Error::OutOfRange { index, len })
        }
    }
}

impl<T: Scalar> Index<usize> for IndicatorBuffer<T> {
    type Output = T;

    /// # Panics
    ///
    /// Panics when `index >= len()`, like slice indexing.
    fn index(&self, index: usize) -> &T {
        let len = self.values.len();
        assert!(index < len, "index {index} out of range for length {len}");
        &self.values[self.order.resolve(index, len)]
    }
}

impl<T: Scalar> IndexMut<usize> for IndicatorBuffer<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.values.len();
        assert!(index < len, "index {index} out of range for length {len}");
        &mut self.values[self.order.resolve(index, len)]
    }
}
