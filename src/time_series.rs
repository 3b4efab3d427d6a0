use crate::{Bar, BarStore, Error, Price, Result, SharedBars, Timestamp};

use std::{cell::RefCell, fmt::Debug, rc::Weak};

/// Which end of a series index `0` addresses.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Default, Debug)]
pub enum IndexOrder {
    /// Index `0` is the oldest bar.
    #[default]
    Chronological,
    /// Index `0` is the newest bar.
    ReverseChronological,
}

impl IndexOrder {
    /// Maps a logical index to the chronological storage index.
    ///
    /// Callers check `index < len` first.
    #[inline]
    pub(crate) fn resolve(self, index: usize, len: usize) -> usize {
        match self {
            Self::Chronological => index,
            Self::ReverseChronological => len - 1 - index,
        }
    }
}

/// Read-only projection of one bar field out of a shared [`BarStore`].
///
/// The view holds a weak reference and a field selector, nothing else.
/// Every read goes back to the store, so changes to the forming bar are
/// visible immediately and the length tracks the store at read time.
///
/// # Example
///
/// ```
/// use quantedge_rates::{Bar, BarStore, IndexOrder, TimeSeries};
///
/// let bars = BarStore::with_history(
///     vec![Bar::new(0, 1.0, 1.0, 1.0, 1.0)],
///     Bar::new(60, 2.0, 2.0, 2.0, 2.0),
/// )
/// .shared();
///
/// let mut close = TimeSeries::close(&bars);
/// assert_eq!(close.get(0), Ok(1.0));
///
/// close.set_order(IndexOrder::ReverseChronological);
/// assert_eq!(close.get(0), Ok(2.0));
///
/// bars.borrow_mut().update_forming(|bar| bar.close = 2.5);
/// assert_eq!(close.get(0), Ok(2.5));
/// ```
pub struct TimeSeries<T> {
    bars: Weak<RefCell<BarStore>>,
    field: fn(&Bar) -> T,
    order: IndexOrder,
}

impl<T> TimeSeries<T> {
    /// View of `field` over `bars`, in chronological order.
    #[must_use]
    pub fn new(bars: &SharedBars, field: fn(&Bar) -> T) -> Self {
        Self {
            bars: std::rc::Rc::downgrade(bars),
            field,
            order: IndexOrder::Chronological,
        }
    }

    /// Current indexing order.
    #[inline]
    #[must_use]
    pub fn order(&self) -> IndexOrder {
        self.order
    }

    /// Switches indexing order. Storage is never touched.
    #[inline]
    pub fn set_order(&mut self, order: IndexOrder) {
        self.order = order;
    }

    /// Number of bars in the store right now, forming bar included.
    ///
    /// # Errors
    ///
    /// [`Error::Detached`] if the store was dropped, [`Error::Busy`] if
    /// the source is mutating it.
    pub fn len(&self) -> Result<usize> {
        self.with_store(BarStore::len)
    }

    /// `true` only when the store has no bars at all, which a live
    /// [`BarStore`] never does.
    ///
    /// # Errors
    ///
    /// See [`len`](Self::len).
    pub fn is_empty(&self) -> Result<bool> {
        self.len().map(|len| len == 0)
    }

    /// Field value at logical `index`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] for `index >= len()`, plus the errors of
    /// [`len`](Self::len).
    pub fn get(&self, index: usize) -> Result<T> {
        self.with_store(|store| {
            let len = store.len();
            if index >= len {
                return Err(Error::OutOfRange { index, len });
            }
            let bar = store
                .get(self.order.resolve(index, len))
                .ok_or(Error::OutOfRange { index, len })?;
            Ok((self.field)(bar))
        })?
    }

    fn with_store<R>(&self, f: impl FnOnce(&BarStore) -> R) -> Result<R> {
        let store = self.bars.upgrade().ok_or(Error::Detached)?;
        let guard = store.try_borrow().map_err(|_| Error::Busy)?;
        Ok(f(&guard))
    }
}

impl TimeSeries<Timestamp> {
    /// Bar open times.
    #[must_use]
    pub fn time(bars: &SharedBars) -> Self {
        Self::new(bars, |bar| bar.time)
    }

    /// Tick counts.
    #[must_use]
    pub fn tick_volume(bars: &SharedBars) -> Self {
        Self::new(bars, |bar| bar.tick_volume)
    }

    /// Traded volume.
    #[must_use]
    pub fn volume(bars: &SharedBars) -> Self {
        Self::new(bars, |bar| bar.volume)
    }
}

impl TimeSeries<Price> {
    #[must_use]
    pub fn open(bars: &SharedBars) -> Self {
        Self::new(bars, |bar| bar.open)
    }

    #[must_use]
    pub fn high(bars: &SharedBars) -> Self {
        Self::new(bars, |bar| bar.high)
    }

    #[must_use]
    pub fn low(bars: &SharedBars) -> Self {
        Self::new(bars, |bar| bar.low)
    }

    #[must_use]
    pub fn close(bars: &SharedBars) -> Self {
        Self::new(bars, |bar| bar.close)
    }
}

impl<T> Debug for TimeSeries<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeSeries")
            .field("order", &self.order)
            .field("alive", &(self.bars.strong_count() > 0))
            .finish_non_exhaustive()
    }
}
