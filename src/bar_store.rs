use crate::Bar;

use std::{cell::RefCell, rc::Rc};

/// Shared handle to a [`BarStore`].
///
/// The bar source keeps the strong reference; views created by
/// [`Indicator::bind`](crate::Indicator::bind) hold only weak ones.
pub type SharedBars = Rc<RefCell<BarStore>>;

/// Append-only list of closed bars followed by one forming bar.
///
/// The forming bar always exists, so the logical length is
/// `closed_len() + 1` and the last logical index addresses the bar whose
/// values may still change.
///
/// # Example
///
/// ```
/// use quantedge_rates::{Bar, BarStore};
///
/// let mut store = BarStore::new(Bar::new(0, 1.0, 1.0, 1.0, 1.0));
/// store.update_forming(|bar| bar.tick(1.5));
/// store.close_forming(Bar::new(60, 1.5, 1.5, 1.5, 1.5));
///
/// assert_eq!(store.closed_len(), 1);
/// assert_eq!(store.len(), 2);
/// assert_eq!(store.get(0).unwrap().close, 1.5);
/// ```
#[derive(Clone, Debug, Default)]
pub struct BarStore {
    closed: Vec<Bar>,
    forming: Bar,
}

impl BarStore {
    /// Empty history with `forming` as the open bar.
    #[must_use]
    pub fn new(forming: Bar) -> Self {
        Self {
            closed: Vec::new(),
            forming,
        }
    }

    /// Store pre-filled with closed history.
    #[must_use]
    pub fn with_history(closed: Vec<Bar>, forming: Bar) -> Self {
        Self { closed, forming }
    }

    /// Wraps the store in a [`SharedBars`] handle.
    #[must_use]
    pub fn shared(self) -> SharedBars {
        Rc::new(RefCell::new(self))
    }

    /// Number of closed bars.
    #[inline]
    #[must_use]
    pub fn closed_len(&self) -> usize {
        self.closed.len()
    }

    /// Logical length: closed bars plus the forming bar.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.closed.len() + 1
    }

    /// Always `false`: the forming bar is always present.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Bar at chronological index `i`, with `closed_len()` being the
    /// forming bar.
    #[inline]
    #[must_use]
    pub fn get(&self, i: usize) -> Option<&Bar> {
        match i.cmp(&self.closed.len()) {
            std::cmp::Ordering::Less => self.closed.get(i),
            std::cmp::Ordering::Equal => Some(&self.forming),
            std::cmp::Ordering::Greater => None,
        }
    }

    /// Closed bars, oldest first.
    #[must_use]
    pub fn closed(&self) -> &[Bar] {
        &self.closed
    }

    /// The bar still receiving ticks.
    #[must_use]
    pub fn forming(&self) -> &Bar {
        &self.forming
    }

    /// Mutates the forming bar in place.
    pub fn update_forming(&mut self, f: impl FnOnce(&mut Bar)) {
        f(&mut self.forming);
    }

    /// Closes the forming bar and starts `next` in its place.
    pub fn close_forming(&mut self, next: Bar) {
        let closed = std::mem::replace(&mut self.forming, next);
        self.closed.push(closed);
    }

    /// Drops all closed history. Bound indicators recompute from scratch on
    /// their next update, detected by the shorter list or a different first
    /// bar time.
    pub fn clear(&mut self) {
        self.closed.clear();
    }
}
