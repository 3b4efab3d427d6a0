use crate::{
    BufferKind, Error, IndexOrder, IndicatorBuffer, Price, Result, SharedBars, TimeSeries,
    Timestamp,
};

use std::{cell::RefCell, ops::Range, rc::Rc};

/// Per-indicator calculation step driven by [`Indicator`](crate::Indicator).
///
/// The contract every implementation keeps:
///
/// - write only indices in [`Rates::window`], never below [`Rates::limit`];
/// - return the exclusive upper bound of settled bars, normally
///   [`Rates::rates_total`]. Returning less defers the trailing bars to
///   the next update; returning more is rejected.
///
/// # Example
///
/// ```
/// use quantedge_rates::{BufferKind, Calculate, Outputs, Rates, Result};
///
/// /// Bar range: `high - low`.
/// struct HighLow;
///
/// impl Calculate for HighLow {
///     fn init(&mut self, outputs: &mut Outputs) -> Result<()> {
///         outputs.declare(0, BufferKind::Data)
///     }
///
///     fn calculate(&mut self, rates: &Rates<'_>, outputs: &mut Outputs) -> Result<usize> {
///         let out = outputs.get_mut(0)?;
///         for i in rates.window() {
///             out.set(i, rates.high().get(i)? - rates.low().get(i)?)?;
///         }
///         Ok(rates.rates_total())
///     }
/// }
/// ```
pub trait Calculate {
    /// Declares output buffers. Runs on every bind.
    ///
    /// # Errors
    ///
    /// Whatever [`Outputs`] reports for a bad slot.
    fn init(&mut self, outputs: &mut Outputs) -> Result<()>;

    /// Fills `outputs` over the recompute window and returns the new
    /// watermark.
    ///
    /// # Errors
    ///
    /// Any view or buffer error; the engine keeps its previous watermark.
    fn calculate(&mut self, rates: &Rates<'_>, outputs: &mut Outputs) -> Result<usize>;
}

/// Anything that can be brought up to date with its bar list.
///
/// Used for the dependency list of an [`Indicator`](crate::Indicator).
pub trait Update {
    /// Recomputes the unsettled suffix.
    ///
    /// # Errors
    ///
    /// See [`Indicator::update`](crate::Indicator::update).
    fn update(&mut self) -> Result<()>;
}

/// Shared handle to an upstream indicator.
pub type Dependency = Rc<RefCell<dyn Update>>;

/// Views over every bar field, created once at bind time.
#[derive(Debug)]
pub(crate) struct SeriesSet {
    pub(crate) time: TimeSeries<Timestamp>,
    pub(crate) open: TimeSeries<Price>,
    pub(crate) high: TimeSeries<Price>,
    pub(crate) low: TimeSeries<Price>,
    pub(crate) close: TimeSeries<Price>,
    pub(crate) tick_volume: TimeSeries<i64>,
    pub(crate) volume: TimeSeries<i64>,
}

impl SeriesSet {
    pub(crate) fn new(bars: &SharedBars) -> Self {
        Self {
            time: TimeSeries::time(bars),
            open: TimeSeries::open(bars),
            high: TimeSeries::high(bars),
            low: TimeSeries::low(bars),
            close: TimeSeries::close(bars),
            tick_volume: TimeSeries::tick_volume(bars),
            volume: TimeSeries::volume(bars),
        }
    }

    pub(crate) fn set_order(&mut self, order: IndexOrder) {
        self.time.set_order(order);
        self.open.set_order(order);
        self.high.set_order(order);
        self.low.set_order(order);
        self.close.set_order(order);
        self.tick_volume.set_order(order);
        self.volume.set_order(order);
    }

    pub(crate) fn len(&self) -> Result<usize> {
        self.time.len()
    }
}

/// Input handed to [`Calculate::calculate`]: the recompute window plus
/// chronological views over the bound bars.
#[derive(Debug, Clone, Copy)]
pub struct Rates<'a> {
    rates_total: usize,
    prev_calculated: usize,
    series: &'a SeriesSet,
}

impl<'a> Rates<'a> {
    pub(crate) fn new(rates_total: usize, prev_calculated: usize, series: &'a SeriesSet) -> Self {
        Self {
            rates_total,
            prev_calculated,
            series,
        }
    }

    /// Bars available this update, forming bar included.
    #[inline]
    #[must_use]
    pub fn rates_total(&self) -> usize {
        self.rates_total
    }

    /// Watermark returned by the previous calculation.
    #[inline]
    #[must_use]
    pub fn prev_calculated(&self) -> usize {
        self.prev_calculated
    }

    /// First index to recompute: `0` on a full pass, otherwise
    /// `prev_calculated - 1` so the bar that was forming last time is
    /// recomputed with its final values.
    #[inline]
    #[must_use]
    pub fn limit(&self) -> usize {
        self.prev_calculated.saturating_sub(1)
    }

    /// `limit()..rates_total()`.
    #[inline]
    #[must_use]
    pub fn window(&self) -> Range<usize> {
        self.limit()..self.rates_total
    }

    #[must_use]
    pub fn time(&self) -> &'a TimeSeries<Timestamp> {
        &self.series.time
    }

    #[must_use]
    pub fn open(&self) -> &'a TimeSeries<Price> {
        &self.series.open
    }

    #[must_use]
    pub fn high(&self) -> &'a TimeSeries<Price> {
        &self.series.high
    }

    #[must_use]
    pub fn low(&self) -> &'a TimeSeries<Price> {
        &self.series.low
    }

    #[must_use]
    pub fn close(&self) -> &'a TimeSeries<Price> {
        &self.series.close
    }

    #[must_use]
    pub fn tick_volume(&self) -> &'a TimeSeries<i64> {
        &self.series.tick_volume
    }

    #[must_use]
    pub fn volume(&self) -> &'a TimeSeries<i64> {
        &self.series.volume
    }
}

/// Fixed set of output slots owned by one indicator.
///
/// Slots are declared by [`Calculate::init`] and looked up by index by
/// plotting and downstream indicators.
#[derive(Clone, Debug, Default)]
pub struct Outputs {
    slots: Vec<Option<IndicatorBuffer>>,
}

impl Outputs {
    /// `slots` undeclared slots.
    #[must_use]
    pub fn new(slots: usize) -> Self {
        Self {
            slots: vec![None; slots],
        }
    }

    /// Number of slots, declared or not.
    #[must_use]
    pub fn slots(&self) -> usize {
        self.slots.len()
    }

    /// Registers a fresh buffer at `index`, replacing any earlier one.
    ///
    /// # Errors
    ///
    /// [`Error::NoSuchOutput`] if `index` is not a slot.
    pub fn declare(&mut self, index: usize, kind: BufferKind) -> Result<()> {
        let slots = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(Error::NoSuchOutput { index, slots })?;
        *slot = Some(IndicatorBuffer::with_kind(kind));
        Ok(())
    }

    /// Declared buffer at `index`.
    ///
    /// # Errors
    ///
    /// [`Error::NoSuchOutput`] if the slot does not exist or is undeclared.
    pub fn get(&self, index: usize) -> Result<&IndicatorBuffer> {
        self.slots
            .get(index)
            .and_then(Option::as_ref)
            .ok_or(Error::NoSuchOutput {
                index,
                slots: self.slots.len(),
            })
    }

    /// Mutable access to the declared buffer at `index`.
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub fn get_mut(&mut self, index: usize) -> Result<&mut IndicatorBuffer> {
        let slots = self.slots.len();
        self.slots
            .get_mut(index)
            .and_then(Option::as_mut)
            .ok_or(Error::NoSuchOutput { index, slots })
    }

    /// Sets the plot shift of the buffer at `index`.
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub fn set_shift(&mut self, index: usize, shift: i32) -> Result<()> {
        self.get_mut(index)?.set_shift(shift);
        Ok(())
    }

    /// Declared buffers with their slot index.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &IndicatorBuffer)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|buffer| (i, buffer)))
    }

    pub(crate) fn resize_all(&mut self, len: usize) {
        for buffer in self.slots.iter_mut().flatten() {
            buffer.resize(len);
        }
    }

    pub(crate) fn set_order_all(&mut self, order: IndexOrder) {
        for buffer in self.slots.iter_mut().flatten() {
            buffer.set_order(order);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.slots.fill(None);
    }
}
