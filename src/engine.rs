use crate::{
    BufferKind, Calculate, Dependency, Error, IndexOrder, IndicatorBuffer, Outputs, Rates, Result,
    SharedBars, Timestamp, Update, indicator::SeriesSet,
};

use std::{cell::RefCell, fmt::Debug, rc::Rc};

/// Incremental recompute engine for one indicator.
///
/// Owns the indicator's output buffers and a finalization watermark
/// (`prev_calculated`). Each [`update`](Self::update) brings dependencies
/// up to date, sizes every buffer to the current bar count, and hands the
/// calculation step only the bars from `prev_calculated - 1` onward: the
/// newly appended bars plus the one that was still forming last time.
///
/// Single-threaded and non-reentrant. Buffers may be read between
/// updates, never during one.
///
/// # Example
///
/// ```
/// use quantedge_rates::{AppliedPrice, Bar, BarStore, PriceReducer, PriceReducerConfig};
///
/// let bars = BarStore::new(Bar::new(0, 10.0, 12.0, 8.0, 11.0)).shared();
/// let mut median = PriceReducer::indicator(PriceReducerConfig::new(AppliedPrice::Median));
///
/// median.bind(&bars).unwrap();
/// median.update().unwrap();
/// assert_eq!(median.output(0).unwrap().get(0), Ok(10.0));
///
/// bars.borrow_mut().close_forming(Bar::new(60, 11.0, 15.0, 11.0, 14.0));
/// median.update().unwrap();
/// assert_eq!(median.output(0).unwrap().get(1), Ok(13.0));
/// assert_eq!(median.prev_calculated(), 2);
/// ```
pub struct Indicator<C> {
    calc: C,
    outputs: Outputs,
    series: Option<SeriesSet>,
    depends: Vec<Dependency>,
    rates_total: usize,
    prev_calculated: usize,
    first_time: Option<Timestamp>,
}

impl<C: Calculate> Indicator<C> {
    /// Unbound indicator with `slots` output slots.
    #[must_use]
    pub fn new(calc: C, slots: usize) -> Self {
        Self {
            calc,
            outputs: Outputs::new(slots),
            series: None,
            depends: Vec::new(),
            rates_total: 0,
            prev_calculated: 0,
            first_time: None,
        }
    }

    /// Wraps the indicator for use as a [`Dependency`] of another one.
    #[must_use]
    pub fn shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }

    /// Creates the bar views, runs [`Calculate::init`] and resets the
    /// watermark.
    ///
    /// Outputs start from what `init` declares. Buffers added through
    /// [`declare_output`](Self::declare_output) or shifts set through
    /// [`set_plot_shift`](Self::set_plot_shift) do not survive
    /// [`unbind`](Self::unbind) and must be applied again after rebinding.
    ///
    /// # Errors
    ///
    /// [`Error::AlreadyBound`] unless [`unbind`](Self::unbind) ran first,
    /// or any error from `init`, in which case the indicator stays unbound.
    pub fn bind(&mut self, bars: &SharedBars) -> Result<()> {
        if self.series.is_some() {
            return Err(Error::AlreadyBound);
        }

        self.outputs.clear();
        self.calc.init(&mut self.outputs)?;

        self.series = Some(SeriesSet::new(bars));
        self.rates_total = 0;
        self.prev_calculated = 0;
        self.first_time = None;

        tracing::debug!(
            slots = self.outputs.slots(),
            declared = self.outputs.iter().count(),
            "indicator bound"
        );
        Ok(())
    }

    /// Releases the bar views and undeclares every output.
    pub fn unbind(&mut self) {
        if self.series.take().is_some() {
            self.outputs.clear();
            self.rates_total = 0;
            self.prev_calculated = 0;
            self.first_time = None;
            tracing::debug!("indicator unbound");
        }
    }

    #[inline]
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.series.is_some()
    }

    /// Drops the watermark so the next update recomputes every bar.
    pub fn reset(&mut self) {
        tracing::debug!(prev_calculated = self.prev_calculated, "watermark reset");
        self.prev_calculated = 0;
    }

    /// Appends an indicator that is updated before this one.
    ///
    /// Dependencies are updated depth-first in insertion order. Cycles are
    /// not rejected here; one surfaces at update time as
    /// [`Error::Reentrant`].
    pub fn depends_on(&mut self, dependency: Dependency) {
        self.depends.push(dependency);
    }

    /// Registers a fresh buffer at `index` outside of [`Calculate::init`].
    ///
    /// Replacing a buffer discards its values, so once anything has settled
    /// the watermark drops to 0 and the next update recomputes every bar.
    ///
    /// # Errors
    ///
    /// [`Error::NotBound`] before [`bind`](Self::bind), or
    /// [`Error::NoSuchOutput`] if `index` is not a slot.
    pub fn declare_output(&mut self, index: usize, kind: BufferKind) -> Result<()> {
        if self.series.is_none() {
            return Err(Error::NotBound);
        }

        self.outputs.declare(index, kind)?;
        if self.prev_calculated > 0 {
            tracing::debug!(
                index,
                prev_calculated = self.prev_calculated,
                "output redeclared, watermark reset"
            );
            self.prev_calculated = 0;
        }
        Ok(())
    }

    /// Sets the display shift of output `index`.
    ///
    /// # Errors
    ///
    /// [`Error::NotBound`] before [`bind`](Self::bind), or
    /// [`Error::NoSuchOutput`] if the slot is missing or undeclared.
    pub fn set_plot_shift(&mut self, index: usize, shift: i32) -> Result<()> {
        if self.series.is_none() {
            return Err(Error::NotBound);
        }
        self.outputs.set_shift(index, shift)
    }

    /// Declared output buffer at `index`.
    ///
    /// # Errors
    ///
    /// [`Error::NoSuchOutput`] if the slot is missing or undeclared.
    pub fn output(&self, index: usize) -> Result<&IndicatorBuffer> {
        self.outputs.get(index)
    }

    /// Mutable output access for consumers, e.g. to flip indexing order
    /// between updates.
    ///
    /// # Errors
    ///
    /// [`Error::NoSuchOutput`] if the slot is missing or undeclared.
    pub fn output_mut(&mut self, index: usize) -> Result<&mut IndicatorBuffer> {
        self.outputs.get_mut(index)
    }

    #[must_use]
    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    /// The calculation step.
    #[must_use]
    pub fn calc(&self) -> &C {
        &self.calc
    }

    /// Bars settled by the last update.
    #[inline]
    #[must_use]
    pub fn prev_calculated(&self) -> usize {
        self.prev_calculated
    }

    /// Buffer length after the last update.
    #[inline]
    #[must_use]
    pub fn rates_total(&self) -> usize {
        self.rates_total
    }

    /// Brings the outputs up to date with the bound bars.
    ///
    /// # Errors
    ///
    /// Dependency errors, [`Error::Reentrant`] when a dependency is already
    /// mid-update, bar view errors, calculation errors, and
    /// [`Error::WatermarkOverrun`]. On error the watermark is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the indicator was never bound.
    pub fn update(&mut self) -> Result<()> {
        let Some(series) = self.series.as_mut() else {
            panic!("update() called before bind()");
        };

        for dependency in &self.depends {
            dependency
                .try_borrow_mut()
                .map_err(|_| Error::Reentrant)?
                .update()?;
        }

        // A render pass may have left views or buffers reversed.
        series.set_order(IndexOrder::Chronological);
        self.outputs.set_order_all(IndexOrder::Chronological);

        let rates_total = series.len()?;
        let first_time = series.time.get(0)?;
        if rates_total < self.rates_total {
            tracing::warn!(
                rates_total,
                previous = self.rates_total,
                "bar list shrank, recomputing from scratch"
            );
            self.prev_calculated = 0;
        } else if self.first_time.is_some_and(|time| time != first_time) {
            tracing::warn!(
                first_time,
                previous = self.first_time,
                "bar list history replaced, recomputing from scratch"
            );
            self.prev_calculated = 0;
        }
        self.outputs.resize_all(rates_total);
        self.rates_total = rates_total;
        self.first_time = Some(first_time);

        let rates = Rates::new(rates_total, self.prev_calculated, series);
        tracing::trace!(
            rates_total,
            prev_calculated = self.prev_calculated,
            limit = rates.limit(),
            "calculating"
        );

        let calculated = self.calc.calculate(&rates, &mut self.outputs)?;
        if calculated > rates_total {
            return Err(Error::WatermarkOverrun {
                returned: calculated,
                rates_total,
            });
        }

        self.prev_calculated = calculated;
        Ok(())
    }
}

impl<C: Debug> Debug for Indicator<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Indicator")
            .field("calc", &self.calc)
            .field("outputs", &self.outputs)
            .field("bound", &self.series.is_some())
            .field("depends", &self.depends.len())
            .field("rates_total", &self.rates_total)
            .field("prev_calculated", &self.prev_calculated)
            .field("first_time", &self.first_time)
            .finish()
    }
}

impl<C: Calculate> Update for Indicator<C> {
    fn update(&mut self) -> Result<()> {
        Indicator::update(self)
    }
}
