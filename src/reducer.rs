use std::fmt::Display;

use crate::{
    AppliedPrice, BufferKind, Calculate, IndexOrder, Indicator, IndicatorBuffer, Outputs, Rates,
    Result,
};

/// Configuration for [`PriceReducer`].
///
/// # Example
///
/// ```rust
/// use quantedge_rates::{AppliedPrice, PriceReducerConfig};
///
/// let config = PriceReducerConfig::builder()
///     .source(AppliedPrice::Typical)
///     .shift(2)
///     .build();
/// assert_eq!(config.source(), AppliedPrice::Typical);
/// assert_eq!(config.to_string(), "PriceReducerConfig(Typical, 2)");
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Default, Debug)]
pub struct PriceReducerConfig {
    source: AppliedPrice,
    shift: i32,
}

impl PriceReducerConfig {
    /// Reducer on `source` with no plot shift.
    #[must_use]
    pub fn new(source: AppliedPrice) -> Self {
        Self::builder().source(source).build()
    }

    /// Reducer from a numeric terminal selector. Unknown values select
    /// [`AppliedPrice::Close`].
    #[must_use]
    pub fn from_raw(raw: i32) -> Self {
        Self::new(AppliedPrice::from_raw(raw))
    }

    #[must_use]
    pub fn builder() -> PriceReducerConfigBuilder {
        PriceReducerConfigBuilder::new()
    }

    #[must_use]
    pub fn source(&self) -> AppliedPrice {
        self.source
    }

    #[must_use]
    pub fn shift(&self) -> i32 {
        self.shift
    }
}

impl Display for PriceReducerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PriceReducerConfig({}, {})", self.source, self.shift)
    }
}

/// Builder for [`PriceReducerConfig`].
///
/// Defaults: source = [`AppliedPrice::Close`], shift = `0`.
pub struct PriceReducerConfigBuilder {
    source: AppliedPrice,
    shift: i32,
}

impl PriceReducerConfigBuilder {
    fn new() -> Self {
        Self {
            source: AppliedPrice::Close,
            shift: 0,
        }
    }

    #[must_use]
    pub fn source(mut self, source: AppliedPrice) -> Self {
        self.source = source;
        self
    }

    /// Plot shift in bars for the reduced-price output.
    #[must_use]
    pub fn shift(mut self, shift: i32) -> Self {
        self.shift = shift;
        self
    }

    #[must_use]
    pub fn build(self) -> PriceReducerConfig {
        PriceReducerConfig {
            source: self.source,
            shift: self.shift,
        }
    }
}

/// Reference calculation step: reduces every bar's OHLC to one price.
///
/// One [`BufferKind::Data`] output at slot `0`. Each update rewrites only
/// `[limit, rates_total)` and settles every bar it was given.
#[derive(Clone, Copy, Debug)]
pub struct PriceReducer {
    config: PriceReducerConfig,
}

impl PriceReducer {
    #[must_use]
    pub fn new(config: PriceReducerConfig) -> Self {
        Self { config }
    }

    /// Unbound engine around a reducer with its single output slot.
    #[must_use]
    pub fn indicator(config: PriceReducerConfig) -> Indicator<Self> {
        Indicator::new(Self::new(config), 1)
    }

    #[must_use]
    pub fn config(&self) -> &PriceReducerConfig {
        &self.config
    }
}

impl Calculate for PriceReducer {
    fn init(&mut self, outputs: &mut Outputs) -> Result<()> {
        outputs.declare(0, BufferKind::Data)?;
        outputs.set_shift(0, self.config.shift)
    }

    fn calculate(&mut self, rates: &Rates<'_>, outputs: &mut Outputs) -> Result<usize> {
        reduce_into(self.config.source, rates, outputs.get_mut(0)?)?;
        Ok(rates.rates_total())
    }
}

impl Display for PriceReducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PRICE({}, {})", self.config.source, self.config.shift)
    }
}

/// A calculation step over one price series instead of full bars.
///
/// Wrapped by [`OnPrice`], which reduces bars to prices first.
pub trait SeriesCalculate {
    /// Declares output buffers. Runs on every bind.
    ///
    /// # Errors
    ///
    /// Whatever [`Outputs`] reports for a bad slot.
    fn init(&mut self, outputs: &mut Outputs) -> Result<()>;

    /// Fills `outputs` over `rates.window()` from `price`, where `begin`
    /// is the first index holding meaningful input, and returns the new
    /// watermark.
    ///
    /// # Errors
    ///
    /// Any buffer error.
    fn calculate_series(
        &mut self,
        rates: &Rates<'_>,
        begin: usize,
        price: &IndicatorBuffer,
        outputs: &mut Outputs,
    ) -> Result<usize>;
}

/// Adapts a [`SeriesCalculate`] step to full bars.
///
/// Keeps a private applied-price buffer sized with the outputs, refreshes
/// it over the recompute window, then hands it to the wrapped step.
#[derive(Clone, Debug)]
pub struct OnPrice<S> {
    source: AppliedPrice,
    price: IndicatorBuffer,
    inner: S,
}

impl<S: SeriesCalculate> OnPrice<S> {
    #[must_use]
    pub fn new(source: AppliedPrice, inner: S) -> Self {
        Self {
            source,
            price: IndicatorBuffer::with_kind(BufferKind::Calculations),
            inner,
        }
    }

    /// Unbound engine around `inner` fed with `source` prices.
    #[must_use]
    pub fn indicator(source: AppliedPrice, inner: S, slots: usize) -> Indicator<Self> {
        Indicator::new(Self::new(source, inner), slots)
    }

    #[must_use]
    pub fn source(&self) -> AppliedPrice {
        self.source
    }

    /// Reduced prices from the last update.
    #[must_use]
    pub fn price(&self) -> &IndicatorBuffer {
        &self.price
    }

    #[must_use]
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: SeriesCalculate> Calculate for OnPrice<S> {
    fn init(&mut self, outputs: &mut Outputs) -> Result<()> {
        self.price = IndicatorBuffer::with_kind(BufferKind::Calculations);
        self.inner.init(outputs)
    }

    fn calculate(&mut self, rates: &Rates<'_>, outputs: &mut Outputs) -> Result<usize> {
        self.price.set_order(IndexOrder::Chronological);
        if self.price.len() > rates.rates_total() || rates.prev_calculated() == 0 {
            self.price.resize(0);
        }
        self.price.resize(rates.rates_total());

        reduce_into(self.source, rates, &mut self.price)?;
        self.inner.calculate_series(rates, 0, &self.price, outputs)
    }
}

fn reduce_into(source: AppliedPrice, rates: &Rates<'_>, out: &mut IndicatorBuffer) -> Result<()> {
    let (open, high, low, close) = (rates.open(), rates.high(), rates.low(), rates.close());
    for i in rates.window() {
        out.set(
            i,
            source.reduce(open.get(i)?, high.get(i)?, low.get(i)?, close.get(i)?),
        )?;
    }
    Ok(())
}
