/// A price value.
///
/// Semantic alias for [`f64`]. Documents intent in function signatures
/// without introducing newtype construction overhead.
pub type Price = f64;

/// Bar open timestamp.
///
/// Signed so that sources using epoch offsets or sentinel values before
/// 1970 round-trip unchanged.
pub type Timestamp = i64;

/// Read access to the OHLC prices of a bar.
///
/// [`Bar`] implements it; implement it on your own kline type to feed
/// [`AppliedPrice::extract`](crate::AppliedPrice::extract) without
/// conversion.
pub trait Ohlcv {
    /// Opening price of the bar.
    fn open(&self) -> Price;

    /// Highest price during the bar.
    fn high(&self) -> Price;

    /// Lowest price during the bar.
    fn low(&self) -> Price;

    /// Closing (or latest) price of the bar.
    fn close(&self) -> Price;
}

/// One OHLCV record for a fixed time interval.
///
/// Closed bars are never mutated. The forming bar held by
/// [`BarStore`](crate::BarStore) changes in place until it is closed.
///
/// # Example
///
/// ```
/// use quantedge_rates::{Bar, Ohlcv};
///
/// let bar = Bar::new(60, 10.0, 12.0, 8.0, 11.0).with_volume(42, 4200);
/// assert_eq!(bar.high(), 12.0);
/// assert_eq!(bar.tick_volume, 42);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bar {
    pub time: Timestamp,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub tick_volume: i64,
    pub volume: i64,
}

impl Bar {
    /// Bar with the given time and prices and zero volumes.
    #[must_use]
    pub fn new(time: Timestamp, open: Price, high: Price, low: Price, close: Price) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            tick_volume: 0,
            volume: 0,
        }
    }

    /// Sets tick and real volume.
    #[must_use]
    pub fn with_volume(mut self, tick_volume: i64, volume: i64) -> Self {
        self.tick_volume = tick_volume;
        self.volume = volume;
        self
    }

    /// Folds a trade price into the bar: moves the close and widens the
    /// high/low range if needed.
    pub fn tick(&mut self, price: Price) {
        self.close = price;
        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.tick_volume += 1;
    }
}

impl Ohlcv for Bar {
    #[inline]
    fn open(&self) -> Price {
        self.open
    }

    #[inline]
    fn high(&self) -> Price {
        self.high
    }

    #[inline]
    fn low(&self) -> Price {
        self.low
    }

    #[inline]
    fn close(&self) -> Price {
        self.close
    }
}
