use crate::{Ohlcv, Price};

use std::{
    convert::Infallible,
    fmt::Display,
    str::FromStr,
};

/// Price reduced from a bar's OHLC values before feeding a single-series
/// indicator.
///
/// Unknown selectors, numeric or textual, resolve to [`Close`](Self::Close)
/// instead of failing.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Default, Debug)]
pub enum AppliedPrice {
    /// Closing price.
    #[default]
    Close,
    /// Opening price.
    Open,
    /// Highest price.
    High,
    /// Lowest price.
    Low,
    /// Median price: `(high + low) / 2`.
    Median,
    /// Typical price: `(high + low + close) / 3`.
    Typical,
    /// Weighted close: `(high + low + close + close) / 4`.
    Weighted,
}

impl Display for AppliedPrice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl AppliedPrice {
    /// Maps the numeric selector used by terminal configurations
    /// (`1..=7`: close, open, high, low, median, typical, weighted).
    #[must_use]
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            1 => Self::Close,
            2 => Self::Open,
            3 => Self::High,
            4 => Self::Low,
            5 => Self::Median,
            6 => Self::Typical,
            7 => Self::Weighted,
            _ => {
                tracing::debug!(raw, "unknown applied price, using close");
                Self::Close
            }
        }
    }

    /// Numeric selector, inverse of [`from_raw`](Self::from_raw).
    #[must_use]
    pub fn to_raw(self) -> i32 {
        match self {
            Self::Close => 1,
            Self::Open => 2,
            Self::High => 3,
            Self::Low => 4,
            Self::Median => 5,
            Self::Typical => 6,
            Self::Weighted => 7,
        }
    }

    /// Reduces an OHLC quadruple to one price.
    #[inline]
    #[must_use]
    pub fn reduce(self, open: Price, high: Price, low: Price, close: Price) -> Price {
        match self {
            Self::Open => open,
            Self::High => high,
            Self::Low => low,
            Self::Close => close,
            Self::Median => (high + low) / 2.0,
            Self::Typical => (high + low + close) / 3.0,
            Self::Weighted => (high + low + close + close) / 4.0,
        }
    }

    /// [`reduce`](Self::reduce) over any [`Ohlcv`] bar.
    #[inline]
    #[must_use]
    pub fn extract(self, ohlcv: &impl Ohlcv) -> Price {
        self.reduce(ohlcv.open(), ohlcv.high(), ohlcv.low(), ohlcv.close())
    }
}

impl From<i32> for AppliedPrice {
    fn from(raw: i32) -> Self {
        Self::from_raw(raw)
    }
}

impl FromStr for AppliedPrice {
    type Err = Infallible;

    /// Case-insensitive name (`"median"`, `"PRICE_MEDIAN"`, `"hl2"`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let name = name.strip_prefix("price_").unwrap_or(&name);

        Ok(match name {
            "close" => Self::Close,
            "open" => Self::Open,
            "high" => Self::High,
            "low" => Self::Low,
            "median" | "hl2" => Self::Median,
            "typical" | "hlc3" => Self::Typical,
            "weighted" | "hlcc4" => Self::Weighted,
            other => {
                tracing::debug!(selector = other, "unknown applied price, using close");
                Self::Close
            }
        })
    }
}
