//! Incremental indicator buffers over a growing OHLCV bar series.
//!
//! A bar source owns a [`BarStore`]: closed bars plus one forming bar whose
//! values change in place. An [`Indicator`] binds to that store through
//! non-owning [`TimeSeries`] views and keeps one [`IndicatorBuffer`] per
//! declared output. Each [`update`](Indicator::update) recomputes only the
//! bars that are new or were still forming last time, tracked by the
//! `prev_calculated` watermark.
//!
//! Concrete indicators implement [`Calculate`]. [`PriceReducer`] is the
//! reference step; [`OnPrice`] adapts single-series steps
//! ([`SeriesCalculate`]) to full bars.
//!
//! # Example
//!
//! ```
//! use quantedge_rates::{AppliedPrice, Bar, BarStore, PriceReducer, PriceReducerConfig};
//!
//! let bars = BarStore::new(Bar::new(0, 10.0, 12.0, 8.0, 11.0)).shared();
//! let mut typical = PriceReducer::indicator(PriceReducerConfig::new(AppliedPrice::Typical));
//! typical.bind(&bars)?;
//! typical.update()?;
//!
//! bars.borrow_mut().update_forming(|bar| bar.tick(14.0));
//! typical.update()?;
//!
//! // (14 + 8 + 14) / 3
//! assert_eq!(typical.output(0)?.get(0)?, 12.0);
//! # Ok::<(), quantedge_rates::Error>(())
//! ```

mod applied_price;
mod bar_store;
mod buffer;
mod engine;
mod error;
mod indicator;
mod ohlcv;
mod reducer;
mod time_series;

pub use crate::applied_price::AppliedPrice;
pub use crate::bar_store::{BarStore, SharedBars};
pub use crate::buffer::{BufferKind, IndicatorBuffer, Scalar};
pub use crate::engine::Indicator;
pub use crate::error::{Error, Result};
pub use crate::indicator::{Calculate, Dependency, Outputs, Rates, Update};
pub use crate::ohlcv::{Bar, Ohlcv, Price, Timestamp};
pub use crate::reducer::{
    OnPrice, PriceReducer, PriceReducerConfig, PriceReducerConfigBuilder, SeriesCalculate,
};
pub use crate::time_series::{IndexOrder, TimeSeries};

#[cfg(test)]
mod test_util;
