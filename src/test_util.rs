// src/test_util.rs

use crate::{Bar, BarStore, Price, SharedBars, Timestamp};

/// Asserts that two `f64` values are approximately equal using a
/// relative epsilon of `4 * f64::EPSILON`.
macro_rules! assert_approx {
    ($actual:expr, $expected:expr) => {{
        let (a, e) = ($actual, $expected);
        assert!(
            (a - e).abs() < e.abs() * 4.0 * f64::EPSILON,
            "assert_approx failed: actual={a}, expected={e}, diff={}",
            (a - e).abs(),
        );
    }};
}

pub(crate) use assert_approx;

/// Convenience: bar with just a close price and timestamp (OHLC all equal to close).
pub fn bar(close: Price, time: Timestamp) -> Bar {
    Bar::new(time, close, close, close, close)
}

/// Shared store whose closed history is `closes` followed by a forming bar at `forming`.
pub fn store(closes: &[Price], forming: Price) -> SharedBars {
    let history = closes
        .iter()
        .zip(0..)
        .map(|(&close, time)| bar(close, time))
        .collect::<Vec<_>>();
    let time = Timestamp::try_from(closes.len()).expect("test history fits i64");
    BarStore::with_history(history, bar(forming, time)).shared()
}
