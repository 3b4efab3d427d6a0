#![allow(dead_code)]

use quantedge_rates::{
    Bar, BarStore, BufferKind, Calculate, Indicator, IndicatorBuffer, Outputs, Rates, Result,
    SeriesCalculate, SharedBars,
};
use serde::{Deserialize, de::DeserializeOwned};

/// OHLCV bar parsed from the Binance CSV export.
#[derive(Debug, Clone, Deserialize)]
pub struct RefBar {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub tick_volume: i64,
    pub volume: i64,
}

impl From<&RefBar> for Bar {
    fn from(r: &RefBar) -> Self {
        Bar::new(r.time, r.open, r.high, r.low, r.close).with_volume(r.tick_volume, r.volume)
    }
}

const OHLCV_PATH: &str = "tests/fixtures/data/btcusdt-1h.csv";

/// Load reference OHLCV bars, oldest first.
pub fn load_reference_bars() -> Vec<Bar> {
    load_records::<RefBar>(OHLCV_PATH, "invalid OHLCV record")
        .iter()
        .map(Bar::from)
        .collect()
}

/// Store holding every bar but the last as closed history, the last one
/// forming.
pub fn store_from(bars: &[Bar]) -> SharedBars {
    let (forming, history) = bars.split_last().expect("at least one bar");
    BarStore::with_history(history.to_vec(), *forming).shared()
}

/// Assert two f64 values are within tolerance.
pub fn assert_near(actual: f64, expected: f64, tolerance: f64, context: &str) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "{context}: expected {expected:.10}, got {actual:.10}, diff {diff:.2e} > tolerance {tolerance:.2e}"
    );
}

/// Assert two buffers hold the same values, `NaN` matching `NaN`.
pub fn assert_series_match(live: &[f64], full: &[f64], tolerance: f64) {
    assert_eq!(live.len(), full.len(), "length mismatch");
    for (i, (l, f)) in live.iter().zip(full).enumerate() {
        match (l.is_nan(), f.is_nan()) {
            (true, true) => {}
            (false, false) => assert_near(*l, *f, tolerance, &format!("bar {i}")),
            _ => panic!("warmup mismatch at bar {i}: live={l}, full={f}"),
        }
    }
}

/// Creates intermediate states of a forming bar to simulate live ticks.
///
/// Returns 2 intermediate bars (with shifted close/high/low) followed
/// by the original bar. All share the same `time`.
pub fn repaint_sequence(bar: &Bar) -> Vec<Bar> {
    vec![
        // First tick: only open is known, close near open
        Bar {
            high: bar.open * 1.001,
            low: bar.open * 0.999,
            close: bar.open * 1.0005,
            tick_volume: 1,
            volume: 1,
            ..*bar
        },
        // Mid-bar: partial movement toward final values
        Bar {
            high: bar.open.midpoint(bar.high),
            low: bar.open.midpoint(bar.low),
            close: bar.open.midpoint(bar.close),
            tick_volume: bar.tick_volume / 2,
            volume: bar.volume / 2,
            ..*bar
        },
        // Final: real OHLCV values
        *bar,
    ]
}

/// Replays `bars` the way a live feed would: every bar forms over a
/// repaint sequence with an update per tick, then closes and the next
/// one starts. Returns the store, which must outlive the indicator's use.
pub fn replay_live<C: Calculate>(bars: &[Bar], indicator: &mut Indicator<C>) -> SharedBars {
    let first = repaint_sequence(&bars[0]);
    let store = BarStore::new(first[0]).shared();
    indicator.bind(&store).expect("bind");

    for (i, bar) in bars.iter().enumerate() {
        if i > 0 {
            store.borrow_mut().close_forming(repaint_sequence(bar)[0]);
        }
        for tick in repaint_sequence(bar) {
            store.borrow_mut().update_forming(|forming| *forming = tick);
            indicator.update().expect("update");
        }
    }

    store
}

/// Simple moving average over a price series. `NaN` until `period`
/// prices are available from `begin`.
#[derive(Debug, Clone)]
pub struct Sma {
    pub period: usize,
}

impl SeriesCalculate for Sma {
    fn init(&mut self, outputs: &mut Outputs) -> Result<()> {
        outputs.declare(0, BufferKind::Data)
    }

    fn calculate_series(
        &mut self,
        rates: &Rates<'_>,
        begin: usize,
        price: &IndicatorBuffer,
        outputs: &mut Outputs,
    ) -> Result<usize> {
        let out = outputs.get_mut(0)?;
        #[allow(clippy::cast_precision_loss)]
        let period = self.period as f64;

        for i in rates.window() {
            if i + 1 < begin + self.period {
                out.set(i, f64::NAN)?;
                continue;
            }
            let mut sum = 0.0;
            for j in i + 1 - self.period..=i {
                sum += price.get(j)?;
            }
            out.set(i, sum / period)?;
        }

        Ok(rates.rates_total())
    }
}

fn load_records<D>(path: &str, expect_msg: &str) -> Vec<D>
where
    D: DeserializeOwned,
{
    let mut rdr =
        csv::Reader::from_path(path).unwrap_or_else(|e| panic!("failed to open {path}: {e}"));

    rdr.deserialize().map(|r| r.expect(expect_msg)).collect()
}
