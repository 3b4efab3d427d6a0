mod fixtures;

use fixtures::{assert_series_match, load_reference_bars, replay_live, store_from};
use quantedge_rates::{
    AppliedPrice, BufferKind, Calculate, Error, Indicator, Outputs, PriceReducer,
    PriceReducerConfig, Rates, Result, SharedBars,
};
use std::{cell::RefCell, rc::Rc};

type Log = Rc<RefCell<Vec<&'static str>>>;

/// Distance of the close from an upstream reduced price.
struct CloseSpread {
    name: &'static str,
    upstream: Rc<RefCell<Indicator<PriceReducer>>>,
    log: Log,
}

impl Calculate for CloseSpread {
    fn init(&mut self, outputs: &mut Outputs) -> Result<()> {
        outputs.declare(0, BufferKind::Data)
    }

    fn calculate(&mut self, rates: &Rates<'_>, outputs: &mut Outputs) -> Result<usize> {
        self.log.borrow_mut().push(self.name);

        let upstream = self.upstream.borrow();
        let reference = upstream.output(0)?;
        let out = outputs.get_mut(0)?;
        for i in rates.window() {
            out.set(i, rates.close().get(i)? - reference.get(i)?)?;
        }
        Ok(rates.rates_total())
    }
}

/// Sum of two upstream spreads.
struct Sum {
    inputs: [Rc<RefCell<Indicator<CloseSpread>>>; 2],
    log: Log,
}

impl Calculate for Sum {
    fn init(&mut self, outputs: &mut Outputs) -> Result<()> {
        outputs.declare(0, BufferKind::Data)
    }

    fn calculate(&mut self, rates: &Rates<'_>, outputs: &mut Outputs) -> Result<usize> {
        self.log.borrow_mut().push("sum");

        let a = self.inputs[0].borrow();
        let b = self.inputs[1].borrow();
        let (a, b) = (a.output(0)?, b.output(0)?);
        let out = outputs.get_mut(0)?;
        for i in rates.window() {
            out.set(i, a.get(i)? + b.get(i)?)?;
        }
        Ok(rates.rates_total())
    }
}

struct Graph {
    sum: Indicator<Sum>,
    log: Log,
}

fn graph() -> Graph {
    let log = Log::default();

    let spread = |name, source| {
        let upstream = PriceReducer::indicator(PriceReducerConfig::new(source)).shared();
        let mut ind = Indicator::new(
            CloseSpread {
                name,
                upstream: Rc::clone(&upstream),
                log: Rc::clone(&log),
            },
            1,
        );
        ind.depends_on(upstream);
        ind.shared()
    };

    let median = spread("median", AppliedPrice::Median);
    let typical = spread("typical", AppliedPrice::Typical);

    let mut sum = Indicator::new(
        Sum {
            inputs: [Rc::clone(&median), Rc::clone(&typical)],
            log: Rc::clone(&log),
        },
        1,
    );
    sum.depends_on(median);
    sum.depends_on(typical);

    Graph { sum, log }
}

/// Binds the whole tree to `bars`. Upstream reducers are reached through
/// the spread steps.
fn bind_all(graph: &mut Graph, bars: &SharedBars) {
    for input in &graph.sum.calc().inputs {
        let mut spread = input.borrow_mut();
        spread.calc().upstream.borrow_mut().bind(bars).unwrap();
        spread.bind(bars).unwrap();
    }
    graph.sum.bind(bars).unwrap();
}

#[test]
fn dependencies_run_depth_first_in_order() {
    let bars = load_reference_bars();
    let store = store_from(&bars[..10]);
    let mut graph = graph();
    bind_all(&mut graph, &store);

    graph.sum.update().unwrap();

    assert_eq!(*graph.log.borrow(), vec!["median", "typical", "sum"]);
}

#[test]
fn tree_matches_direct_formula() {
    let bars = load_reference_bars();
    let store = store_from(&bars);
    let mut graph = graph();
    bind_all(&mut graph, &store);
    graph.sum.update().unwrap();

    let expected: Vec<f64> = bars
        .iter()
        .map(|b| {
            let median = (b.high + b.low) / 2.0;
            let typical = (b.high + b.low + b.close) / 3.0;
            (b.close - median) + (b.close - typical)
        })
        .collect();

    assert_series_match(graph.sum.output(0).unwrap().as_slice(), &expected, 1e-9);
}

#[test]
fn tree_updates_incrementally() {
    let bars = load_reference_bars();

    let mut full = graph();
    let full_store = store_from(&bars);
    bind_all(&mut full, &full_store);
    full.sum.update().unwrap();

    let mut live = graph();
    let live_store = store_from(&bars[..1]);
    bind_all(&mut live, &live_store);
    live.sum.update().unwrap();
    for bar in &bars[1..] {
        live_store.borrow_mut().close_forming(*bar);
        live.sum.update().unwrap();
    }

    assert_series_match(
        live.sum.output(0).unwrap().as_slice(),
        full.sum.output(0).unwrap().as_slice(),
        1e-9,
    );
}

#[test]
fn standalone_reducer_replay_settles_every_bar() {
    let bars = load_reference_bars();
    let mut reducer = PriceReducer::indicator(PriceReducerConfig::default());
    let _store = replay_live(&bars, &mut reducer);
    assert_eq!(reducer.prev_calculated(), bars.len());
    assert_eq!(reducer.rates_total(), bars.len());
}

#[test]
fn shared_dependency_mid_update_is_reentrant() {
    let bars = load_reference_bars();
    let store = store_from(&bars[..5]);
    let mut graph = graph();
    bind_all(&mut graph, &store);

    let spread = Rc::clone(&graph.sum.calc().inputs[0]);
    let _held = spread.borrow_mut();
    assert_eq!(graph.sum.update(), Err(Error::Reentrant));
}
