//! Integration: partial accumulators merge to the same result in any order.

use dm_core::{Accumulator, AnalysisConfig, EventTable, Histogram, MassPolicy, Muon, run_pipeline};

/// Deterministic pseudo-random events (64-bit LCG).
fn generated_events(n: usize) -> EventTable {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 40) as f32 / (1u64 << 24) as f32
    };

    let mut t = EventTable::new();
    for _ in 0..n {
        let count = (next() * 4.0) as usize;
        let muons: Vec<Muon> = (0..count)
            .map(|_| Muon {
                pt: 3.0 + 60.0 * next(),
                eta: -2.4 + 4.8 * next(),
                phi: -3.14159 + 6.28318 * next(),
                mass: 0.105_658,
                charge: if next() < 0.5 { -1 } else { 1 },
            })
            .collect();
        t.push_event(&muons);
    }
    t
}

fn fill(events: &EventTable, rows: impl Iterator<Item = usize>) -> Accumulator {
    let mut acc = Accumulator::new(Histogram::new(1000, 0.25, 300.0).unwrap(), MassPolicy::Clamp);
    for row in rows {
        acc.observe_event(&events.event(row));
    }
    acc
}

#[test]
fn merge_is_order_independent() {
    let events = generated_events(2_000);
    let n = events.len();

    let whole = fill(&events, 0..n);

    let a = fill(&events, (0..n).filter(|r| r % 3 == 0));
    let b = fill(&events, (0..n).filter(|r| r % 3 == 1));
    let c = fill(&events, (0..n).filter(|r| r % 3 == 2).rev());

    let abc = a.clone().merged(b.clone()).unwrap().merged(c.clone()).unwrap();
    let cba = c.merged(b).unwrap().merged(a).unwrap();

    assert_eq!(abc.histogram(), whole.histogram());
    assert_eq!(cba.histogram(), whole.histogram());
    assert_eq!(abc.cutflow(), whole.cutflow());
    assert_eq!(cba.cutflow(), whole.cutflow());
}

#[test]
fn parallel_pipeline_matches_sequential() {
    let events = generated_events(5_000);
    let seq = AnalysisConfig { threads: 1, max_events: None, ..Default::default() };
    let par = AnalysisConfig { threads: 0, chunk_size: 333, max_events: None, ..Default::default() };

    let a = run_pipeline(&events, &seq).unwrap();
    let b = run_pipeline(&events, &par).unwrap();
    assert_eq!(a.events_processed, 5_000);
    assert_eq!(a.histogram, b.histogram);
    assert_eq!(a.cutflow, b.cutflow);
    assert!(a.histogram.entries() > 0);
}
