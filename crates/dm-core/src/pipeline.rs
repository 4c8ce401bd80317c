//! Single-pass select → reduce → aggregate over an [`EventTable`].

use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::accumulator::Accumulator;
use crate::config::AnalysisConfig;
use crate::cutflow::{CutflowReport, Stage};
use crate::error::{Error, Result};
use crate::event::EventTable;
use crate::histogram::Histogram;

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Filled di-muon mass histogram.
    pub histogram: Histogram,
    /// Per-stage event counts.
    pub cutflow: CutflowReport,
    /// Events read after the event-count ceiling was applied.
    pub events_processed: usize,
    /// Wall time spent in the event loop.
    pub elapsed: Duration,
}

/// Run the analysis over the first `config.max_events` events of `events`.
///
/// With `config.threads == 1` (or a single chunk of input) the loop is
/// sequential. Otherwise chunks of `config.chunk_size` events are processed
/// into private accumulators that are merged at the end: on a dedicated pool
/// of `config.threads` workers when that differs from the current pool size,
/// on the current rayon pool when `config.threads == 0`. The output does not
/// depend on the thread count.
pub fn run_pipeline(events: &EventTable, config: &AnalysisConfig) -> Result<PipelineOutput> {
    config.validate()?;

    let n = match config.max_events {
        Some(max) => events.len().min(usize::try_from(max).unwrap_or(usize::MAX)),
        None => events.len(),
    };
    if n < events.len() {
        tracing::info!(total = events.len(), kept = n, "applying event-count ceiling");
    }

    let proto = Accumulator::new(Histogram::from_config(&config.histogram)?, config.mass_policy);
    let chunk = config.chunk_size;
    let start = Instant::now();

    let acc = if config.threads == 1 || n <= chunk {
        let mut acc = proto;
        for row in 0..n {
            acc.observe_event(&events.event(row));
        }
        acc
    } else if config.threads > 1 && config.threads != rayon::current_num_threads() {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build()
            .map_err(|e| Error::Computation(format!("failed to build thread pool: {e}")))?;
        pool.install(|| fill_parallel(events, n, chunk, &proto))?
    } else {
        fill_parallel(events, n, chunk, &proto)?
    };

    let elapsed = start.elapsed();
    let (histogram, cutflow) = acc.finalize();
    tracing::info!(
        events = n,
        selected = cutflow.count(Stage::OppositeCharge).unwrap_or(0),
        elapsed_ms = elapsed.as_millis() as u64,
        "event loop complete"
    );

    Ok(PipelineOutput { histogram, cutflow, events_processed: n, elapsed })
}

/// Fill the first `n` events in chunks on the current rayon pool.
fn fill_parallel(
    events: &EventTable,
    n: usize,
    chunk: usize,
    proto: &Accumulator,
) -> Result<Accumulator> {
    let n_chunks = n.div_ceil(chunk);
    tracing::debug!(n_chunks, chunk, threads = rayon::current_num_threads(), "parallel fill");
    (0..n_chunks)
        .into_par_iter()
        .map(|c| {
            let mut acc = proto.clone();
            for row in c * chunk..((c + 1) * chunk).min(n) {
                acc.observe_event(&events.event(row));
            }
            Ok(acc)
        })
        .try_reduce(|| proto.clone(), Accumulator::merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Muon;

    fn mu(pt: f32, phi: f32, charge: i32) -> Muon {
        Muon { pt, eta: 0.0, phi, mass: 0.105, charge }
    }

    fn three_events() -> EventTable {
        let mut t = EventTable::new();
        t.push_event(&[mu(20.0, 0.0, 1), mu(15.0, 1.0, -1), mu(5.0, 2.0, 1)]);
        t.push_event(&[mu(20.0, 0.0, 1), mu(20.0, 3.14159, 1)]);
        t.push_event(&[mu(20.0, 0.0, 1), mu(20.0, 3.14159, -1)]);
        t
    }

    #[test]
    fn max_events_truncates_prefix() {
        let cfg = AnalysisConfig { max_events: Some(2), ..Default::default() };
        let out = run_pipeline(&three_events(), &cfg).unwrap();
        assert_eq!(out.events_processed, 2);
        assert_eq!(out.cutflow.count(Stage::Loaded), Some(2));
        assert_eq!(out.cutflow.count(Stage::OppositeCharge), Some(0));
        assert_eq!(out.histogram.entries(), 0);
    }

    #[test]
    fn no_ceiling_processes_everything() {
        let cfg = AnalysisConfig { max_events: None, ..Default::default() };
        let out = run_pipeline(&three_events(), &cfg).unwrap();
        assert_eq!(out.events_processed, 3);
        assert_eq!(out.histogram.entries(), 1);
    }

    #[test]
    fn tiny_chunks_match_sequential() {
        let events = three_events();
        let seq = AnalysisConfig { threads: 1, ..Default::default() };
        let par = AnalysisConfig { threads: 0, chunk_size: 1, ..Default::default() };
        let a = run_pipeline(&events, &seq).unwrap();
        let b = run_pipeline(&events, &par).unwrap();
        assert_eq!(a.histogram, b.histogram);
        assert_eq!(a.cutflow, b.cutflow);
    }

    #[test]
    fn explicit_thread_count_matches_sequential() {
        let mut events = EventTable::new();
        for _ in 0..50 {
            events.extend_from(&three_events());
        }
        let seq = AnalysisConfig { threads: 1, ..Default::default() };
        let seq = run_pipeline(&events, &seq).unwrap();
        for threads in [2, 3, 7] {
            let cfg = AnalysisConfig { threads, chunk_size: 4, ..Default::default() };
            let out = run_pipeline(&events, &cfg).unwrap();
            assert_eq!(out.events_processed, 150);
            assert_eq!(out.histogram, seq.histogram, "threads={threads}");
            assert_eq!(out.cutflow, seq.cutflow, "threads={threads}");
        }
    }
}
