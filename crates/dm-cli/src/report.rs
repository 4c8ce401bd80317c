use dm_core::{AnalysisConfig, CutflowReport, Histogram, PipelineOutput};
use serde::Serialize;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub tool: String,
    pub tool_version: String,
    pub created_unix_ms: u128,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistogramSummary {
    pub bins: usize,
    pub low: f64,
    pub up: f64,
    pub entries: u64,
    pub underflow: u64,
    pub overflow: u64,
    pub nan: u64,
    pub max_count: u64,
}

impl HistogramSummary {
    fn of(h: &Histogram) -> Self {
        Self {
            bins: h.n_bins(),
            low: h.low(),
            up: h.up(),
            entries: h.entries(),
            underflow: h.underflow(),
            overflow: h.overflow(),
            nan: h.nan(),
            max_count: h.max_count(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Timing {
    pub load_ms: f64,
    pub event_loop_ms: f64,
    pub events_per_second: f64,
}

/// Machine-readable summary of one `dimuon run`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub meta: RunMeta,
    pub dataset: String,
    pub locator: String,
    pub events_processed: usize,
    pub config: AnalysisConfig,
    pub cutflow: CutflowReport,
    pub histogram: HistogramSummary,
    pub timing: Timing,
}

impl RunReport {
    pub fn new(config: &AnalysisConfig, out: &PipelineOutput, load_time: Duration) -> Self {
        let loop_s = out.elapsed.as_secs_f64();
        let events_per_second =
            if loop_s > 0.0 { out.events_processed as f64 / loop_s } else { 0.0 };
        Self {
            meta: RunMeta {
                tool: "dimuon".into(),
                tool_version: env!("CARGO_PKG_VERSION").into(),
                created_unix_ms: SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_millis())
                    .unwrap_or(0),
            },
            dataset: config.dataset.name.clone(),
            locator: config.dataset.locator.clone(),
            events_processed: out.events_processed,
            config: config.clone(),
            cutflow: out.cutflow.clone(),
            histogram: HistogramSummary::of(&out.histogram),
            timing: Timing {
                load_ms: load_time.as_secs_f64() * 1e3,
                event_loop_ms: loop_s * 1e3,
                events_per_second,
            },
        }
    }
}

/// `(label, count)` lines, one per stage, in selection order.
pub fn format_counts(cutflow: &CutflowReport) -> String {
    let mut s = String::new();
    for e in &cutflow.entries {
        s.push_str(&format!("{}: {}\n", e.label, e.pass));
    }
    s
}
