//! dimuon CLI

mod report;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dm_core::{AnalysisConfig, MassPolicy, run_pipeline};
use dm_io::DatasetLocator;
use dm_viz::{MassSpectrumArtifact, VizConfig};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::report::RunReport;

#[derive(Parser)]
#[command(name = "dimuon")]
#[command(about = "Dimuon invariant-mass spectrum from CMS open data")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Select opposite-charge muon pairs, histogram their mass, print the cut-flow
    Run {
        /// Analysis config (YAML or JSON). Flags below override its values.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Input dataset: local path or file:// URI (.parquet, or .root with the `root` feature)
        #[arg(short, long)]
        input: Option<String>,

        /// Dataset display name
        #[arg(long)]
        name: Option<String>,

        /// TTree name for ROOT inputs
        #[arg(long)]
        tree: Option<String>,

        /// Process only the first N events
        #[arg(long, conflicts_with = "all_events")]
        max_events: Option<u64>,

        /// Process every event (no event-count ceiling)
        #[arg(long)]
        all_events: bool,

        /// Negative radicand handling in the mass formula
        #[arg(long, value_enum)]
        mass_policy: Option<MassPolicyArg>,

        /// Number of histogram bins
        #[arg(long)]
        bins: Option<usize>,

        /// Histogram lower edge (GeV)
        #[arg(long)]
        low: Option<f64>,

        /// Histogram upper edge (GeV)
        #[arg(long)]
        up: Option<f64>,

        /// Threads (0 = auto, 1 = sequential).
        #[arg(long)]
        threads: Option<usize>,

        /// Write the mass spectrum plot (SVG)
        #[arg(long)]
        plot: Option<PathBuf>,

        /// Write the plot artifact JSON (re-render later with `dimuon render`)
        #[arg(long)]
        artifact: Option<PathBuf>,

        /// Write the run report (pretty JSON)
        #[arg(long)]
        report: Option<PathBuf>,

        #[command(flatten)]
        style: StyleArgs,
    },

    /// Render a plot artifact JSON to SVG
    Render {
        /// Artifact JSON written by `dimuon run --artifact`
        #[arg(short, long)]
        input: PathBuf,

        /// Output SVG file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        style: StyleArgs,
    },

    /// Print the schema and event count of a dataset
    Inspect {
        /// Input dataset: local path or file:// URI
        #[arg(short, long)]
        input: String,

        /// TTree name for ROOT inputs
        #[arg(long, default_value = dm_core::config::DEFAULT_TREE_NAME)]
        tree: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print version
    Version,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum MassPolicyArg {
    /// Floor the radicand at zero (mass 0)
    Clamp,
    /// Keep the negative radicand (mass NaN, counted as `nan`)
    #[value(alias = "nan")]
    Propagate,
}

impl From<MassPolicyArg> for MassPolicy {
    fn from(arg: MassPolicyArg) -> Self {
        match arg {
            MassPolicyArg::Clamp => MassPolicy::Clamp,
            MassPolicyArg::Propagate => MassPolicy::Propagate,
        }
    }
}

#[derive(clap::Args)]
struct StyleArgs {
    /// Built-in plot theme (dimuon, cms, minimal)
    #[arg(long)]
    theme: Option<String>,

    /// YAML file overriding plot settings on top of the theme
    #[arg(long)]
    viz_config: Option<PathBuf>,
}

struct RunArgs {
    config: Option<PathBuf>,
    input: Option<String>,
    name: Option<String>,
    tree: Option<String>,
    max_events: Option<u64>,
    all_events: bool,
    mass_policy: Option<MassPolicyArg>,
    bins: Option<usize>,
    low: Option<f64>,
    up: Option<f64>,
    threads: Option<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt().with_max_level(cli.log_level).with_target(false).init();

    match cli.command {
        Commands::Run {
            config,
            input,
            name,
            tree,
            max_events,
            all_events,
            mass_policy,
            bins,
            low,
            up,
            threads,
            plot,
            artifact,
            report,
            style,
        } => {
            let args = RunArgs {
                config,
                input,
                name,
                tree,
                max_events,
                all_events,
                mass_policy,
                bins,
                low,
                up,
                threads,
            };
            cmd_run(args, plot.as_ref(), artifact.as_ref(), report.as_ref(), &style)
        }
        Commands::Render { input, output, style } => cmd_render(&input, &output, &style),
        Commands::Inspect { input, tree, json } => cmd_inspect(&input, &tree, json),
        Commands::Version => {
            println!("dimuon {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn cmd_run(
    args: RunArgs,
    plot: Option<&PathBuf>,
    artifact: Option<&PathBuf>,
    report: Option<&PathBuf>,
    style: &StyleArgs,
) -> Result<()> {
    let config = resolve_analysis_config(args)?;
    // Fail on a bad theme before spending time in the event loop.
    let viz = if plot.is_some() { Some(load_viz_config(style)?) } else { None };

    if config.threads > 0 {
        // Best-effort; if a global pool already exists, keep going.
        let _ = rayon::ThreadPoolBuilder::new().num_threads(config.threads).build_global();
    }

    let locator = DatasetLocator::parse(&config.dataset.locator);
    let max_events = config.max_events.map(|n| usize::try_from(n).unwrap_or(usize::MAX));

    let t0 = Instant::now();
    let events = dm_io::load_events(&locator, &config.dataset.tree, max_events)
        .with_context(|| format!("failed to load dataset {locator}"))?;
    let load_time = t0.elapsed();
    tracing::info!(events = events.len(), load_ms = load_time.as_millis() as u64, "dataset ready");

    let out = run_pipeline(&events, &config).context("analysis failed")?;

    print!("{}", report::format_counts(&out.cutflow));
    print!("{}", out.cutflow);

    if plot.is_some() || artifact.is_some() {
        let spectrum = MassSpectrumArtifact::from_histogram(
            &out.histogram,
            &out.cutflow,
            &config.dataset.name,
            out.events_processed as u64,
        );
        if let Some(path) = artifact {
            let json = spectrum.to_json_pretty()?;
            write_text(path, &json)?;
            tracing::info!(path = %path.display(), "artifact written");
        }
        if let (Some(path), Some(viz)) = (plot, viz.as_ref()) {
            dm_viz::render_to_file(&spectrum, path, viz)
                .with_context(|| format!("failed to write plot {}", path.display()))?;
        }
    }

    if let Some(path) = report {
        let value = serde_json::to_value(RunReport::new(&config, &out, load_time))?;
        write_json(Some(path), value)?;
    }
    Ok(())
}

fn cmd_render(input: &Path, output: &Path, style: &StyleArgs) -> Result<()> {
    let viz = load_viz_config(style)?;
    let json = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read artifact {}", input.display()))?;
    let artifact = MassSpectrumArtifact::from_json(&json)
        .with_context(|| format!("invalid artifact {}", input.display()))?;
    dm_viz::render_to_file(&artifact, output, &viz)
        .with_context(|| format!("failed to write plot {}", output.display()))?;
    Ok(())
}

fn cmd_inspect(input: &str, tree: &str, json: bool) -> Result<()> {
    let locator = DatasetLocator::parse(input);
    let summary = dm_io::inspect_dataset(&locator, tree)
        .with_context(|| format!("failed to inspect {locator}"))?;
    if json {
        write_json(None, serde_json::to_value(&summary)?)
    } else {
        print!("{summary}");
        Ok(())
    }
}

fn resolve_analysis_config(args: RunArgs) -> Result<AnalysisConfig> {
    let mut cfg = match &args.config {
        Some(path) => AnalysisConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };

    if let Some(input) = args.input {
        cfg.dataset.locator = input;
    }
    if let Some(name) = args.name {
        cfg.dataset.name = name;
    }
    if let Some(tree) = args.tree {
        cfg.dataset.tree = tree;
    }
    if args.all_events {
        cfg.max_events = None;
    } else if let Some(n) = args.max_events {
        cfg.max_events = Some(n);
    }
    if let Some(policy) = args.mass_policy {
        cfg.mass_policy = policy.into();
    }
    if let Some(bins) = args.bins {
        cfg.histogram.bins = bins;
    }
    if let Some(low) = args.low {
        cfg.histogram.low = low;
    }
    if let Some(up) = args.up {
        cfg.histogram.up = up;
    }
    if let Some(threads) = args.threads {
        cfg.threads = threads;
    }

    cfg.validate().context("invalid analysis configuration")?;
    tracing::debug!(?cfg, "resolved analysis config");
    Ok(cfg)
}

fn load_viz_config(style: &StyleArgs) -> Result<VizConfig> {
    let overlay = match &style.viz_config {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read viz config {}", path.display()))?,
        ),
        None => None,
    };
    dm_viz::resolve_config(style.theme.as_deref(), overlay.as_deref())
        .context("invalid plot configuration")
}

fn write_text(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
}

fn write_json(output: Option<&PathBuf>, value: serde_json::Value) -> Result<()> {
    let text = serde_json::to_string_pretty(&value)?;
    if let Some(path) = output {
        write_text(path, &text)?;
    } else {
        println!("{text}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> RunArgs {
        RunArgs {
            config: None,
            input: None,
            name: None,
            tree: None,
            max_events: None,
            all_events: false,
            mass_policy: None,
            bins: None,
            low: None,
            up: None,
            threads: None,
        }
    }

    #[test]
    fn flags_override_defaults() {
        let cfg = resolve_analysis_config(RunArgs {
            input: Some("skim.parquet".into()),
            max_events: Some(10),
            mass_policy: Some(MassPolicyArg::Propagate),
            bins: Some(50),
            threads: Some(1),
            ..args()
        })
        .unwrap();
        assert_eq!(cfg.dataset.locator, "skim.parquet");
        assert_eq!(cfg.max_events, Some(10));
        assert_eq!(cfg.mass_policy, MassPolicy::Propagate);
        assert_eq!(cfg.histogram.bins, 50);
        assert_eq!(cfg.histogram.up, 300.0);
        assert_eq!(cfg.threads, 1);
    }

    #[test]
    fn all_events_clears_ceiling() {
        let cfg = resolve_analysis_config(RunArgs { all_events: true, ..args() }).unwrap();
        assert_eq!(cfg.max_events, None);
    }

    #[test]
    fn mass_policy_flag_values() {
        let parse = |v: &str| Cli::try_parse_from(["dimuon", "run", "--mass-policy", v]);
        for (v, want) in [
            ("clamp", MassPolicy::Clamp),
            ("propagate", MassPolicy::Propagate),
            ("nan", MassPolicy::Propagate),
        ] {
            let Commands::Run { mass_policy, .. } = parse(v).unwrap().command else {
                panic!("expected run");
            };
            assert_eq!(mass_policy.map(MassPolicy::from), Some(want));
        }
        assert!(parse("abs").is_err());
    }

    #[test]
    fn bad_flags_rejected() {
        assert!(resolve_analysis_config(RunArgs { low: Some(500.0), ..args() }).is_err());
    }
}
