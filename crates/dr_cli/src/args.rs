// crates/dr_cli/src/args.rs
//
// Deterministic, offline CLI argument parsing & validation.
// - No networked paths (reject http/https schemes)
// - --catalog, --dimensioning, --request are always required local files
// - --strategy parses into dr_core::domain::PlacementStrategy
// - No environment variables are consulted (§6).

use clap::Parser;
use std::{
    env,
    fs,
    path::PathBuf,
};

use dr_core::domain::PlacementStrategy;

#[derive(Debug, Parser)]
pub struct Args {
    /// RuleCatalog JSON document (§4.1).
    #[arg(long)]
    pub catalog: PathBuf,

    /// DimensioningLookup JSON document (§6).
    #[arg(long)]
    pub dimensioning: PathBuf,

    /// DeploymentInput JSON document to validate.
    #[arg(long)]
    pub request: PathBuf,

    /// Optional PodFlavorTable JSON document (§6, metrics enrichment only).
    #[arg(long)]
    pub pod_flavor: Option<PathBuf>,

    /// Run the placement planner after a successful validation.
    #[arg(long)]
    pub plan: bool,

    /// Placement strategy passed to the planner when `--plan` is set.
    #[arg(long, default_value = "balanced")]
    pub strategy: String,

    /// Output directory for `result.json` and rendered reports.
    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    /// Report formats to render into `--out` (repeatable). Defaults to `text`.
    #[arg(long, value_parser = ["json", "text"], num_args = 0..=2)]
    pub render: Vec<String>,

    #[arg(short = 'v', long)]
    pub verbose: bool,
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

#[derive(Debug)]
pub enum CliError {
    NonLocalPath(String),
    NotFound(String),
    BadStrategy(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use CliError::*;
        match self {
            NonLocalPath(p) => write!(f, "path must be local file (no scheme): {p}"),
            NotFound(p) => write!(f, "file not found: {p}"),
            BadStrategy(s) => write!(f, "unknown placement strategy: {s}"),
        }
    }
}
impl std::error::Error for CliError {}

/// Parsed CLI args plus the validated inputs main.rs needs downstream.
pub struct ParsedArgs {
    pub catalog: PathBuf,
    pub dimensioning: PathBuf,
    pub request: PathBuf,
    pub pod_flavor: Option<PathBuf>,
    pub plan: bool,
    pub strategy: PlacementStrategy,
    pub out: PathBuf,
    pub render: Vec<String>,
    pub verbose: bool,
    pub quiet: bool,
}

/// Entry point used by main.rs
pub fn parse_and_validate() -> Result<ParsedArgs, CliError> {
    let mut args = Args::parse();

    if args.render.is_empty() {
        args.render.push("text".to_string());
    }

    ensure_local_exists(&args.catalog, "--catalog")?;
    ensure_local_exists(&args.dimensioning, "--dimensioning")?;
    ensure_local_exists(&args.request, "--request")?;
    if let Some(p) = &args.pod_flavor {
        ensure_local_exists(p, "--pod-flavor")?;
    }

    let strategy = args
        .strategy
        .parse::<PlacementStrategy>()
        .map_err(|_| CliError::BadStrategy(args.strategy.clone()))?;

    Ok(ParsedArgs {
        catalog: normalize_path(&args.catalog),
        dimensioning: normalize_path(&args.dimensioning),
        request: normalize_path(&args.request),
        pod_flavor: args.pod_flavor.as_ref().map(normalize_path),
        plan: args.plan,
        strategy,
        out: normalize_path(&args.out),
        render: args.render,
        verbose: args.verbose,
        quiet: args.quiet,
    })
}

/// Ensure a path is local (no scheme) and exists as a file.
fn ensure_local_exists(p: &PathBuf, label: &'static str) -> Result<(), CliError> {
    let s = p.to_string_lossy().to_string();
    if has_scheme(&s) {
        return Err(CliError::NonLocalPath(format!("{label} {s}")));
    }
    let meta = fs::metadata(p).map_err(|_| CliError::NotFound(format!("{label} {s}")))?;
    if !meta.is_file() {
        return Err(CliError::NotFound(format!("{label} {s}")));
    }
    Ok(())
}

/// Best-effort normalization to an absolute canonical path.
fn normalize_path(p: &PathBuf) -> PathBuf {
    fs::canonicalize(p).unwrap_or_else(|_| {
        if p.is_absolute() {
            p.clone()
        } else {
            env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join(p)
        }
    })
}

fn has_scheme(s: &str) -> bool {
    s.contains("://") || s.starts_with("http:") || s.starts_with("https:")
}
