// crates/dr_cli/src/main.rs
//
// DR-ENGINE v0 — CLI entrypoint
// Loads a RuleCatalog + DimensioningLookup + DeploymentInput, runs the
// engine's validate() entry point, writes result.json, and renders the
// requested report formats. Strictly offline: no network, no env vars.

mod args;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use args::{parse_and_validate, ParsedArgs};
use dr_catalog::canonical_json::write_canonical_file;
use dr_catalog::dimensioning::JsonDimensioningTable;
use dr_catalog::pod_flavor::{JsonPodFlavorTable, PodFlavorTable};
use dr_catalog::rule_catalog::RuleCatalog;
use dr_core::domain::{DeploymentInput, ValidateOptions, ValidationResult};

const RESULT_FILE: &str = "result.json";

fn main() -> ExitCode {
    let args = match parse_and_validate() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("dr: error: {e}");
            return ExitCode::from(2);
        }
    };

    init_tracing(args.verbose, args.quiet);

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("dr: error: {e}");
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    use tracing_subscriber::EnvFilter;
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::new(level);
    tracing_subscriber::fmt().with_env_filter(filter).without_time().init();
}

fn run(args: ParsedArgs) -> Result<ExitCode, String> {
    fs::create_dir_all(&args.out).map_err(|e| format!("cannot create output directory {}: {e}", args.out.display()))?;

    let catalog = RuleCatalog::load(&args.catalog).map_err(|e| format!("loading catalog: {e}"))?;
    let dimensioning = JsonDimensioningTable::load(&args.dimensioning).map_err(|e| format!("loading dimensioning table: {e}"))?;
    let pod_flavor: JsonPodFlavorTable = match &args.pod_flavor {
        Some(path) => JsonPodFlavorTable::load(path).map_err(|e| format!("loading pod-flavor table: {e}"))?,
        None => JsonPodFlavorTable::empty(),
    };

    let request_text = fs::read_to_string(&args.request).map_err(|e| format!("reading request {}: {e}", args.request.display()))?;
    let input: DeploymentInput = serde_json::from_str(&request_text).map_err(|e| format!("parsing request: {e}"))?;

    let options = ValidateOptions { generate_plan: args.plan, strategy: args.strategy };
    let result = dr_pipeline::orchestrator::validate(&input, &catalog, &dimensioning, options);

    write_result(&args.out, &result)?;
    render_reports(&args.out, &result, &args.render, &pod_flavor)?;

    if !args.quiet {
        println!("dr: verdict={} violations={}", if result.success { "PASS" } else { "FAIL" }, result.violations.len());
        println!("dr: artifacts written to {}", args.out.display());
    }

    Ok(if result.success { ExitCode::from(0) } else { ExitCode::from(1) })
}

fn write_result(out_dir: &Path, result: &ValidationResult) -> Result<(), String> {
    let value = serde_json::to_value(result).map_err(|e| format!("serializing result: {e}"))?;
    let path = out_dir.join(RESULT_FILE);
    write_canonical_file(&path, &value).map_err(|e| format!("writing {}: {e}", path.display()))
}

fn render_reports(out_dir: &Path, result: &ValidationResult, formats: &[String], pod_flavor: &dyn PodFlavorTable) -> Result<(), String> {
    for fmt in formats {
        match fmt.as_str() {
            "text" => {
                let text = dr_report::render_text::render_text(result, pod_flavor);
                let path = out_dir.join("report.txt");
                write_bytes_atomically(&path, text.as_bytes()).map_err(|e| format!("writing {}: {e}", path.display()))?;
            }
            #[cfg(feature = "report-json")]
            "json" => {
                let value = dr_report::render_json::render_json(result, pod_flavor);
                let path = out_dir.join("report.json");
                write_canonical_file(&path, &value).map_err(|e| format!("writing {}: {e}", path.display()))?;
            }
            other => eprintln!("dr: warning: unknown --render format: {other}"),
        }
    }
    Ok(())
}

/// Write bytes with a single trailing LF and atomic rename (teacher's own pattern).
fn write_bytes_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = tmp_path_for(path);
    {
        let mut f = fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        if !bytes.last().is_some_and(|b| *b == b'\n') {
            f.write_all(b"\n")?;
        }
        f.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_path_for(final_path: &Path) -> PathBuf {
    let mut s = final_path.as_os_str().to_owned();
    s.push(".tmp");
    PathBuf::from(s)
}
