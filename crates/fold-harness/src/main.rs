#![forbid(unsafe_code)]

//! Command-line harness for grouped field foldouts.
//!
//! Loads an object document, runs one enable/draw cycle, applies the
//! requested toggles, and prints the resulting outline.
//!
//! ```text
//! fold-harness <object.json> [--toggle PATH]... [--expand PATH]... [--collapse PATH]...
//! ```
//!
//! `--expand`/`--collapse` set a group's flag directly; `--toggle` clicks the
//! header during the draw, exactly as an interactive renderer would, so it
//! only reaches headers that are visible.
//!
//! # Environment
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `FOLD_HARNESS_CONFIG` | JSON `SessionConfig` file loaded before the overrides below |
//! | `FOLD_HARNESS_STATE_FIELD` | persisted-state field name |
//! | `FOLD_HARNESS_READ_ONLY` | comma-separated read-only fields |
//! | `FOLD_HARNESS_HIDDEN` | comma-separated hidden fields |
//! | `FOLD_HARNESS_SEGMENT_POLICY` | `permissive` or `strict` |
//! | `FOLD_HARNESS_WRITE_BACK` | write the canonical encoding on enable (flag) |
//! | `FOLD_HARNESS_GUIDES` | `ascii` or `unicode` |
//! | `FOLD_HARNESS_MAX_WIDTH` | truncate lines to this many columns |
//! | `FOLD_HARNESS_REPORT_JSON` | print the cycle report as JSON after the outline (flag) |
//! | `FOLD_LOG` | tracing filter, e.g. `fold_session=debug` |

use std::path::PathBuf;
use std::process::ExitCode;

use fold_core::SegmentPolicy;
use fold_session::{
    CycleReport, FileObject, FoldoutSession, OutlineGuides, OutlineRenderer, SessionConfig,
};
use tracing_subscriber::EnvFilter;

const USAGE: &str =
    "usage: fold-harness <object.json> [--toggle PATH]... [--expand PATH]... [--collapse PATH]...";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Toggle(String),
    Expand(String),
    Collapse(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Args {
    object: PathBuf,
    actions: Vec<Action>,
}

fn parse_args<I>(args: I) -> Result<Args, String>
where
    I: IntoIterator<Item = String>,
{
    let mut object = None;
    let mut actions = Vec::new();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let make: fn(String) -> Action = match arg.as_str() {
            "--toggle" => Action::Toggle,
            "--expand" => Action::Expand,
            "--collapse" => Action::Collapse,
            flag if flag.starts_with("--") => return Err(format!("unknown option {flag}")),
            _ => {
                if object.replace(PathBuf::from(&arg)).is_some() {
                    return Err(format!("unexpected argument {arg}"));
                }
                continue;
            }
        };
        let path = args.next().ok_or_else(|| format!("{arg} needs a group path"))?;
        actions.push(make(path));
    }
    let object = object.ok_or_else(|| "missing object document".to_owned())?;
    Ok(Args { object, actions })
}

// ─────────────────────────────────────────────────────────────────────────────
// Environment
// ─────────────────────────────────────────────────────────────────────────────

fn env_string(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn env_flag(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<bool> {
    let value = env_string(lookup, name)?;
    Some(matches!(
        value.as_str(),
        "1" | "true" | "TRUE" | "True" | "yes" | "YES" | "on" | "ON"
    ))
}

fn env_list(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<Vec<String>> {
    let value = env_string(lookup, name)?;
    Some(
        value
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_owned)
            .collect(),
    )
}

fn config_from_env(lookup: &impl Fn(&str) -> Option<String>) -> Result<SessionConfig, String> {
    let mut config = match env_string(lookup, "FOLD_HARNESS_CONFIG") {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| format!("failed to read config {path}: {e}"))?;
            serde_json::from_str(&text).map_err(|e| format!("invalid config {path}: {e}"))?
        }
        None => SessionConfig::default(),
    };

    if let Some(field) = env_string(lookup, "FOLD_HARNESS_STATE_FIELD") {
        config = config.with_state_field(field);
    }
    if let Some(fields) = env_list(lookup, "FOLD_HARNESS_READ_ONLY") {
        config = config.with_read_only(fields);
    }
    if let Some(fields) = env_list(lookup, "FOLD_HARNESS_HIDDEN") {
        config = config.with_hidden(fields);
    }
    if let Some(policy) = env_string(lookup, "FOLD_HARNESS_SEGMENT_POLICY") {
        let policy = match policy.to_ascii_lowercase().as_str() {
            "permissive" => SegmentPolicy::Permissive,
            "strict" => SegmentPolicy::Strict,
            other => return Err(format!("unknown segment policy {other}")),
        };
        config = config.with_segment_policy(policy);
    }
    if let Some(write_back) = env_flag(lookup, "FOLD_HARNESS_WRITE_BACK") {
        config = config.with_write_back_on_enable(write_back);
    }
    Ok(config)
}

fn outline_from_env(lookup: &impl Fn(&str) -> Option<String>) -> OutlineRenderer {
    let guides = match env_string(lookup, "FOLD_HARNESS_GUIDES").as_deref() {
        Some("ascii" | "ASCII") => OutlineGuides::Ascii,
        _ => OutlineGuides::Unicode,
    };
    let mut outline = OutlineRenderer::new()
        .with_guides(guides)
        .with_read_only_tag(" (read-only)");
    if let Some(width) =
        env_string(lookup, "FOLD_HARNESS_MAX_WIDTH").and_then(|w| w.parse::<usize>().ok())
    {
        outline = outline.with_max_width(width);
    }
    outline
}

fn report_json(report: &CycleReport) -> serde_json::Value {
    serde_json::json!({
        "grouped": report.grouped,
        "recovered_from_corruption": report.recovered_from_corruption,
        "matched": report.stats.matched,
        "fresh": report.stats.fresh,
        "stale": report.stats.stale,
        "rejected": report.rejected.iter().map(ToString::to_string).collect::<Vec<_>>(),
        "wrote_back": report.wrote_back,
        "toggled": report.toggled,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Run
// ─────────────────────────────────────────────────────────────────────────────

fn run(
    args: &Args,
    config: SessionConfig,
    mut outline: OutlineRenderer,
) -> Result<(Vec<String>, CycleReport), Box<dyn std::error::Error>> {
    let mut object = FileObject::open(&args.object)?;
    let annotations = object.annotations();
    let mut session = FoldoutSession::new(config);
    let mut report = session.enable(&mut object, &annotations)?;

    for action in &args.actions {
        match action {
            Action::Expand(path) => {
                session.set_expanded(path, true, &mut object)?;
            }
            Action::Collapse(path) => {
                session.set_expanded(path, false, &mut object)?;
            }
            Action::Toggle(path) => outline.click(path.clone()),
        }
    }

    report.toggled = session.draw(&mut object, &mut outline)?;
    for path in outline.pending_clicks() {
        tracing::warn!(path, "toggle target not visible, ignored");
    }
    Ok((outline.take_lines(), report))
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("FOLD_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_logging();

    let lookup = |name: &str| std::env::var(name).ok();
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}\n{USAGE}");
            return ExitCode::from(2);
        }
    };
    let config = match config_from_env(&lookup) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    match run(&args, config, outline_from_env(&lookup)) {
        Ok((lines, report)) => {
            for line in lines {
                println!("{line}");
            }
            if env_flag(&lookup, "FOLD_HARNESS_REPORT_JSON") == Some(true) {
                println!("{}", report_json(&report));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("fold-harness: {e}");
            ExitCode::FAILURE
        }
    }
}
