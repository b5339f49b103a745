//! Session loading and per-method inference.

use anyhow::{Context, Result};
use rsi_common::InferenceOptions;
use rsi_infer::{CancellationToken, InferenceResult, MetadataAggregator, SymbolCache};
use rsi_ops::{AnalysisSession, MethodEntry};
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

use crate::args::CliArgs;

/// Outcome for one method of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodReport {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<InferenceResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub methods: Vec<MethodReport>,
}

impl Report {
    /// True when every analyzed method resolved every return path.
    pub fn fully_resolved(&self) -> bool {
        self.methods.iter().all(|method| {
            method
                .result
                .as_ref()
                .is_some_and(|result| result.all_returns_resolved)
        })
    }
}

pub fn load_session(path: &Path) -> Result<AnalysisSession> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read session {}", path.display()))?;
    AnalysisSession::from_json(&text)
        .with_context(|| format!("failed to parse session {}", path.display()))
}

pub fn load_options(path: Option<&Path>) -> Result<InferenceOptions> {
    let Some(path) = path else {
        return Ok(InferenceOptions::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    InferenceOptions::from_json(&text)
        .with_context(|| format!("failed to parse config {}", path.display()))
}

/// Analyze the selected methods of `session`.
pub fn analyze(
    session: &AnalysisSession,
    options: &InferenceOptions,
    only: &[String],
    cancellation: &CancellationToken,
) -> Report {
    let cache = SymbolCache::new(&session.symbols, options);
    let aggregator = MetadataAggregator::new(&session.operations, &session.symbols, &cache);

    let selected = session
        .methods
        .iter()
        .filter(|entry| only.is_empty() || only.iter().any(|name| *name == entry.name));

    let mut report = Report::default();
    for entry in selected {
        report.methods.push(analyze_method(session, &aggregator, entry, cancellation));
    }
    info!(methods = report.methods.len(), "analysis finished");
    report
}

fn analyze_method(
    session: &AnalysisSession,
    aggregator: &MetadataAggregator<'_>,
    entry: &MethodEntry,
    cancellation: &CancellationToken,
) -> MethodReport {
    if !session.is_method_body(entry.body) {
        warn!(method = %entry.name, body = entry.body.0, "method body node is missing");
        return MethodReport {
            name: entry.name.clone(),
            result: None,
            error: Some(format!("node {} is not a method body", entry.body.0)),
        };
    }

    match aggregator.infer(entry.body, cancellation) {
        Ok(result) => MethodReport {
            name: entry.name.clone(),
            result: Some(result),
            error: None,
        },
        Err(err) => MethodReport {
            name: entry.name.clone(),
            result: None,
            error: Some(err.to_string()),
        },
    }
}

/// Load, analyze and serialize according to `args`.
pub fn run(args: &CliArgs) -> Result<(Report, String)> {
    let session = load_session(&args.session)?;
    let options = load_options(args.config.as_deref())?;

    let report = analyze(&session, &options, &args.methods, &CancellationToken::new());
    let json = if args.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .context("failed to serialize report")?;
    Ok((report, json))
}
