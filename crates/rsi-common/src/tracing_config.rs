//! Opt-in tracing subscriber for inspecting inference decisions.
//!
//! `RSI_LOG` holds filter directives (same syntax as `RUST_LOG`, which is
//! used when `RSI_LOG` is absent). `RSI_LOG_FORMAT` picks the output:
//!
//! | Format | Output |
//! |--------|--------|
//! | `text` (default) | flat `fmt` lines |
//! | `tree` | `tracing-tree`: one `infer_method` span per method, each `inspect_return` nested below it |
//! | `json` | newline-delimited JSON events |
//!
//! ```bash
//! RSI_LOG=debug RSI_LOG_FORMAT=tree rsi session.json
//! RSI_LOG="rsi_infer::inspector=trace" rsi session.json
//! ```
//!
//! Output always goes to stderr; stdout carries the JSON report.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

pub const LOG_ENV: &str = "RSI_LOG";
pub const LOG_FORMAT_ENV: &str = "RSI_LOG_FORMAT";
const FALLBACK_LOG_ENV: &str = "RUST_LOG";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Tree,
    Json,
}

impl LogFormat {
    /// Parse a format name; unknown names fall back to `Text`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Resolved logging settings. `directives` is None when logging is off.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TracingConfig {
    pub directives: Option<String>,
    pub format: LogFormat,
}

impl TracingConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve settings through `lookup` (an environment-variable reader).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let directives = lookup(LOG_ENV).or_else(|| lookup(FALLBACK_LOG_ENV));
        let format = lookup(LOG_FORMAT_ENV)
            .map(|value| LogFormat::parse(&value))
            .unwrap_or_default();
        Self { directives, format }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.directives.is_some()
    }

    /// Install the global subscriber. Returns false when logging is off or a
    /// subscriber is already installed.
    pub fn install(&self) -> bool {
        let Some(directives) = self.directives.as_deref() else {
            return false;
        };
        let filter = EnvFilter::builder().parse_lossy(directives);

        match self.format {
            LogFormat::Tree => {
                let layer = tracing_tree::HierarchicalLayer::new(2)
                    .with_writer(std::io::stderr)
                    .with_indent_lines(true)
                    .with_deferred_spans(true)
                    .with_targets(true);
                Registry::default().with(filter).with(layer).try_init().is_ok()
            }
            LogFormat::Json => {
                let layer = fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr);
                Registry::default().with(filter).with(layer).try_init().is_ok()
            }
            LogFormat::Text => fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init()
                .is_ok(),
        }
    }
}

/// Install the subscriber described by the environment, if any.
pub fn init_tracing() {
    TracingConfig::from_env().install();
}
