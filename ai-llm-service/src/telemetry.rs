use std::io::{self, IsTerminal};

use tracing::Level;
use tracing_subscriber::filter::{Directive, ParseError};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, filter, fmt};

/// Log targets owned by the NicorAI backend workspace.
///
/// The formatting layer renders only events whose target starts with one of these.
pub const WORKSPACE_TARGETS: &[&str] = &[
    "nicorai_backend",
    "ai_llm_service",
    "rag_store",
    "responder",
    "api",
    "content_sync",
];

/// RFC3339 UTC timer implemented via `chrono`.
/// Example output: `2026-10-19T10:20:30Z`
#[derive(Clone, Debug, Default)]
pub struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let s = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        w.write_str(&s)
    }
}

fn is_workspace_target(target: &str) -> bool {
    WORKSPACE_TARGETS.iter().any(|p| {
        target == *p
            || target
                .strip_prefix(p)
                .is_some_and(|rest| rest.starts_with("::"))
    })
}

/// Formatting layer that renders only events emitted by workspace crates.
///
/// Compact single-line output with RFC3339 UTC timestamps, `file:line`,
/// span close timings and ANSI colors when stdout is a terminal.
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let use_ansi = io::stdout().is_terminal();
    let only_workspace = filter::filter_fn(|meta| is_workspace_target(meta.target()));

    fmt::layer()
        .with_timer(ChronoRfc3339Utc)
        .with_level(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(use_ansi)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .event_format(fmt::format().compact().with_source_location(true))
        .with_filter(only_workspace)
}

/// Builds `target=level` directives for every workspace crate.
pub fn level_directives(level: Level) -> Result<Vec<Directive>, ParseError> {
    let level = level.as_str().to_lowercase();
    WORKSPACE_TARGETS
        .iter()
        .map(|t| format!("{t}={level}").parse())
        .collect()
}

/// `EnvFilter` from `RUST_LOG` (or `default`), raised to `level` for workspace crates.
///
/// Directives already present in `RUST_LOG` for a workspace crate take precedence.
pub fn env_filter_with_level(default: &str, level: Level) -> EnvFilter {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let mut base = match &from_env {
        Some(spec) => EnvFilter::try_new(spec).unwrap_or_else(|_| EnvFilter::new(default)),
        None => EnvFilter::new(default),
    };

    let explicit = from_env.unwrap_or_default();
    if let Ok(directives) = level_directives(level) {
        for d in directives {
            let target = d.to_string();
            let crate_name = target.split('=').next().unwrap_or_default();
            if !explicit.contains(crate_name) {
                base = base.add_directive(d);
            }
        }
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_crate_and_module_targets_only() {
        assert!(is_workspace_target("responder"));
        assert!(is_workspace_target("rag_store::retrieve"));
        assert!(!is_workspace_target("responders"));
        assert!(!is_workspace_target("hyper::proto"));
        assert!(!is_workspace_target("apiary"));
    }

    #[test]
    fn builds_one_directive_per_workspace_crate() {
        let ds = level_directives(Level::DEBUG).unwrap();
        assert_eq!(ds.len(), WORKSPACE_TARGETS.len());
        assert_eq!(ds[2].to_string(), "rag_store=debug");
    }
}
