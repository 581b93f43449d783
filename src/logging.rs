//! Logging setup
//!
//! Diagnostics go through `tracing` to stderr, leaving stdout to the console
//! sink.
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Full `EnvFilter` directives, wins over everything else
//! - `FLAGWATCH_LOG_LEVEL=trace|debug|info|warn|error|off` - Default `info`
//! - `FLAGWATCH_LOG_FORMAT=pretty|compact|json` - Default `compact`

use std::env;
use tracing_subscriber::EnvFilter;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Pretty,
    Compact,
    Json,
}

impl Format {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Some(Format::Pretty),
            "compact" => Some(Format::Compact),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

/// Normalize a level name into an `EnvFilter` directive.
pub fn parse_level(s: &str) -> Option<&'static str> {
    match s.trim().to_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" | "warning" => Some("warn"),
        "error" => Some("error"),
        "off" | "none" => Some("off"),
        _ => None,
    }
}

fn filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }

    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = env::var("FLAGWATCH_LOG_LEVEL")
            .ok()
            .and_then(|s| parse_level(&s))
            .unwrap_or("info");
        EnvFilter::new(level)
    })
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(verbose: bool) {
    let format = env::var("FLAGWATCH_LOG_FORMAT")
        .ok()
        .and_then(|s| Format::parse(&s))
        .unwrap_or(Format::Compact);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_writer(std::io::stderr);

    let result = match format {
        Format::Pretty => builder.pretty().try_init(),
        Format::Compact => builder.compact().try_init(),
        Format::Json => builder.json().try_init(),
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Some("debug"));
        assert_eq!(parse_level("WARNING"), Some("warn"));
        assert_eq!(parse_level("none"), Some("off"));
        assert_eq!(parse_level("loud"), None);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(Format::parse("pretty"), Some(Format::Pretty));
        assert_eq!(Format::parse(" JSON "), Some(Format::Json));
        assert_eq!(Format::parse("xml"), None);
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(false);
        init(true);
    }
}
