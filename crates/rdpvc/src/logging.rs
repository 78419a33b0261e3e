//! stderr diagnostics for the CLI.
//!
//! `--log-level` applies to the rdpvc crates only; everything else stays at
//! `warn`. `RDPVC_LOG` takes a full filter string and overrides both, e.g.
//! `RDPVC_LOG=rdpvc_frame::writer=trace` to see every emitted chunk.

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an explicit filter directive string.
pub const LOG_ENV: &str = "RDPVC_LOG";

/// Crates whose events follow `--log-level`.
const FRAMING_TARGETS: [&str; 3] = ["rdpvc", "rdpvc_frame", "rdpvc_transport"];

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    /// Includes one event per chunk sent or validated.
    Trace,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Filter directives for `level`: framing crates at `level`, the rest at warn.
pub fn default_directives(level: LogLevel) -> String {
    let mut directives = vec!["warn".to_string()];
    directives.extend(
        FRAMING_TARGETS
            .iter()
            .map(|target| format!("{target}={}", level.directive())),
    );
    directives.join(",")
}

fn build_filter(level: LogLevel, env_override: Option<String>) -> EnvFilter {
    env_override
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .unwrap_or_else(|| EnvFilter::new(default_directives(level)))
}

pub fn init_logging(format: LogFormat, level: LogLevel) {
    let filter = build_filter(level, std::env::var(LOG_ENV).ok());
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true);

    match format {
        LogFormat::Text => {
            let _ = builder.try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().try_init();
        }
    }
}
