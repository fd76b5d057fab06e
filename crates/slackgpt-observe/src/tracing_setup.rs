//! Tracing subscriber initialization with structured logging, an optional
//! log file, and optional OpenTelemetry trace export.
//!
//! # Usage
//!
//! ```no_run
//! use slackgpt_observe::tracing_setup::{init_tracing, LogOptions};
//!
//! // Stderr logging at info level
//! init_tracing(&LogOptions::default()).unwrap();
//! ```

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Stores the OTel tracer provider so it can be shut down cleanly on exit.
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// Default level when neither `RUST_LOG` nor an explicit level is given.
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("invalid log level: {0}")]
    InvalidLevel(String),

    #[error("unable to open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("tracing subscriber already initialized: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Logging settings resolved from configuration.
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Level or filter directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    /// Append log lines to this file in addition to stderr.
    pub file: Option<PathBuf>,
    /// Bridge spans to OpenTelemetry with a stdout exporter.
    pub otel: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
            otel: false,
        }
    }
}

/// Accept the level spellings commonly found in deployment configs
/// (`WARNING`, `CRITICAL`, ...) alongside tracing's own.
fn normalize_level(level: &str) -> String {
    match level.trim().to_ascii_lowercase().as_str() {
        "warning" => "warn".to_string(),
        "critical" | "fatal" => "error".to_string(),
        other => other.to_string(),
    }
}

/// Build the filter: `RUST_LOG` if set, otherwise `level`.
fn env_filter(level: &str) -> Result<EnvFilter, TracingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let directive = normalize_level(level);
    EnvFilter::try_new(&directive).map_err(|_| TracingError::InvalidLevel(level.to_string()))
}

/// Open `path` for appending, creating it if absent.
fn open_log_file(path: &Path) -> Result<Mutex<File>, TracingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(Mutex::new)
        .map_err(|source| TracingError::LogFile {
            path: path.to_path_buf(),
            source,
        })
}

/// Initialize the global tracing subscriber.
///
/// - Always installs a structured `fmt` layer on stderr with target
///   visibility and span close timing.
/// - When `options.file` is set, mirrors every line (without ANSI colors)
///   into that file, appending.
/// - When `options.otel` is true, additionally bridges tracing spans to
///   OpenTelemetry using a stdout exporter.
///
/// # Errors
///
/// Returns an error if the level is invalid, the log file cannot be opened,
/// or the global subscriber has already been set.
pub fn init_tracing(options: &LogOptions) -> Result<(), TracingError> {
    let env_filter = env_filter(&options.level)?;

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE);

    let file_layer = match &options.file {
        Some(path) => Some(
            tracing_subscriber::fmt::layer()
                .with_writer(open_log_file(path)?)
                .with_ansi(false)
                .with_target(true),
        ),
        None => None,
    };

    let otel_layer = if options.otel {
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build();
        let tracer = provider.tracer("slackgpt");

        // Store the provider for shutdown and register it globally.
        let _ = TRACER_PROVIDER.set(provider.clone());
        opentelemetry::global::set_tracer_provider(provider);

        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .with(otel_layer)
        .try_init()?;

    Ok(())
}

/// Flush pending traces and shut down the OpenTelemetry tracer provider.
///
/// Safe to call even when OTel was not enabled (no-op in that case).
pub fn shutdown_tracing() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            eprintln!("Warning: OTel tracer provider shutdown error: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_normalize_level() {
        assert_eq!(normalize_level("INFO"), "info");
        assert_eq!(normalize_level("WARNING"), "warn");
        assert_eq!(normalize_level("critical"), "error");
        assert_eq!(normalize_level(" debug "), "debug");
    }

    #[test]
    fn test_log_file_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slackgpt.log");
        std::fs::write(&path, "existing\n").unwrap();

        let writer = open_log_file(&path).unwrap();
        writeln!(writer.lock().unwrap(), "appended").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "existing\nappended\n");
    }

    #[test]
    fn test_log_file_receives_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.log");

        let subscriber = tracing_subscriber::fmt()
            .with_writer(open_log_file(&path).unwrap())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(user = "U1", "conversation created");
        });

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("conversation created"));
        assert!(contents.contains("user=\"U1\""));
    }

    #[test]
    fn test_unopenable_log_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened as a log file.
        let err = open_log_file(dir.path()).unwrap_err();
        assert!(matches!(err, TracingError::LogFile { .. }));
    }
}
