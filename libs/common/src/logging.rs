//! Unified logging module for SmartCane services
//!
//! Console output plus daily rolling files, with HTTP access records split
//! into their own file via the `api_access` target.

use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use axum::body::{Body, Bytes};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use errors::{CaneError, CaneResult};
use http_body_util::LengthLimitError;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter,
    fmt::{self, format::Writer, FmtContext, FormatEvent, FormatFields},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Tracing target used for HTTP access records
pub const API_ACCESS_TARGET: &str = "api_access";

/// Largest request body buffered for logging; same as axum's `Json` default
pub const MAX_REQUEST_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Custom format for log level with brackets: `[INFO]`, `[WARN]`, etc.
fn format_level(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "[TRACE]",
        Level::DEBUG => "[DEBUG]",
        Level::INFO => "[INFO]",
        Level::WARN => "[WARN]",
        Level::ERROR => "[ERROR]",
    }
}

/// Custom event formatter that outputs: `timestamp [LEVEL] message`
///
/// Example output: `2026-03-02T00:50:44.809121Z [INFO] Service started`
struct BracketedLevelFormat;

impl<S, N> FormatEvent<S, N> for BracketedLevelFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let now = chrono::Utc::now();
        write!(writer, "{} ", now.format("%Y-%m-%dT%H:%M:%S%.6fZ"))?;

        let level = *event.metadata().level();
        if writer.has_ansi_escapes() {
            let color = match level {
                Level::TRACE => "\x1b[35m",
                Level::DEBUG => "\x1b[34m",
                Level::INFO => "\x1b[32m",
                Level::WARN => "\x1b[33m",
                Level::ERROR => "\x1b[31m",
            };
            write!(writer, "{}{}\x1b[0m ", color, format_level(&level))?;
        } else {
            write!(writer, "{} ", format_level(&level))?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

// Worker guards must outlive the subscriber or buffered lines are lost
static GUARDS: OnceLock<Mutex<Vec<WorkerGuard>>> = OnceLock::new();

/// Global log root directory (initialized once from config or env)
static LOG_ROOT: OnceLock<PathBuf> = OnceLock::new();

/// Initialize log root directory
///
/// Priority:
/// 1. `CANE_LOG_DIR` environment variable
/// 2. `config_dir` parameter
/// 3. `logs`
pub fn init_log_root(config_dir: Option<&str>) {
    LOG_ROOT.get_or_init(|| {
        std::env::var("CANE_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                config_dir
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("logs"))
            })
    });
}

/// Get log root directory
pub fn get_log_root() -> PathBuf {
    LOG_ROOT.get().cloned().unwrap_or_else(|| {
        std::env::var("CANE_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("logs"))
    })
}

/// Logger configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Service name (e.g., "alertsrv")
    pub service_name: String,
    /// Directory receiving the rolling files
    pub log_dir: PathBuf,
    /// Default filter directive when `RUST_LOG` is unset
    pub default_level: Level,
    /// Colorize console output
    pub ansi: bool,
    /// Write HTTP access records to `{service}_api.log.YYYY-MM-DD`
    pub enable_api_log: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".to_string(),
            log_dir: get_log_root(),
            default_level: Level::INFO,
            ansi: true,
            enable_api_log: true,
        }
    }
}

impl LogConfig {
    /// Filter directive string used when `RUST_LOG` is not set
    fn default_directive(&self) -> String {
        let api_level = if self.enable_api_log { "info" } else { "off" };
        format!(
            "{},{}=debug,{}={}",
            self.default_level.as_str().to_lowercase(),
            self.service_name,
            API_ACCESS_TARGET,
            api_level
        )
    }
}

fn keep_guard(guard: WorkerGuard) {
    let guards = GUARDS.get_or_init(|| Mutex::new(Vec::new()));
    match guards.lock() {
        Ok(mut guards) => guards.push(guard),
        Err(poisoned) => poisoned.into_inner().push(guard),
    }
}

/// Initialize logging system with configuration
pub fn init_with_config(config: LogConfig) -> CaneResult<()> {
    fs::create_dir_all(&config.log_dir)?;

    let env_filter = match std::env::var("RUST_LOG") {
        Ok(directive) if directive.contains(API_ACCESS_TARGET) => EnvFilter::new(directive),
        Ok(directive) => EnvFilter::new(format!("{},{}=info", directive, API_ACCESS_TARGET)),
        Err(_) => EnvFilter::new(config.default_directive()),
    };

    let service_appender = tracing_appender::rolling::daily(
        &config.log_dir,
        format!("{}.log", config.service_name),
    );
    let (service_writer, service_guard) = tracing_appender::non_blocking(service_appender);
    keep_guard(service_guard);

    let api_appender = tracing_appender::rolling::daily(
        &config.log_dir,
        format!("{}_api.log", config.service_name),
    );
    let (api_writer, api_guard) = tracing_appender::non_blocking(api_appender);
    keep_guard(api_guard);

    let console_layer = fmt::layer()
        .with_ansi(config.ansi)
        .event_format(BracketedLevelFormat)
        .with_filter(filter::filter_fn(|meta| {
            meta.target() != API_ACCESS_TARGET
        }));

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(service_writer)
        .event_format(BracketedLevelFormat)
        .with_filter(filter::filter_fn(|meta| {
            meta.target() != API_ACCESS_TARGET
        }));

    let api_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(api_writer)
        .event_format(BracketedLevelFormat)
        .with_filter(filter::filter_fn(|meta| {
            meta.target() == API_ACCESS_TARGET
        }));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .with(api_layer)
        .try_init()
        .map_err(|e| CaneError::Logging(e.to_string()))?;

    Ok(())
}

// ============================================================================
// HTTP API Request Logging Middleware
// ============================================================================

/// Redact sensitive fields in a JSON string
///
/// Object keys containing any of the sensitive names have their values
/// replaced by `***REDACTED***`, recursively. Non-JSON input is returned
/// unchanged.
#[allow(clippy::disallowed_methods)] // json! macro internally uses unwrap (compile-time safe, never panics)
fn redact_sensitive_fields(json_str: &str) -> String {
    use serde_json::{json, Value};

    const SENSITIVE_KEYS: &[&str] = &["password", "token", "api_key", "secret", "authorization"];

    let Ok(mut value) = serde_json::from_str::<Value>(json_str) else {
        return json_str.to_string();
    };

    fn redact_recursive(value: &mut Value) {
        match value {
            Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    let key_lower = key.to_lowercase();
                    if SENSITIVE_KEYS.iter().any(|&k| key_lower.contains(k)) {
                        *val = json!("***REDACTED***");
                    } else {
                        redact_recursive(val);
                    }
                }
            },
            Value::Array(arr) => {
                for item in arr.iter_mut() {
                    redact_recursive(item);
                }
            },
            _ => {},
        }
    }

    redact_recursive(&mut value);

    serde_json::to_string(&value).unwrap_or_else(|_| json_str.to_string())
}

/// Truncate body string to at most `max_length` bytes on a char boundary
fn truncate_body(body: &str, max_length: usize) -> String {
    if body.len() <= max_length {
        return body.to_string();
    }

    let mut cut = max_length;
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}[truncated {} bytes]", &body[..cut], body.len() - cut)
}

fn is_length_limit(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}

/// Buffer a request body of at most `limit` bytes
///
/// Oversized bodies are answered with 413, unreadable ones with 400.
async fn buffer_request_body(body: Body, limit: usize) -> Result<Bytes, Response> {
    match axum::body::to_bytes(body, limit).await {
        Ok(bytes) => Ok(bytes),
        Err(e) => {
            let source = e.into_inner();
            if is_length_limit(source.as_ref()) {
                Err(crate::AppError::rejected(
                    StatusCode::PAYLOAD_TOO_LARGE,
                    format!("Request body exceeds {} bytes", limit),
                )
                .into_response())
            } else {
                tracing::warn!("Failed to read request body: {}", source);
                Err(
                    crate::AppError::rejected(StatusCode::BAD_REQUEST, "Failed to read request body")
                        .into_response(),
                )
            }
        },
    }
}

fn is_mutating(method: &axum::http::Method) -> bool {
    matches!(method.as_str(), "POST" | "PUT" | "PATCH" | "DELETE")
}

/// HTTP API request logger middleware
///
/// - **INFO**: mutating requests (POST/PUT/PATCH/DELETE), no body
/// - **DEBUG**: every request; JSON bodies of mutating requests are included,
///   truncated to 500 bytes with sensitive fields redacted
///
/// Bodies are only buffered up to [`MAX_REQUEST_BODY_BYTES`]; larger ones are
/// rejected with 413 before reaching the handler.
///
/// Records go to the `api_access` target. Add the layer before `.with_state()`:
/// ```rust,ignore
/// let app = Router::new()
///     // ... routes ...
///     .layer(middleware::from_fn(http_request_logger))
///     .with_state(state);
/// ```
pub async fn http_request_logger(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    use std::time::Instant;
    use tracing::{debug, info, level_enabled};

    const MAX_BODY_LENGTH: usize = 500;

    let method = req.method().clone();
    let uri = req.uri().clone();
    let is_json = req
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));
    let start = Instant::now();

    let should_read_body = level_enabled!(Level::DEBUG) && is_mutating(&method) && is_json;

    let (req, body_str) = if should_read_body {
        let (parts, body) = req.into_parts();
        let bytes = match buffer_request_body(body, MAX_REQUEST_BODY_BYTES).await {
            Ok(bytes) => bytes,
            Err(rejection) => {
                info!(
                    target: "api_access",
                    method = %method,
                    path = %uri.path(),
                    status = %rejection.status().as_u16(),
                    duration_ms = %start.elapsed().as_millis(),
                    "HTTP request rejected"
                );
                return rejection;
            },
        };

        let body_str = match std::str::from_utf8(&bytes) {
            Ok(s) => truncate_body(&redact_sensitive_fields(s), MAX_BODY_LENGTH),
            Err(_) => "<binary data>".to_string(),
        };

        (axum::extract::Request::from_parts(parts, Body::from(bytes)), Some(body_str))
    } else {
        (req, None)
    };

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status();

    if is_mutating(&method) {
        info!(
            target: "api_access",
            method = %method,
            path = %uri.path(),
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "HTTP request"
        );
    }

    match body_str {
        Some(body) => debug!(
            target: "api_access",
            method = %method,
            path = %uri.path(),
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            request_body = %body,
            "HTTP request (detailed)"
        ),
        None if !is_mutating(&method) => debug!(
            target: "api_access",
            method = %method,
            path = %uri.path(),
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "HTTP request"
        ),
        None => {},
    }

    response
}
