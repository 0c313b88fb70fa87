//! Process-wide diagnostic logging for the catalog core.
//!
//! # Responsibility
//! - Route `log` records into size-rotated files under one directory.
//! - Record panics as a single sanitized `event=panic_captured` line.
//!
//! # Invariants
//! - The backend starts at most once; a repeat call with the same target is a no-op.
//! - A repeat call naming another level or directory fails without side effects.
//! - Starting the backend reports failures as `Err`, never by panicking.
//! - Book titles and authors are never written to logs; ids and counts are.

use crate::config::CoreConfig;
use flexi_logger::{
    Cleanup, Criterion, FileSpec, LogSpecification, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::Once;

const LOG_FILE_BASENAME: &str = "bookshelf";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_ROTATED_FILES: usize = 5;
const PANIC_SUMMARY_CHARS: usize = 160;
const BUILD_MODE: &str = if cfg!(debug_assertions) {
    "debug"
} else {
    "release"
};

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: Once = Once::new();

/// Level and directory a logger was (or would be) started with.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LogTarget {
    level: &'static str,
    dir: PathBuf,
}

impl LogTarget {
    fn parse(level: &str, dir: &str) -> Result<Self, String> {
        Ok(Self {
            level: normalize_level(level)?,
            dir: normalize_log_dir(dir)?,
        })
    }

    /// Explains why `requested` cannot reuse this already active target.
    fn conflict_with(&self, requested: &LogTarget) -> Option<String> {
        if self.dir != requested.dir {
            Some(format!(
                "logging already initialized at `{}`; refusing to switch to `{}`",
                self.dir.display(),
                requested.dir.display()
            ))
        } else if self.level != requested.level {
            Some(format!(
                "logging already initialized with level `{}`; refusing to switch to `{}`",
                self.level, requested.level
            ))
        } else {
            None
        }
    }
}

struct ActiveLogger {
    target: LogTarget,
    _handle: LoggerHandle,
}

/// Starts file logging at `level` under the absolute directory `log_dir`.
///
/// # Errors
/// - `level` is not one of trace|debug|info|warn|error.
/// - `log_dir` is blank, relative, or cannot be created.
/// - Logging already runs with a different level or directory.
/// - The flexi_logger backend refuses to start.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    let requested = LogTarget::parse(level, log_dir)?;
    let active = ACTIVE.get_or_try_init(|| start(requested.clone()))?;
    match active.target.conflict_with(&requested) {
        Some(message) => Err(message),
        None => Ok(()),
    }
}

/// Starts file logging when the config names a log directory.
///
/// Returns `Ok(false)` when no directory is configured.
pub fn init_logging_from_config(config: &CoreConfig) -> Result<bool, String> {
    let Some(log_dir) = config.log_dir.as_ref() else {
        return Ok(false);
    };
    let log_dir = log_dir
        .to_str()
        .ok_or_else(|| format!("log_dir `{}` is not valid UTF-8", log_dir.display()))?;
    init_logging(config.log_level, log_dir)?;
    Ok(true)
}

/// Returns `(level, log_dir)` when logging is active.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    ACTIVE
        .get()
        .map(|active| (active.target.level, active.target.dir.clone()))
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> &'static str {
    match BUILD_MODE {
        "debug" => "debug",
        _ => "info",
    }
}

pub(crate) fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error"
        )),
    }
}

pub(crate) fn normalize_log_dir(log_dir: &str) -> Result<PathBuf, String> {
    let trimmed = log_dir.trim();
    if trimmed.is_empty() {
        return Err("log_dir cannot be empty".to_string());
    }
    let path = PathBuf::from(trimmed);
    if path.is_relative() {
        return Err(format!("log_dir must be an absolute path, got `{trimmed}`"));
    }
    Ok(path)
}

fn start(target: LogTarget) -> Result<ActiveLogger, String> {
    std::fs::create_dir_all(&target.dir).map_err(|err| {
        format!(
            "failed to create log directory `{}`: {err}",
            target.dir.display()
        )
    })?;

    let handle = file_logger(&target)?
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;
    PANIC_HOOK.call_once(install_panic_hook);

    info!(
        "event=core_init module=core status=ok os={} build_mode={} version={} level={} log_dir={}",
        std::env::consts::OS,
        BUILD_MODE,
        env!("CARGO_PKG_VERSION"),
        target.level,
        target.dir.display()
    );
    Ok(ActiveLogger {
        target,
        _handle: handle,
    })
}

/// Rotating, appending file logger; records carry timestamp and source line.
fn file_logger(target: &LogTarget) -> Result<Logger, String> {
    let spec = LogSpecification::parse(target.level)
        .map_err(|err| format!("invalid log level `{}`: {err}", target.level))?;
    Ok(Logger::with(spec)
        .log_to_file(log_file_spec(&target.dir))
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_ROTATED_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format))
}

fn log_file_spec(dir: &Path) -> FileSpec {
    FileSpec::default()
        .directory(dir)
        .basename(LOG_FILE_BASENAME)
}

fn install_panic_hook() {
    let chained = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info.location().map_or_else(
            || "unknown".to_string(),
            |loc| format!("{}:{}", loc.file(), loc.line()),
        );
        // Payloads can quote a book title; only a capped single line is kept.
        error!(
            "event=panic_captured module=core status=error location={} payload={}",
            location,
            sanitize_message(payload_text(info.payload()), PANIC_SUMMARY_CHARS)
        );
        chained(info);
    }));
}

fn payload_text(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

/// Flattens line breaks to spaces and caps the result at `max_chars`.
fn sanitize_message(value: &str, max_chars: usize) -> String {
    let mut chars = value
        .chars()
        .map(|ch| if matches!(ch, '\n' | '\r') { ' ' } else { ch });
    let mut out = chars.by_ref().take(max_chars).collect::<String>();
    if chars.next().is_some() {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{
        default_log_level, init_logging, init_logging_from_config, logging_status,
        normalize_level, normalize_log_dir, payload_text, sanitize_message, LogTarget,
    };
    use crate::config::CoreConfig;
    use std::any::Any;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch_log_dir(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "bookshelf-logging-{label}-{}-{nanos}",
            std::process::id()
        ))
    }

    #[test]
    fn levels_normalize_to_canonical_names() {
        assert_eq!(normalize_level("INFO").unwrap(), "info");
        assert_eq!(normalize_level(" warning ").unwrap(), "warn");
        assert!(normalize_level("verbose").is_err());
        assert!(normalize_level(default_log_level()).is_ok());
    }

    #[test]
    fn log_dir_must_be_absolute_and_non_blank() {
        let error = normalize_log_dir("logs/dev").expect_err("relative paths must be rejected");
        assert!(error.contains("absolute"));
        assert!(normalize_log_dir("   ").is_err());
    }

    #[test]
    fn target_conflicts_name_the_changed_setting() {
        let dir = scratch_log_dir("target");
        let dir_str = dir.to_str().unwrap();
        let active = LogTarget::parse("info", dir_str).unwrap();

        assert_eq!(active.conflict_with(&LogTarget::parse("INFO", dir_str).unwrap()), None);
        let level = active
            .conflict_with(&LogTarget::parse("debug", dir_str).unwrap())
            .unwrap();
        assert!(level.contains("level `info`"));
        let other_dir = scratch_log_dir("elsewhere");
        let moved = active
            .conflict_with(&LogTarget::parse("info", other_dir.to_str().unwrap()).unwrap())
            .unwrap();
        assert!(moved.contains("refusing to switch"));
    }

    #[test]
    fn sanitize_message_flattens_lines_and_caps_length() {
        let sanitized = sanitize_message("line1\nline2\rline3", 8);
        assert_eq!(sanitized, "line1 li...");
        assert_eq!(sanitize_message("Dune", 4), "Dune");
        assert_eq!(sanitize_message("Émile\n", 10), "Émile ");
    }

    #[test]
    fn payload_text_reads_string_payloads_only() {
        let borrowed: Box<dyn Any + Send> = Box::new("boom");
        let owned: Box<dyn Any + Send> = Box::new(String::from("bang"));
        let other: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(payload_text(&*borrowed), "boom");
        assert_eq!(payload_text(&*owned), "bang");
        assert_eq!(payload_text(&*other), "non-string panic payload");
    }

    #[test]
    fn config_without_log_dir_does_not_start_logging() {
        let config = CoreConfig {
            db_path: PathBuf::from("unused.sqlite3"),
            log_level: "info",
            log_dir: None,
        };
        assert_eq!(init_logging_from_config(&config), Ok(false));
    }

    // The only test that starts the global logger; it is process-wide state.
    #[test]
    fn second_init_reuses_same_target_and_rejects_changes() {
        let first = scratch_log_dir("idempotent");
        let second = scratch_log_dir("different");
        let first_str = first.to_str().unwrap().to_string();
        let second_str = second.to_str().unwrap().to_string();

        init_logging("info", &first_str).expect("first init should succeed");
        init_logging("info", &first_str).expect("same config should be idempotent");

        let level_error = init_logging("debug", &first_str).expect_err("level conflict");
        assert!(level_error.contains("refusing to switch"));

        let dir_error = init_logging("info", &second_str).expect_err("directory conflict");
        assert!(dir_error.contains("refusing to switch"));

        let (active_level, active_dir) = logging_status().expect("logging should be active");
        assert_eq!(active_level, "info");
        assert_eq!(active_dir, first);
        assert!(first.is_dir());
    }
}
