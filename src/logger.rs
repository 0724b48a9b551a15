//! FILENAME: src/logger.rs
// PURPOSE: Leveled console logging with caller attribution.
// FORMAT: [timestamp] [LEVEL] file:line? content

use chrono::Local;
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::Value;

use crate::caller::{self, CallerInfo};

// ============================================================================
// LEVELS & COLORS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }

    /// Level the legacy `log` entry point maps to.
    pub(crate) fn legacy() -> Level {
        Level::Info
    }

    /// ANSI color for the level tag. Cosmetic only.
    fn color(self) -> &'static str {
        match self {
            Level::Debug => "\x1b[36m",
            Level::Info => "\x1b[32m",
            Level::Warn => "\x1b[33m",
            Level::Error => "\x1b[31m",
        }
    }
}

const RESET: &str = "\x1b[0m";
const GRAY: &str = "\x1b[90m";

// ============================================================================
// RECORDS & FORMATTING
// ============================================================================

/// One log line, built per call and consumed immediately. Never retained.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub level: Level,
    pub timestamp: String,
    pub caller: Option<CallerInfo>,
    pub message: String,
}

/// Fixed-width local timestamp: `YYYY-MM-DD HH:MM:SS.mmm`.
pub(crate) fn format_time() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

/// Join the caller-supplied values with single spaces.
pub(crate) fn join_args(args: &[Value]) -> String {
    args.iter()
        .map(serialize_arg)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strings render bare; objects and arrays render as indented JSON;
/// everything else uses its JSON text.
pub(crate) fn serialize_arg(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Object(_) | Value::Array(_) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        other => other.to_string(),
    }
}

// ============================================================================
// LOGGER
// ============================================================================

/// Console logging facility. The process-wide instance lives behind
/// [`global`]; tests and embedders can construct their own.
pub struct Logger {
    color: bool,
}

impl Logger {
    pub const fn new() -> Self {
        Logger { color: true }
    }

    /// Colorless variant for deterministic output.
    pub const fn plain() -> Self {
        Logger { color: false }
    }

    pub fn debug(&self, args: &[Value]) {
        self.write(Level::Debug, args);
    }

    pub fn info(&self, args: &[Value]) {
        self.write(Level::Info, args);
    }

    pub fn warn(&self, args: &[Value]) {
        self.write(Level::Warn, args);
    }

    pub fn error(&self, args: &[Value]) {
        self.write(Level::Error, args);
    }

    /// Legacy alias, kept for older call sites. Maps to the info-level
    /// entry point unchanged.
    pub fn log(&self, args: &[Value]) {
        self.write(Level::legacy(), args);
    }

    /// Pure formatting step: resolve the caller, stamp the time, serialize
    /// the arguments. No output is produced.
    pub fn render(&self, level: Level, args: &[Value]) -> String {
        let record = self.make_record(level, args);
        self.format_record(&record)
    }

    /// Format an already-built record. The caller segment appears only when
    /// resolution succeeded.
    pub fn format_record(&self, record: &LogRecord) -> String {
        let level = record.level;
        let mut line = if self.color {
            format!(
                "{}[{}]{} {}[{}]{}",
                GRAY,
                record.timestamp,
                RESET,
                level.color(),
                level.as_str(),
                RESET
            )
        } else {
            format!("[{}] [{}]", record.timestamp, level.as_str())
        };

        if let Some(caller) = &record.caller {
            if self.color {
                line.push_str(&format!(" {}{}:{}{}", GRAY, caller.file, caller.line, RESET));
            } else {
                line.push_str(&format!(" {}:{}", caller.file, caller.line));
            }
        }

        line.push(' ');
        line.push_str(&record.message);
        line
    }

    /// Format an already-built record and write it to the stream its level
    /// selects: stdout for debug/info, stderr for warn/error.
    pub fn write_record(&self, record: &LogRecord) {
        let line = self.format_record(record);
        match record.level {
            Level::Debug | Level::Info => println!("{}", line),
            Level::Warn | Level::Error => eprintln!("{}", line),
        }
    }

    fn make_record(&self, level: Level, args: &[Value]) -> LogRecord {
        LogRecord {
            level,
            timestamp: format_time(),
            caller: caller::caller_info(),
            message: join_args(args),
        }
    }

    fn write(&self, level: Level, args: &[Value]) {
        self.write_record(&self.make_record(level, args));
    }
}

impl Default for Logger {
    fn default() -> Self {
        Logger::new()
    }
}

/// Process-wide logger, created once at first use and never reassigned.
static LOGGER: Lazy<Logger> = Lazy::new(Logger::new);

pub fn global() -> &'static Logger {
    &LOGGER
}

// ============================================================================
// `log` FACADE ADAPTER
// ============================================================================

/// Routes records emitted through the `log` facade into this facility.
/// Facade records already carry accurate file/line metadata, so those are
/// used directly instead of stack inspection.
pub struct FacadeLogger;

static FACADE: FacadeLogger = FacadeLogger;

impl log::Log for FacadeLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        global().write_record(&facade_record(record));
    }

    fn flush(&self) {}
}

/// Build a [`LogRecord`] from a facade record. When the record carries its
/// own file/line metadata, that location is used verbatim; otherwise the
/// caller is resolved from the stack.
pub(crate) fn facade_record(record: &log::Record) -> LogRecord {
    let level = match record.level() {
        log::Level::Error => Level::Error,
        log::Level::Warn => Level::Warn,
        log::Level::Info => Level::Info,
        log::Level::Debug | log::Level::Trace => Level::Debug,
    };

    let caller = match (record.file(), record.line()) {
        (Some(file), Some(line)) => Some(CallerInfo {
            file: file.to_string(),
            line,
        }),
        _ => caller::caller_info(),
    };

    LogRecord {
        level,
        timestamp: format_time(),
        caller,
        message: record.args().to_string(),
    }
}

/// Install the facade adapter as the global `log` logger.
pub fn init_facade() -> Result<(), String> {
    log::set_logger(&FACADE).map_err(|e| format!("log facade already installed: {}", e))?;
    log::set_max_level(log::LevelFilter::Debug);
    Ok(())
}

// ============================================================================
// MACRO DEFINITIONS & EXPORTS
// ============================================================================

#[macro_export]
macro_rules! log_debug {
    ($($arg:expr),* $(,)?) => {
        $crate::logger::global().debug(&[$($crate::serde_json::json!($arg)),*])
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:expr),* $(,)?) => {
        $crate::logger::global().info(&[$($crate::serde_json::json!($arg)),*])
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:expr),* $(,)?) => {
        $crate::logger::global().warn(&[$($crate::serde_json::json!($arg)),*])
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:expr),* $(,)?) => {
        $crate::logger::global().error(&[$($crate::serde_json::json!($arg)),*])
    };
}

// Legacy alias for call sites written against the old `log` entry point.

#[macro_export]
macro_rules! log_message {
    ($($arg:expr),* $(,)?) => {
        $crate::logger::global().log(&[$($crate::serde_json::json!($arg)),*])
    };
}

// Re-export the macros so they can be imported via `use crate::logger::log_info;`
pub use log_debug;
pub use log_error;
pub use log_info;
pub use log_message;
pub use log_warn;
