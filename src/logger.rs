use chrono::{DateTime, Utc};
use colored::*;
use log::{Level, Metadata, Record};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::config::ArtConfig;

static ART_LOGGER: Lazy<ArtLogger> = Lazy::new(ArtLogger::new);

pub fn init() -> Result<(), String> {
    init_with_config(LoggerConfig::default())
}

pub fn init_with_config(config: LoggerConfig) -> Result<(), String> {
    let max_level = config.min_level.to_log_level_filter();
    ART_LOGGER.update_config(config)?;

    if let Err(e) = log::set_logger(&*ART_LOGGER) {
        return Err(format!("Failed to set logger: {:?}", e));
    }

    log::set_max_level(max_level);
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl LogLevel {
    pub fn color(&self) -> Color {
        match self {
            LogLevel::Trace => Color::Cyan,
            LogLevel::Debug => Color::Blue,
            LogLevel::Info => Color::Green,
            LogLevel::Warn => Color::Yellow,
            LogLevel::Error => Color::Red,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    pub fn to_log_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }

    pub fn from_log_level(level: Level) -> Self {
        match level {
            Level::Trace => LogLevel::Trace,
            Level::Debug => LogLevel::Debug,
            Level::Info => LogLevel::Info,
            Level::Warn => LogLevel::Warn,
            Level::Error => LogLevel::Error,
        }
    }

    /// Parses `RUST_LOG`-style names; anything unknown is `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub module: String,
    pub file: String,
    pub line: u32,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: String, module: String, file: String, line: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            level,
            message,
            module,
            file,
            line,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub min_level: LogLevel,
    pub show_colors: bool,
    pub show_file_location: bool,
    pub show_module: bool,
    pub include_timestamp: bool,
    pub timestamp_format: String,
    pub output_json: bool,
    pub log_to_file: bool,
    pub log_file_path: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            show_colors: true,
            show_file_location: false,
            show_module: true,
            include_timestamp: true,
            timestamp_format: "%Y-%m-%d %H:%M:%S%.3f".to_string(),
            output_json: false,
            log_to_file: false,
            log_file_path: "artgen.log".to_string(),
        }
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn with_colors(mut self, enabled: bool) -> Self {
        self.show_colors = enabled;
        self
    }

    pub fn with_file_output(mut self, path: &str) -> Self {
        self.log_to_file = true;
        self.log_file_path = path.to_string();
        self
    }

    pub fn with_json_output(mut self, enabled: bool) -> Self {
        self.output_json = enabled;
        self
    }

    pub fn production() -> Self {
        Self {
            min_level: LogLevel::Info,
            show_colors: false,
            output_json: true,
            log_to_file: true,
            ..Default::default()
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `LOG_FORMAT` picks a preset (`json` for production, `dev` for
    /// development), `LOG_FILE` adds file output and `RUST_LOG` sets the level.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup("LOG_FORMAT")
            .map(|format| format.trim().to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => Self::production(),
            Some("dev") | Some("development") => Self::development(),
            _ => Self::default(),
        };

        if let Some(path) = lookup("LOG_FILE").filter(|path| !path.trim().is_empty()) {
            config = config.with_file_output(path.trim());
        }
        if let Some(level) = lookup("RUST_LOG").and_then(|name| LogLevel::from_name(&name)) {
            config = config.with_level(level);
        }
        config
    }

    pub fn development() -> Self {
        Self {
            min_level: LogLevel::Debug,
            show_colors: true,
            output_json: false,
            show_file_location: true,
            ..Default::default()
        }
    }
}

pub struct ArtLogger {
    config: Mutex<LoggerConfig>,
    log_file: Mutex<Option<File>>,
}

impl ArtLogger {
    pub fn new() -> Self {
        Self {
            config: Mutex::new(LoggerConfig::default()),
            log_file: Mutex::new(None),
        }
    }

    pub fn update_config(&self, new_config: LoggerConfig) -> Result<(), String> {
        if new_config.log_to_file {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&new_config.log_file_path)
                .map_err(|e| format!("Failed to open {}: {}", new_config.log_file_path, e))?;
            if let Ok(mut log_file) = self.log_file.lock() {
                *log_file = Some(file);
            }
        }

        let mut config = self
            .config
            .lock()
            .map_err(|_| "Logger config lock poisoned".to_string())?;
        *config = new_config;
        Ok(())
    }

    fn format_line(&self, entry: &LogEntry, config: &LoggerConfig) -> String {
        let mut output = String::new();

        if config.include_timestamp {
            let timestamp = entry.timestamp.format(&config.timestamp_format).to_string();
            if config.show_colors {
                output.push_str(&format!("{} ", timestamp.bright_black()));
            } else {
                output.push_str(&format!("{} ", timestamp));
            }
        }

        if config.show_colors {
            output.push_str(&format!(
                "[{}] ",
                entry.level.as_str().color(entry.level.color()).bold()
            ));
        } else {
            output.push_str(&format!("[{}] ", entry.level.as_str()));
        }

        if config.show_module && !entry.module.is_empty() {
            if config.show_colors {
                output.push_str(&format!("{}: ", entry.module.bright_blue()));
            } else {
                output.push_str(&format!("{}: ", entry.module));
            }
        }

        output.push_str(&entry.message);

        if config.show_file_location {
            let location = format!("{}:{}", entry.file, entry.line);
            if config.show_colors {
                output.push_str(&format!(" ({})", location.bright_black()));
            } else {
                output.push_str(&format!(" ({})", location));
            }
        }

        output
    }

    fn render(&self, entry: &LogEntry, config: &LoggerConfig) -> String {
        if config.output_json {
            serde_json::to_string(entry).unwrap_or_default()
        } else {
            self.format_line(entry, config)
        }
    }

    fn write_to_file(&self, line: &str) {
        if let Ok(mut guard) = self.log_file.lock() {
            if let Some(file) = guard.as_mut() {
                let _ = writeln!(file, "{}", line);
            }
        }
    }

    fn create_log_entry(&self, record: &Record) -> LogEntry {
        LogEntry::new(
            LogLevel::from_log_level(record.level()),
            record.args().to_string(),
            record.module_path().unwrap_or("unknown").to_string(),
            record.file().unwrap_or("unknown").to_string(),
            record.line().unwrap_or(0),
        )
    }
}

impl Default for ArtLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl log::Log for ArtLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        match self.config.lock() {
            Ok(config) => LogLevel::from_log_level(metadata.level()) >= config.min_level,
            Err(_) => true,
        }
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let entry = self.create_log_entry(record);
        if let Ok(config) = self.config.lock() {
            let line = self.render(&entry, &config);
            if entry.level >= LogLevel::Warn {
                eprintln!("{}", line);
            } else {
                println!("{}", line);
            }

            if config.log_to_file {
                // File output never carries colour codes.
                let plain = LoggerConfig {
                    show_colors: false,
                    ..config.clone()
                };
                self.write_to_file(&self.render(&entry, &plain));
            }
        }
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
        if let Ok(mut guard) = self.log_file.lock() {
            if let Some(file) = guard.as_mut() {
                let _ = file.flush();
            }
        }
    }
}

/// Measures one operation and logs how long it took when dropped.
pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn new(name: &str) -> Self {
        log::debug!("⏱️  Starting timer: {}", name);
        Self {
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        log::info!(
            "🕒 {} completed in {:.2} seconds",
            self.name,
            self.elapsed().as_secs_f64()
        );
    }
}

pub fn timer(name: &str) -> Timer {
    Timer::new(name)
}

pub fn log_startup_info(app_name: &str, version: &str, port: u16) {
    log::info!("🚀 Starting {} v{}", app_name, version);
    log::info!("🌐 Server will run on http://127.0.0.1:{}", port);
}

/// Logs the effective configuration. The credential itself is never printed.
pub fn log_config_info(config: &ArtConfig) {
    log::info!("⚙️  Configuration loaded:");
    log::info!("   Endpoint: {}", config.endpoint);
    log::info!(
        "   API key: {}",
        if config.credential().is_ok() { "✅" } else { "❌" }
    );
    log::info!(
        "   Retries: {} attempts, {}s apart",
        config.max_attempts,
        config.retry_delay.as_secs()
    );
    match config.request_timeout {
        Some(timeout) => log::info!("   Request timeout: {}s", timeout.as_secs()),
        None => log::info!("   Request timeout: none"),
    }
    log::info!("   Cache capacity: {}", config.cache_capacity);
    log::info!("   Port: {}", config.port);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(level: LogLevel, message: &str) -> LogEntry {
        LogEntry::new(
            level,
            message.to_string(),
            "artgen::inference".to_string(),
            "src/inference/image_client.rs".to_string(),
            42,
        )
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(LogLevel::Info.as_str(), "INFO");
        assert_eq!(LogLevel::Debug.color(), Color::Blue);
        assert!(LogLevel::Error > LogLevel::Warn);
        assert_eq!(LogLevel::from_name("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_name("loud"), None);
    }

    #[test]
    fn test_logger_config() {
        let config = LoggerConfig::development();
        assert_eq!(config.min_level, LogLevel::Debug);
        assert!(config.show_colors);

        let prod_config = LoggerConfig::production();
        assert!(!prod_config.show_colors);
        assert!(prod_config.output_json);
    }

    #[test]
    fn config_from_environment() {
        let lookup = |vars: &'static [(&'static str, &'static str)]| {
            move |key: &str| {
                vars.iter()
                    .find(|(k, _)| *k == key)
                    .map(|(_, v)| v.to_string())
            }
        };

        let plain = LoggerConfig::from_lookup(lookup(&[]));
        assert_eq!(plain.min_level, LogLevel::Info);
        assert!(!plain.output_json);
        assert!(!plain.log_to_file);

        let json =
            LoggerConfig::from_lookup(lookup(&[("LOG_FORMAT", "JSON"), ("RUST_LOG", "warn")]));
        assert!(json.output_json);
        assert!(json.log_to_file);
        assert_eq!(json.log_file_path, "artgen.log");
        assert_eq!(json.min_level, LogLevel::Warn);

        let file = LoggerConfig::from_lookup(lookup(&[
            ("LOG_FORMAT", "dev"),
            ("LOG_FILE", "/tmp/artgen-test.log"),
        ]));
        assert_eq!(file.min_level, LogLevel::Debug);
        assert!(file.log_to_file);
        assert_eq!(file.log_file_path, "/tmp/artgen-test.log");
    }

    #[test]
    fn plain_line_has_level_module_and_message() {
        let logger = ArtLogger::new();
        let config = LoggerConfig::new()
            .with_colors(false)
            .with_json_output(false);
        let line = logger.format_line(&entry(LogLevel::Warn, "model is loading"), &config);

        assert!(line.contains("[WARN] "));
        assert!(line.contains("artgen::inference: model is loading"));
        assert!(!line.contains("image_client.rs"));
    }

    #[test]
    fn json_output_is_one_object_per_line() {
        let logger = ArtLogger::new();
        let config = LoggerConfig::new().with_json_output(true);
        let line = logger.render(&entry(LogLevel::Info, "done"), &config);

        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["message"], "done");
        assert_eq!(value["level"], "Info");
    }

    #[test]
    fn test_logger_initialization() {
        let config = LoggerConfig::development();
        assert!(init_with_config(config).is_ok());
    }
}
