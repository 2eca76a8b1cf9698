// src/logging.rs

use chrono::{DateTime, Utc};
use flexi_logger::{FileSpec, Logger, LoggerHandle, WriteMode};

use crate::config::Config;
use crate::errors::{MedsageError, MedsageResult};

/// Starts the file logger. The terminal belongs to the TUI, so everything
/// goes to a rotating file under the configured log directory. The returned
/// handle must stay alive for the lifetime of the process.
pub fn init_logging(config: &Config) -> MedsageResult<LoggerHandle> {
    let logger = Logger::try_with_str(&config.log_level)
        .map_err(|e| MedsageError::logging_error(format!("Invalid log spec: {}", e)))?
        .log_to_file(
            FileSpec::default()
                .directory(&config.log_dir)
                .basename("medsage"),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .start()
        .map_err(|e| MedsageError::logging_error(format!("Failed to start logger: {}", e)))?;

    Ok(logger)
}

/// Details of one request to the QA service.
#[derive(Debug)]
pub struct ApiCallLog {
    pub timestamp: DateTime<Utc>,
    pub endpoint: String,
    pub request_summary: String,
    pub response_status: u16,
    pub response_time_ms: u128,
}

/// Writes an API call record to the log file.
pub fn log_api_call(call: &ApiCallLog) {
    log::info!(
        "[{}] {} - {} - Status: {} - Time: {}ms",
        call.timestamp.to_rfc3339(),
        call.endpoint,
        call.request_summary,
        call.response_status,
        call.response_time_ms
    );
}

/// Capped scrollback for the in-app log pane.
#[derive(Debug, Default)]
pub struct LogBuffer {
    pub entries: Vec<String>,
}

const LOG_BUFFER_CAP: usize = 200;

impl LogBuffer {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn add(&mut self, entry: String) {
        self.entries.push(entry);
        if self.entries.len() > LOG_BUFFER_CAP {
            self.entries.remove(0);
        }
    }
}
