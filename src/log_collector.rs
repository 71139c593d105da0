//! Background log writer behind the `log` facade.
//!
//! ```text
//! log::info!() ... [LogCollector] --crossbeam--> [writer thread] --> file / stderr
//! ```
//!
//! Callers never block on I/O: lines are timestamped, queued on an unbounded
//! crossbeam channel and written by a dedicated OS thread. A flush marker lets
//! the binary wait until everything queued so far has reached its sink.

use chrono::Local;
use crossbeam_channel::{unbounded, Sender};
use log::{LevelFilter, Log, Metadata, Record};
use once_cell::sync::OnceCell;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

static GLOBAL_COLLECTOR: OnceCell<LogCollector> = OnceCell::new();

/// A formatted log line.
#[derive(Clone, Debug, PartialEq)]
pub struct LogLine {
    pub timestamp: String,
    pub level: log::Level,
    pub target: String,
    pub message: String,
}

impl LogLine {
    pub fn new(level: log::Level, target: &str, message: String) -> Self {
        LogLine {
            timestamp: Local::now().format("%H:%M:%S%.3f").to_string(),
            level,
            target: target.to_string(),
            message,
        }
    }

    /// `[HH:MM:SS.mmm] [LEVEL] message`
    pub fn render(&self) -> String {
        format!("[{}] [{}] {}", self.timestamp, self.level, self.message)
    }
}

enum LogMessage {
    Line(LogLine),
    /// Signals the sender once every earlier line is written
    Flush(std::sync::mpsc::Sender<()>),
}

/// Where the writer thread sends lines.
#[derive(Clone, Debug, Default)]
pub struct LogSinks {
    pub file: Option<PathBuf>,
    pub stderr: bool,
}

#[derive(Clone)]
pub struct LogCollector {
    tx: Sender<LogMessage>,
    level: LevelFilter,
}

impl LogCollector {
    /// Spawn the writer thread. Fails only if the log file cannot be opened.
    pub fn new(sinks: LogSinks, level: LevelFilter) -> io::Result<Self> {
        let mut file = match &sinks.file {
            Some(path) => Some(open_log_file(path)?),
            None => None,
        };
        let stderr = sinks.stderr;
        let (tx, rx) = unbounded::<LogMessage>();

        std::thread::spawn(move || {
            while let Ok(msg) = rx.recv() {
                match msg {
                    LogMessage::Line(line) => {
                        let rendered = line.render();
                        if let Some(file) = file.as_mut() {
                            if let Err(e) = writeln!(file, "{}", rendered) {
                                eprintln!("[Log] Failed to write log file: {}", e);
                            }
                        }
                        if stderr {
                            eprintln!("{}", rendered);
                        }
                    }
                    LogMessage::Flush(done) => {
                        if let Some(file) = file.as_mut() {
                            let _ = file.flush();
                        }
                        let _ = done.send(());
                    }
                }
            }
        });

        Ok(LogCollector { tx, level })
    }

    pub fn push(&self, line: LogLine) {
        let _ = self.tx.send(LogMessage::Line(line));
    }

    /// Block until every line queued before this call is written.
    pub fn wait_for_empty(&self) -> Result<(), String> {
        let (tx, rx) = std::sync::mpsc::channel::<()>();
        self.tx
            .send(LogMessage::Flush(tx))
            .map_err(|e| format!("Failed to send flush marker: {}", e))?;
        rx.recv()
            .map_err(|e| format!("Flush signal interrupted: {}", e))
    }
}

impl Log for LogCollector {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.push(LogLine::new(
                record.level(),
                record.target(),
                record.args().to_string(),
            ));
        }
    }

    fn flush(&self) {
        let _ = self.wait_for_empty();
    }
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the collector as the global logger.
///
/// Lines go to stderr, and to `log_file` when given. Calling it twice keeps
/// the first logger.
pub fn init_logging(level: LevelFilter, log_file: Option<&Path>) -> io::Result<()> {
    let collector = LogCollector::new(
        LogSinks {
            file: log_file.map(Path::to_path_buf),
            stderr: true,
        },
        level,
    )?;
    if GLOBAL_COLLECTOR.set(collector).is_err() {
        return Ok(());
    }
    if let Some(collector) = GLOBAL_COLLECTOR.get() {
        if log::set_logger(collector).is_ok() {
            log::set_max_level(level);
        }
    }
    Ok(())
}

/// Flush the global collector, if one is installed.
pub fn flush_all_logs() {
    if let Some(collector) = GLOBAL_COLLECTOR.get() {
        if let Err(e) = collector.wait_for_empty() {
            eprintln!("[Log] {}", e);
        }
    }
}
