//! Debug logging to an optional file.
//!
//! `log` records from this crate go through [`BoardLogger`]; `tracing` spans (remote
//! call timings) go through a subscriber that only ever writes to the same file.

use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::sync::OnceLock;
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Targets that only show up with verbose logging
const NOISY_TARGETS: &[&str] = &["reqwest", "hyper", "h2", "rustls", "want", "mio", "rustyline"];

const DEFAULT_FILTER: &str = "sketchboard=debug,warn";

#[derive(Default)]
struct LogState {
    enabled: bool,
    verbose: bool,
    to_stdout: bool,
    file: Option<File>,
}

impl LogState {
    fn write_file(&mut self, bytes: &[u8]) {
        if let Some(file) = self.file.as_mut() {
            let _ = file.write_all(bytes);
            let _ = file.flush();
        }
    }
}

static STATE: Mutex<LogState> = Mutex::new(LogState {
    enabled: false,
    verbose: false,
    to_stdout: false,
    file: None,
});

struct BoardLogger;

static LOGGER: BoardLogger = BoardLogger;

fn is_noisy(target: &str) -> bool {
    NOISY_TARGETS.iter().any(|noisy| target.starts_with(noisy))
}

impl log::Log for BoardLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        let state = STATE.lock();
        if !state.enabled || metadata.level() > Level::Debug {
            return false;
        }
        state.verbose || metadata.target().starts_with("sketchboard") || !is_noisy(metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "{} {:<5} [{}] {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        );

        let mut state = STATE.lock();
        state.write_file(line.as_bytes());
        if state.to_stdout {
            print!("{line}");
        }
    }

    fn flush(&self) {}
}

/// `MakeWriter` that appends span events to the log file, never the terminal
#[derive(Clone, Copy)]
struct SpanFileWriter;

impl Write for SpanFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = STATE.lock();
        if state.enabled {
            state.write_file(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> fmt::MakeWriter<'a> for SpanFileWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        *self
    }
}

/// Install the `log` logger and the `tracing` subscriber. Safe to call more than once.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    static INIT: OnceLock<Result<(), String>> = OnceLock::new();

    let result = INIT.get_or_init(|| {
        if std::env::var_os("SKETCHBOARD_VERBOSE").is_some() {
            set_verbose_logging(true);
        }

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        let spans = fmt::Layer::new()
            .with_ansi(false)
            .with_timer(fmt::time::ChronoLocal::rfc_3339())
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(SpanFileWriter);
        // Spans are optional; an embedding program may own the global subscriber
        let _ = Registry::default().with(filter).with(spans).try_init();

        // The subscriber is built without `tracing-log`, so `log` records land here
        log::set_logger(&LOGGER)
            .map(|()| log::set_max_level(LevelFilter::Debug))
            .map_err(|e| format!("Failed to install the logger: {e}"))
    });

    result.clone().map_err(Into::into)
}

pub fn enable_logging() {
    STATE.lock().enabled = true;
}

pub fn disable_logging() {
    STATE.lock().enabled = false;
}

pub fn set_verbose_logging(enabled: bool) {
    STATE.lock().verbose = enabled;
}

/// Append log lines to `file_path`, creating it if needed
pub fn set_log_file(file_path: &str) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(file_path)?;
    STATE.lock().file = Some(file);
    Ok(())
}

pub fn set_log_to_stdout(enabled: bool) {
    STATE.lock().to_stdout = enabled;
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        log::debug!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        log::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        log::warn!($($arg)*)
    };
}
