//! Session logger: a `log` backend that writes to a single file.
//!
//! The file is **truncated (overwritten) at each `init`**, so it only ever
//! contains output from the most recent session.
//!
//! Default location:
//!   Windows:  `%APPDATA%\casecanvas\casecanvas.log`
//!   Linux:    `~/.local/share/casecanvas/casecanvas.log`
//!   macOS:    `~/Library/Application Support/casecanvas/casecanvas.log`
//!
//! Host applications call [`init`] once; the library itself only uses the
//! `log` macros and stays silent when no logger is installed.

use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};

struct SessionLogger {
    file: Mutex<Option<File>>,
}

static LOGGER: SessionLogger = SessionLogger {
    file: Mutex::new(None),
};
static INSTALL: Once = Once::new();

impl Log for SessionLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        write_line(&format!(
            "[{}] [{}] {}",
            chrono::Local::now().format("%H:%M:%S%.3f"),
            record.level(),
            record.args()
        ));
    }

    fn flush(&self) {
        if let Ok(mut guard) = self.file.lock()
            && let Some(file) = guard.as_mut()
        {
            let _ = file.flush();
        }
    }
}

/// Write a raw line to the session log. Silently ignores I/O errors so that
/// logging never crashes the host.
fn write_line(line: &str) {
    if let Ok(mut guard) = LOGGER.file.lock()
        && let Some(file) = guard.as_mut()
    {
        let _ = writeln!(file, "{}", line);
    }
}

/// Install the session logger writing to `path` at `level`.
///
/// * Creates (or truncates) the log file.
/// * On first call, registers the logger with `log` and installs a panic
///   hook that mirrors the panic message into the file before running the
///   previous hook. Later calls only switch the file.
pub fn init(path: &Path, level: LevelFilter) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;

    if let Ok(mut guard) = LOGGER.file.lock() {
        *guard = Some(file);
    }

    INSTALL.call_once(|| {
        if log::set_logger(&LOGGER).is_err() {
            eprintln!("[logger] another logger is already installed");
        }
        let prev = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            write_line(&format!("[PANIC] {}", info));
            prev(info);
        }));
    });
    log::set_max_level(level);

    write_line(&format!(
        "=== casecanvas session started {} ===",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    write_line(&format!("Log file: {}", path.display()));
    write_line("");
    Ok(())
}

/// `<data dir>/casecanvas/casecanvas.log`.
pub fn default_log_path() -> PathBuf {
    data_dir().join("casecanvas").join("casecanvas.log")
}

/// Platform data directory (without the app sub-folder).
fn data_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata);
        }
    }
    #[cfg(target_os = "macos")]
    {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support");
        }
    }
    // Linux / fallback
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local").join("share");
    }
    PathBuf::from(".")
}
