//! Log writer module
//!
//! Provides thread-safe log writing to files or stdout/stderr.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use super::level::Level;

/// Global log writer instance
static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

/// Log output target
enum LogTarget {
    /// Write to stdout
    Stdout,
    /// Write to stderr
    Stderr,
    /// Write to file
    File(Mutex<File>),
}

/// Thread-safe log writer
pub struct LogWriter {
    /// Access and info log target
    access: LogTarget,
    /// Error log target
    error: LogTarget,
    /// Messages less severe than this are dropped
    level: Level,
}

impl LogWriter {
    /// Create a new log writer with optional file paths
    fn new(
        access_log_file: Option<&str>,
        error_log_file: Option<&str>,
        level: Level,
    ) -> io::Result<Self> {
        let access = match access_log_file {
            Some(path) => LogTarget::File(Mutex::new(open_log_file(path)?)),
            None => LogTarget::Stdout,
        };

        let error = match error_log_file {
            Some(path) => LogTarget::File(Mutex::new(open_log_file(path)?)),
            None => LogTarget::Stderr,
        };

        Ok(Self {
            access,
            error,
            level,
        })
    }

    pub const fn level(&self) -> Level {
        self.level
    }

    /// Write to access log
    pub fn write_access(&self, message: &str) {
        write_to_target(&self.access, message);
    }

    /// Write to error log
    pub fn write_error(&self, message: &str) {
        write_to_target(&self.error, message);
    }

    /// Whether error lines already reach stderr
    pub const fn error_goes_to_stderr(&self) -> bool {
        matches!(self.error, LogTarget::Stderr)
    }

    /// Write info message (to access log target)
    pub fn write_info(&self, message: &str) {
        write_to_target(&self.access, message);
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    // Create parent directories if they don't exist
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

/// Write message to log target
fn write_to_target(target: &LogTarget, message: &str) {
    match target {
        LogTarget::Stdout => {
            println!("{message}");
        }
        LogTarget::Stderr => {
            eprintln!("{message}");
        }
        LogTarget::File(file) => match file.lock() {
            Ok(mut f) => {
                write_line_or_stderr(&mut *f, message);
            }
            Err(_) => eprintln!("{message}"),
        },
    }
}

/// Append a line, falling back to stderr so the message is not lost
fn write_line_or_stderr<W: Write>(out: &mut W, message: &str) -> bool {
    match writeln!(out, "{message}") {
        Ok(()) => true,
        Err(err) => {
            eprintln!("[log write failed: {err}] {message}");
            false
        }
    }
}

/// Initialize the global log writer
///
/// This should be called once at application startup.
/// Returns error if log files cannot be opened.
pub fn init(
    access_log_file: Option<&str>,
    error_log_file: Option<&str>,
    level: Level,
) -> io::Result<()> {
    let writer = LogWriter::new(access_log_file, error_log_file, level)?;
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Log writer already initialized",
        )
    })
}

/// Get the global log writer, if `init()` has been called
pub fn get() -> Option<&'static LogWriter> {
    LOG_WRITER.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_log_dir() -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("delay-server-{}-{nanos}", std::process::id()))
    }

    #[test]
    fn test_file_targets_append_lines() {
        let dir = temp_log_dir();
        let access = dir.join("access.log");
        let error = dir.join("error.log");
        let writer = LogWriter::new(
            Some(access.to_str().unwrap()),
            Some(error.to_str().unwrap()),
            Level::Info,
        )
        .unwrap();

        writer.write_access("GET / 200");
        writer.write_info("started");
        writer.write_error("[ERROR] boom");

        let access_content = std::fs::read_to_string(&access).unwrap();
        assert_eq!(access_content, "GET / 200\nstarted\n");
        let error_content = std::fs::read_to_string(&error).unwrap();
        assert_eq!(error_content, "[ERROR] boom\n");
        assert_eq!(writer.level(), Level::Info);

        assert!(!writer.error_goes_to_stderr());

        let _ = std::fs::remove_dir_all(dir);
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "disk gone"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_write_falls_back_to_stderr() {
        assert!(!write_line_or_stderr(&mut BrokenPipe, "GET / 200"));

        let mut buf = Vec::new();
        assert!(write_line_or_stderr(&mut buf, "GET / 200"));
        assert_eq!(buf, b"GET / 200\n");
    }

    #[test]
    fn test_default_targets_are_console() {
        let writer = LogWriter::new(None, None, Level::Warn).unwrap();
        assert!(writer.error_goes_to_stderr());
    }
}
