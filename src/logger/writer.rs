//! File writer for the logger

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;

use crate::logger::config::FileConfig;
use crate::logger::error::LoggerError;

/// Shared log file handle. Once a write fails the writer switches to stderr
/// for the rest of the process.
#[derive(Clone)]
pub struct LogFileWriter {
    state: Arc<Mutex<WriterState>>,
}

struct WriterState {
    file: BufWriter<File>,
    fallback_mode: bool,
}

impl LogFileWriter {
    pub fn new(config: &FileConfig) -> Result<Self, LoggerError> {
        if let Some(parent) = config.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = open_log_file(&config.path, config.append)?;

        Ok(Self {
            state: Arc::new(Mutex::new(WriterState {
                file,
                fallback_mode: false,
            })),
        })
    }

    pub fn is_in_fallback_mode(&self) -> bool {
        self.state.lock().map(|s| s.fallback_mode).unwrap_or(false)
    }
}

impl<'a> MakeWriter<'a> for LogFileWriter {
    type Writer = LogFileGuard;

    fn make_writer(&'a self) -> Self::Writer {
        LogFileGuard {
            state: Arc::clone(&self.state),
        }
    }
}

/// Per-event handle returned by [`LogFileWriter::make_writer`].
pub struct LogFileGuard {
    state: Arc<Mutex<WriterState>>,
}

impl Write for LogFileGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::other("Failed to acquire writer lock"))?;

        if state.fallback_mode {
            return io::stderr().write(buf);
        }

        match state.file.write(buf) {
            Ok(written) => Ok(written),
            Err(e) => {
                state.fallback_mode = true;
                eprintln!("[Logger] File write failed, falling back to stderr: {}", e);
                io::stderr().write(buf)
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::other("Failed to acquire writer lock"))?;

        if state.fallback_mode {
            return io::stderr().flush();
        }
        state.file.flush()
    }
}

impl Drop for LogFileGuard {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            let _ = state.file.flush();
        }
    }
}

fn open_log_file(path: &Path, append: bool) -> io::Result<BufWriter<File>> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)?;

    Ok(BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::LogFormat;
    use tempfile::TempDir;

    fn file_config(dir: &TempDir, append: bool) -> FileConfig {
        FileConfig {
            enabled: true,
            path: dir.path().join("nested").join("app.log"),
            append,
            format: LogFormat::Full,
        }
    }

    #[test]
    fn test_writer_creates_directories_and_writes() {
        let dir = TempDir::new().unwrap();
        let config = file_config(&dir, true);
        let writer = LogFileWriter::new(&config).unwrap();

        {
            let mut guard = writer.make_writer();
            guard.write_all(b"first line\n").unwrap();
        }

        let contents = std::fs::read_to_string(&config.path).unwrap();
        assert_eq!(contents, "first line\n");
        assert!(!writer.is_in_fallback_mode());
    }

    #[test]
    fn test_append_and_truncate_modes() {
        let dir = TempDir::new().unwrap();
        let config = file_config(&dir, true);
        std::fs::create_dir_all(config.path.parent().unwrap()).unwrap();
        std::fs::write(&config.path, "old\n").unwrap();

        {
            let writer = LogFileWriter::new(&config).unwrap();
            writer.make_writer().write_all(b"new\n").unwrap();
        }
        assert_eq!(std::fs::read_to_string(&config.path).unwrap(), "old\nnew\n");

        let truncating = FileConfig {
            append: false,
            ..config.clone()
        };
        {
            let writer = LogFileWriter::new(&truncating).unwrap();
            writer.make_writer().write_all(b"fresh\n").unwrap();
        }
        assert_eq!(std::fs::read_to_string(&config.path).unwrap(), "fresh\n");
    }
}
