//! Abstractions for filesystem access to enable testing and mocking.
//!
//! The `FileSystem` trait allows the collector to read the real
//! `/proc/slabinfo` on Linux and canned content in tests on any platform.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Line-oriented reader handed out by [`FileSystem::open`].
pub type LineSource = Box<dyn BufRead + Send>;

/// Abstraction for filesystem operations.
///
/// This trait allows collectors to read from the real filesystem or from
/// a mock implementation for testing purposes.
pub trait FileSystem: Send + Sync {
    /// Opens a file for buffered, line-by-line reading.
    ///
    /// Errors returned here mean the source is unavailable. Errors surfaced
    /// later by the reader are read errors in the middle of the stream.
    fn open(&self, path: &Path) -> io::Result<LineSource>;

    /// Reads the entire contents of a file as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Checks if a path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Real filesystem implementation that delegates to `std::fs`.
///
/// Use this in production to read from the actual `/proc` filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    /// Creates a new `RealFs` instance.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn open(&self, path: &Path) -> io::Result<LineSource> {
        let file = File::open(path)?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_real_fs_open_reads_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "slabinfo - version: 2.1").unwrap();
        writeln!(file, "dentry 10 20 192 21 1 : tunables 0 0 0 : slabdata 1 1 0").unwrap();

        let fs = RealFs::new();
        let lines: Vec<String> = fs
            .open(file.path())
            .unwrap()
            .lines()
            .collect::<io::Result<_>>()
            .unwrap();

        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("dentry"));
    }

    #[test]
    fn test_real_fs_open_missing_file() {
        let fs = RealFs::new();
        let result = fs.open(Path::new("/nonexistent/path/slabinfo"));
        assert_eq!(result.err().unwrap().kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_real_fs_read_to_string() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[events]\nregex = \"^kmalloc\"\n").unwrap();

        let fs = RealFs::new();
        let content = fs.read_to_string(file.path()).unwrap();
        assert!(content.contains("[events]"));
    }

    #[test]
    fn test_real_fs_exists() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let fs = RealFs::new();
        assert!(fs.exists(file.path()));
        assert!(!fs.exists(Path::new("/nonexistent/path/12345")));
    }
}
