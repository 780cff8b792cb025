//! In-memory mock filesystem for testing collectors without real `/proc`.
//!
//! This module provides `MockFs` which simulates a filesystem in memory,
//! allowing tests to run on macOS and in CI environments without Linux.

use crate::collector::traits::{FileSystem, LineSource};
use std::collections::{HashMap, HashSet};
use std::io::{self, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

/// Contents of a mock file.
#[derive(Debug, Clone)]
struct MockFile {
    content: String,
    /// When set, reading past `content` fails with this message instead of
    /// reporting EOF.
    read_error: Option<String>,
}

/// In-memory filesystem for testing.
///
/// Stores files in memory, allowing tests to simulate various `/proc`
/// states (including unreadable and truncated files) without Linux.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    files: HashMap<PathBuf, MockFile>,
    directories: HashSet<PathBuf>,
    /// Paths that exist but refuse to open (e.g. permission denied).
    denied: HashSet<PathBuf>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with the given content.
    ///
    /// Parent directories are automatically created.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        self.insert(path.as_ref(), content.into(), None);
    }

    /// Adds a file whose reader yields `content` and then fails with an I/O
    /// error instead of reaching EOF.
    pub fn add_file_with_read_error(
        &mut self,
        path: impl AsRef<Path>,
        content: impl Into<String>,
        error: impl Into<String>,
    ) {
        self.insert(path.as_ref(), content.into(), Some(error.into()));
    }

    /// Marks a path as existing but not openable.
    pub fn deny(&mut self, path: impl AsRef<Path>) {
        self.denied.insert(path.as_ref().to_path_buf());
    }

    fn insert(&mut self, path: &Path, content: String, read_error: Option<String>) {
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }

        self.files.insert(
            path.to_path_buf(),
            MockFile {
                content,
                read_error,
            },
        );
    }

    fn lookup(&self, path: &Path) -> io::Result<&MockFile> {
        if self.denied.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {:?}", path),
            ));
        }
        self.files.get(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )
        })
    }
}

/// Reader that serves its buffer and then fails once exhausted.
struct FailingReader {
    inner: Cursor<Vec<u8>>,
    error: String,
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n == 0 && !buf.is_empty() {
            return Err(io::Error::other(self.error.clone()));
        }
        Ok(n)
    }
}

impl FileSystem for MockFs {
    fn open(&self, path: &Path) -> io::Result<LineSource> {
        let file = self.lookup(path)?;
        let bytes = file.content.clone().into_bytes();
        match &file.read_error {
            None => Ok(Box::new(Cursor::new(bytes))),
            Some(error) => Ok(Box::new(BufReader::new(FailingReader {
                inner: Cursor::new(bytes),
                error: error.clone(),
            }))),
        }
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let file = self.lookup(path)?;
        match &file.read_error {
            None => Ok(file.content.clone()),
            Some(error) => Err(io::Error::other(error.clone())),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
            || self.directories.contains(path)
            || self.denied.contains(path)
    }
}
