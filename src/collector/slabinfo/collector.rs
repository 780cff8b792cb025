//! Snapshot collector for `/proc/slabinfo`.
//!
//! Every pass opens the source afresh, runs each line through
//! [`LineFilter`] → [`parse_slab`] → [`expand`] and keeps going past bad rows.
//! The collector itself holds no mutable state, so passes may overlap.

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, warn};

use super::filter::{FilterError, LineFilter};
use super::mapper::{Measurement, NAMESPACE, POOL_LABEL, expand};
use super::parser::{ParseError, ROW_SCHEMA, SlabInfo, parse_slab};
use crate::collector::traits::FileSystem;

/// Error type for problems met during a collection pass.
///
/// None of these abort the process; they are reported alongside whatever
/// measurements the pass managed to produce.
#[derive(Debug)]
pub enum CollectError {
    /// The source could not be opened. The pass produced nothing.
    SourceUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A data row was skipped because it failed to parse.
    Row {
        line_number: usize,
        error: ParseError,
    },
    /// Reading stopped early. Rows read before the error are kept.
    StreamRead {
        path: PathBuf,
        line_number: usize,
        source: std::io::Error,
    },
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::SourceUnavailable { path, source } => {
                write!(f, "cannot open {}: {}", path.display(), source)
            }
            CollectError::Row { line_number, error } => {
                write!(f, "line {}: {}", line_number, error)
            }
            CollectError::StreamRead {
                path,
                line_number,
                source,
            } => write!(
                f,
                "read error in {} after line {}: {}",
                path.display(),
                line_number,
                source
            ),
        }
    }
}

impl std::error::Error for CollectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectError::SourceUnavailable { source, .. } => Some(source),
            CollectError::Row { error, .. } => Some(error),
            CollectError::StreamRead { source, .. } => Some(source),
        }
    }
}

/// Result of one collection pass.
#[derive(Debug, Default)]
pub struct Snapshot {
    /// Measurements grouped by row, rows in file order.
    pub measurements: Vec<Measurement>,
    /// Problems reported during the pass.
    pub errors: Vec<CollectError>,
    /// Number of rows that parsed successfully.
    pub pools: usize,
    /// Wall time of the pass.
    pub elapsed: Duration,
}

/// Descriptor of a declared metric in the metadata listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricDesc {
    pub name: String,
    pub help: String,
    pub labels: Vec<&'static str>,
}

/// Metadata-only listing produced by [`SlabCollector::describe`].
#[derive(Debug, Default, Serialize)]
pub struct Catalog {
    /// Parsed pool names, sorted by descending name.
    pub pools: Vec<String>,
    /// One descriptor per parsed field.
    pub metrics: Vec<MetricDesc>,
    /// Problems reported while reading the source.
    #[serde(serialize_with = "serialize_errors")]
    pub errors: Vec<CollectError>,
}

fn serialize_errors<S: serde::Serializer>(
    errors: &[CollectError],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(errors.iter().map(ToString::to_string))
}

/// Default location of slabinfo on Linux.
pub const DEFAULT_SLABINFO_PATH: &str = "/proc/slabinfo";

/// Collects slab pool gauges from a slabinfo source.
pub struct SlabCollector<F: FileSystem> {
    fs: F,
    path: PathBuf,
    filter: LineFilter,
}

impl<F: FileSystem> SlabCollector<F> {
    /// Creates a new collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `path` - Path to the slabinfo file (usually `/proc/slabinfo`)
    /// * `pattern` - Optional inclusion pattern applied to raw lines
    ///
    /// Fails if `pattern` is not a valid regular expression.
    pub fn new(
        fs: F,
        path: impl Into<PathBuf>,
        pattern: Option<&str>,
    ) -> Result<Self, FilterError> {
        Ok(Self::with_filter(fs, path, LineFilter::new(pattern)?))
    }

    /// Creates a collector from an already compiled filter.
    pub fn with_filter(fs: F, path: impl Into<PathBuf>, filter: LineFilter) -> Self {
        Self {
            fs,
            path: path.into(),
            filter,
        }
    }

    /// Returns the slabinfo path this collector reads.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the line filter in use.
    pub fn filter(&self) -> &LineFilter {
        &self.filter
    }

    /// Runs one collection pass.
    ///
    /// Measurements keep file order: all measurements of a row are emitted
    /// together, rows in the order they were read. Duplicate pool names are
    /// kept as separate groups.
    pub fn collect(&self) -> Snapshot {
        let start = Instant::now();
        let mut measurements = Vec::new();
        let mut pools = 0;

        let errors = self.read_records(|info| {
            pools += 1;
            measurements.extend(expand(&info));
        });

        let snapshot = Snapshot {
            measurements,
            errors,
            pools,
            elapsed: start.elapsed(),
        };
        debug!(
            path = %self.path.display(),
            pools = snapshot.pools,
            measurements = snapshot.measurements.len(),
            errors = snapshot.errors.len(),
            elapsed_us = snapshot.elapsed.as_micros() as u64,
            "slabinfo collected"
        );
        snapshot
    }

    /// Builds the metadata listing: pool names sorted by descending name,
    /// plus one descriptor for every parsed field.
    ///
    /// The ordering here is independent from [`collect`](Self::collect),
    /// which never sorts.
    pub fn describe(&self) -> Catalog {
        let mut pools = Vec::new();
        let errors = self.read_records(|info| pools.push(info.name));
        pools.sort_by(|a, b| b.cmp(a));

        let metrics = ROW_SCHEMA
            .iter()
            .map(|field| MetricDesc {
                name: format!("{}_{}_slab", NAMESPACE, field.name),
                help: format!("{} {}", NAMESPACE, field.name),
                labels: vec![POOL_LABEL],
            })
            .collect();

        Catalog {
            pools,
            metrics,
            errors,
        }
    }

    /// Reads the source line by line and hands every parsed row to
    /// `on_record`. Returns the errors met along the way.
    fn read_records(&self, mut on_record: impl FnMut(SlabInfo)) -> Vec<CollectError> {
        let mut errors = Vec::new();

        let mut reader = match self.fs.open(&self.path) {
            Ok(reader) => reader,
            Err(source) => {
                warn!(path = %self.path.display(), error = %source, "slabinfo unavailable");
                errors.push(CollectError::SourceUnavailable {
                    path: self.path.clone(),
                    source,
                });
                return errors;
            }
        };

        let mut buf = Vec::new();
        let mut line_number = 0;
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {}
                Err(source) => {
                    warn!(
                        path = %self.path.display(),
                        line = line_number,
                        error = %source,
                        "slabinfo read failed"
                    );
                    errors.push(CollectError::StreamRead {
                        path: self.path.clone(),
                        line_number,
                        source,
                    });
                    break;
                }
            }
            line_number += 1;

            let line = match std::str::from_utf8(trim_line_ending(&buf)) {
                Ok(line) => line,
                Err(source) => {
                    let error = ParseError::InvalidEncoding { source };
                    warn!(line = line_number, error = %error, "skipping slabinfo row");
                    errors.push(CollectError::Row { line_number, error });
                    continue;
                }
            };

            if !self.filter.should_parse(line) {
                continue;
            }

            match parse_slab(line) {
                Ok(info) => on_record(info),
                Err(error) => {
                    warn!(line = line_number, error = %error, "skipping slabinfo row");
                    errors.push(CollectError::Row { line_number, error });
                }
            }
        }

        errors
    }
}

/// Strips a trailing `\n` or `\r\n`.
fn trim_line_ending(mut line: &[u8]) -> &[u8] {
    if let Some(rest) = line.strip_suffix(b"\n") {
        line = rest.strip_suffix(b"\r").unwrap_or(rest);
    }
    line
}
