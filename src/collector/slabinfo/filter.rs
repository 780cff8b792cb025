//! Line admission for `/proc/slabinfo`.

use regex::Regex;

/// Marker present in the version banner (`slabinfo - version: 2.1`).
const VERSION_MARKER: &str = "slabinfo -";
/// Marker present in the column header (`# name <active_objs> ...`).
const HEADER_MARKER: &str = "# name";

/// Error returned when the inclusion pattern does not compile.
#[derive(Debug)]
pub struct FilterError {
    pub pattern: String,
    pub source: regex::Error,
}

impl std::fmt::Display for FilterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid filter pattern {:?}: {}", self.pattern, self.source)
    }
}

impl std::error::Error for FilterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Decides which lines of slabinfo are data rows worth parsing.
///
/// Banner and header lines are always rejected. When an inclusion pattern
/// is set, a line is accepted only if the pattern matches it.
#[derive(Debug, Clone, Default)]
pub struct LineFilter {
    include: Option<Regex>,
}

impl LineFilter {
    /// Creates a filter with an optional inclusion pattern.
    ///
    /// `None` and the empty string both mean "accept every data row".
    pub fn new(pattern: Option<&str>) -> Result<Self, FilterError> {
        let include = match pattern {
            Some(p) if !p.is_empty() => Some(Regex::new(p).map_err(|source| FilterError {
                pattern: p.to_string(),
                source,
            })?),
            _ => None,
        };
        Ok(Self { include })
    }

    /// Returns the inclusion pattern, if one is configured.
    pub fn pattern(&self) -> Option<&str> {
        self.include.as_ref().map(Regex::as_str)
    }

    /// Returns `true` if `line` is a data row admitted by the filter.
    pub fn should_parse(&self, line: &str) -> bool {
        if line.contains(VERSION_MARKER) || line.contains(HEADER_MARKER) {
            return false;
        }
        match &self.include {
            Some(re) => re.is_match(line),
            None => true,
        }
    }
}
