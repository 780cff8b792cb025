//! Parser for `/proc/slabinfo` data rows.
//!
//! Pure functions over a single line of text, designed to be easily testable
//! with string inputs.
//!
//! Row format (slabinfo 2.x), 16 whitespace-separated tokens:
//!
//! ```text
//! name active_objs num_objs objsize objperslab pagesperslab : tunables limit batchcount sharedfactor : slabdata active_slabs num_slabs sharedavail
//! 0    1           2        3       4          5            6 7        8     9          10           11 12      13           14        15
//! ```

use std::num::ParseIntError;
use std::str::Utf8Error;
use std::sync::LazyLock;

use regex::Regex;

/// Number of tokens in a well-formed data row.
pub const ROW_TOKENS: usize = 16;

/// Token positions holding the `:`, `tunables`, `:` and `slabdata` markers.
pub const STRUCTURAL_TOKENS: [usize; 4] = [6, 7, 11, 12];

/// ASCII whitespace only; Unicode spaces such as NBSP stay inside tokens.
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\t\n\f\r ]+").expect("whitespace pattern is valid"));

/// Error type for row parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The row did not split into exactly [`ROW_TOKENS`] tokens.
    MalformedRow { line: String, tokens: usize },
    /// A numeric token is not a base-10 `i64`.
    FieldConversion {
        field: &'static str,
        token: String,
        source: ParseIntError,
    },
    /// The row is not valid UTF-8.
    InvalidEncoding { source: Utf8Error },
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::MalformedRow { line, tokens } => write!(
                f,
                "malformed row shape ({} tokens, expected {}): {}",
                tokens, ROW_TOKENS, line
            ),
            ParseError::FieldConversion {
                field,
                token,
                source,
            } => write!(f, "invalid {} {:?}: {}", field, token, source),
            ParseError::InvalidEncoding { source } => {
                write!(f, "row is not valid UTF-8: {}", source)
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::MalformedRow { .. } => None,
            ParseError::FieldConversion { source, .. } => Some(source),
            ParseError::InvalidEncoding { source } => Some(source),
        }
    }
}

/// Parsed data from one `/proc/slabinfo` row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlabInfo {
    /// Pool name, normalized with [`normalize_name`].
    pub name: String,
    pub active_objs: i64,
    pub num_objs: i64,
    /// Object size in bytes.
    pub objsize: i64,
    pub objperslab: i64,
    pub pagesperslab: i64,
    // tunables
    pub limit: i64,
    pub batchcount: i64,
    pub sharedfactor: i64,
    // slabdata
    pub active_slabs: i64,
    pub num_slabs: i64,
    pub sharedavail: i64,
}

/// One semantic column of a slabinfo row.
pub struct FieldSpec {
    /// Token position in the collapsed row.
    pub index: usize,
    pub name: &'static str,
    assign: fn(&mut SlabInfo, i64),
}

const fn field(index: usize, name: &'static str, assign: fn(&mut SlabInfo, i64)) -> FieldSpec {
    FieldSpec {
        index,
        name,
        assign,
    }
}

/// Semantic columns in token order. Positions missing here are either the
/// name (0) or listed in [`STRUCTURAL_TOKENS`].
pub static ROW_SCHEMA: [FieldSpec; 11] = [
    field(1, "active_objs", |s, v| s.active_objs = v),
    field(2, "num_objs", |s, v| s.num_objs = v),
    field(3, "objsize", |s, v| s.objsize = v),
    field(4, "objperslab", |s, v| s.objperslab = v),
    field(5, "pagesperslab", |s, v| s.pagesperslab = v),
    field(8, "limit", |s, v| s.limit = v),
    field(9, "batchcount", |s, v| s.batchcount = v),
    field(10, "sharedfactor", |s, v| s.sharedfactor = v),
    field(13, "active_slabs", |s, v| s.active_slabs = v),
    field(14, "num_slabs", |s, v| s.num_slabs = v),
    field(15, "sharedavail", |s, v| s.sharedavail = v),
];

/// Parses one data row of `/proc/slabinfo`.
///
/// Whitespace runs are collapsed to a single space before splitting, so
/// leading or trailing whitespace yields empty tokens and a malformed row.
/// No partially filled record is ever returned.
pub fn parse_slab(line: &str) -> Result<SlabInfo, ParseError> {
    let collapsed = WHITESPACE.replace_all(line, " ");
    let tokens: Vec<&str> = collapsed.split(' ').collect();

    if tokens.len() != ROW_TOKENS {
        return Err(ParseError::MalformedRow {
            line: line.to_string(),
            tokens: tokens.len(),
        });
    }

    let mut info = SlabInfo {
        name: normalize_name(tokens[0]),
        ..SlabInfo::default()
    };

    for field in &ROW_SCHEMA {
        let token = tokens[field.index];
        let value = token
            .parse::<i64>()
            .map_err(|source| ParseError::FieldConversion {
                field: field.name,
                token: token.to_string(),
                source,
            })?;
        (field.assign)(&mut info, value);
    }

    Ok(info)
}

/// Makes a pool name safe to use as a metric label value.
///
/// Replaces `:`, `.`, `-` and `/` with `_`; everything else is kept as is.
pub fn normalize_name(raw: &str) -> String {
    raw.replace([':', '.', '-', '/'], "_")
}
