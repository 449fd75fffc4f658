use actix_web::web;
use serde::Deserialize;

use crate::errors::AppError;

/// Largest page the table widget may ask for.
pub const MAX_PAGE_LENGTH: u64 = 100;

/// Longest search term passed on to the database, in characters.
pub const MAX_SEARCH_CHARS: usize = 128;

/// Escape character used in every LIKE pattern built from a search term.
pub const LIKE_ESCAPE: char = '\\';

/// The query string sent by the table widget. Fields the widget sends but
/// we do not use (`columns[i][...]` and friends) are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct DataTableQuery {
    pub draw: Option<String>,
    pub start: Option<String>,
    pub length: Option<String>,
    #[serde(rename = "search[value]")]
    pub search: Option<String>,
    #[serde(rename = "order[0][column]")]
    pub order_column: Option<String>,
    #[serde(rename = "order[0][dir]")]
    pub order_dir: Option<String>,
}

/// A column a table may be sorted by.
///
/// Implementors are closed enums; `as_sql` is the only text from a request
/// that ever reaches an ORDER BY clause.
pub trait SortColumn: Copy + Send + 'static {
    const DEFAULT: Self;

    /// Maps the widget's column index to a column, if it is sortable.
    fn from_index(index: &str) -> Option<Self>;

    fn as_sql(&self) -> &'static str;

    fn resolve(index: Option<&str>) -> Self {
        index.and_then(Self::from_index).unwrap_or(Self::DEFAULT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Anything but an exact `asc` or `desc` sorts descending.
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("asc") => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// A sanitised, non-empty search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    /// Strips every `0x` (so pasted addresses match their hex encoding) and
    /// caps the length. Returns `None` if nothing is left to search for.
    pub fn parse(raw: &str) -> Option<Self> {
        let stripped = raw.replace("0x", "");
        let term: String = stripped.chars().take(MAX_SEARCH_CHARS).collect();
        if term.is_empty() {
            None
        } else {
            Some(SearchTerm(term))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The term as typed, for equality comparisons.
    pub fn exact(&self) -> String {
        self.0.clone()
    }

    /// `term%`, to be used with `LIKE ... ESCAPE '\'`.
    pub fn prefix_pattern(&self) -> String {
        format!("{}%", escape_like(&self.0))
    }

    /// `%term%`, to be used with `LIKE ... ESCAPE '\'`.
    pub fn contains_pattern(&self) -> String {
        format!("%{}%", escape_like(&self.0))
    }
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if c == '%' || c == '_' || c == LIKE_ESCAPE {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// Validated paging, sorting and search parameters for one table request.
#[derive(Debug, Clone)]
pub struct TableParams<C: SortColumn> {
    pub draw: u64,
    pub start: u64,
    pub length: u64,
    pub search: Option<SearchTerm>,
    pub order_by: C,
    pub direction: SortDirection,
}

impl<C: SortColumn> TableParams<C> {
    pub fn from_query_string(query_string: &str) -> Result<Self, AppError> {
        let query = web::Query::<DataTableQuery>::from_query(query_string)?.into_inner();
        Self::from_query(query)
    }

    pub fn from_query(query: DataTableQuery) -> Result<Self, AppError> {
        let draw = parse_counter("draw", query.draw.as_deref())?;
        let start = parse_counter("start", query.start.as_deref())?;
        let length = parse_counter("length", query.length.as_deref())?.min(MAX_PAGE_LENGTH);

        Ok(TableParams {
            draw,
            start,
            length,
            search: query.search.as_deref().and_then(SearchTerm::parse),
            order_by: C::resolve(query.order_column.as_deref()),
            direction: SortDirection::from_param(query.order_dir.as_deref()),
        })
    }

    /// LIMIT and OFFSET as SQLite integers. An offset past `i64::MAX` can
    /// only ever produce an empty page, so it saturates.
    pub fn limit_offset(&self) -> (i64, i64) {
        (
            self.length as i64,
            i64::try_from(self.start).unwrap_or(i64::MAX),
        )
    }

    /// `ORDER BY` body built only from whitelisted column and direction text.
    pub fn order_clause(&self) -> String {
        format!("{} {}", self.order_by.as_sql(), self.direction.as_sql())
    }
}

/// Plain decimal digits only. A missing parameter is treated like an
/// unparsable one, and so is a leading `+`, which `u64::from_str` would
/// otherwise accept.
fn parse_counter(param: &'static str, value: Option<&str>) -> Result<u64, AppError> {
    let value = value.unwrap_or_default();
    match value.parse::<u64>() {
        Ok(n) if !value.starts_with('+') => Ok(n),
        _ => Err(AppError::InvalidParam {
            param,
            value: value.to_string(),
        }),
    }
}
