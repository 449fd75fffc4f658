//! The four explorer tables.
//!
//! Every table has the same two query shapes. The plain one reads the whole
//! table, the search one first collects the keys matching the term into a
//! `matched` CTE and joins against it. Both broadcast the size of the set they
//! page through as a `total_count` column, so one round trip yields the rows
//! and the pagination metadata.

use rusqlite::{Connection, Params, Row};
use serde_json::Value;

use crate::models::Page;
use crate::params::{SortColumn, TableParams};

pub mod dao_members;
pub mod dao_proposals;
pub mod minipools;
pub mod nodes;

pub use dao_members::DaoMembers;
pub use dao_proposals::DaoProposals;
pub use minipools::Minipools;
pub use nodes::Nodes;

/// A paginated, sortable, searchable view over one table.
pub trait Table: 'static {
    type Column: SortColumn;
    type Row: Send + 'static;

    /// Used in log lines.
    const NAME: &'static str;

    fn fetch(
        conn: &Connection,
        params: &TableParams<Self::Column>,
    ) -> rusqlite::Result<Page<Self::Row>>;

    /// One table cell per column, in the order the widget declares them.
    fn display(row: &Self::Row) -> Vec<Value>;
}

/// Runs a page query whose last selected column is `total_count`.
pub(crate) fn fetch_page<T, P, F>(
    conn: &Connection,
    sql: &str,
    params: P,
    map_row: F,
) -> rusqlite::Result<Page<T>>
where
    P: Params,
    F: Fn(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;

    let mut page = Page {
        rows: Vec::new(),
        total_count: 0,
    };
    while let Some(row) = rows.next()? {
        if page.rows.is_empty() {
            let total: i64 = row.get("total_count")?;
            page.total_count = total.max(0) as u64;
        }
        page.rows.push(map_row(row)?);
    }
    Ok(page)
}
