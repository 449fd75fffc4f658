use rusqlite::{Connection, params};
use serde_json::{Value, json};

use super::{Table, fetch_page};
use crate::formatters::format_eth1_address;
use crate::models::{NodeRow, Page};
use crate::params::{LIKE_ESCAPE, SortColumn, TableParams};

const COLUMNS: &str = "
    rocketpool_nodes.address,
    rocketpool_nodes.timezone_location,
    rocketpool_nodes.rpl_stake,
    rocketpool_nodes.min_rpl_stake,
    rocketpool_nodes.max_rpl_stake,
    cnt.total_count AS total_count";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeColumn {
    Address,
    TimezoneLocation,
    RplStake,
    MinRplStake,
    MaxRplStake,
}

impl SortColumn for NodeColumn {
    const DEFAULT: Self = NodeColumn::Address;

    fn from_index(index: &str) -> Option<Self> {
        match index {
            "0" => Some(NodeColumn::Address),
            "1" => Some(NodeColumn::TimezoneLocation),
            "2" => Some(NodeColumn::RplStake),
            "3" => Some(NodeColumn::MinRplStake),
            "4" => Some(NodeColumn::MaxRplStake),
            _ => None,
        }
    }

    // Stakes are wei strings; compare them as numbers.
    fn as_sql(&self) -> &'static str {
        match self {
            NodeColumn::Address => "rocketpool_nodes.address",
            NodeColumn::TimezoneLocation => "rocketpool_nodes.timezone_location",
            NodeColumn::RplStake => "CAST(rocketpool_nodes.rpl_stake AS REAL)",
            NodeColumn::MinRplStake => "CAST(rocketpool_nodes.min_rpl_stake AS REAL)",
            NodeColumn::MaxRplStake => "CAST(rocketpool_nodes.max_rpl_stake AS REAL)",
        }
    }
}

pub struct Nodes;

impl Table for Nodes {
    type Column = NodeColumn;
    type Row = NodeRow;

    const NAME: &'static str = "rocketpool-nodes";

    fn fetch(
        conn: &Connection,
        params: &TableParams<NodeColumn>,
    ) -> rusqlite::Result<Page<NodeRow>> {
        let order = params.order_clause();
        let (limit, offset) = params.limit_offset();

        match &params.search {
            None => {
                let sql = format!(
                    "SELECT {COLUMNS}
                    FROM rocketpool_nodes
                    CROSS JOIN (SELECT COUNT(*) AS total_count FROM rocketpool_nodes) AS cnt
                    ORDER BY {order}
                    LIMIT ?1 OFFSET ?2"
                );
                fetch_page(conn, &sql, params![limit, offset], map_row)
            }
            Some(search) => {
                let sql = format!(
                    "WITH matched AS (
                        SELECT address FROM rocketpool_nodes
                            WHERE hex(address) LIKE ?3 ESCAPE '{LIKE_ESCAPE}'
                    )
                    SELECT {COLUMNS}
                    FROM rocketpool_nodes
                    INNER JOIN matched ON rocketpool_nodes.address = matched.address
                    CROSS JOIN (SELECT COUNT(*) AS total_count FROM matched) AS cnt
                    ORDER BY {order}
                    LIMIT ?1 OFFSET ?2"
                );
                fetch_page(conn, &sql, params![limit, offset, search.prefix_pattern()], map_row)
            }
        }
    }

    fn display(row: &NodeRow) -> Vec<Value> {
        vec![
            json!(format_eth1_address(&row.address)),
            json!(row.timezone_location),
            json!(row.rpl_stake),
            json!(row.min_rpl_stake),
            json!(row.max_rpl_stake),
        ]
    }
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<NodeRow> {
    Ok(NodeRow {
        address: row.get(0)?,
        timezone_location: row.get(1)?,
        rpl_stake: row.get(2)?,
        min_rpl_stake: row.get(3)?,
        max_rpl_stake: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TestDb, address, node, params};
    use pretty_assertions::assert_eq;

    #[test]
    fn search_count_is_the_matched_set() {
        let db = TestDb::new();
        for n in [0x10, 0x11, 0x12, 0x20] {
            db.insert_node(&node(n));
        }

        let query = params("draw=1&start=0&length=10&search%5Bvalue%5D=0x1");
        let page = Nodes::fetch(&db.conn(), &query).unwrap();
        assert_eq!(page.total_count, 3);
        assert!(page.rows.iter().all(|r| r.address[0] >> 4 == 0x1));

        let page = Nodes::fetch(&db.conn(), &params("draw=1&start=0&length=10")).unwrap();
        assert_eq!(page.total_count, 4);
    }

    #[test]
    fn stakes_sort_numerically() {
        let db = TestDb::new();
        // 9 RPL sorts below 10 RPL even though "9..." > "1..." as text
        for n in [9, 10, 2] {
            db.insert_node(&node(n));
        }
        let page = Nodes::fetch(
            &db.conn(),
            &params("draw=1&start=0&length=10&order%5B0%5D%5Bcolumn%5D=2&order%5B0%5D%5Bdir%5D=desc"),
        )
        .unwrap();

        let order: Vec<Vec<u8>> = page.rows.into_iter().map(|r| r.address).collect();
        assert_eq!(order, vec![address(10), address(9), address(2)]);
    }

    #[test]
    fn displays_five_cells() {
        let cells = Nodes::display(&node(3));
        assert_eq!(cells.len(), 5);
        assert_eq!(cells[1], json!("Europe/Berlin"));
        assert_eq!(cells[2], json!("3000000000000000000"));
    }
}
