use rusqlite::{Connection, params};
use serde_json::{Value, json};

use super::{Table, fetch_page};
use crate::formatters::{format_eth1_address, format_validator_with_name};
use crate::models::{MinipoolRow, Page};
use crate::params::{LIKE_ESCAPE, SortColumn, TableParams};

/// Pubkey the indexer stores until a minipool has been assigned a validator.
const UNASSIGNED_PUBKEY: [u8; 48] = [0u8; 48];

const COLUMNS: &str = "
    rocketpool_minipools.address,
    rocketpool_minipools.pubkey,
    validators.validatorindex AS validator_index,
    COALESCE(validator_names.name, '') AS validator_name,
    rocketpool_minipools.node_address,
    rocketpool_minipools.node_fee,
    rocketpool_minipools.deposit_type,
    rocketpool_minipools.status,
    cnt.total_count AS total_count";

const JOINS: &str = "
    LEFT JOIN validator_names ON rocketpool_minipools.pubkey = validator_names.publickey
    LEFT JOIN validators ON rocketpool_minipools.pubkey = validators.pubkey";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinipoolColumn {
    Address,
    Pubkey,
    NodeAddress,
    NodeFee,
    DepositType,
    Status,
}

impl SortColumn for MinipoolColumn {
    const DEFAULT: Self = MinipoolColumn::Address;

    fn from_index(index: &str) -> Option<Self> {
        match index {
            "0" => Some(MinipoolColumn::Address),
            "1" => Some(MinipoolColumn::Pubkey),
            "2" => Some(MinipoolColumn::NodeAddress),
            "3" => Some(MinipoolColumn::NodeFee),
            "4" => Some(MinipoolColumn::DepositType),
            "5" => Some(MinipoolColumn::Status),
            _ => None,
        }
    }

    fn as_sql(&self) -> &'static str {
        match self {
            MinipoolColumn::Address => "rocketpool_minipools.address",
            MinipoolColumn::Pubkey => "rocketpool_minipools.pubkey",
            MinipoolColumn::NodeAddress => "rocketpool_minipools.node_address",
            MinipoolColumn::NodeFee => "rocketpool_minipools.node_fee",
            MinipoolColumn::DepositType => "rocketpool_minipools.deposit_type",
            MinipoolColumn::Status => "rocketpool_minipools.status",
        }
    }
}

pub struct Minipools;

impl Table for Minipools {
    type Column = MinipoolColumn;
    type Row = MinipoolRow;

    const NAME: &'static str = "rocketpool-minipools";

    fn fetch(
        conn: &Connection,
        params: &TableParams<MinipoolColumn>,
    ) -> rusqlite::Result<Page<MinipoolRow>> {
        let order = params.order_clause();
        let (limit, offset) = params.limit_offset();

        match &params.search {
            None => {
                let sql = format!(
                    "SELECT {COLUMNS}
                    FROM rocketpool_minipools
                    {JOINS}
                    CROSS JOIN (SELECT COUNT(*) AS total_count FROM rocketpool_minipools) AS cnt
                    ORDER BY {order}
                    LIMIT ?1 OFFSET ?2"
                );
                fetch_page(conn, &sql, params![limit, offset], map_row)
            }
            Some(search) => {
                let sql = format!(
                    "WITH matched AS (
                        SELECT address FROM rocketpool_minipools
                            WHERE hex(pubkey) LIKE ?3 ESCAPE '{LIKE_ESCAPE}'
                        UNION SELECT address FROM rocketpool_minipools
                            WHERE hex(address) LIKE ?3 ESCAPE '{LIKE_ESCAPE}'
                        UNION SELECT rocketpool_minipools.address FROM validator_names
                            INNER JOIN rocketpool_minipools ON rocketpool_minipools.pubkey = validator_names.publickey
                            WHERE validator_names.name LIKE ?4 ESCAPE '{LIKE_ESCAPE}'
                    )
                    SELECT {COLUMNS}
                    FROM rocketpool_minipools
                    INNER JOIN matched ON rocketpool_minipools.address = matched.address
                    {JOINS}
                    CROSS JOIN (SELECT COUNT(*) AS total_count FROM matched) AS cnt
                    ORDER BY {order}
                    LIMIT ?1 OFFSET ?2"
                );
                fetch_page(
                    conn,
                    &sql,
                    params![limit, offset, search.prefix_pattern(), search.contains_pattern()],
                    map_row,
                )
            }
        }
    }

    fn display(row: &MinipoolRow) -> Vec<Value> {
        let validator = if row.pubkey.as_slice() == UNASSIGNED_PUBKEY.as_slice() {
            "N/A".to_string()
        } else {
            format_validator_with_name(&row.pubkey, row.validator_index, &row.validator_name)
        };
        vec![
            json!(format_eth1_address(&row.address)),
            json!(validator),
            json!(format_eth1_address(&row.node_address)),
            json!(row.node_fee),
            json!(row.deposit_type),
            json!(row.status),
        ]
    }
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MinipoolRow> {
    Ok(MinipoolRow {
        address: row.get(0)?,
        pubkey: row.get(1)?,
        validator_index: row.get(2)?,
        validator_name: row.get(3)?,
        node_address: row.get(4)?,
        node_fee: row.get(5)?,
        deposit_type: row.get(6)?,
        status: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TestDb, minipool, params, pubkey};
    use pretty_assertions::assert_eq;

    fn seeded() -> TestDb {
        let db = TestDb::new();
        for n in 1..=5 {
            db.insert_minipool(&minipool(n));
        }
        let mut named = minipool(0xab);
        named.validator_name = "Rocket Rick".to_string();
        db.insert_minipool(&named);
        db
    }

    #[test]
    fn unfiltered_page_reports_table_size() {
        let db = seeded();
        let page = Minipools::fetch(&db.conn(), &params("draw=1&start=0&length=4")).unwrap();

        assert_eq!(page.total_count, 6);
        assert_eq!(page.rows.len(), 4);
        // default: address descending
        assert_eq!(page.rows[0].address, vec![0xab; 20]);
        assert_eq!(page.rows[0].validator_name, "Rocket Rick");
        assert_eq!(page.rows[1].validator_index, Some(5000));
    }

    #[test]
    fn offset_past_the_end_is_an_empty_page() {
        let db = seeded();
        let page = Minipools::fetch(&db.conn(), &params("draw=1&start=50&length=10")).unwrap();
        assert_eq!(page, Page { rows: vec![], total_count: 0 });
    }

    #[test]
    fn search_matches_pubkey_prefix_case_insensitively() {
        let db = seeded();
        let page = Minipools::fetch(
            &db.conn(),
            &params("draw=1&start=0&length=10&search%5Bvalue%5D=0x0303"),
        )
        .unwrap();

        assert_eq!(page.total_count, 1);
        assert_eq!(page.rows[0].pubkey, pubkey(3));

        let page = Minipools::fetch(
            &db.conn(),
            &params("draw=1&start=0&length=10&search%5Bvalue%5D=ABAB"),
        )
        .unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.rows[0].address, vec![0xab; 20]);
    }

    #[test]
    fn search_matches_validator_names_by_substring() {
        let db = seeded();
        let page = Minipools::fetch(
            &db.conn(),
            &params("draw=1&start=0&length=10&search%5Bvalue%5D=rick"),
        )
        .unwrap();

        assert_eq!(page.total_count, 1);
        assert_eq!(page.rows[0].validator_name, "Rocket Rick");
    }

    #[test]
    fn sorts_by_whitelisted_columns() {
        let db = TestDb::new();
        for (n, fee) in [(1u8, 0.2), (2, 0.05), (3, 0.1)] {
            let mut row = minipool(n);
            row.node_fee = fee;
            db.insert_minipool(&row);
        }
        let page = Minipools::fetch(
            &db.conn(),
            &params("draw=1&start=0&length=10&order%5B0%5D%5Bcolumn%5D=3&order%5B0%5D%5Bdir%5D=asc"),
        )
        .unwrap();

        let fees: Vec<f64> = page.rows.iter().map(|r| r.node_fee).collect();
        assert_eq!(fees, vec![0.05, 0.1, 0.2]);
    }

    #[test]
    fn unassigned_pubkey_renders_not_available() {
        let mut row = minipool(1);
        row.pubkey = vec![0u8; 48];
        row.validator_name = "ignored".to_string();

        let cells = Minipools::display(&row);
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[1], json!("N/A"));
        assert_eq!(cells[3], json!(0.15));
        assert_eq!(cells[4], json!("Full"));
        assert_eq!(cells[5], json!("Staking"));
    }

    #[test]
    fn assigned_pubkey_renders_validator_link() {
        let cells = Minipools::display(&minipool(2));
        let validator = cells[1].as_str().unwrap();
        assert!(validator.contains(r#"href="/validator/2000""#));
    }
}
