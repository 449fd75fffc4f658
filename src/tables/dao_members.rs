use rusqlite::{Connection, params};
use serde_json::{Value, json};

use super::{Table, fetch_page};
use crate::formatters::{format_eth1_address, format_timestamp};
use crate::models::{DaoMemberRow, Page};
use crate::params::{LIKE_ESCAPE, SortColumn, TableParams};

const COLUMNS: &str = "
    rocketpool_dao_members.address,
    rocketpool_dao_members.id,
    rocketpool_dao_members.url,
    rocketpool_dao_members.joined_time,
    rocketpool_dao_members.last_proposal_time,
    rocketpool_dao_members.rpl_bond_amount,
    rocketpool_dao_members.unbonded_validator_count,
    cnt.total_count AS total_count";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaoMemberColumn {
    Address,
    Id,
    Url,
    JoinedTime,
    LastProposalTime,
    RplBondAmount,
    UnbondedValidatorCount,
}

impl SortColumn for DaoMemberColumn {
    const DEFAULT: Self = DaoMemberColumn::Id;

    fn from_index(index: &str) -> Option<Self> {
        match index {
            "0" => Some(DaoMemberColumn::Address),
            "1" => Some(DaoMemberColumn::Id),
            "2" => Some(DaoMemberColumn::Url),
            "3" => Some(DaoMemberColumn::JoinedTime),
            "4" => Some(DaoMemberColumn::LastProposalTime),
            "5" => Some(DaoMemberColumn::RplBondAmount),
            "6" => Some(DaoMemberColumn::UnbondedValidatorCount),
            _ => None,
        }
    }

    fn as_sql(&self) -> &'static str {
        match self {
            DaoMemberColumn::Address => "rocketpool_dao_members.address",
            DaoMemberColumn::Id => "rocketpool_dao_members.id",
            DaoMemberColumn::Url => "rocketpool_dao_members.url",
            DaoMemberColumn::JoinedTime => "rocketpool_dao_members.joined_time",
            DaoMemberColumn::LastProposalTime => "rocketpool_dao_members.last_proposal_time",
            DaoMemberColumn::RplBondAmount => {
                "CAST(rocketpool_dao_members.rpl_bond_amount AS REAL)"
            }
            DaoMemberColumn::UnbondedValidatorCount => {
                "rocketpool_dao_members.unbonded_validator_count"
            }
        }
    }
}

pub struct DaoMembers;

impl Table for DaoMembers {
    type Column = DaoMemberColumn;
    type Row = DaoMemberRow;

    const NAME: &'static str = "rocketpool-members";

    fn fetch(
        conn: &Connection,
        params: &TableParams<DaoMemberColumn>,
    ) -> rusqlite::Result<Page<DaoMemberRow>> {
        let order = params.order_clause();
        let (limit, offset) = params.limit_offset();

        match &params.search {
            None => {
                let sql = format!(
                    "SELECT {COLUMNS}
                    FROM rocketpool_dao_members
                    CROSS JOIN (SELECT COUNT(*) AS total_count FROM rocketpool_dao_members) AS cnt
                    ORDER BY {order}
                    LIMIT ?1 OFFSET ?2"
                );
                fetch_page(conn, &sql, params![limit, offset], map_row)
            }
            Some(search) => {
                let sql = format!(
                    "WITH matched AS (
                        SELECT address FROM rocketpool_dao_members
                            WHERE hex(address) LIKE ?3 ESCAPE '{LIKE_ESCAPE}'
                        UNION SELECT address FROM rocketpool_dao_members
                            WHERE id LIKE ?4 ESCAPE '{LIKE_ESCAPE}'
                        UNION SELECT address FROM rocketpool_dao_members
                            WHERE url LIKE ?4 ESCAPE '{LIKE_ESCAPE}'
                    )
                    SELECT {COLUMNS}
                    FROM rocketpool_dao_members
                    INNER JOIN matched ON rocketpool_dao_members.address = matched.address
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

    fn display(row: &DaoMemberRow) -> Vec<Value> {
        vec![
            json!(format_eth1_address(&row.address)),
            json!(row.id),
            json!(row.url),
            json!(format_timestamp(row.joined_time)),
            json!(format_timestamp(row.last_proposal_time)),
            json!(row.rpl_bond_amount),
            json!(row.unbonded_validator_count),
        ]
    }
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DaoMemberRow> {
    Ok(DaoMemberRow {
        address: row.get(0)?,
        id: row.get(1)?,
        url: row.get(2)?,
        joined_time: row.get(3)?,
        last_proposal_time: row.get(4)?,
        rpl_bond_amount: row.get(5)?,
        unbonded_validator_count: row.get(6)?,
    })
}
