use rusqlite::{Connection, params};
use serde_json::{Value, json};

use super::{Table, fetch_page};
use crate::formatters::{escape_html, format_eth1_address, format_payload, format_timestamp};
use crate::models::{DaoProposalRow, Page};
use crate::params::{LIKE_ESCAPE, SortColumn, TableParams};

const COLUMNS: &str = "
    rocketpool_dao_proposals.id,
    rocketpool_dao_proposals.dao,
    rocketpool_dao_proposals.proposer_address,
    rocketpool_dao_proposals.message,
    rocketpool_dao_proposals.created_time,
    rocketpool_dao_proposals.start_time,
    rocketpool_dao_proposals.end_time,
    rocketpool_dao_proposals.expiry_time,
    rocketpool_dao_proposals.votes_required,
    rocketpool_dao_proposals.votes_for,
    rocketpool_dao_proposals.votes_against,
    rocketpool_dao_proposals.member_voted,
    rocketpool_dao_proposals.member_supported,
    rocketpool_dao_proposals.is_cancelled,
    rocketpool_dao_proposals.is_executed,
    rocketpool_dao_proposals.payload,
    rocketpool_dao_proposals.state,
    cnt.total_count AS total_count";

/// Sortable proposal columns. The widget does not sort the time and vote
/// columns (indexes 4-13).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaoProposalColumn {
    Id,
    Dao,
    Proposer,
    Message,
    IsExecuted,
    Payload,
    State,
}

impl SortColumn for DaoProposalColumn {
    const DEFAULT: Self = DaoProposalColumn::Id;

    fn from_index(index: &str) -> Option<Self> {
        match index {
            "0" => Some(DaoProposalColumn::Id),
            "1" => Some(DaoProposalColumn::Dao),
            "2" => Some(DaoProposalColumn::Proposer),
            "3" => Some(DaoProposalColumn::Message),
            "14" => Some(DaoProposalColumn::IsExecuted),
            "15" => Some(DaoProposalColumn::Payload),
            "16" => Some(DaoProposalColumn::State),
            _ => None,
        }
    }

    fn as_sql(&self) -> &'static str {
        match self {
            DaoProposalColumn::Id => "rocketpool_dao_proposals.id",
            DaoProposalColumn::Dao => "rocketpool_dao_proposals.dao",
            DaoProposalColumn::Proposer => "rocketpool_dao_proposals.proposer_address",
            DaoProposalColumn::Message => "rocketpool_dao_proposals.message",
            DaoProposalColumn::IsExecuted => "rocketpool_dao_proposals.is_executed",
            DaoProposalColumn::Payload => "rocketpool_dao_proposals.payload",
            DaoProposalColumn::State => "rocketpool_dao_proposals.state",
        }
    }
}

pub struct DaoProposals;

impl Table for DaoProposals {
    type Column = DaoProposalColumn;
    type Row = DaoProposalRow;

    const NAME: &'static str = "rocketpool-proposals";

    fn fetch(
        conn: &Connection,
        params: &TableParams<DaoProposalColumn>,
    ) -> rusqlite::Result<Page<DaoProposalRow>> {
        let order = params.order_clause();
        let (limit, offset) = params.limit_offset();

        match &params.search {
            None => {
                let sql = format!(
                    "SELECT {COLUMNS}
                    FROM rocketpool_dao_proposals
                    CROSS JOIN (SELECT COUNT(*) AS total_count FROM rocketpool_dao_proposals) AS cnt
                    ORDER BY {order}
                    LIMIT ?1 OFFSET ?2"
                );
                fetch_page(conn, &sql, params![limit, offset], map_row)
            }
            Some(search) => {
                // ?3 exact term, ?4 prefix pattern, ?5 substring pattern
                let sql = format!(
                    "WITH matched AS (
                        SELECT id FROM rocketpool_dao_proposals WHERE CAST(id AS TEXT) = ?3
                        UNION SELECT id FROM rocketpool_dao_proposals
                            WHERE dao LIKE ?5 ESCAPE '{LIKE_ESCAPE}'
                        UNION SELECT id FROM rocketpool_dao_proposals
                            WHERE message LIKE ?5 ESCAPE '{LIKE_ESCAPE}'
                        UNION SELECT id FROM rocketpool_dao_proposals WHERE state = ?3
                        UNION SELECT id FROM rocketpool_dao_proposals
                            WHERE hex(proposer_address) LIKE ?4 ESCAPE '{LIKE_ESCAPE}'
                    )
                    SELECT {COLUMNS}
                    FROM rocketpool_dao_proposals
                    INNER JOIN matched ON rocketpool_dao_proposals.id = matched.id
                    CROSS JOIN (SELECT COUNT(*) AS total_count FROM matched) AS cnt
                    ORDER BY {order}
                    LIMIT ?1 OFFSET ?2"
                );
                fetch_page(
                    conn,
                    &sql,
                    params![
                        limit,
                        offset,
                        search.exact(),
                        search.prefix_pattern(),
                        search.contains_pattern()
                    ],
                    map_row,
                )
            }
        }
    }

    fn display(row: &DaoProposalRow) -> Vec<Value> {
        vec![
            json!(row.id),
            json!(row.dao),
            json!(format_eth1_address(&row.proposer_address)),
            json!(escape_html(&row.message)),
            json!(format_timestamp(row.created_time)),
            json!(format_timestamp(row.start_time)),
            json!(format_timestamp(row.end_time)),
            json!(format_timestamp(row.expiry_time)),
            json!(row.votes_required),
            json!(row.votes_for),
            json!(row.votes_against),
            json!(row.member_voted),
            json!(row.member_supported),
            json!(row.is_cancelled),
            json!(row.is_executed),
            json!(format_payload(&row.payload)),
            json!(row.state),
        ]
    }
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DaoProposalRow> {
    Ok(DaoProposalRow {
        id: row.get(0)?,
        dao: row.get(1)?,
        proposer_address: row.get(2)?,
        message: row.get(3)?,
        created_time: row.get(4)?,
        start_time: row.get(5)?,
        end_time: row.get(6)?,
        expiry_time: row.get(7)?,
        votes_required: row.get(8)?,
        votes_for: row.get(9)?,
        votes_against: row.get(10)?,
        member_voted: row.get(11)?,
        member_supported: row.get(12)?,
        is_cancelled: row.get(13)?,
        is_executed: row.get(14)?,
        payload: row.get(15)?,
        state: row.get(16)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TestDb, address, params, proposal};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn seeded() -> TestDb {
        let db = TestDb::new();
        for id in 1..=12 {
            db.insert_proposal(&proposal(id));
        }
        let mut odd = proposal(40);
        odd.dao = "rocketDAOProtocolProposals".to_string();
        odd.message = "Raise 100% of <fees>".to_string();
        odd.state = "Executed".to_string();
        odd.proposer_address = address(0xc4);
        db.insert_proposal(&odd);
        db
    }

    fn ids(db: &TestDb, query_string: &str) -> (Vec<i64>, u64) {
        let page = DaoProposals::fetch(&db.conn(), &params(query_string)).unwrap();
        (page.rows.iter().map(|r| r.id).collect(), page.total_count)
    }

    #[test]
    fn default_order_is_id_descending() {
        let db = seeded();
        let (ids, total) = ids(&db, "draw=1&start=1&length=3");
        assert_eq!(ids, vec![12, 11, 10]);
        assert_eq!(total, 13);
    }

    #[rstest]
    #[case::exact_id("12", vec![12])]
    #[case::no_match("zzz", vec![])]
    #[case::exact_state("Executed", vec![40])]
    #[case::dao_substring("protocol", vec![40])]
    #[case::message_literal_percent("100%25", vec![40])]
    #[case::proposer_prefix("0xC4c4", vec![40])]
    #[case::proposer_shared_prefix("1111", (1..=12).rev().collect())]
    fn search_matches_candidate_set(#[case] term: &str, #[case] expected: Vec<i64>) {
        let db = seeded();
        let (ids, total) = ids(&db, &format!("draw=1&start=0&length=100&search%5Bvalue%5D={term}"));
        assert_eq!(ids, expected);
        assert_eq!(total, expected.len() as u64);
    }

    #[test]
    fn percent_is_not_a_wildcard() {
        let db = seeded();
        let (ids, _) = ids(&db, "draw=1&start=0&length=100&search%5Bvalue%5D=%25");
        assert_eq!(ids, vec![40]);
    }

    #[test]
    fn displays_seventeen_cells() {
        let mut row = proposal(7);
        row.message = "<b>hi</b>".to_string();
        row.payload = vec![1, 2, 3, 4, 5];

        let cells = DaoProposals::display(&row);
        assert_eq!(cells.len(), 17);
        assert_eq!(cells[0], json!(7));
        assert_eq!(cells[3], json!("&lt;b&gt;hi&lt;/b&gt;"));
        assert_eq!(cells[8], json!(5.0));
        assert_eq!(cells[11], json!(true));
        assert_eq!(cells[14], json!(false));
        assert!(cells[15].as_str().unwrap().contains(r#"data-clipboard-text="0102030405""#));
        assert_eq!(cells[16], json!("Active"));
    }

    #[test]
    fn short_payload_is_plain_hex() {
        let cells = DaoProposals::display(&proposal(1));
        assert_eq!(cells[15], json!("deadbeef"));
    }
}
