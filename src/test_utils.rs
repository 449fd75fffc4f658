//! Temporary databases and fixture rows shared by the table and handler tests.

use rusqlite::{Connection, params};
use std::path::PathBuf;
use tempfile::{TempDir, tempdir};

use crate::db::{Database, initialize_database};
use crate::models::{DaoMemberRow, DaoProposalRow, MinipoolRow, NodeRow};
use crate::params::{SortColumn, TableParams};

/// A schema-initialised SQLite file that is removed when dropped.
pub struct TestDb {
    _temp_dir: TempDir,
    path: PathBuf,
}

impl TestDb {
    pub fn new() -> Self {
        let temp_dir = tempdir().expect("create temp dir");
        let path = temp_dir.path().join("explorer.db");
        initialize_database(&path).expect("initialize schema");
        TestDb {
            _temp_dir: temp_dir,
            path,
        }
    }

    pub fn database(&self) -> Database {
        Database::new(&self.path)
    }

    /// A writable connection, for seeding.
    pub fn conn(&self) -> Connection {
        Connection::open(&self.path).expect("open test db")
    }

    pub fn insert_minipool(&self, row: &MinipoolRow) {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO rocketpool_minipools (address, pubkey, node_address, node_fee, deposit_type, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                row.address,
                row.pubkey,
                row.node_address,
                row.node_fee,
                row.deposit_type,
                row.status
            ],
        )
        .expect("insert minipool");
        if let Some(index) = row.validator_index {
            conn.execute(
                "INSERT INTO validators (pubkey, validatorindex) VALUES (?1, ?2)",
                params![row.pubkey, index],
            )
            .expect("insert validator");
        }
        if !row.validator_name.is_empty() {
            conn.execute(
                "INSERT INTO validator_names (publickey, name) VALUES (?1, ?2)",
                params![row.pubkey, row.validator_name],
            )
            .expect("insert validator name");
        }
    }

    pub fn insert_node(&self, row: &NodeRow) {
        self.conn()
            .execute(
                "INSERT INTO rocketpool_nodes (address, timezone_location, rpl_stake, min_rpl_stake, max_rpl_stake)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    row.address,
                    row.timezone_location,
                    row.rpl_stake,
                    row.min_rpl_stake,
                    row.max_rpl_stake
                ],
            )
            .expect("insert node");
    }

    pub fn insert_proposal(&self, row: &DaoProposalRow) {
        self.conn()
            .execute(
                "INSERT INTO rocketpool_dao_proposals (
                    id, dao, proposer_address, message, created_time, start_time, end_time,
                    expiry_time, votes_required, votes_for, votes_against, member_voted,
                    member_supported, is_cancelled, is_executed, payload, state)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
                params![
                    row.id,
                    row.dao,
                    row.proposer_address,
                    row.message,
                    row.created_time,
                    row.start_time,
                    row.end_time,
                    row.expiry_time,
                    row.votes_required,
                    row.votes_for,
                    row.votes_against,
                    row.member_voted,
                    row.member_supported,
                    row.is_cancelled,
                    row.is_executed,
                    row.payload,
                    row.state
                ],
            )
            .expect("insert proposal");
    }

    pub fn insert_member(&self, row: &DaoMemberRow) {
        self.conn()
            .execute(
                "INSERT INTO rocketpool_dao_members (
                    address, id, url, joined_time, last_proposal_time, rpl_bond_amount,
                    unbonded_validator_count)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    row.address,
                    row.id,
                    row.url,
                    row.joined_time,
                    row.last_proposal_time,
                    row.rpl_bond_amount,
                    row.unbonded_validator_count
                ],
            )
            .expect("insert member");
    }
}

pub fn params<C: SortColumn>(query_string: &str) -> TableParams<C> {
    TableParams::from_query_string(query_string).expect("valid table params")
}

pub fn address(byte: u8) -> Vec<u8> {
    vec![byte; 20]
}

pub fn pubkey(byte: u8) -> Vec<u8> {
    vec![byte; 48]
}

pub fn minipool(n: u8) -> MinipoolRow {
    MinipoolRow {
        address: address(n),
        pubkey: pubkey(n),
        validator_index: Some(i64::from(n) * 1000),
        validator_name: String::new(),
        node_address: address(0xf0),
        node_fee: 0.15,
        deposit_type: "Full".to_string(),
        status: "Staking".to_string(),
    }
}

pub fn node(n: u8) -> NodeRow {
    NodeRow {
        address: address(n),
        timezone_location: "Europe/Berlin".to_string(),
        rpl_stake: format!("{}000000000000000000", n),
        min_rpl_stake: "1600000000000000000000".to_string(),
        max_rpl_stake: "24000000000000000000000".to_string(),
    }
}

pub fn proposal(id: i64) -> DaoProposalRow {
    DaoProposalRow {
        id,
        dao: "rocketDAONodeTrustedProposals".to_string(),
        proposer_address: address(0x11),
        message: format!("proposal {id}"),
        created_time: 1_600_000_000,
        start_time: 1_600_000_100,
        end_time: 1_600_100_000,
        expiry_time: 1_600_200_000,
        votes_required: 5.0,
        votes_for: 3.0,
        votes_against: 1.0,
        member_voted: true,
        member_supported: false,
        is_cancelled: false,
        is_executed: false,
        payload: vec![0xde, 0xad, 0xbe, 0xef],
        state: "Active".to_string(),
    }
}

pub fn member(n: u8) -> DaoMemberRow {
    DaoMemberRow {
        address: address(n),
        id: format!("member-{n}"),
        url: format!("https://member{n}.example"),
        joined_time: 1_600_000_000,
        last_proposal_time: 1_600_500_000,
        rpl_bond_amount: "1750000000000000000000".to_string(),
        unbonded_validator_count: i64::from(n),
    }
}
