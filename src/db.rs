use rusqlite::{Connection, OpenFlags, Result};
use std::path::{Path, PathBuf};

/// The tables an external indexer fills and the data routes read from.
const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS rocketpool_minipools (
        address         BLOB PRIMARY KEY,
        pubkey          BLOB NOT NULL,
        node_address    BLOB NOT NULL,
        node_fee        REAL NOT NULL DEFAULT 0,
        deposit_type    TEXT NOT NULL DEFAULT '',
        status          TEXT NOT NULL DEFAULT ''
    );

    CREATE TABLE IF NOT EXISTS rocketpool_nodes (
        address             BLOB PRIMARY KEY,
        timezone_location   TEXT NOT NULL DEFAULT '',
        rpl_stake           TEXT NOT NULL DEFAULT '0',
        min_rpl_stake       TEXT NOT NULL DEFAULT '0',
        max_rpl_stake       TEXT NOT NULL DEFAULT '0'
    );

    CREATE TABLE IF NOT EXISTS rocketpool_dao_proposals (
        id                  INTEGER PRIMARY KEY,
        dao                 TEXT NOT NULL,
        proposer_address    BLOB NOT NULL,
        message             TEXT NOT NULL DEFAULT '',
        created_time        INTEGER NOT NULL,
        start_time          INTEGER NOT NULL,
        end_time            INTEGER NOT NULL,
        expiry_time         INTEGER NOT NULL,
        votes_required      REAL NOT NULL DEFAULT 0,
        votes_for           REAL NOT NULL DEFAULT 0,
        votes_against       REAL NOT NULL DEFAULT 0,
        member_voted        INTEGER NOT NULL DEFAULT 0,
        member_supported    INTEGER NOT NULL DEFAULT 0,
        is_cancelled        INTEGER NOT NULL DEFAULT 0,
        is_executed         INTEGER NOT NULL DEFAULT 0,
        payload             BLOB NOT NULL DEFAULT x'',
        state               TEXT NOT NULL DEFAULT ''
    );

    CREATE TABLE IF NOT EXISTS rocketpool_dao_members (
        address                     BLOB PRIMARY KEY,
        id                          TEXT NOT NULL,
        url                         TEXT NOT NULL DEFAULT '',
        joined_time                 INTEGER NOT NULL,
        last_proposal_time          INTEGER NOT NULL DEFAULT 0,
        rpl_bond_amount             TEXT NOT NULL DEFAULT '0',
        unbonded_validator_count    INTEGER NOT NULL DEFAULT 0
    );

    CREATE TABLE IF NOT EXISTS validators (
        pubkey          BLOB PRIMARY KEY,
        validatorindex  INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS validator_names (
        publickey   BLOB PRIMARY KEY,
        name        TEXT NOT NULL
    );
";

/// Creates any missing tables so a fresh deployment serves empty pages.
pub fn initialize_database(path: &Path) -> Result<()> {
    let conn = Connection::open(path)?;
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Where the data routes read from. Handlers get a fresh read-only
/// connection per request; the indexer is the only writer.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Database { path: path.into() }
    }

    pub fn connect(&self) -> Result<Connection> {
        Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
    }
}
