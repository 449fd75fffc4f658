use serde::Serialize;
use serde_json::Value;

// Rows as read from the database, before they are formatted for the table
// widget, plus the response envelope the widget expects.

/// How the table widget wants a page of data (all data routes).
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DataTableResponse {
    pub draw: u64,
    pub records_total: u64,
    pub records_filtered: u64,
    pub data: Vec<Vec<Value>>,
}

/// One page of rows and the size of the set it was cut from.
///
/// `total_count` is the whole table when no search is applied and the
/// matched set otherwise. An empty page reports 0.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub total_count: u64,
}

impl<T> Page<T> {
    pub fn into_response(self, draw: u64, display: impl Fn(&T) -> Vec<Value>) -> DataTableResponse {
        DataTableResponse {
            draw,
            records_total: self.total_count,
            records_filtered: self.total_count,
            data: self.rows.iter().map(display).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MinipoolRow {
    pub address: Vec<u8>,
    /// 48 zero bytes until a validator key is assigned.
    pub pubkey: Vec<u8>,
    pub validator_index: Option<i64>,
    /// Empty when the validator has no display name.
    pub validator_name: String,
    pub node_address: Vec<u8>,
    pub node_fee: f64,
    pub deposit_type: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeRow {
    pub address: Vec<u8>,
    pub timezone_location: String,
    /// Wei amounts, as decimal strings.
    pub rpl_stake: String,
    pub min_rpl_stake: String,
    pub max_rpl_stake: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DaoProposalRow {
    pub id: i64,
    pub dao: String,
    pub proposer_address: Vec<u8>,
    pub message: String,
    pub created_time: i64,
    pub start_time: i64,
    pub end_time: i64,
    pub expiry_time: i64,
    pub votes_required: f64,
    pub votes_for: f64,
    pub votes_against: f64,
    pub member_voted: bool,
    pub member_supported: bool,
    pub is_cancelled: bool,
    pub is_executed: bool,
    pub payload: Vec<u8>,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DaoMemberRow {
    pub address: Vec<u8>,
    pub id: String,
    pub url: String,
    pub joined_time: i64,
    pub last_proposal_time: i64,
    pub rpl_bond_amount: String,
    pub unbonded_validator_count: i64,
}
