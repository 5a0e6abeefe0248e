//! Data model for ledger transactions and hash-linked blocks.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// A single checkout record. Field order here is the order it is hashed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Opaque reference to the catalog item being checked out.
    #[serde(rename = "serviceID")]
    pub service_id: String,
    /// Identity of whoever submitted the transaction.
    #[serde(rename = "user")]
    pub submitter: String,
    /// RFC3339 timestamp stamped by the node on arrival.
    #[serde(rename = "checkoutDate")]
    pub checkout_date: String,
    #[serde(rename = "isGenesis")]
    pub is_genesis: bool,
}

impl Transaction {
    /// Stamp a client submission; never produces a genesis transaction.
    pub fn submitted(service_id: String, submitter: String, checkout_date: String) -> Self {
        Self {
            service_id,
            submitter,
            checkout_date,
            is_genesis: false,
        }
    }

    /// The synthetic placeholder carried by the genesis block.
    pub fn genesis() -> Self {
        Self {
            service_id: String::new(),
            submitter: String::new(),
            checkout_date: String::new(),
            is_genesis: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// 0 for genesis, then +1 per block.
    pub position: u64,
    /// SHA-256 hex over transactions, previous hash, timestamp and position.
    pub hash: String,
    /// Hash of the predecessor (empty for genesis).
    pub previous_hash: String,
    /// RFC3339 timestamp string.
    pub timestamp: String,
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Assemble a block and store its freshly computed hash.
    pub fn seal(
        position: u64,
        previous_hash: String,
        transactions: Vec<Transaction>,
        timestamp: String,
    ) -> Self {
        let mut block = Block {
            position,
            hash: String::new(),
            previous_hash,
            timestamp,
            transactions,
        };
        block.hash = compute_block_hash(&block);
        block
    }
}

/// Build the successor of `previous`.
///
/// `None` stands for the synthetic predecessor of genesis: position -1 and
/// an empty hash, so the result lands at position 0. Genesis blocks ignore
/// `pending` and carry a single placeholder transaction; every other block
/// takes `pending` in arrival order.
pub fn create_block(previous: Option<&Block>, is_genesis: bool, pending: &[Transaction]) -> Block {
    let (position, previous_hash) = match previous {
        // wraps at u64::MAX; the chain gate then refuses it as a position gap
        Some(prev) => (prev.position.wrapping_add(1), prev.hash.clone()),
        None => (0, String::new()),
    };
    let transactions = if is_genesis {
        vec![Transaction::genesis()]
    } else {
        pending.to_vec()
    };
    Block::seal(position, previous_hash, transactions, timestamp_now())
}

/// The first block of every chain.
pub fn genesis_block() -> Block {
    create_block(None, true, &[])
}

/// Current UTC time as RFC3339.
pub fn timestamp_now() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp_nanos().to_string())
}

/// Hash inputs (concatenate as bytes, SHA-256) and return lowercase hex.
pub fn hash_concat(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for p in parts {
        hasher.update(p);
    }
    hex::encode(hasher.finalize())
}

/// Compute a block hash from its content.
/// Included: transactions (compact JSON), previous_hash, timestamp, position.
pub fn compute_block_hash(b: &Block) -> String {
    // Only string and bool fields, so encoding cannot fail.
    let txs = serde_json::to_vec(&b.transactions).unwrap_or_default();
    hash_concat(&[
        &txs,
        b.previous_hash.as_bytes(),
        b.timestamp.as_bytes(),
        &b.position.to_le_bytes(),
    ])
}
