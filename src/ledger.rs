//! Batching trigger: owns the chain and the pending pool together so that
//! "push, check size, seal, append, clear" happens under one lock.

use serde::Serialize;
use tracing::{info, warn};

use crate::chain::Chain;
use crate::model::{create_block, timestamp_now, Transaction};
use crate::pool::{PoolState, TxPool};

/// Result of a submission or flush.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubmitReceipt {
    /// Positions of blocks appended while handling the call.
    pub sealed: Vec<u64>,
    /// Transactions still waiting after the call.
    pub pending: usize,
}

#[derive(Debug)]
pub struct Ledger {
    chain: Chain,
    pool: TxPool,
}

impl Ledger {
    /// Fresh genesis chain and an empty pool.
    pub fn new(threshold: usize) -> Self {
        Self::with_chain(Chain::new(), threshold)
    }

    pub fn with_chain(chain: Chain, threshold: usize) -> Self {
        Self {
            chain,
            pool: TxPool::new(threshold),
        }
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn pool(&self) -> &TxPool {
        &self.pool
    }

    /// Stamp and buffer a submission, sealing a block once the pool is ready.
    pub fn submit(&mut self, service_id: String, submitter: String) -> SubmitReceipt {
        let tx = Transaction::submitted(service_id, submitter, timestamp_now());
        self.submit_tx(tx)
    }

    /// Buffer an already stamped transaction.
    pub fn submit_tx(&mut self, tx: Transaction) -> SubmitReceipt {
        let mut sealed = Vec::new();

        // Already over threshold: flush whatever is there (possibly nothing)
        // before accepting the arrival.
        if self.pool.state() == PoolState::Ready {
            sealed.extend(self.seal_pending());
        }
        if self.pool.push(tx) == PoolState::Ready {
            sealed.extend(self.seal_pending());
        }

        SubmitReceipt {
            sealed,
            pending: self.pool.len(),
        }
    }

    /// Seal the pool into a block regardless of its size.
    pub fn flush(&mut self) -> SubmitReceipt {
        let sealed = self.seal_pending().into_iter().collect();
        SubmitReceipt {
            sealed,
            pending: self.pool.len(),
        }
    }

    /// Drain the pool into a candidate and try to append it. The pool is
    /// cleared either way; a rejected candidate's transactions are dropped.
    fn seal_pending(&mut self) -> Option<u64> {
        let txs = self.pool.drain();
        let candidate = create_block(Some(self.chain.tail()), false, &txs);
        let position = candidate.position;
        let hash = candidate.hash.clone();
        match self.chain.append(candidate) {
            Ok(()) => {
                info!(position, %hash, txs = txs.len(), "sealed block");
                Some(position)
            }
            Err(e) => {
                warn!(
                    position,
                    dropped = txs.len(),
                    rejected = self.chain.rejected(),
                    error = %e,
                    "candidate block rejected"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{compute_block_hash, Block};
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn below_threshold_keeps_chain() {
        let mut ledger = Ledger::new(3);
        let r = ledger.submit("a".into(), "alice".into());
        ledger.submit("b".into(), "alice".into());
        assert!(r.sealed.is_empty());
        assert_eq!(ledger.chain().len(), 1);
        assert_eq!(ledger.pool().len(), 2);
    }

    #[test]
    fn two_submissions_seal_one_block() {
        let mut ledger = Ledger::new(2);
        let genesis_hash = ledger.chain().tail().hash.clone();

        let r = ledger.submit("A".into(), "alice".into());
        assert_eq!(r, SubmitReceipt { sealed: vec![], pending: 1 });
        assert_eq!(ledger.chain().len(), 1);
        assert_eq!(ledger.pool().pending()[0].service_id, "A");

        let r = ledger.submit("B".into(), "bob".into());
        assert_eq!(r, SubmitReceipt { sealed: vec![1], pending: 0 });
        assert_eq!(ledger.chain().len(), 2);
        assert!(ledger.pool().is_empty());

        let block = ledger.chain().tail();
        assert_eq!(block.position, 1);
        assert_eq!(block.previous_hash, genesis_hash);
        let services: Vec<_> = block.transactions.iter().map(|t| t.service_id.as_str()).collect();
        assert_eq!(services, ["A", "B"]);
        assert_eq!(block.transactions[0].submitter, "alice");
        assert_eq!(block.transactions[1].submitter, "bob");
        assert!(block.transactions.iter().all(|t| !t.is_genesis));
    }

    #[test]
    fn flush_of_empty_pool_seals_empty_block() {
        let mut ledger = Ledger::new(2);
        let r = ledger.flush();
        assert_eq!(r.sealed, vec![1]);
        let tail = ledger.chain().tail();
        assert!(tail.transactions.is_empty());
        assert_eq!(tail.hash, compute_block_hash(tail));
        assert!(ledger.chain().audit().is_empty());
    }

    #[test]
    fn flush_seals_partial_batch() {
        let mut ledger = Ledger::new(5);
        ledger.submit("a".into(), "u".into());
        let r = ledger.flush();
        assert_eq!(r, SubmitReceipt { sealed: vec![1], pending: 0 });
        assert_eq!(ledger.chain().tail().transactions.len(), 1);
    }

    #[test]
    fn arrival_while_ready_flushes_first() {
        let mut ledger = Ledger::new(2);
        // Force the pool over threshold without going through submit.
        ledger.pool.push(Transaction::submitted("x".into(), "u".into(), String::new()));
        ledger.pool.push(Transaction::submitted("y".into(), "u".into(), String::new()));

        let r = ledger.submit("z".into(), "u".into());
        assert_eq!(r.sealed, vec![1]);
        assert_eq!(r.pending, 1);
        assert_eq!(ledger.chain().tail().transactions.len(), 2);
        assert_eq!(ledger.pool().pending()[0].service_id, "z");
    }

    #[test]
    fn exhausted_positions_reject_instead_of_panicking() {
        let tail = Block::seal(u64::MAX, String::new(), vec![], "t".into());
        let mut ledger = Ledger::with_chain(Chain::from_genesis(tail), 1);
        let r = ledger.submit("a".into(), "u".into());
        assert!(r.sealed.is_empty());
        assert_eq!(r.pending, 0);
        assert_eq!(ledger.chain().len(), 1);
        assert_eq!(ledger.chain().rejected(), 1);
    }

    #[test]
    fn concurrent_submissions_lose_nothing() {
        let ledger = Arc::new(Mutex::new(Ledger::new(2)));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let ledger = Arc::clone(&ledger);
                thread::spawn(move || {
                    for i in 0..25 {
                        ledger.lock().submit(format!("svc-{t}-{i}"), format!("user-{t}"));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let ledger = ledger.lock();
        let chain = ledger.chain();
        assert!(chain.audit().is_empty());
        assert_eq!(chain.rejected(), 0);
        assert_eq!(chain.len(), 1 + 100);
        let total: usize = chain.blocks()[1..].iter().map(|b| b.transactions.len()).sum();
        assert_eq!(total + ledger.pool().len(), 200);
        assert!(chain.blocks()[1..].iter().all(|b| b.transactions.len() == 2));
    }
}
