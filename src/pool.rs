//! Pending-transaction buffer with a batching threshold.

use crate::model::Transaction;

pub const DEFAULT_BATCH_THRESHOLD: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    /// Below threshold; keep collecting.
    Accumulating,
    /// At or above threshold; must be flushed.
    Ready,
}

/// Insertion-ordered queue of transactions awaiting a block.
#[derive(Debug)]
pub struct TxPool {
    pending: Vec<Transaction>,
    threshold: usize,
}

impl TxPool {
    /// A threshold of 0 is treated as 1.
    pub fn new(threshold: usize) -> Self {
        Self {
            pending: Vec::new(),
            threshold: threshold.max(1),
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn state(&self) -> PoolState {
        if self.pending.len() >= self.threshold {
            PoolState::Ready
        } else {
            PoolState::Accumulating
        }
    }

    pub fn push(&mut self, tx: Transaction) -> PoolState {
        self.pending.push(tx);
        self.state()
    }

    /// Take everything buffered, leaving the pool empty.
    pub fn drain(&mut self) -> Vec<Transaction> {
        std::mem::take(&mut self.pending)
    }
}

impl Default for TxPool {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_THRESHOLD)
    }
}
