//! The append-only chain and its validation gate.

use thiserror::Error;

use crate::model::{compute_block_hash, genesis_block, Block};

/// Why a candidate block was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("previous hash {got} does not match tail hash {expected}")]
    LinkageMismatch { expected: String, got: String },
    #[error("position {got} does not follow tail position {tail}")]
    PositionGap { tail: u64, got: u64 },
    #[error("stored hash {stored} does not match recomputed {computed}")]
    HashMismatch { stored: String, computed: String },
}

/// Ordered blocks, genesis first. Only `append` grows it.
#[derive(Debug)]
pub struct Chain {
    blocks: Vec<Block>,
    rejected: u64,
}

impl Chain {
    /// A chain holding just a fresh genesis block.
    pub fn new() -> Self {
        Self::from_genesis(genesis_block())
    }

    pub fn from_genesis(genesis: Block) -> Self {
        Self {
            blocks: vec![genesis],
            rejected: 0,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn tail(&self) -> &Block {
        // never empty: constructed with genesis and only grows
        &self.blocks[self.blocks.len() - 1]
    }

    /// Candidates refused by `append` since startup.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Validate `candidate` against the tail and push it. On error the chain
    /// is unchanged.
    pub fn append(&mut self, candidate: Block) -> Result<(), ChainError> {
        if let Err(e) = check(&candidate, self.tail()) {
            self.rejected += 1;
            return Err(e);
        }
        self.blocks.push(candidate);
        Ok(())
    }

    /// Re-derive every block from scratch; returns one message per problem.
    pub fn audit(&self) -> Vec<String> {
        let mut errors = vec![];
        for (i, b) in self.blocks.iter().enumerate() {
            if i == 0 {
                if b.position != 0 {
                    errors.push(format!("genesis position is {}, expected 0", b.position));
                }
                if !b.previous_hash.is_empty() {
                    errors.push("genesis previous hash should be empty".to_string());
                }
                if compute_block_hash(b) != b.hash {
                    errors.push("genesis hash mismatch".to_string());
                }
                continue;
            }
            if let Err(e) = check(b, &self.blocks[i - 1]) {
                errors.push(format!("block {}: {e}", b.position));
            }
        }
        errors
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

/// Linkage, position and content-hash checks, naming the first failure.
pub fn check(candidate: &Block, tail: &Block) -> Result<(), ChainError> {
    if tail.hash != candidate.previous_hash {
        return Err(ChainError::LinkageMismatch {
            expected: tail.hash.clone(),
            got: candidate.previous_hash.clone(),
        });
    }
    if tail.position.checked_add(1) != Some(candidate.position) {
        return Err(ChainError::PositionGap {
            tail: tail.position,
            got: candidate.position,
        });
    }
    let computed = compute_block_hash(candidate);
    if computed != candidate.hash {
        return Err(ChainError::HashMismatch {
            stored: candidate.hash.clone(),
            computed,
        });
    }
    Ok(())
}

pub fn is_valid(candidate: &Block, tail: &Block) -> bool {
    check(candidate, tail).is_ok()
}
