use crate::config::VerifierConfig;
use crate::error::{ChainError, Result};
use rayon::prelude::*;
use tracing::{debug, warn};

use super::chain::{Block, Chain};
use super::state::LedgerState;

/// Fails with `HashMismatch` unless `block.hash` is the fingerprint of its contents.
pub fn check_hash(block: &Block) -> Result<()> {
    let expected = block.contents().fingerprint()?;
    if expected != *block.hash() {
        return Err(ChainError::HashMismatch(block.block_number()));
    }
    Ok(())
}

/// Block and chain verification.
///
/// Checks run in a fixed order so the reported error is deterministic when a
/// block breaks several rules at once: transaction replay, hash, block number,
/// parent hash, then (if enabled) the declared transaction count.
#[derive(Debug, Clone, Copy, Default)]
pub struct Verifier {
    config: VerifierConfig,
}

impl Verifier {
    pub fn new(config: VerifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Replays `block` on top of `state` and checks its linkage to `parent`.
    pub fn check_validity(&self, block: &Block, parent: &Block, state: &LedgerState) -> Result<LedgerState> {
        let block_number = block.block_number();

        let mut state = state.clone();
        for txn in block.txns() {
            if let Err(reason) = txn.check(&state) {
                warn!(block_number, %txn, %reason, "invalid transaction");
                return Err(ChainError::InvalidTransaction {
                    block_number,
                    txn: txn.clone(),
                    reason,
                });
            }
            state = state.apply(txn);
        }

        check_hash(block)?;

        if parent.block_number().checked_add(1) != Some(block_number) {
            return Err(ChainError::BadBlockNumber(block_number));
        }

        if block.parent_hash() != Some(parent.hash()) {
            return Err(ChainError::BadParentHash(block_number));
        }

        self.check_txn_count(block)?;

        debug!(block_number, txns = block.txns().len(), "block verified");
        Ok(state)
    }

    /// Verifies `blocks` from genesis and returns the final ledger state.
    ///
    /// Genesis entries are credited onto the empty state without validity
    /// checks; only its hash is verified.
    pub fn check_chain(&self, blocks: &[Block]) -> Result<LedgerState> {
        let (genesis, rest) = blocks
            .split_first()
            .ok_or_else(|| ChainError::MalformedChain("chain has no genesis block".to_string()))?;

        let mut state = genesis
            .txns()
            .iter()
            .fold(LedgerState::new(), |state, entry| state.apply(entry));
        check_hash(genesis)?;
        self.check_txn_count(genesis)?;

        let mut parent = genesis;
        for block in rest {
            state = self.check_validity(block, parent, &state)?;
            parent = block;
        }

        debug!(blocks = blocks.len(), accounts = state.len(), "chain verified");
        Ok(state)
    }

    /// Parses a JSON array of blocks, then verifies it.
    pub fn check_chain_json(&self, text: &str) -> Result<LedgerState> {
        let chain = Chain::from_json(text)?;
        self.check_chain(chain.blocks())
    }

    /// Verifies independent candidate chains in parallel. Results keep the input order.
    pub fn check_chains(&self, chains: &[Chain]) -> Vec<Result<LedgerState>> {
        chains.par_iter().map(|chain| self.check_chain(chain.blocks())).collect()
    }

    fn check_txn_count(&self, block: &Block) -> Result<()> {
        let declared = block.contents().txn_count;
        let actual = block.txns().len();
        if self.config.strict_txn_count && declared != actual {
            return Err(ChainError::TxnCountMismatch {
                block_number: block.block_number(),
                declared,
                actual,
            });
        }
        Ok(())
    }
}

pub fn check_validity(block: &Block, parent: &Block, state: &LedgerState) -> Result<LedgerState> {
    Verifier::default().check_validity(block, parent, state)
}

pub fn check_chain(blocks: &[Block]) -> Result<LedgerState> {
    Verifier::default().check_chain(blocks)
}

pub fn check_chain_json(text: &str) -> Result<LedgerState> {
    Verifier::default().check_chain_json(text)
}

pub fn check_chains(chains: &[Chain]) -> Vec<Result<LedgerState>> {
    Verifier::default().check_chains(chains)
}
