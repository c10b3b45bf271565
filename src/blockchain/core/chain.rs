use crate::crypto::{fingerprint, Fingerprint};
use crate::error::{ChainError, Result};
use crate::transaction::Transaction;
use tracing::{debug, warn};

use super::state::LedgerState;
use super::validation::{check_validity, Verifier};

/// The hashed part of a block.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BlockContents {
    pub block_number: u64,
    /// `None` only for genesis.
    pub parent_hash: Option<Fingerprint>,
    pub txn_count: usize,
    pub txns: Vec<Transaction>,
}

impl BlockContents {
    pub fn fingerprint(&self) -> Result<Fingerprint> {
        fingerprint(self)
    }
}

/// A batch of transactions sealed under the fingerprint of its contents.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Block {
    hash: Fingerprint,
    contents: BlockContents,
}

impl Block {
    /// Seals `contents` under its own fingerprint.
    pub fn seal(contents: BlockContents) -> Result<Self> {
        let hash = contents.fingerprint()?;
        Ok(Block { hash, contents })
    }

    /// Pairs a hash with contents without checking that they agree, as a block
    /// received from elsewhere would arrive. Use [`super::check_hash`] before
    /// trusting it.
    pub fn from_parts(hash: Fingerprint, contents: BlockContents) -> Self {
        Block { hash, contents }
    }

    /// Block 0: no parent, and the initial balances as its only entry.
    pub fn genesis(initial: &LedgerState) -> Result<Self> {
        let txns = vec![Transaction::allocation(initial)];
        Self::seal(BlockContents {
            block_number: 0,
            parent_hash: None,
            txn_count: txns.len(),
            txns,
        })
    }

    pub fn hash(&self) -> &Fingerprint {
        &self.hash
    }

    pub fn contents(&self) -> &BlockContents {
        &self.contents
    }

    pub fn block_number(&self) -> u64 {
        self.contents.block_number
    }

    pub fn parent_hash(&self) -> Option<&Fingerprint> {
        self.contents.parent_hash.as_ref()
    }

    pub fn txns(&self) -> &[Transaction] {
        &self.contents.txns
    }

    pub fn into_parts(self) -> (Fingerprint, BlockContents) {
        (self.hash, self.contents)
    }
}

/// Builds the block that follows `parent`. Transactions are not checked.
///
/// Fails with `BadBlockNumber` when `parent` already carries the largest
/// representable block number.
pub fn make_block(txns: Vec<Transaction>, parent: &Block) -> Result<Block> {
    let block_number = parent
        .block_number()
        .checked_add(1)
        .ok_or_else(|| ChainError::BadBlockNumber(parent.block_number()))?;
    Block::seal(BlockContents {
        block_number,
        parent_hash: Some(parent.hash().clone()),
        txn_count: txns.len(),
        txns,
    })
}

/// An ordered, hash-linked sequence of blocks rooted at genesis.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Vec<Block>", into = "Vec<Block>")]
pub struct Chain {
    blocks: Vec<Block>,
}

impl Chain {
    /// Starts a chain from a freshly built genesis block.
    pub fn new(initial: &LedgerState) -> Result<Self> {
        Ok(Chain {
            blocks: vec![Block::genesis(initial)?],
        })
    }

    /// Wraps existing blocks. Nothing is verified; see [`Chain::verify`].
    pub fn from_blocks(blocks: Vec<Block>) -> Result<Self> {
        if blocks.is_empty() {
            return Err(ChainError::MalformedChain("chain has no genesis block".to_string()));
        }
        Ok(Chain { blocks })
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let blocks: Vec<Block> =
            serde_json::from_str(text).map_err(|e| ChainError::MalformedChain(e.to_string()))?;
        Self::from_blocks(blocks)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.blocks).map_err(|e| ChainError::SerializationError(e.to_string()))
    }

    pub fn genesis(&self) -> &Block {
        &self.blocks[0]
    }

    pub fn tip(&self) -> &Block {
        &self.blocks[self.blocks.len() - 1]
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

    /// Seals `txns` on top of the tip and appends the block.
    ///
    /// The caller is responsible for having checked the transactions against
    /// the tip state.
    pub fn extend(&mut self, txns: Vec<Transaction>) -> Result<&Block> {
        let block = make_block(txns, self.tip())?;
        debug!(block_number = block.block_number(), hash = %block.hash(), "sealed block");
        self.blocks.push(block);
        Ok(self.tip())
    }

    /// Appends a block built elsewhere once it verifies against the tip.
    ///
    /// `state` must be the ledger state at the tip. On success the state after
    /// the new block is returned; on failure the chain is left unchanged.
    pub fn accept(&mut self, block: Block, state: &LedgerState) -> Result<LedgerState> {
        match check_validity(&block, self.tip(), state) {
            Ok(next) => {
                self.blocks.push(block);
                Ok(next)
            }
            Err(e) => {
                warn!(block_number = block.block_number(), error = %e, "rejected block");
                Err(e)
            }
        }
    }

    /// Replays the whole chain with the default verifier.
    pub fn verify(&self) -> Result<LedgerState> {
        Verifier::default().check_chain(&self.blocks)
    }
}

impl TryFrom<Vec<Block>> for Chain {
    type Error = ChainError;

    fn try_from(blocks: Vec<Block>) -> Result<Self> {
        Self::from_blocks(blocks)
    }
}

impl From<Chain> for Vec<Block> {
    fn from(chain: Chain) -> Self {
        chain.blocks
    }
}
