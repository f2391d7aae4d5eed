//! In-memory block store.
//! Intended for tests and ephemeral indexes.

use parking_lot::Mutex;

use crate::common::{BlockId, Error, Result};
use crate::storage::block::Block;
use crate::storage::block_store::{check_range, check_size, BlockStore};

/// A fixed number of zeroed blocks held in memory.
///
/// # Example
/// ```
/// use blocktree::storage::{BlockStore, MemoryBlockStore};
/// use blocktree::BlockId;
///
/// let store = MemoryBlockStore::new(512, 16);
/// assert_eq!(store.num_blocks(), 16);
/// let block = store.read_block(BlockId::new(3)).unwrap();
/// assert!(block.as_slice().iter().all(|&b| b == 0));
/// ```
pub struct MemoryBlockStore {
    block_size: usize,
    blocks: Mutex<Vec<Block>>,
}

impl MemoryBlockStore {
    /// Create a store of `num_blocks` zeroed blocks.
    pub fn new(block_size: usize, num_blocks: u32) -> Self {
        let blocks = (0..num_blocks).map(|_| Block::new(block_size)).collect();
        Self {
            block_size,
            blocks: Mutex::new(blocks),
        }
    }

    /// Copy of every block's bytes, in id order.
    pub fn snapshot(&self) -> Vec<Vec<u8>> {
        self.blocks
            .lock()
            .iter()
            .map(|block| block.as_slice().to_vec())
            .collect()
    }

    /// Overwrite raw bytes of a block, bypassing checksums.
    ///
    /// Used to inject corruption in tests.
    pub fn corrupt(&self, id: BlockId, offset: usize, bytes: &[u8]) -> Result<()> {
        check_range(id, self.num_blocks())?;
        if offset + bytes.len() > self.block_size {
            return Err(Error::InvalidConfig(format!(
                "corruption at {}..{} runs past a {}-byte block",
                offset,
                offset + bytes.len(),
                self.block_size
            )));
        }
        let mut blocks = self.blocks.lock();
        blocks[id.0 as usize].as_mut_slice()[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }
}

impl BlockStore for MemoryBlockStore {
    fn block_size(&self) -> usize {
        self.block_size
    }

    fn num_blocks(&self) -> u32 {
        self.blocks.lock().len() as u32
    }

    fn read_block(&self, id: BlockId) -> Result<Block> {
        let blocks = self.blocks.lock();
        check_range(id, blocks.len() as u32)?;
        Ok(blocks[id.0 as usize].clone())
    }

    fn write_block(&self, id: BlockId, block: &Block) -> Result<()> {
        check_size(block, self.block_size)?;
        let mut blocks = self.blocks.lock();
        check_range(id, blocks.len() as u32)?;
        blocks[id.0 as usize] = block.clone();
        Ok(())
    }
}
