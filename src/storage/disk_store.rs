//! Disk block store - file-backed storage for tree blocks.
//!
//! The [`DiskBlockStore`] handles all direct file operations:
//! - Reading and writing blocks
//! - Sizing the file for a fixed block count
//! - Durability (`fsync`) after writes

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use parking_lot::Mutex;

use crate::common::{BlockId, Error, Result};
use crate::storage::block::Block;
use crate::storage::block_store::{check_range, check_size, BlockStore};

/// Stores a fixed number of blocks in a single file.
///
/// # File Layout
/// Blocks are laid out sequentially:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Block 0 │ Block 1 │ Block 2 │  ...    │ Block N │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0       B       2B      ...       N×B
/// ```
///
/// Block N is located at file offset `N × block_size`. The file is sized
/// once at creation; the tree never grows it, it allocates from its own
/// free list instead.
///
/// # Thread Safety
/// The file handle sits behind a `Mutex` so reads can take `&self`. The tree
/// itself is single-writer.
///
/// # Durability
/// By default every write is followed by `fsync()`. Call
/// [`with_sync_writes(false)`](Self::with_sync_writes) to leave flushing to
/// the OS (bulk loads, tests).
pub struct DiskBlockStore {
    file: Mutex<File>,
    block_size: usize,
    num_blocks: u32,
    sync_writes: bool,
}

impl DiskBlockStore {
    /// Create a new store file holding `num_blocks` zeroed blocks.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be created.
    pub fn create<P: AsRef<Path>>(path: P, block_size: usize, num_blocks: u32) -> Result<Self> {
        if block_size == 0 {
            return Err(Error::InvalidConfig("block size must be non-zero".into()));
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;

        file.set_len(BlockId(num_blocks).offset(block_size))?;
        file.sync_all()?;

        Ok(Self {
            file: Mutex::new(file),
            block_size,
            num_blocks,
            sync_writes: true,
        })
    }

    /// Open an existing store file.
    ///
    /// The block count is derived from the file length.
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist, cannot be opened, or its
    /// length is not a multiple of `block_size`.
    pub fn open<P: AsRef<Path>>(path: P, block_size: usize) -> Result<Self> {
        if block_size == 0 {
            return Err(Error::InvalidConfig("block size must be non-zero".into()));
        }

        let file = OpenOptions::new().read(true).write(true).open(&path)?;

        let file_size = file.metadata()?.len();
        if file_size % block_size as u64 != 0 {
            return Err(Error::InvalidConfig(format!(
                "file size {} is not a multiple of block size {}",
                file_size, block_size
            )));
        }
        let num_blocks = (file_size / block_size as u64) as u32;

        Ok(Self {
            file: Mutex::new(file),
            block_size,
            num_blocks,
            sync_writes: true,
        })
    }

    /// Open an existing store file, or create it with `num_blocks` blocks.
    pub fn open_or_create<P: AsRef<Path>>(
        path: P,
        block_size: usize,
        num_blocks: u32,
    ) -> Result<Self> {
        if path.as_ref().exists() {
            Self::open(path, block_size)
        } else {
            Self::create(path, block_size, num_blocks)
        }
    }

    /// Enable or disable `fsync()` after each write.
    pub fn with_sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }

    /// Flush all written blocks to stable storage.
    pub fn sync(&self) -> Result<()> {
        self.file.lock().sync_all()?;
        Ok(())
    }

    /// Get the total size of the store file in bytes.
    #[inline]
    pub fn file_size(&self) -> u64 {
        BlockId(self.num_blocks).offset(self.block_size)
    }
}

impl BlockStore for DiskBlockStore {
    fn block_size(&self) -> usize {
        self.block_size
    }

    fn num_blocks(&self) -> u32 {
        self.num_blocks
    }

    fn read_block(&self, id: BlockId) -> Result<Block> {
        check_range(id, self.num_blocks)?;

        let mut block = Block::new(self.block_size);
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(id.offset(self.block_size)))?;
        file.read_exact(block.as_mut_slice())?;

        Ok(block)
    }

    fn write_block(&self, id: BlockId, block: &Block) -> Result<()> {
        check_range(id, self.num_blocks)?;
        check_size(block, self.block_size)?;

        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(id.offset(self.block_size)))?;
        file.write_all(block.as_slice())?;
        if self.sync_writes {
            file.sync_data()?;
        }

        Ok(())
    }
}
