//! Error types for blocktree.

use thiserror::Error;

use crate::common::BlockId;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
/// `Ok(())` is the "no error" outcome of every operation.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in blocktree.
///
/// Block-store failures and B-tree failures share one enum so that every
/// internal step can propagate with `?` and callers match on a single type.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from a file-backed block store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The block id is past the end of the store.
    #[error("{block} is out of range (store has {num_blocks} blocks)")]
    BlockOutOfRange { block: BlockId, num_blocks: u32 },

    /// A block buffer does not match the store's block size.
    #[error("block is {actual} bytes, store expects {expected}")]
    BlockSizeMismatch { expected: usize, actual: usize },

    /// The stored checksum does not match the block contents.
    #[error("checksum mismatch on {0}")]
    ChecksumMismatch(BlockId),

    /// The free list is exhausted.
    #[error("no free blocks left")]
    NoSpace,

    /// The key is not in the tree.
    #[error("key not found")]
    NotFound,

    /// The tree structure is corrupt or an internal invariant was violated.
    #[error("tree is insane: {0}")]
    Insane(String),

    /// The operation is not supported by this engine.
    #[error("{0} is not implemented")]
    Unimplemented(&'static str),

    /// A key does not have the tree's fixed key width.
    #[error("key is {actual} bytes, tree expects {expected}")]
    KeySizeMismatch { expected: usize, actual: usize },

    /// A value does not have the tree's fixed value width.
    #[error("value is {actual} bytes, tree expects {expected}")]
    ValueSizeMismatch { expected: usize, actual: usize },

    /// Options or store geometry cannot host a tree.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Shorthand for building an [`Error::Insane`].
    pub(crate) fn insane(msg: impl Into<String>) -> Self {
        Error::Insane(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::BlockOutOfRange {
            block: BlockId::new(42),
            num_blocks: 8,
        };
        assert_eq!(format!("{}", err), "Block(42) is out of range (store has 8 blocks)");

        assert_eq!(format!("{}", Error::NoSpace), "no free blocks left");
        assert_eq!(format!("{}", Error::Unimplemented("delete")), "delete is not implemented");
        assert_eq!(
            format!("{}", Error::insane("bad tag")),
            "tree is insane: bad tag"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();

        match err {
            Error::Io(_) => {} // Success
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_io_error_source() {
        use std::error::Error as _;

        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err = Error::from(io_err);
        assert!(err.source().is_some());
        assert!(Error::NotFound.source().is_none());
    }

    #[test]
    fn test_result_type_alias() {
        fn might_fail() -> Result<u32> {
            Ok(42)
        }

        assert_eq!(might_fail().unwrap(), 42);
    }
}
