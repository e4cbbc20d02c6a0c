//! On-disk format
//!
//! A volume is one flat file: `Header ++ Bitmap ++ Blocks[0..nblocks)`.
//!
//! - header: `blocksize: u64`, `nblocks: u32`, padded to [`HEADER_SIZE`] bytes
//! - bitmap: one tag byte per block (see [`BlockKind`])
//! - blocks: `nblocks` slots of `blocksize` bytes
//!
//! Block 0 always holds the root directory. Directory and file records are
//! fixed-size structures written at the start of their block; data blocks hold raw
//! file content. All integers are little-endian.

pub mod dirblock;
pub mod fileblock;
pub mod header;

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{SifsError, SifsResult};

pub use dirblock::{DIRBLOCK_SIZE, DirBlock, DirEntry};
pub use fileblock::{ContentHash, FILEBLOCK_SIZE, FileBlock, compute_checksum};
pub use header::{HEADER_SIZE, Header};

/// Index of a block inside the volume.
pub type BlockId = u32;

/// ROOTDIR_BLOCKID is the block holding the root directory.
pub const ROOTDIR_BLOCKID: BlockId = 0;
/// MAX_NAME_LENGTH is the size of a name slot, including its NUL terminator.
pub const MAX_NAME_LENGTH: usize = 32;
/// MAX_ENTRIES bounds both directory entries and names per file record.
pub const MAX_ENTRIES: usize = 24;
/// HASH_LEN is the byte length of a content hash.
pub const HASH_LEN: usize = 16;
/// MIN_BLOCKSIZE keeps every record small enough to fit in one block.
pub const MIN_BLOCKSIZE: u64 = 1024;
/// TAG_SIZE is the byte size of one bitmap tag.
pub const TAG_SIZE: u64 = 1;
/// ROOT_ALIAS names the root directory explicitly as a leading path component.
pub const ROOT_ALIAS: &str = ".";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Unused,
    Dir,
    File,
    Data,
}

impl BlockKind {
    /// # Errors
    /// Returns `Corrupt` for a byte that is not one of the four tags.
    pub fn from_byte(byte: u8) -> SifsResult<Self> {
        match byte {
            b'u' => Ok(Self::Unused),
            b'd' => Ok(Self::Dir),
            b'f' => Ok(Self::File),
            b'b' => Ok(Self::Data),
            other => Err(SifsError::Corrupt(format!("unknown bitmap tag {other:#04x}"))),
        }
    }

    #[must_use]
    pub const fn to_byte(self) -> u8 {
        match self {
            Self::Unused => b'u',
            Self::Dir => b'd',
            Self::File => b'f',
            Self::Data => b'b',
        }
    }
}

/// A name fits a slot when it is non-empty, leaves room for the terminator, and is
/// neither the root alias nor carries a separator or NUL byte.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    if name.is_empty() || name.len() >= MAX_NAME_LENGTH || name == ROOT_ALIAS {
        return false;
    }
    !name.contains('/') && !name.contains('\0')
}

pub(crate) fn now() -> i64 {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    i64::try_from(secs).unwrap_or(i64::MAX)
}

pub(crate) fn encode_name(name: &str, slot: &mut [u8]) {
    slot.fill(0);
    let bytes = name.as_bytes();
    let max = bytes.len().min(MAX_NAME_LENGTH - 1);
    slot[..max].copy_from_slice(&bytes[..max]);
}

pub(crate) fn decode_name(slot: &[u8]) -> SifsResult<String> {
    let end = slot.iter().position(|b| *b == 0).unwrap_or(slot.len());
    String::from_utf8(slot[..end].to_vec())
        .map_err(|_| SifsError::Corrupt("name is not valid utf-8".to_string()))
}

pub(crate) fn read_u32(buf: &[u8], at: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&buf[at..at + 4]);
    u32::from_le_bytes(raw)
}

pub(crate) fn read_u64(buf: &[u8], at: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&buf[at..at + 8]);
    u64::from_le_bytes(raw)
}

pub(crate) fn read_i64(buf: &[u8], at: usize) -> i64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&buf[at..at + 8]);
    i64::from_le_bytes(raw)
}
