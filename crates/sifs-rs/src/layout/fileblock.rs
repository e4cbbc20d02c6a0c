use sha2::{Digest, Sha256};

use super::{
    BlockId, HASH_LEN, MAX_ENTRIES, MAX_NAME_LENGTH, decode_name, encode_name, read_i64, read_u32,
    read_u64,
};
use crate::error::{SifsError, SifsResult};

const MODTIME_AT: usize = 0;
const LENGTH_AT: usize = 8;
const HASH_AT: usize = 16;
const FIRST_BLOCK_AT: usize = HASH_AT + HASH_LEN;
const NFILES_AT: usize = FIRST_BLOCK_AT + 4;
const NAMES_AT: usize = NFILES_AT + 4;

/// FILEBLOCK_SIZE is the byte size of an encoded file record.
pub const FILEBLOCK_SIZE: usize = NAMES_AT + MAX_ENTRIES * MAX_NAME_LENGTH;

pub type ContentHash = [u8; HASH_LEN];

/// Deduplication record: one copy of some content plus every name it is known by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlock {
    pub modtime: i64,
    pub length: u64,
    pub hash: ContentHash,
    pub first_block: BlockId,
    pub names: Vec<String>,
}

impl FileBlock {
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.names.len() >= MAX_ENTRIES
    }

    /// Name at `fileindex`, if the slot is live.
    #[must_use]
    pub fn name_at(&self, fileindex: u32) -> Option<&str> {
        self.names.get(fileindex as usize).map(String::as_str)
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; FILEBLOCK_SIZE] {
        let mut buf = [0u8; FILEBLOCK_SIZE];
        buf[MODTIME_AT..LENGTH_AT].copy_from_slice(&self.modtime.to_le_bytes());
        buf[LENGTH_AT..HASH_AT].copy_from_slice(&self.length.to_le_bytes());
        buf[HASH_AT..FIRST_BLOCK_AT].copy_from_slice(&self.hash);
        buf[FIRST_BLOCK_AT..NFILES_AT].copy_from_slice(&self.first_block.to_le_bytes());
        let count = self.names.len().min(MAX_ENTRIES);
        buf[NFILES_AT..NAMES_AT].copy_from_slice(&(count as u32).to_le_bytes());
        for (i, name) in self.names.iter().take(count).enumerate() {
            let at = NAMES_AT + i * MAX_NAME_LENGTH;
            encode_name(name, &mut buf[at..at + MAX_NAME_LENGTH]);
        }
        buf
    }

    /// # Errors
    /// Returns `Corrupt` for a short buffer, a name count above [`MAX_ENTRIES`] or an
    /// undecodable name.
    pub fn from_bytes(buf: &[u8]) -> SifsResult<Self> {
        if buf.len() < FILEBLOCK_SIZE {
            return Err(SifsError::Corrupt("short file block".to_string()));
        }
        let count = read_u32(buf, NFILES_AT) as usize;
        if count > MAX_ENTRIES {
            return Err(SifsError::Corrupt(format!(
                "file record holds {count} names, limit is {MAX_ENTRIES}"
            )));
        }
        let names = (0..count)
            .map(|i| {
                let at = NAMES_AT + i * MAX_NAME_LENGTH;
                decode_name(&buf[at..at + MAX_NAME_LENGTH])
            })
            .collect::<SifsResult<Vec<_>>>()?;
        let mut hash = [0u8; HASH_LEN];
        hash.copy_from_slice(&buf[HASH_AT..FIRST_BLOCK_AT]);
        Ok(Self {
            modtime: read_i64(buf, MODTIME_AT),
            length: read_u64(buf, LENGTH_AT),
            hash,
            first_block: read_u32(buf, FIRST_BLOCK_AT),
            names,
        })
    }
}

/// 128-bit content digest: the leading bytes of the SHA-256 of `data`.
#[must_use]
pub fn compute_checksum(data: &[u8]) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let digest = hasher.finalize();
    let mut out = [0u8; HASH_LEN];
    out.copy_from_slice(&digest[..HASH_LEN]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FileBlock {
        FileBlock {
            modtime: 42,
            length: 2500,
            hash: compute_checksum(b"payload"),
            first_block: 9,
            names: vec!["a.txt".to_string(), "copy-of-a".to_string()],
        }
    }

    #[test]
    fn record_matches_packed_layout() {
        assert_eq!(FILEBLOCK_SIZE, 808);
        assert!(FILEBLOCK_SIZE as u64 <= crate::layout::MIN_BLOCKSIZE);
    }

    #[test]
    fn file_record_round_trip() {
        let file = sample();
        assert_eq!(FileBlock::from_bytes(&file.to_bytes()).unwrap(), file);
    }

    #[test]
    fn unused_name_slots_are_zeroed() {
        let bytes = sample().to_bytes();
        let third = NAMES_AT + 2 * MAX_NAME_LENGTH;
        assert!(bytes[third..].iter().all(|&b| b == 0));
    }

    #[test]
    fn name_at_only_sees_live_slots() {
        let file = sample();
        assert_eq!(file.name_at(1), Some("copy-of-a"));
        assert_eq!(file.name_at(2), None);
    }

    #[test]
    fn overfull_names_are_corrupt() {
        let mut bytes = sample().to_bytes();
        bytes[NFILES_AT..NAMES_AT].copy_from_slice(&(MAX_ENTRIES as u32 + 1).to_le_bytes());
        assert!(matches!(
            FileBlock::from_bytes(&bytes),
            Err(SifsError::Corrupt(_))
        ));
    }

    #[test]
    fn checksum_tracks_content() {
        assert_eq!(compute_checksum(b"same"), compute_checksum(b"same"));
        assert_ne!(compute_checksum(b"same"), compute_checksum(b"different"));
        assert_eq!(compute_checksum(b"").len(), HASH_LEN);
    }
}
