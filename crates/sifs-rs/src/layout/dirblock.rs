use super::{BlockId, MAX_ENTRIES, MAX_NAME_LENGTH, decode_name, encode_name, read_i64, read_u32};
use crate::error::{SifsError, SifsResult};

const NAME_AT: usize = 0;
const MODTIME_AT: usize = NAME_AT + MAX_NAME_LENGTH;
const NENTRIES_AT: usize = MODTIME_AT + 8;
const ENTRIES_AT: usize = NENTRIES_AT + 4;
const ENTRY_SIZE: usize = 8;

/// DIRBLOCK_SIZE is the padded byte size of an encoded directory record.
pub const DIRBLOCK_SIZE: usize = (ENTRIES_AT + MAX_ENTRIES * ENTRY_SIZE).next_multiple_of(8);

/// One slot of a directory. `fileindex` only means something when `block` is a file
/// record: it picks which of the record's names this entry stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirEntry {
    pub block: BlockId,
    pub fileindex: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirBlock {
    pub name: String,
    pub modtime: i64,
    pub entries: Vec<DirEntry>,
}

impl DirBlock {
    #[must_use]
    pub fn new(name: &str, modtime: i64) -> Self {
        Self {
            name: name.to_string(),
            modtime,
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= MAX_ENTRIES
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; DIRBLOCK_SIZE] {
        let mut buf = [0u8; DIRBLOCK_SIZE];
        encode_name(&self.name, &mut buf[NAME_AT..MODTIME_AT]);
        buf[MODTIME_AT..NENTRIES_AT].copy_from_slice(&self.modtime.to_le_bytes());
        let count = self.entries.len().min(MAX_ENTRIES);
        buf[NENTRIES_AT..ENTRIES_AT].copy_from_slice(&(count as u32).to_le_bytes());
        for (i, entry) in self.entries.iter().take(count).enumerate() {
            let at = ENTRIES_AT + i * ENTRY_SIZE;
            buf[at..at + 4].copy_from_slice(&entry.block.to_le_bytes());
            buf[at + 4..at + 8].copy_from_slice(&entry.fileindex.to_le_bytes());
        }
        buf
    }

    /// # Errors
    /// Returns `Corrupt` for a short buffer, an entry count above [`MAX_ENTRIES`] or an
    /// undecodable name.
    pub fn from_bytes(buf: &[u8]) -> SifsResult<Self> {
        if buf.len() < DIRBLOCK_SIZE {
            return Err(SifsError::Corrupt("short directory block".to_string()));
        }
        let count = read_u32(buf, NENTRIES_AT) as usize;
        if count > MAX_ENTRIES {
            return Err(SifsError::Corrupt(format!(
                "directory holds {count} entries, limit is {MAX_ENTRIES}"
            )));
        }
        let entries = (0..count)
            .map(|i| {
                let at = ENTRIES_AT + i * ENTRY_SIZE;
                DirEntry {
                    block: read_u32(buf, at),
                    fileindex: read_u32(buf, at + 4),
                }
            })
            .collect();
        Ok(Self {
            name: decode_name(&buf[NAME_AT..MODTIME_AT])?,
            modtime: read_i64(buf, MODTIME_AT),
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_matches_packed_layout() {
        assert_eq!(DIRBLOCK_SIZE, 240);
        assert_eq!(ENTRIES_AT, 44);
    }

    #[test]
    fn directory_round_trip_preserves_entry_order() {
        let mut dir = DirBlock::new("docs", 1_700_000_000);
        dir.entries.push(DirEntry {
            block: 7,
            fileindex: 0,
        });
        dir.entries.push(DirEntry {
            block: 3,
            fileindex: 2,
        });

        let decoded = DirBlock::from_bytes(&dir.to_bytes()).unwrap();
        assert_eq!(decoded, dir);
    }

    #[test]
    fn root_directory_has_empty_name() {
        let decoded = DirBlock::from_bytes(&DirBlock::new("", 0).to_bytes()).unwrap();
        assert_eq!(decoded.name, "");
        assert!(decoded.entries.is_empty());
    }

    #[test]
    fn overfull_count_is_corrupt() {
        let mut bytes = DirBlock::new("x", 0).to_bytes();
        bytes[NENTRIES_AT..ENTRIES_AT].copy_from_slice(&(MAX_ENTRIES as u32 + 1).to_le_bytes());
        assert!(matches!(
            DirBlock::from_bytes(&bytes),
            Err(SifsError::Corrupt(_))
        ));
    }

    #[test]
    fn full_directory_reports_full() {
        let mut dir = DirBlock::new("full", 0);
        for i in 0..MAX_ENTRIES {
            assert!(!dir.is_full());
            dir.entries.push(DirEntry {
                block: i as BlockId + 1,
                fileindex: 0,
            });
        }
        assert!(dir.is_full());
    }
}
