use super::{BlockId, MIN_BLOCKSIZE, TAG_SIZE, read_u32, read_u64};

/// HEADER_SIZE is the padded byte size of the volume header.
pub const HEADER_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub blocksize: u64,
    pub nblocks: u32,
}

impl Header {
    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..8].copy_from_slice(&self.blocksize.to_le_bytes());
        buf[8..12].copy_from_slice(&self.nblocks.to_le_bytes());
        buf
    }

    #[must_use]
    pub fn from_bytes(buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_SIZE {
            return None;
        }
        Some(Self {
            blocksize: read_u64(buf, 0),
            nblocks: read_u32(buf, 8),
        })
    }

    /// Whether the geometry can describe a volume at all.
    #[must_use]
    pub const fn is_plausible(&self) -> bool {
        self.blocksize >= MIN_BLOCKSIZE && self.nblocks > 0
    }

    #[must_use]
    pub const fn bitmap_offset() -> u64 {
        HEADER_SIZE as u64
    }

    #[must_use]
    pub const fn blocks_offset(&self) -> u64 {
        HEADER_SIZE as u64 + (self.nblocks as u64) * TAG_SIZE
    }

    #[must_use]
    pub const fn block_offset(&self, block: BlockId) -> u64 {
        self.blocks_offset() + (block as u64) * self.blocksize
    }

    /// Total file length implied by the header, `None` on overflow.
    #[must_use]
    pub fn volume_len(&self) -> Option<u64> {
        u64::from(self.nblocks)
            .checked_mul(self.blocksize)?
            .checked_add(self.blocks_offset())
    }

    /// Number of blocks needed to hold `nbytes` of content.
    #[must_use]
    pub const fn blocks_for(&self, nbytes: u64) -> u64 {
        nbytes.div_ceil(self.blocksize)
    }
}
