//! Volume handle and the operations exposed on it.
//!
//! Every operation resolves paths and validates its inputs before it touches the
//! bitmap, reserves all blocks it needs before writing content, and links new
//! records into their parent directory last.

mod allocator;
mod defrag;
mod ops_dir;
mod ops_file;
mod path;
mod types;
#[cfg(test)]
mod ops_dir_tests;

use std::path::Path;

use tracing::info;

use crate::disk::Disk;
use crate::error::{SifsError, SifsResult};
use crate::layout::{
    BlockId, BlockKind, DIRBLOCK_SIZE, DirBlock, FILEBLOCK_SIZE, FileBlock, HEADER_SIZE, Header,
    ROOTDIR_BLOCKID, now,
};

pub use path::split_path;
pub use types::{BlockUsage, DefragReport, DirInfo, EntryKind, FileInfo, ListEntry};

pub struct Volume {
    disk: Disk,
    header: Header,
}

impl Volume {
    /// Creates and formats a new volume file: header, a bitmap with only the root
    /// directory in use, and an empty root directory.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for a block size below the minimum or zero blocks,
    /// `AlreadyExists` if `path` is taken, or an I/O error if the file cannot be
    /// created.
    pub fn create(path: &Path, blocksize: u64, nblocks: u32) -> SifsResult<Self> {
        let header = Header { blocksize, nblocks };
        if !header.is_plausible() {
            return Err(SifsError::InvalidArgument(
                "blocksize must be at least 1024 bytes and nblocks at least 1",
            ));
        }
        let len = header
            .volume_len()
            .ok_or(SifsError::InvalidArgument("volume size overflows"))?;
        let disk = Disk::create(path, len)?;
        let mut volume = Self { disk, header };

        volume.write_region(0, &header.to_bytes())?;
        let mut bitmap = vec![BlockKind::Unused.to_byte(); nblocks as usize];
        bitmap[ROOTDIR_BLOCKID as usize] = BlockKind::Dir.to_byte();
        volume.write_region(Header::bitmap_offset(), &bitmap)?;
        volume.store_dir(ROOTDIR_BLOCKID, &DirBlock::new("", now()))?;

        info!(
            path = %path.display(),
            blocksize,
            nblocks,
            "created volume"
        );
        Ok(volume)
    }

    /// Opens an existing volume after checking that the file length matches the
    /// geometry recorded in its header.
    ///
    /// # Errors
    /// Returns `VolumeNotFound` if the file does not exist and `NotAVolume` if its
    /// size or header do not describe a volume.
    pub fn open(path: &Path) -> SifsResult<Self> {
        let disk = Disk::open(path)?;
        let mut buf = [0u8; HEADER_SIZE];
        if disk.read_at(0, &mut buf) != HEADER_SIZE {
            return Err(SifsError::NotAVolume);
        }
        let header = Header::from_bytes(&buf).ok_or(SifsError::NotAVolume)?;
        if !header.is_plausible() || header.volume_len() != Some(disk.len()) {
            return Err(SifsError::NotAVolume);
        }

        let volume = Self { disk, header };
        match volume.block_kind(ROOTDIR_BLOCKID) {
            Ok(BlockKind::Dir) => Ok(volume),
            _ => Err(SifsError::NotAVolume),
        }
    }

    #[must_use]
    pub const fn header(&self) -> Header {
        self.header
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.disk.path()
    }

    /// Flushes every pending write to the backing file.
    ///
    /// # Errors
    /// Returns an I/O error if the flush fails.
    pub fn sync(&self) -> SifsResult<()> {
        self.disk.flush()
    }

    /// Counts blocks per bitmap tag.
    ///
    /// # Errors
    /// Returns `Corrupt` if the bitmap holds an unknown tag.
    pub fn usage(&self) -> SifsResult<BlockUsage> {
        let mut usage = BlockUsage::default();
        for kind in self.bitmap()? {
            match kind {
                BlockKind::Unused => usage.unused += 1,
                BlockKind::Dir => usage.dirs += 1,
                BlockKind::File => usage.files += 1,
                BlockKind::Data => usage.data += 1,
            }
        }
        Ok(usage)
    }

    fn read_region(&self, offset: u64, buf: &mut [u8]) -> SifsResult<()> {
        let n = self.disk.read_at(offset, buf);
        if n != buf.len() {
            return Err(SifsError::Corrupt(format!(
                "read of {} bytes at offset {offset} runs past the volume end",
                buf.len()
            )));
        }
        Ok(())
    }

    fn write_region(&mut self, offset: u64, data: &[u8]) -> SifsResult<()> {
        let n = self.disk.write_at(offset, data);
        if n != data.len() {
            return Err(SifsError::Corrupt(format!(
                "write of {} bytes at offset {offset} runs past the volume end",
                data.len()
            )));
        }
        Ok(())
    }

    fn check_range(&self, first: BlockId, count: u32) -> SifsResult<()> {
        if u64::from(first) + u64::from(count) > u64::from(self.header.nblocks) {
            return Err(SifsError::Corrupt(format!(
                "blocks {first}..{} lie outside a volume of {} blocks",
                u64::from(first) + u64::from(count),
                self.header.nblocks
            )));
        }
        Ok(())
    }

    fn bitmap(&self) -> SifsResult<Vec<BlockKind>> {
        let mut raw = vec![0u8; self.header.nblocks as usize];
        self.read_region(Header::bitmap_offset(), &mut raw)?;
        raw.into_iter().map(BlockKind::from_byte).collect()
    }

    fn block_kind(&self, block: BlockId) -> SifsResult<BlockKind> {
        self.check_range(block, 1)?;
        let mut raw = [0u8; 1];
        self.read_region(Header::bitmap_offset() + u64::from(block), &mut raw)?;
        BlockKind::from_byte(raw[0])
    }

    fn set_block_kinds(&mut self, first: BlockId, count: u32, kind: BlockKind) -> SifsResult<()> {
        self.check_range(first, count)?;
        let tags = vec![kind.to_byte(); count as usize];
        self.write_region(Header::bitmap_offset() + u64::from(first), &tags)
    }

    fn read_blocks(&self, first: BlockId, count: u32) -> SifsResult<Vec<u8>> {
        self.check_range(first, count)?;
        let len = usize::try_from(u64::from(count) * self.header.blocksize)
            .map_err(|_| SifsError::OutOfMemory)?;
        let mut buf = Vec::new();
        buf.try_reserve_exact(len)?;
        buf.resize(len, 0);
        self.read_region(self.header.block_offset(first), &mut buf)?;
        Ok(buf)
    }

    fn write_blocks(&mut self, first: BlockId, data: &[u8]) -> SifsResult<()> {
        let count = self.header.blocks_for(data.len() as u64);
        let count = u32::try_from(count).map_err(|_| SifsError::OutOfSpace)?;
        self.check_range(first, count)?;
        self.write_region(self.header.block_offset(first), data)
    }

    fn expect_kind(&self, block: BlockId, kind: BlockKind) -> SifsResult<()> {
        let found = self.block_kind(block)?;
        if found != kind {
            return Err(SifsError::Corrupt(format!(
                "block {block} is tagged {found:?}, expected {kind:?}"
            )));
        }
        Ok(())
    }

    fn load_dir(&self, block: BlockId) -> SifsResult<DirBlock> {
        self.expect_kind(block, BlockKind::Dir)?;
        let mut buf = [0u8; DIRBLOCK_SIZE];
        self.read_region(self.header.block_offset(block), &mut buf)?;
        DirBlock::from_bytes(&buf)
    }

    fn store_dir(&mut self, block: BlockId, dir: &DirBlock) -> SifsResult<()> {
        self.check_range(block, 1)?;
        self.write_region(self.header.block_offset(block), &dir.to_bytes())
    }

    fn load_file(&self, block: BlockId) -> SifsResult<FileBlock> {
        self.expect_kind(block, BlockKind::File)?;
        let mut buf = [0u8; FILEBLOCK_SIZE];
        self.read_region(self.header.block_offset(block), &mut buf)?;
        FileBlock::from_bytes(&buf)
    }

    fn store_file(&mut self, block: BlockId, file: &FileBlock) -> SifsResult<()> {
        self.check_range(block, 1)?;
        self.write_region(self.header.block_offset(block), &file.to_bytes())
    }

    /// Blocks spanned by a file's data run.
    fn run_len(&self, file: &FileBlock) -> SifsResult<u32> {
        u32::try_from(self.header.blocks_for(file.length))
            .map_err(|_| SifsError::Corrupt(format!("file length {} is too large", file.length)))
    }
}

#[cfg(test)]
impl Volume {
    /// Rewrites the modtime of the directory at `path` so a later update stands out.
    pub(crate) fn backdate_dir(&mut self, path: &str, modtime: i64) {
        let (block, mut dir) = self.resolve_dir(&split_path(path)).expect("resolve dir");
        dir.modtime = modtime;
        self.store_dir(block, &dir).expect("store dir");
    }
}
