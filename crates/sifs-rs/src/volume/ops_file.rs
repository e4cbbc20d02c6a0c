use tracing::{debug, info};

use super::Volume;
use super::path::split_path;
use super::types::FileInfo;
use crate::error::{SifsError, SifsResult};
use crate::layout::{
    BlockId, BlockKind, ContentHash, DirEntry, FileBlock, compute_checksum, is_valid_name, now,
};

impl Volume {
    /// Stores `data` under `path`. Content already present on the volume is shared:
    /// the existing record gains a name and no data blocks are written.
    ///
    /// # Errors
    /// `InvalidArgument` for empty data or a bad leaf name, the parent errors of
    /// [`Self::mkdir`], `TooManyEntries` when the shared record has no free name slot
    /// and `OutOfSpace` when the record or its data run does not fit.
    pub fn writefile(&mut self, path: &str, data: &[u8]) -> SifsResult<()> {
        if data.is_empty() {
            return Err(SifsError::InvalidArgument("file data must not be empty"));
        }
        let components = split_path(path);
        let (leaf, parent) = components
            .split_last()
            .ok_or(SifsError::InvalidArgument("a file needs a name"))?;
        if !is_valid_name(leaf) {
            return Err(SifsError::InvalidArgument("invalid file name"));
        }

        let (parent_block, mut parent_dir) = self.resolve_dir(parent)?;
        if parent_dir.is_full() {
            return Err(SifsError::TooManyEntries);
        }
        if self.has_entry(&parent_dir, leaf)? {
            return Err(SifsError::AlreadyExists);
        }

        let hash = compute_checksum(data);
        let modtime = now();
        let (file_block, file) = match self.find_file_by_hash(&hash)? {
            Some((block, mut file)) => {
                if file.is_full() {
                    return Err(SifsError::TooManyEntries);
                }
                file.names.push((*leaf).to_string());
                debug!(path, block, names = file.names.len(), "shared existing content");
                (block, file)
            }
            None => {
                let count = u32::try_from(self.header.blocks_for(data.len() as u64))
                    .map_err(|_| SifsError::OutOfSpace)?;
                let block = self.allocate(1, BlockKind::File)?;
                let first_block = match self.allocate(count, BlockKind::Data) {
                    Ok(first) => first,
                    Err(err) => {
                        self.free(block, 1)?;
                        return Err(err);
                    }
                };
                self.write_blocks(first_block, data)?;
                let file = FileBlock {
                    modtime,
                    length: data.len() as u64,
                    hash,
                    first_block,
                    names: vec![(*leaf).to_string()],
                };
                debug!(path, block, first_block, count, "stored new content");
                (block, file)
            }
        };
        self.store_file(file_block, &file)?;

        let fileindex = u32::try_from(file.names.len() - 1)
            .map_err(|_| SifsError::Corrupt("file name index overflows".to_string()))?;
        parent_dir.entries.push(DirEntry {
            block: file_block,
            fileindex,
        });
        parent_dir.modtime = modtime;
        self.store_dir(parent_block, &parent_dir)
    }

    /// Reads the whole content of the file at `path`.
    ///
    /// # Errors
    /// `NoSuchEntry` or `NotAFile` when `path` does not name a file, `OutOfMemory`
    /// when the content buffer cannot be reserved.
    pub fn readfile(&self, path: &str) -> SifsResult<Vec<u8>> {
        let resolved = self.resolve_file(&split_path(path))?;
        let file = resolved.file;
        let len = usize::try_from(file.length).map_err(|_| SifsError::OutOfMemory)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)?;
        data.resize(len, 0);
        self.check_range(file.first_block, self.run_len(&file)?)?;
        self.read_region(self.header.block_offset(file.first_block), &mut data)?;
        Ok(data)
    }

    /// Length and modification time of the file at `path`.
    ///
    /// # Errors
    /// `NoSuchEntry` or `NotAFile` when `path` does not name a file.
    pub fn fileinfo(&self, path: &str) -> SifsResult<FileInfo> {
        let resolved = self.resolve_file(&split_path(path))?;
        Ok(FileInfo {
            length: resolved.file.length,
            modtime: resolved.file.modtime,
        })
    }

    /// Removes one name of a file. The content and its record are freed with the
    /// last name.
    ///
    /// # Errors
    /// `NoSuchEntry` or `NotAFile` when `path` does not name a file.
    pub fn rmfile(&mut self, path: &str) -> SifsResult<()> {
        let resolved = self.resolve_file(&split_path(path))?;
        let file_block = resolved.file_block;
        let removed = resolved.fileindex;

        // Names after the removed one shift down a slot.
        self.shift_fileindexes(file_block, removed)?;

        let mut parent_dir = self.load_dir(resolved.dir_block)?;
        if resolved.entry_index >= parent_dir.entries.len() {
            return Err(SifsError::Corrupt(format!(
                "entry {} vanished from directory block {}",
                resolved.entry_index, resolved.dir_block
            )));
        }
        parent_dir.entries.remove(resolved.entry_index);
        parent_dir.modtime = now();
        self.store_dir(resolved.dir_block, &parent_dir)?;

        let mut file = resolved.file;
        file.names.remove(removed as usize);
        if file.names.is_empty() {
            let count = self.run_len(&file)?;
            self.free(file.first_block, count)?;
            self.free(file_block, 1)?;
            info!(path, block = file_block, "released file content");
        } else {
            self.store_file(file_block, &file)?;
            debug!(path, block = file_block, names = file.names.len(), "dropped file name");
        }
        Ok(())
    }

    /// File record holding content with `hash`, if any.
    pub(crate) fn find_file_by_hash(
        &self,
        hash: &ContentHash,
    ) -> SifsResult<Option<(BlockId, FileBlock)>> {
        for (index, kind) in self.bitmap()?.into_iter().enumerate() {
            if kind != BlockKind::File {
                continue;
            }
            let block = index as BlockId;
            let file = self.load_file(block)?;
            if file.hash == *hash {
                return Ok(Some((block, file)));
            }
        }
        Ok(None)
    }

    /// Decrements, in every directory, the entries pointing at `file_block` with a
    /// fileindex above `removed`.
    fn shift_fileindexes(&mut self, file_block: BlockId, removed: u32) -> SifsResult<()> {
        for (index, kind) in self.bitmap()?.into_iter().enumerate() {
            if kind != BlockKind::Dir {
                continue;
            }
            let block = index as BlockId;
            let mut dir = self.load_dir(block)?;
            let mut changed = false;
            for entry in &mut dir.entries {
                if entry.block == file_block && entry.fileindex > removed {
                    entry.fileindex -= 1;
                    changed = true;
                }
            }
            if changed {
                self.store_dir(block, &dir)?;
            }
        }
        Ok(())
    }
}
