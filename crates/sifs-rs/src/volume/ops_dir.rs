use tracing::debug;

use super::Volume;
use super::path::{EntryMatch, split_path};
use super::types::{DirInfo, ListEntry};
use crate::error::{SifsError, SifsResult};
use crate::layout::{BlockKind, DirBlock, DirEntry, is_valid_name, now};

impl Volume {
    /// Creates an empty directory at `path`.
    ///
    /// # Errors
    /// `InvalidArgument` for a bad leaf name, `NoSuchEntry`/`NotADirectory` for a bad
    /// parent, `TooManyEntries` when the parent is full, `AlreadyExists` when the name
    /// is taken and `OutOfSpace` when no block is free.
    pub fn mkdir(&mut self, path: &str) -> SifsResult<()> {
        let components = split_path(path);
        let (leaf, parent) = components
            .split_last()
            .ok_or(SifsError::InvalidArgument("the root directory already exists"))?;
        if !is_valid_name(leaf) {
            return Err(SifsError::InvalidArgument("invalid directory name"));
        }

        let (parent_block, mut parent_dir) = self.resolve_dir(parent)?;
        if parent_dir.is_full() {
            return Err(SifsError::TooManyEntries);
        }
        if self.has_entry(&parent_dir, leaf)? {
            return Err(SifsError::AlreadyExists);
        }

        let block = self.allocate(1, BlockKind::Dir)?;
        let modtime = now();
        self.store_dir(block, &DirBlock::new(leaf, modtime))?;

        parent_dir.entries.push(DirEntry {
            block,
            fileindex: 0,
        });
        parent_dir.modtime = modtime;
        self.store_dir(parent_block, &parent_dir)?;
        debug!(path, block, "created directory");
        Ok(())
    }

    /// Removes the empty directory at `path`.
    ///
    /// # Errors
    /// `InvalidArgument` for the root, `NoSuchEntry` when nothing has that name,
    /// `NotADirectory` when it names a file and `DirectoryNotEmpty` when it still has
    /// entries.
    pub fn rmdir(&mut self, path: &str) -> SifsResult<()> {
        let components = split_path(path);
        let (leaf, parent) = components
            .split_last()
            .ok_or(SifsError::InvalidArgument("the root directory cannot be removed"))?;

        let (parent_block, mut parent_dir) = self.resolve_dir(parent)?;
        let (index, block) = match self.lookup(&parent_dir, leaf)? {
            Some(EntryMatch::Dir { index, block, dir }) => {
                if !dir.entries.is_empty() {
                    return Err(SifsError::DirectoryNotEmpty);
                }
                (index, block)
            }
            Some(EntryMatch::File { .. }) => return Err(SifsError::NotADirectory),
            None => return Err(SifsError::NoSuchEntry),
        };

        parent_dir.entries.remove(index);
        parent_dir.modtime = now();
        self.store_dir(parent_block, &parent_dir)?;
        self.free(block, 1)?;
        debug!(path, block, "removed directory");
        Ok(())
    }

    /// Entry names of the directory at `path`, in entry order.
    ///
    /// # Errors
    /// `NoSuchEntry` or `NotADirectory` when `path` does not name a directory.
    pub fn dirinfo(&self, path: &str) -> SifsResult<DirInfo> {
        let (_, dir) = self.resolve_dir(&split_path(path))?;
        let names = dir
            .entries
            .iter()
            .map(|entry| self.entry_name(entry).map(|(_, name)| name))
            .collect::<SifsResult<Vec<_>>>()?;
        Ok(DirInfo {
            names,
            modtime: dir.modtime,
        })
    }

    /// Like [`Self::dirinfo`], with each name tagged by its kind.
    ///
    /// # Errors
    /// Same as [`Self::dirinfo`].
    pub fn list(&self, path: &str) -> SifsResult<Vec<ListEntry>> {
        let (_, dir) = self.resolve_dir(&split_path(path))?;
        dir.entries
            .iter()
            .map(|entry| {
                self.entry_name(entry)
                    .map(|(kind, name)| ListEntry { kind, name })
            })
            .collect()
    }
}
