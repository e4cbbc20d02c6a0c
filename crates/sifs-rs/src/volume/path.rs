use super::Volume;
use super::types::EntryKind;
use crate::error::{SifsError, SifsResult};
use crate::layout::{BlockId, BlockKind, DirBlock, DirEntry, FileBlock, ROOT_ALIAS, ROOTDIR_BLOCKID};

/// Splits a `/`-separated path into its components.
///
/// Empty components from repeated, leading or trailing separators are dropped, as
/// is a leading `.` naming the root. The root itself has no components.
#[must_use]
pub fn split_path(path: &str) -> Vec<&str> {
    let mut components: Vec<&str> = path.split('/').filter(|c| !c.is_empty()).collect();
    if components.first() == Some(&ROOT_ALIAS) {
        components.remove(0);
    }
    components
}

/// A named entry found in a directory, with the record it points at.
pub(crate) enum EntryMatch {
    Dir {
        index: usize,
        block: BlockId,
        dir: DirBlock,
    },
    File {
        index: usize,
        block: BlockId,
        file: FileBlock,
        fileindex: u32,
    },
}

/// A file name resolved down to its directory entry.
pub(crate) struct ResolvedFile {
    pub dir_block: BlockId,
    pub entry_index: usize,
    pub file_block: BlockId,
    pub file: FileBlock,
    pub fileindex: u32,
}

impl Volume {
    /// Display name and kind of the record an entry points at.
    pub(crate) fn entry_name(&self, entry: &DirEntry) -> SifsResult<(EntryKind, String)> {
        match self.block_kind(entry.block)? {
            BlockKind::Dir => Ok((EntryKind::Dir, self.load_dir(entry.block)?.name)),
            BlockKind::File => {
                let file = self.load_file(entry.block)?;
                let name = file.name_at(entry.fileindex).ok_or_else(|| {
                    SifsError::Corrupt(format!(
                        "fileindex {} out of range for file block {}",
                        entry.fileindex, entry.block
                    ))
                })?;
                Ok((EntryKind::File, name.to_string()))
            }
            other => Err(SifsError::Corrupt(format!(
                "directory entry points at {other:?} block {}",
                entry.block
            ))),
        }
    }

    /// Finds the entry of `dir` called `name`, directory or file.
    pub(crate) fn lookup(&self, dir: &DirBlock, name: &str) -> SifsResult<Option<EntryMatch>> {
        for (index, entry) in dir.entries.iter().enumerate() {
            match self.block_kind(entry.block)? {
                BlockKind::Dir => {
                    let child = self.load_dir(entry.block)?;
                    if child.name == name {
                        return Ok(Some(EntryMatch::Dir {
                            index,
                            block: entry.block,
                            dir: child,
                        }));
                    }
                }
                BlockKind::File => {
                    let file = self.load_file(entry.block)?;
                    if file.name_at(entry.fileindex) == Some(name) {
                        return Ok(Some(EntryMatch::File {
                            index,
                            block: entry.block,
                            file,
                            fileindex: entry.fileindex,
                        }));
                    }
                }
                other => {
                    return Err(SifsError::Corrupt(format!(
                        "directory entry points at {other:?} block {}",
                        entry.block
                    )));
                }
            }
        }
        Ok(None)
    }

    pub(crate) fn has_entry(&self, dir: &DirBlock, name: &str) -> SifsResult<bool> {
        Ok(self.lookup(dir, name)?.is_some())
    }

    /// Walks from the root through one directory per component.
    pub(crate) fn resolve_dir(&self, components: &[&str]) -> SifsResult<(BlockId, DirBlock)> {
        let mut block = ROOTDIR_BLOCKID;
        let mut dir = self.load_dir(block)?;
        for name in components {
            match self.lookup(&dir, name)? {
                Some(EntryMatch::Dir {
                    block: child,
                    dir: child_dir,
                    ..
                }) => {
                    block = child;
                    dir = child_dir;
                }
                Some(EntryMatch::File { .. }) => return Err(SifsError::NotADirectory),
                None => return Err(SifsError::NoSuchEntry),
            }
        }
        Ok((block, dir))
    }

    /// Resolves every component but the last as a directory and the last as a file
    /// name inside it.
    pub(crate) fn resolve_file(&self, components: &[&str]) -> SifsResult<ResolvedFile> {
        let (name, parent) = components.split_last().ok_or(SifsError::NotAFile)?;
        let (dir_block, dir) = self.resolve_dir(parent)?;
        match self.lookup(&dir, name)? {
            Some(EntryMatch::File {
                index,
                block,
                file,
                fileindex,
            }) => Ok(ResolvedFile {
                dir_block,
                entry_index: index,
                file_block: block,
                file,
                fileindex,
            }),
            Some(EntryMatch::Dir { .. }) => Err(SifsError::NotAFile),
            None => Err(SifsError::NoSuchEntry),
        }
    }
}
