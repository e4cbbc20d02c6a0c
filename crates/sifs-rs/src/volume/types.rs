#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileInfo {
    pub length: u64,
    pub modtime: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirInfo {
    /// Display names in entry order.
    pub names: Vec<String>,
    pub modtime: i64,
}

impl DirInfo {
    #[must_use]
    pub fn nentries(&self) -> usize {
        self.names.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub kind: EntryKind,
    pub name: String,
}

/// Bitmap tag counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockUsage {
    pub unused: u32,
    pub dirs: u32,
    pub files: u32,
    pub data: u32,
}

impl BlockUsage {
    #[must_use]
    pub const fn used(&self) -> u32 {
        self.dirs + self.files + self.data
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefragReport {
    /// Relocations performed; a data run counts once.
    pub moves: usize,
}
