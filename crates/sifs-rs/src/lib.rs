//! Single-file volume engine: a tagged block bitmap, directory and
//! content-deduplicated file records, a first-fit allocator and a compacting
//! defragmenter, all stored in one memory-mapped file.
#![allow(clippy::cargo_common_metadata)]

pub mod disk;
pub mod error;
pub mod layout;
pub mod volume;

pub use error::{SifsError, SifsResult};
pub use volume::{
    BlockUsage, DefragReport, DirInfo, EntryKind, FileInfo, ListEntry, Volume, split_path,
};
