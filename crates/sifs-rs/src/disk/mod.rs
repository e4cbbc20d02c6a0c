//! Memory-mapped backing file of a volume.

#[cfg(test)]
mod disk_tests;

use memmap2::{MmapMut, MmapOptions};
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{SifsError, SifsResult};

pub struct Disk {
    path: PathBuf,
    file: File,
    map: Option<MmapMut>,
    len: u64,
}

impl Disk {
    /// Opens an existing volume file for reading and writing.
    ///
    /// # Errors
    /// Returns `VolumeNotFound` if nothing exists at `path`, or an I/O error if the
    /// file cannot be opened or mapped.
    pub fn open(path: &Path) -> SifsResult<Self> {
        let file = match OpenOptions::new().read(true).write(true).open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(SifsError::VolumeNotFound);
            }
            Err(err) => return Err(err.into()),
        };
        let len = file.metadata()?.len();
        Self::map_file(path, file, len)
    }

    /// Creates a zero-filled file of `len` bytes. Never truncates an existing file.
    ///
    /// # Errors
    /// Returns `AlreadyExists` if `path` is taken, or an I/O error if the file cannot
    /// be created, sized or mapped.
    pub fn create(path: &Path, len: u64) -> SifsResult<Self> {
        let file = match OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)
        {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                return Err(SifsError::AlreadyExists);
            }
            Err(err) => return Err(err.into()),
        };
        file.set_len(len)?;
        Self::map_file(path, file, len)
    }

    fn map_file(path: &Path, file: File, len: u64) -> SifsResult<Self> {
        let map = if len == 0 {
            None
        } else {
            let map_len = usize::try_from(len).map_err(|_| {
                std::io::Error::other(format!("volume length {len} exceeds addressable size"))
            })?;
            Some(unsafe { MmapOptions::new().len(map_len).map_mut(&file)? })
        };

        Ok(Self {
            path: path.to_path_buf(),
            file,
            map,
            len,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn len(&self) -> u64 {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn read_at(&self, off: u64, buf: &mut [u8]) -> usize {
        let Some(map) = self.map.as_ref() else {
            return 0;
        };
        let Ok(off) = usize::try_from(off) else {
            return 0;
        };
        if off >= map.len() {
            return 0;
        }
        let end = off.saturating_add(buf.len()).min(map.len());
        let src = &map[off..end];
        let n = src.len();
        buf[..n].copy_from_slice(src);
        n
    }

    pub fn write_at(&mut self, off: u64, data: &[u8]) -> usize {
        let Some(map) = self.map.as_mut() else {
            return 0;
        };
        let Ok(off) = usize::try_from(off) else {
            return 0;
        };
        if off >= map.len() {
            return 0;
        }
        let end = off.saturating_add(data.len()).min(map.len());
        let dst = &mut map[off..end];
        let n = dst.len();
        dst.copy_from_slice(&data[..n]);
        n
    }

    /// Flushes dirty pages of the mapping back to the file.
    ///
    /// # Errors
    /// Returns an I/O error if the kernel rejects the flush.
    pub fn flush(&self) -> SifsResult<()> {
        if let Some(map) = self.map.as_ref() {
            map.flush()?;
        }
        Ok(())
    }
}
