use tracing::debug;

use super::Volume;
use crate::error::{SifsError, SifsResult};
use crate::layout::{BlockId, BlockKind, ROOTDIR_BLOCKID};

impl Volume {
    /// Reserves the first run of `count` consecutive unused blocks after the root and
    /// tags them `kind`.
    ///
    /// # Errors
    /// Returns `OutOfSpace` when no such run exists; nothing is reserved in that case.
    pub(crate) fn allocate(&mut self, count: u32, kind: BlockKind) -> SifsResult<BlockId> {
        if count == 0 || kind == BlockKind::Unused {
            return Err(SifsError::InvalidArgument(
                "allocation needs a positive count and a used tag",
            ));
        }
        if count > self.header.nblocks {
            return Err(SifsError::OutOfSpace);
        }

        let bitmap = self.bitmap()?;
        let mut run_start = ROOTDIR_BLOCKID + 1;
        let mut run_len = 0u32;
        for (index, tag) in bitmap.iter().enumerate().skip(run_start as usize) {
            if *tag != BlockKind::Unused {
                run_len = 0;
                continue;
            }
            if run_len == 0 {
                run_start = index as BlockId;
            }
            run_len += 1;
            if run_len == count {
                self.set_block_kinds(run_start, count, kind)?;
                debug!(first = run_start, count, ?kind, "allocated blocks");
                return Ok(run_start);
            }
        }
        Err(SifsError::OutOfSpace)
    }

    /// Marks a run previously returned by [`Self::allocate`] as unused.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for a run touching the root directory.
    pub(crate) fn free(&mut self, first: BlockId, count: u32) -> SifsResult<()> {
        if first == ROOTDIR_BLOCKID {
            return Err(SifsError::InvalidArgument(
                "the root directory block is never freed",
            ));
        }
        if count == 0 {
            return Ok(());
        }
        self.set_block_kinds(first, count, BlockKind::Unused)?;
        debug!(first, count, "freed blocks");
        Ok(())
    }
}
