//! Compaction of live blocks towards the front of the volume.
//!
//! The bitmap is scanned from block 1. The first unused block becomes the target
//! slot; the next live block (or data run) after it is moved into the slot, every
//! reference to it is rewritten, and the scan resumes right after the slot.

use tracing::{debug, info};

use super::Volume;
use super::types::DefragReport;
use crate::error::{SifsError, SifsResult};
use crate::layout::{BlockId, BlockKind, FileBlock, ROOTDIR_BLOCKID};

impl Volume {
    /// Moves every live block down so that no unused block lies between the root
    /// and the last live block. Names, content and entry order are preserved.
    ///
    /// # Errors
    /// Returns `Corrupt` when a data run has no owning file record or a relocation
    /// does not land on the expected slot.
    pub fn defrag(&mut self) -> SifsResult<DefragReport> {
        let nblocks = self.header.nblocks;
        let mut report = DefragReport::default();
        let mut free_slot: Option<BlockId> = None;
        let mut index = ROOTDIR_BLOCKID + 1;

        while index < nblocks {
            let kind = self.block_kind(index)?;
            match (kind, free_slot) {
                (BlockKind::Unused, None) => free_slot = Some(index),
                (BlockKind::Unused, Some(_)) => {}
                (_, None) => {}
                (_, Some(slot)) => {
                    self.relocate(kind, index, slot)?;
                    report.moves += 1;
                    free_slot = None;
                    index = slot;
                }
            }
            index += 1;
        }

        info!(moves = report.moves, "defragmented volume");
        Ok(report)
    }

    fn relocate(&mut self, kind: BlockKind, from: BlockId, slot: BlockId) -> SifsResult<()> {
        match kind {
            BlockKind::Dir | BlockKind::File => {
                let bytes = self.read_blocks(from, 1)?;
                let to = self.allocate(1, kind)?;
                if to != slot {
                    return Err(SifsError::Corrupt(format!(
                        "block {from} relocated to {to}, expected {slot}"
                    )));
                }
                self.write_blocks(to, &bytes)?;
                self.repoint_references(from, to)?;
                self.free(from, 1)?;
                debug!(?kind, from, to, "relocated block");
            }
            BlockKind::Data => {
                let (owner_block, mut owner) = self.find_data_owner(from)?;
                let count = self.run_len(&owner)?;
                let bytes = self.read_blocks(from, count)?;
                self.free(from, count)?;
                let to = self.allocate(count, BlockKind::Data)?;
                if to != slot {
                    return Err(SifsError::Corrupt(format!(
                        "data run at {from} relocated to {to}, expected {slot}"
                    )));
                }
                self.write_blocks(to, &bytes)?;
                owner.first_block = to;
                self.store_file(owner_block, &owner)?;
                debug!(from, to, count, owner = owner_block, "relocated data run");
            }
            BlockKind::Unused => {}
        }
        Ok(())
    }

    /// Rewrites every directory entry pointing at `from` to point at `to`.
    fn repoint_references(&mut self, from: BlockId, to: BlockId) -> SifsResult<()> {
        for (index, kind) in self.bitmap()?.into_iter().enumerate() {
            if kind != BlockKind::Dir {
                continue;
            }
            let block = index as BlockId;
            let mut dir = self.load_dir(block)?;
            let mut changed = false;
            for entry in dir.entries.iter_mut().filter(|e| e.block == from) {
                entry.block = to;
                changed = true;
            }
            if changed {
                self.store_dir(block, &dir)?;
            }
        }
        Ok(())
    }

    fn find_data_owner(&self, first_block: BlockId) -> SifsResult<(BlockId, FileBlock)> {
        for (index, kind) in self.bitmap()?.into_iter().enumerate() {
            if kind != BlockKind::File {
                continue;
            }
            let block = index as BlockId;
            let file = self.load_file(block)?;
            if file.first_block == first_block {
                return Ok((block, file));
            }
        }
        Err(SifsError::Corrupt(format!(
            "data block {first_block} has no owning file record"
        )))
    }
}
