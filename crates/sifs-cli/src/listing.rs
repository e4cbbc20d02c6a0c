use std::io::Write;

use anyhow::Result;
use sifs_rs::{BlockUsage, DirInfo, EntryKind, FileInfo, ListEntry};

pub fn write_listing(out: &mut impl Write, entries: &[ListEntry]) -> Result<()> {
    for entry in entries {
        let tag = match entry.kind {
            EntryKind::Dir => "DIR",
            EntryKind::File => "FILE",
        };
        writeln!(out, "{tag:<4} {}", entry.name)?;
    }
    Ok(())
}

pub fn write_dirinfo(out: &mut impl Write, info: &DirInfo) -> Result<()> {
    writeln!(out, "entries: {}", info.nentries())?;
    writeln!(out, "modtime: {}", info.modtime)?;
    for name in &info.names {
        writeln!(out, "  {name}")?;
    }
    Ok(())
}

pub fn write_fileinfo(out: &mut impl Write, info: &FileInfo) -> Result<()> {
    writeln!(out, "length: {}", info.length)?;
    writeln!(out, "modtime: {}", info.modtime)?;
    Ok(())
}

pub fn write_usage(out: &mut impl Write, usage: &BlockUsage) -> Result<()> {
    writeln!(
        out,
        "dirs: {}  files: {}  data: {}  unused: {}",
        usage.dirs, usage.files, usage.data, usage.unused
    )?;
    Ok(())
}
