use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use sifs_rs::Volume;
use tracing::info;

use crate::cli::{Cli, Command, ReadfileArgs};
use crate::import::import_tree;
use crate::listing::{write_dirinfo, write_fileinfo, write_listing, write_usage};

fn open(volume: &Path) -> Result<Volume> {
    Volume::open(volume).with_context(|| format!("failed to open volume {}", volume.display()))
}

/// Runs one subcommand against the volume named on the command line.
pub fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    let path = cli.volume.as_path();
    match cli.command {
        Command::Mkvolume(args) => {
            Volume::create(path, args.blocksize, args.nblocks)
                .with_context(|| format!("failed to create volume {}", path.display()))?;
        }
        Command::Mkdir { path: dir } => {
            let mut volume = open(path)?;
            volume
                .mkdir(&dir)
                .with_context(|| format!("mkdir {dir}"))?;
            volume.sync()?;
        }
        Command::Rmdir { path: dir } => {
            let mut volume = open(path)?;
            volume
                .rmdir(&dir)
                .with_context(|| format!("rmdir {dir}"))?;
            volume.sync()?;
        }
        Command::Ls { path: dir } => {
            let dir = dir.unwrap_or_default();
            let entries = open(path)?
                .list(&dir)
                .with_context(|| format!("ls {dir}"))?;
            write_listing(out, &entries)?;
        }
        Command::Dirinfo { path: dir } => {
            let dir = dir.unwrap_or_default();
            let info = open(path)?
                .dirinfo(&dir)
                .with_context(|| format!("dirinfo {dir}"))?;
            write_dirinfo(out, &info)?;
        }
        Command::Writefile { source, path: file } => {
            let data = std::fs::read(&source)
                .with_context(|| format!("failed to read {}", source.display()))?;
            let mut volume = open(path)?;
            volume
                .writefile(&file, &data)
                .with_context(|| format!("writefile {file}"))?;
            volume.sync()?;
        }
        Command::Readfile(ReadfileArgs { path: file, out: dest }) => {
            let data = open(path)?
                .readfile(&file)
                .with_context(|| format!("readfile {file}"))?;
            match dest {
                Some(dest) => std::fs::write(&dest, &data)
                    .with_context(|| format!("failed to write {}", dest.display()))?,
                None => out.write_all(&data)?,
            }
        }
        Command::Fileinfo { path: file } => {
            let info = open(path)?
                .fileinfo(&file)
                .with_context(|| format!("fileinfo {file}"))?;
            write_fileinfo(out, &info)?;
        }
        Command::Rmfile { path: file } => {
            let mut volume = open(path)?;
            volume
                .rmfile(&file)
                .with_context(|| format!("rmfile {file}"))?;
            volume.sync()?;
        }
        Command::Defrag => {
            let mut volume = open(path)?;
            let report = volume.defrag().context("defrag")?;
            volume.sync()?;
            writeln!(out, "moved {} block(s)", report.moves)?;
        }
        Command::Usage => {
            let usage = open(path)?.usage().context("usage")?;
            write_usage(out, &usage)?;
        }
        Command::Import(args) => {
            let mut volume = open(path)?;
            let dest = args.dest.unwrap_or_default();
            let report = import_tree(&mut volume, &args.source_dir, &dest)?;
            volume.sync()?;
            info!(failed = report.failed, "import done");
            writeln!(
                out,
                "imported {} director(ies) and {} file(s), {} failed",
                report.dirs, report.files, report.failed
            )?;
        }
    }
    Ok(())
}
