use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sifs_rs::layout::MIN_BLOCKSIZE;

/// DEFAULT_NBLOCKS is the block count of a volume created without `--nblocks`.
pub const DEFAULT_NBLOCKS: u32 = 64;

#[derive(Parser)]
#[command(name = "sifs", author, version, about = "Single-file volume utilities")]
pub struct Cli {
    /// Volume file every subcommand operates on.
    #[arg(long, global = true, env = "SIFS_VOLUME", default_value = "volume")]
    pub volume: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create and format a new volume file.
    Mkvolume(MkvolumeArgs),

    /// Create a directory.
    Mkdir { path: String },

    /// Remove an empty directory.
    Rmdir { path: String },

    /// List a directory, tagging each entry as DIR or FILE.
    Ls { path: Option<String> },

    /// Print a directory's entry names and modification time.
    Dirinfo { path: Option<String> },

    /// Copy a host file into the volume.
    Writefile { source: PathBuf, path: String },

    /// Copy a file out of the volume.
    Readfile(ReadfileArgs),

    /// Print a file's length and modification time.
    Fileinfo { path: String },

    /// Remove one name of a file.
    Rmfile { path: String },

    /// Compact the volume.
    Defrag,

    /// Count blocks per kind.
    Usage,

    /// Copy a host directory tree into the volume.
    Import(ImportArgs),
}

#[derive(Args, Debug, Clone)]
pub struct MkvolumeArgs {
    #[arg(long, default_value_t = MIN_BLOCKSIZE)]
    pub blocksize: u64,

    #[arg(long, default_value_t = DEFAULT_NBLOCKS)]
    pub nblocks: u32,
}

#[derive(Args, Debug, Clone)]
pub struct ReadfileArgs {
    pub path: String,

    /// Write the content here instead of standard output.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    pub source_dir: PathBuf,

    /// Volume directory the tree is copied under; the root by default.
    pub dest: Option<String>,
}
