mod cli;
mod commands;
mod import;
mod listing;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::cli::Cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::run(cli, &mut out)
}

#[cfg(test)]
pub(crate) mod test_utils {
    use std::fs;

    use sifs_rs::Volume;
    use sifs_rs::layout::MIN_BLOCKSIZE;
    use tempfile::TempDir;

    /// `fresh_volume` formats an empty volume inside its own scratch directory.
    pub fn fresh_volume(nblocks: u32) -> (TempDir, Volume) {
        let dir = TempDir::new().expect("tmp dir");
        let volume =
            Volume::create(&dir.path().join("volume"), MIN_BLOCKSIZE, nblocks).expect("create");
        (dir, volume)
    }

    /// `seed_tree` builds `a.txt`, `docs/b.txt` and `docs/deep/c.txt` on the host.
    pub fn seed_tree() -> TempDir {
        let dir = TempDir::new().expect("tmp dir");
        let deep = dir.path().join("docs").join("deep");
        fs::create_dir_all(&deep).expect("create dirs");
        fs::write(dir.path().join("a.txt"), b"alpha").expect("write a");
        fs::write(dir.path().join("docs").join("b.txt"), b"beta").expect("write b");
        fs::write(deep.join("c.txt"), b"gamma").expect("write c");
        dir
    }
}
