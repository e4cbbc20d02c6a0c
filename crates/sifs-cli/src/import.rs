//! Recursive copy of a host directory tree into a volume.
//!
//! Every subdirectory becomes a volume directory and every regular file is written
//! through the deduplicating writer. A failed entry is logged and skipped; the walk
//! goes on with its siblings.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sifs_rs::Volume;
use tracing::{info, warn};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub dirs: usize,
    pub files: usize,
    pub failed: usize,
}

/// Copies the contents of `source` under the volume directory `dest`.
///
/// # Errors
/// Fails only when `source` itself cannot be read; problems with entries below it
/// are counted in [`ImportReport::failed`].
pub fn import_tree(volume: &mut Volume, source: &Path, dest: &str) -> Result<ImportReport> {
    let skip = fs::canonicalize(volume.path()).ok();
    let mut report = ImportReport::default();
    let entries = read_sorted(source)
        .with_context(|| format!("failed to read source directory {}", source.display()))?;
    walk(volume, entries, dest, skip.as_deref(), &mut report);
    info!(
        source = %source.display(),
        dirs = report.dirs,
        files = report.files,
        failed = report.failed,
        "import finished"
    );
    Ok(report)
}

fn walk(
    volume: &mut Volume,
    entries: Vec<PathBuf>,
    dest: &str,
    skip: Option<&Path>,
    report: &mut ImportReport,
) {
    for host in entries {
        if skip.is_some() && fs::canonicalize(&host).ok().as_deref() == skip {
            continue;
        }
        let Some(name) = host.file_name().and_then(|n| n.to_str()) else {
            warn!(path = %host.display(), "skipping entry with a non-utf-8 name");
            report.failed += 1;
            continue;
        };
        let vpath = join(dest, name);

        let meta = match fs::metadata(&host) {
            Ok(meta) => meta,
            Err(err) => {
                warn!(path = %host.display(), error = %err, "cannot stat entry");
                report.failed += 1;
                continue;
            }
        };

        if meta.is_dir() {
            if let Err(err) = volume.mkdir(&vpath) {
                warn!(path = %host.display(), vpath = %vpath, error = %err, "mkdir failed");
                report.failed += 1;
                continue;
            }
            report.dirs += 1;
            info!(path = %host.display(), vpath = %vpath, "imported directory");
            match read_sorted(&host) {
                Ok(children) => walk(volume, children, &vpath, skip, report),
                Err(err) => {
                    warn!(path = %host.display(), error = %err, "cannot read directory");
                    report.failed += 1;
                }
            }
        } else if meta.is_file() {
            let result = fs::read(&host)
                .map_err(anyhow::Error::from)
                .and_then(|data| volume.writefile(&vpath, &data).map_err(anyhow::Error::from));
            match result {
                Ok(()) => {
                    report.files += 1;
                    info!(path = %host.display(), vpath = %vpath, "imported file");
                }
                Err(err) => {
                    warn!(path = %host.display(), vpath = %vpath, error = %err, "writefile failed");
                    report.failed += 1;
                }
            }
        }
    }
}

fn read_sorted(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut paths = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();
    Ok(paths)
}

fn join(dest: &str, name: &str) -> String {
    let dest = dest.trim_end_matches('/');
    if dest.is_empty() {
        name.to_string()
    } else {
        format!("{dest}/{name}")
    }
}
