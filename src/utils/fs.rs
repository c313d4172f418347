use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

/// Write to a temp file next to `path`, then rename over it, so a concurrent
/// reader never sees a half-written file.
pub fn write_atomic(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(content)?;
    file.persist(path).map_err(|e| e.error)?;

    Ok(())
}

/// An exclusive advisory lock on `<file>.lock`, released when dropped.
pub struct FileLock {
    _file: File,
}

/// Block until no other process (or instance) holds the lock for `path`.
/// Every read-modify-write of a shared data file goes through this.
pub fn lock_exclusive(path: &Path) -> std::io::Result<FileLock> {
    let lock_path = sidecar(path);
    if let Some(dir) = lock_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)?;
    file.lock_exclusive()?;

    Ok(FileLock { _file: file })
}

fn sidecar(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}
