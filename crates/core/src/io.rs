//! File-system helpers shared by the extractor and the generator.

use std::{
    fs::{self, create_dir_all},
    io,
    path::{Path, PathBuf},
};

use crate::error::Error;

pub fn read_file(path: &Path) -> Result<Vec<u8>, Error> {
    fs::read(path).map_err(|source| Error::Read { path: path.to_path_buf(), source })
}

/// Create `dir` and any missing parents.
pub fn ensure_dir(dir: &Path) -> Result<(), Error> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    create_dir_all(dir).map_err(|source| Error::CreateDir { path: dir.to_path_buf(), source })
}

/// Write `data` to a temporary sibling of `path` and rename it into place.
///
/// Readers never observe a half-written file. On failure the temporary file
/// is removed and `path` is left as it was.
pub fn write_atomically(path: &Path, data: &[u8]) -> io::Result<()> {
    let tmp = temporary_sibling(path);
    let result = fs::write(&tmp, data).and_then(|()| fs::rename(&tmp, path));
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn temporary_sibling(path: &Path) -> PathBuf {
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    path.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
}
