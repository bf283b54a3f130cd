use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Find files recursively under `path` that match `predicate`, sorted by path.
///
/// A missing `path` yields an empty list; a file `path` is tested itself.
pub fn find_files<P, F>(path: P, predicate: &F) -> io::Result<Vec<PathBuf>>
where
    P: AsRef<Path>,
    F: Fn(&Path) -> bool + ?Sized,
{
    let path = path.as_ref();
    let mut result = Vec::new();

    if !path.exists() {
        return Ok(result);
    }
    if path.is_file() {
        if predicate(path) {
            result.push(path.to_path_buf());
        }
        return Ok(result);
    }

    for entry in fs::read_dir(path)? {
        let entry_path = entry?.path();
        if entry_path.is_dir() {
            result.extend(find_files(&entry_path, predicate)?);
        } else if entry_path.is_file() && predicate(&entry_path) {
            result.push(entry_path);
        }
    }

    result.sort();
    Ok(result)
}

/// Find files with a specific extension (case-insensitive, without the dot).
pub fn find_files_with_extension<P: AsRef<Path>>(path: P, extension: &str) -> io::Result<Vec<PathBuf>> {
    let extension = extension.to_lowercase();
    find_files(path, &move |p: &Path| {
        p.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase() == extension)
            .unwrap_or(false)
    })
}

/// Immediate subdirectories of `path`, sorted by name. Missing `path` is empty.
pub fn subdirectories<P: AsRef<Path>>(path: P) -> io::Result<Vec<PathBuf>> {
    let path = path.as_ref();
    if !path.is_dir() {
        return Ok(Vec::new());
    }
    let mut dirs = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry_path = entry?.path();
        if entry_path.is_dir() {
            dirs.push(entry_path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Write `content` to `path`, creating missing parent directories.
pub fn write_creating_parents<P: AsRef<Path>>(path: P, content: &str) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, content)
}
