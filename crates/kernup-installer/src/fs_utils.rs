use std::fs;
use std::io;
use std::path::{Component, Path};

/// Removes `path` if present, reporting whether anything was deleted.
pub fn remove_file_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

/// Final path segment of a listing entry, if it is a plain file name.
pub(crate) fn local_file_name(entry: &str) -> Option<&str> {
    let name = entry.rsplit('/').next()?;
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Some(name),
        _ => None,
    }
}
