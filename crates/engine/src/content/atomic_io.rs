use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Writes `text` next to `path` first, then swaps it into place.
pub(crate) fn write_text_atomic(path: &Path, text: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let staging_path = staging_path_for(path);
    fs::write(&staging_path, text.as_bytes())?;
    swap_into_place(&staging_path, path)
}

fn swap_into_place(staging_path: &Path, final_path: &Path) -> io::Result<()> {
    match fs::remove_file(final_path) {
        Ok(_) => {}
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(error) => {
            let _ = fs::remove_file(staging_path);
            return Err(error);
        }
    }

    if let Err(error) = fs::rename(staging_path, final_path) {
        let _ = fs::remove_file(staging_path);
        return Err(error);
    }
    Ok(())
}

fn staging_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("save.json");
    let staging_name = format!("{file_name}.tmp");
    match path.parent() {
        Some(parent) => parent.join(staging_name),
        None => PathBuf::from(staging_name),
    }
}
