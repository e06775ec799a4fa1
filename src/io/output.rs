//! Run-folder layout: `<output_dir>/<config name>/run<N>/`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Parse the number of a `run<N>` folder name.
fn run_index(name: &str) -> Option<usize> {
    name.strip_prefix("run")?.parse().ok()
}

/// Next free run number in `folder` (0 when it does not exist yet).
pub fn next_run_number(folder: &Path) -> io::Result<usize> {
    if !folder.exists() {
        return Ok(0);
    }
    let mut next = 0;
    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if let Some(n) = entry.file_name().to_str().and_then(run_index) {
            next = next.max(n + 1);
        }
    }
    Ok(next)
}

/// Whether `folder` is empty or already holds run folders.
fn is_result_folder(folder: &Path) -> io::Result<bool> {
    let mut empty = true;
    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        empty = false;
        let is_run = entry.file_type()?.is_dir()
            && entry.file_name().to_str().and_then(run_index).is_some();
        if is_run {
            return Ok(true);
        }
    }
    Ok(empty)
}

/// Create the next run folder for config `name` below `output_dir`.
///
/// Refuses to write into an existing `<output_dir>/<name>` that holds
/// anything other than run folders.
pub fn create_run_folder(output_dir: &Path, name: &str) -> io::Result<(usize, PathBuf)> {
    let result_folder = output_dir.join(name);
    if result_folder.exists() && !is_result_folder(&result_folder)? {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!(
                "cannot use output folder {}: a non-result folder with this name exists",
                result_folder.display()
            ),
        ));
    }
    let run = next_run_number(&result_folder)?;
    let run_folder = result_folder.join(format!("run{run}"));
    fs::create_dir_all(&run_folder)?;
    Ok((run, run_folder))
}
