// SPDX-License-Identifier: MIT

//! Filesystem side of the scan (spec §4.7), translated from
//! `gluetube/autodiscovery.py::PipelineScanner._all_dirs`/`_all_py_files`.

use std::path::Path;

use crate::error::AutodiscoveryError;

/// One pipeline script found on disk: its filename, the subdirectory it
/// lives in, and the file's modification time as a Unix timestamp (the
/// same shape `db.py`'s `py_timestamp` column stores).
#[derive(Debug, Clone, PartialEq)]
pub struct FsPipeline {
    pub py_name: String,
    pub dir_name: String,
    pub py_timestamp: f64,
}

/// Enumerate every `*.py` file directly inside a pipeline subdirectory,
/// skipping hidden directories, `__*` directories, and a literal `None`
/// directory (spec §4.7).
pub fn scan(pipeline_dir: &Path) -> Result<Vec<FsPipeline>, AutodiscoveryError> {
    let mut found = Vec::new();

    for dir_entry in read_dir(pipeline_dir)? {
        if !dir_entry.file_type().map_err(|source| io_err(pipeline_dir, source))?.is_dir() {
            continue;
        }
        let dir_name = dir_entry.file_name().to_string_lossy().into_owned();
        if is_excluded_dir(&dir_name) {
            continue;
        }
        let dir_path = dir_entry.path();

        for file_entry in read_dir(&dir_path)? {
            if !file_entry.file_type().map_err(|source| io_err(&dir_path, source))?.is_file() {
                continue;
            }
            let py_name = file_entry.file_name().to_string_lossy().into_owned();
            if !py_name.ends_with(".py") {
                continue;
            }
            let metadata = file_entry.metadata().map_err(|source| io_err(&dir_path, source))?;
            let modified = metadata.modified().map_err(|source| io_err(&dir_path, source))?;
            let py_timestamp = modified
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs_f64())
                .unwrap_or(0.0);

            found.push(FsPipeline { py_name, dir_name: dir_name.clone(), py_timestamp });
        }
    }

    Ok(found)
}

fn is_excluded_dir(name: &str) -> bool {
    name == "None" || name.starts_with('.') || name.starts_with("__")
}

fn read_dir(dir: &Path) -> Result<Vec<std::fs::DirEntry>, AutodiscoveryError> {
    std::fs::read_dir(dir)
        .map_err(|source| io_err(dir, source))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| io_err(dir, source))
}

fn io_err(dir: &Path, source: std::io::Error) -> AutodiscoveryError {
    AutodiscoveryError::Io { dir: dir.to_path_buf(), source }
}

#[cfg(test)]
#[path = "scan_tests.rs"]
mod tests;
