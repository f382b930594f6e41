// SPDX-License-Identifier: MIT

//! The fs-vs-db set difference (spec §4.7), translated from
//! `autodiscovery.py::PipelineScanner.scan`'s two comparison loops.

use gt_db::PipelineScheduling;

use crate::scan::FsPipeline;

/// The outcome of comparing what's on disk against what the pipeline
/// table knows about.
pub struct Diff {
    /// Pipelines found on disk with no matching `(py_name, dir_name)` row.
    pub to_create: Vec<FsPipeline>,
    /// Pipelines in the table with no matching file on disk any more.
    pub to_delete: Vec<PipelineScheduling>,
}

pub fn diff(fs_pipelines: &[FsPipeline], db_pipelines: &[PipelineScheduling]) -> Diff {
    let to_create = fs_pipelines
        .iter()
        .filter(|fs| {
            !db_pipelines
                .iter()
                .any(|db| db.py_name == fs.py_name && db.dir_name == fs.dir_name)
        })
        .cloned()
        .collect();

    let to_delete = db_pipelines
        .iter()
        .filter(|db| {
            !fs_pipelines
                .iter()
                .any(|fs| fs.py_name == db.py_name && fs.dir_name == db.dir_name)
        })
        .cloned()
        .collect();

    Diff { to_create, to_delete }
}

#[cfg(test)]
#[path = "diff_tests.rs"]
mod tests;
