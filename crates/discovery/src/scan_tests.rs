use super::*;

fn write_py(dir: &std::path::Path, sub: &str, file: &str) {
    let sub_dir = dir.join(sub);
    std::fs::create_dir_all(&sub_dir).expect("create subdir");
    std::fs::write(sub_dir.join(file), "pass").expect("write file");
}

#[test]
fn scan_finds_py_files_in_ordinary_subdirectories() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_py(dir.path(), "alpha", "p.py");
    write_py(dir.path(), "beta", "q.py");

    let mut found = scan(dir.path()).expect("scan succeeds");
    found.sort_by(|a, b| a.dir_name.cmp(&b.dir_name));

    assert_eq!(found.len(), 2);
    assert_eq!(found[0].dir_name, "alpha");
    assert_eq!(found[0].py_name, "p.py");
    assert_eq!(found[1].dir_name, "beta");
    assert_eq!(found[1].py_name, "q.py");
}

#[test]
fn scan_ignores_non_py_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_py(dir.path(), "alpha", "p.py");
    std::fs::write(dir.path().join("alpha").join("readme.md"), "docs").expect("write readme");

    let found = scan(dir.path()).expect("scan succeeds");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].py_name, "p.py");
}

#[test]
fn scan_skips_hidden_dunder_and_none_directories() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_py(dir.path(), "alpha", "p.py");
    write_py(dir.path(), ".hidden", "skip.py");
    write_py(dir.path(), "__pycache__", "skip.py");
    write_py(dir.path(), "None", "skip.py");

    let found = scan(dir.path()).expect("scan succeeds");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].dir_name, "alpha");
}

#[test]
fn scan_of_an_empty_pipeline_dir_returns_no_pipelines() {
    let dir = tempfile::tempdir().expect("tempdir");
    let found = scan(dir.path()).expect("scan succeeds");
    assert!(found.is_empty());
}
