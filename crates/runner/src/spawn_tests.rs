use super::*;

#[tokio::test]
async fn successful_program_captures_stdout() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = run_pipeline(
        Path::new("/bin/sh"),
        dir.path(),
        "echo hello",
        RunId::new(1),
        Path::new("/tmp/gluetube.sock"),
    )
    .await
    .expect("spawn succeeds");

    assert!(output.status.success());
    assert_eq!(captured_output(&output).trim(), "hello");
}

#[tokio::test]
async fn nonzero_exit_is_reported_without_erroring_the_spawn() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = run_pipeline(
        Path::new("/bin/sh"),
        dir.path(),
        "echo boom >&2; exit 7",
        RunId::new(1),
        Path::new("/tmp/gluetube.sock"),
    )
    .await
    .expect("spawn succeeds even on a failing program");

    assert_eq!(output.status.code(), Some(7));
    assert!(captured_output(&output).contains("boom"));
}

#[tokio::test]
async fn run_id_and_socket_file_are_exported_to_the_environment() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = run_pipeline(
        Path::new("/bin/sh"),
        dir.path(),
        "echo $PIPELINE_RUN_ID $SOCKET_FILE",
        RunId::new(42),
        Path::new("/tmp/gluetube.sock"),
    )
    .await
    .expect("spawn succeeds");

    assert_eq!(captured_output(&output).trim(), "42 /tmp/gluetube.sock");
}
