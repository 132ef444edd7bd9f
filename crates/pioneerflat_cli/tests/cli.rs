use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn write_bytes(path: &Path, n_bytes: usize) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent");
    }
    std::fs::write(path, vec![b'x'; n_bytes]).expect("write bytes");
}

fn run_cli(pioneer: &Path, output: &Path) -> Output {
    run_cli_with_log(pioneer, output, None)
}

fn run_cli_with_log(pioneer: &Path, output: &Path, rust_log: Option<&str>) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_pioneerflat"));
    command.arg(pioneer).arg(output);
    match rust_log {
        Some(value) => command.env("RUST_LOG", value),
        None => command.env_remove("RUST_LOG"),
    };
    command.output().expect("spawn pioneerflat")
}

fn setup() -> (TempDir, PathBuf, PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let src = tmp.path().join("usb").join("Contents");
    let dst = tmp.path().join("flat");
    std::fs::create_dir_all(&src).expect("mkdir src");
    (tmp, src, dst)
}

#[test]
fn cli_flattens_and_reports_each_copy() {
    let (_tmp, src, dst) = setup();
    write_bytes(&src.join("a/1.txt"), 10);
    write_bytes(&src.join("b/1.txt"), 10);

    let output = run_cli(&src, &dst);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&format!("Output folder '{}' created.", dst.display())));
    assert!(stdout.contains(&format!(
        "Copied {} to {}",
        src.join("a/1.txt").display(),
        dst.join("1.txt").display()
    )));
    assert!(stdout.contains(&format!(
        "Copied {} to {}",
        src.join("b/1.txt").display(),
        dst.join("1_2.txt").display()
    )));
    assert_eq!(std::fs::metadata(dst.join("1_2.txt")).expect("copy").len(), 10);
}

#[test]
fn cli_existing_destination_is_not_announced() {
    let (_tmp, src, dst) = setup();
    write_bytes(&src.join("a.mp3"), 1);
    std::fs::create_dir_all(&dst).expect("mkdir dst");

    let output = run_cli(&src, &dst);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("created."));
}

#[test]
fn cli_wrong_folder_name_exits_one() {
    let tmp = TempDir::new().expect("tempdir");
    let src = tmp.path().join("Music");
    let dst = tmp.path().join("flat");
    write_bytes(&src.join("a.mp3"), 1);

    let output = run_cli(&src, &dst);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Error: The last folder in the path"));
    assert!(!dst.exists());
}

#[test]
fn cli_missing_source_exits_one() {
    let tmp = TempDir::new().expect("tempdir");
    let src = tmp.path().join("Contents");
    let dst = tmp.path().join("flat");

    let output = run_cli(&src, &dst);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim_end(),
        format!("Error: Pioneer folder {} does not exist", src.display())
    );
}

#[test]
fn cli_missing_argument_is_usage_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_pioneerflat"))
        .arg("Contents")
        .output()
        .expect("spawn pioneerflat");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn cli_progress_lines_survive_quiet_log_filter() {
    for rust_log in ["warn", "error", "off"] {
        let (_tmp, src, dst) = setup();
        write_bytes(&src.join("a/1.txt"), 3);

        let output = run_cli_with_log(&src, &dst, Some(rust_log));
        assert!(output.status.success());

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(
            stdout.contains(&format!("Output folder '{}' created.", dst.display())),
            "RUST_LOG={rust_log}: {stdout}"
        );
        assert!(
            stdout.contains(&format!(
                "Copied {} to {}",
                src.join("a/1.txt").display(),
                dst.join("1.txt").display()
            )),
            "RUST_LOG={rust_log}: {stdout}"
        );
    }
}
