//! Smoke tests for the quillc binary.

use assert_cmd::Command;
use std::io::Write;

fn quillc() -> Command {
    Command::cargo_bin("quillc").expect("quillc binary")
}

fn source_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write source");
    file
}

#[test]
fn checks_a_clean_program() {
    let file = source_file("var x: int = 42\n");
    quillc()
        .arg("--quiet")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicates::str::contains("ident[x]"))
        .stdout(predicates::str::contains("(var_def x"))
        .stdout(predicates::str::contains("ptr(i32)"));
}

#[test]
fn reads_stdin() {
    quillc()
        .arg("--quiet")
        .arg("-")
        .write_stdin("true or false\n")
        .assert()
        .success()
        .stdout(predicates::str::contains("(bin_op or (true : bool) (false : bool) : bool)"));
}

#[test]
fn reports_type_errors_and_fails() {
    let file = source_file("var x: bool = 42\n");
    quillc()
        .arg("--quiet")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicates::str::contains("can't assign"));
}

#[test]
fn reports_lex_errors_and_fails() {
    let file = source_file("\tbad\n");
    quillc()
        .arg("--quiet")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicates::str::contains("tabs are not allowed"));
}

#[test]
fn reports_parse_errors_and_fails() {
    let file = source_file("|\n");
    quillc().arg("--quiet").arg(file.path()).assert().failure();
}

#[test]
fn missing_input_shows_usage() {
    quillc()
        .assert()
        .code(2)
        .stderr(predicates::str::contains("usage: quillc"));
}

#[test]
fn quiet_suppresses_the_banner() {
    let file = source_file("42\n");
    let output = quillc().arg("--quiet").arg(file.path()).output().expect("run");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with('['), "banner leaked into quiet output: {stdout:?}");
}
