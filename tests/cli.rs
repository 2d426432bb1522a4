// Validation failures: usage on stderr, nonzero exit, nothing written.
use assert_cmd::prelude::*;
use std::fs;
use std::process::Command;

use predicates::prelude::*;

mod util;
use util::FakeCorpus;

fn bin(corpus: &FakeCorpus) -> Command {
    let mut cmd = Command::cargo_bin("jck-extract").expect("bin");
    cmd.current_dir(corpus.root()).env_remove("RUST_LOG");
    cmd
}

fn assert_output_untouched(corpus: &FakeCorpus) {
    assert_eq!(fs::read_dir(corpus.output()).expect("output").count(), 0);
}

#[test]
fn test_missing_test_arg() {
    let corpus = FakeCorpus::new();
    bin(&corpus)
        .arg("extract")
        .arg("--jck-dir")
        .arg(corpus.corpus())
        .arg("--output-dir")
        .arg(corpus.output())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Missing: --test arg"))
        .stderr(predicate::str::contains("jck-extract extract --help"))
        .stderr(predicate::str::contains("--jck-dir [DIR]"));
    assert_output_untouched(&corpus);
}

#[test]
fn test_wrong_corpus() {
    let corpus = FakeCorpus::new();
    bin(&corpus)
        .arg("extract")
        .arg("--jck-dir")
        .arg(corpus.corpus().join("src"))
        .arg("--output-dir")
        .arg(corpus.output())
        .arg("--test")
        .arg("api/api_pkg/test1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Wrong jck-dir"))
        .stderr(predicate::str::contains("Args:"));
    assert_output_untouched(&corpus);
}

#[test]
fn test_missing_output_dir() {
    let corpus = FakeCorpus::new();
    bin(&corpus)
        .arg("extract")
        .arg("--jck-dir")
        .arg(corpus.corpus())
        .arg("--output-dir")
        .arg(corpus.root().join("nope"))
        .arg("--test")
        .arg("api/api_pkg/test1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Wrong output-dir"));
    assert!(!corpus.root().join("nope").exists());
}

#[test]
fn test_unknown_test() {
    let corpus = FakeCorpus::new();
    bin(&corpus)
        .arg("extract")
        .arg("--jck-dir")
        .arg(corpus.corpus())
        .arg("--output-dir")
        .arg(corpus.output())
        .arg("--test")
        .arg("api/api_pkg/doesNotExist")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Wrong test name: api/api_pkg/doesNotExist"));
    assert_output_untouched(&corpus);
}

#[test]
fn test_missing_javac_fails_before_writing() {
    let corpus = FakeCorpus::new();
    bin(&corpus)
        .arg("extract")
        .arg("--jck-dir")
        .arg(corpus.corpus())
        .arg("--output-dir")
        .arg(corpus.output())
        .arg("--test")
        .arg("api/api_pkg/test1")
        .arg("--javac")
        .arg(corpus.root().join("no-such-javac"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("javac executable not found"));
    assert_output_untouched(&corpus);
}

#[test]
fn test_completions_to_stdout() {
    let corpus = FakeCorpus::new();
    bin(&corpus)
        .arg("completions")
        .arg("bash")
        .arg("--stdout")
        .assert()
        .success()
        .stdout(predicate::str::contains("jck-extract"));
}

#[test]
fn test_init_writes_config() {
    let corpus = FakeCorpus::new();
    bin(&corpus).arg("init").arg("--quiet").assert().success();

    let written = fs::read_to_string(corpus.root().join("jck-extract.toml")).expect("config");
    assert!(written.contains("[layout]"));
    assert!(written.contains("module_prefix = \"jck.\""));
}
