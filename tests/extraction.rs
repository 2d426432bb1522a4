// End-to-end extraction against the fake corpus with the real compiler.
// Each case mirrors one shape of dependency; every case returns early
// when no javac is installed so the suite stays green on bare machines.
use assert_cmd::prelude::*;
use std::fs;
use std::process::Command;

use predicates::prelude::*;

mod util;
use util::*;

// Run the binary with the three identifiers, from an empty working
// directory so no config file is picked up.
fn extract(corpus: &FakeCorpus, test: &str) -> Command {
    let mut cmd = Command::cargo_bin("jck-extract").expect("bin");
    cmd.current_dir(corpus.root())
        .env_remove("RUST_LOG")
        .arg("--quiet")
        .arg("extract")
        .arg("--jck-dir")
        .arg(corpus.corpus())
        .arg("--output-dir")
        .arg(corpus.output())
        .arg("--test")
        .arg(test);
    cmd
}

// Extract `test` and compare the asserted files present in the output.
fn check(test: &str, expected: &[&str]) {
    if !javac_available() {
        eprintln!("javac not found, skipping {test}");
        return;
    }

    let corpus = FakeCorpus::new();
    extract(&corpus, test).assert().success();

    let mut expected = expected.to_vec();
    expected.sort_by_key(|rel| ALL.iter().position(|a| a == rel));
    assert_eq!(corpus.extracted_set(), expected, "extracted files for {test}");

    // Packaging files always accompany a real run
    assert!(corpus.output().join("Makefile").is_file());
    assert!(corpus.output().join("tryRun.sh").is_file());
}

#[test]
fn test_simple() {
    check("api/api_pkg/test1", &[TEST_SIMPLE]);
}

#[test]
fn test_parent() {
    check("api/api_pkg/test2parent/test2", &[TEST2_PARENT, TEST_PARENT]);
}

#[test]
fn test_direct_lib() {
    check("api/api_pkg/testDirecLib", &[DIRECT_A, TEST_DIRECT_LIB]);
}

#[test]
fn test_jck_lib() {
    check("api/api_pkg/testJckLib", &[JCK_A, TEST_JCK_LIB]);
}

#[test]
fn test_test_lib() {
    check("api/api_pkg/testTestLib", &[TESTS_A, TEST_TEST_LIB]);
}

#[test]
fn test_ksh_dep() {
    check("api/api_pkg/testKshDep", &[DIRECT_A, JCK_A, TEST_KSH]);
}

// Native sources pull in the whole shared native tree, outside discovery.
#[test]
fn test_native_tree() {
    check("api/api_pkg/testNative", &[TEST_NATIVE, TEST_NATIVE_C, SHARE_HEADER]);
}

#[test]
fn test_html() {
    check("api/api_pkg/htmlTestParent/testHtml", &[TEST_HTML, LINKED_BY_HTML]);
}

// Identifier decorations normalize to the same target directory.
#[test]
fn test_decorated_identifier() {
    check("/tests/api/api_pkg/testDirecLib/index.html#TestDirectLib0001", &[DIRECT_A, TEST_DIRECT_LIB]);
}

// Two runs over the same corpus produce the same file list.
#[test]
fn test_deterministic_listing() {
    if !javac_available() {
        return;
    }

    let corpus = FakeCorpus::new();
    let listing = |corpus: &FakeCorpus| {
        let out = Command::cargo_bin("jck-extract")
            .expect("bin")
            .current_dir(corpus.root())
            .arg("--dry-run")
            .arg("extract")
            .arg("--jck-dir")
            .arg(corpus.corpus())
            .arg("--output-dir")
            .arg(corpus.output())
            .arg("--test")
            .arg("api/api_pkg/testKshDep")
            .output()
            .expect("run");
        assert!(out.status.success());
        String::from_utf8_lossy(&out.stdout).into_owned()
    };

    let first = listing(&corpus);
    let second = listing(&corpus);
    assert_eq!(first, second);
    assert!(first.contains("DirectA.java"));

    // Dry run writes nothing
    assert_eq!(fs::read_dir(corpus.output()).expect("output").count(), 0);
}

// The rendered script carries the raw identifier.
#[test]
fn test_try_run_rendered() {
    if !javac_available() {
        return;
    }

    let corpus = FakeCorpus::new();
    extract(&corpus, "api/api_pkg/test1#Frag")
        .env_remove("JAVA_TOOL_OPTIONS")
        .env_remove("BUILD_ID")
        .assert()
        .success();

    let script = fs::read_to_string(corpus.output().join("tryRun.sh")).expect("tryRun.sh");
    assert!(predicate::str::contains("api/api_pkg/test1#Frag").eval(&script));
    assert!(predicate::str::contains("missing-BUILD_ID").eval(&script));
    assert!(predicate::str::contains("# no JAVA_TOOL_OPTIONS found").eval(&script));
}
