//! Shared test utilities for integration tests
//!
//! Builds a small fake corpus with every shape of dependency the
//! extractor has to find: package-mismatched tests, parent-directory
//! package-mates, library roots, `src/tests`, scripts, descriptors and
//! native sources.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

use assert_fs::prelude::*;

/// Fake corpus plus an empty output directory.
pub struct FakeCorpus
{
    pub tmp: assert_fs::TempDir,
}

/// Library and test files the cases assert on, relative to the corpus.
pub const DIRECT_A: &str = "src/direct/pkg/DirectA.java";
pub const JCK_A: &str = "src/jck.something/jck/pkg/JckA.java";
pub const TESTS_A: &str = "src/tests/api/api_pkg/testslib/TestsA.java";
pub const TEST_SIMPLE: &str = "tests/api/api_pkg/test1/Test1.java";
pub const TEST2_PARENT: &str = "tests/api/api_pkg/test2parent/Test2Parent.java";
pub const TEST_PARENT: &str = "tests/api/api_pkg/test2parent/test2/Test2.java";
pub const TEST_DIRECT_LIB: &str = "tests/api/api_pkg/testDirecLib/TestDirectLib.java";
pub const TEST_JCK_LIB: &str = "tests/api/api_pkg/testJckLib/TestJckLib.java";
pub const TEST_TEST_LIB: &str = "tests/api/api_pkg/testTestLib/TestTestLib.java";
pub const TEST_KSH: &str = "tests/api/api_pkg/testKshDep/testKshDep.ksh";
pub const TEST_HTML: &str = "tests/api/api_pkg/htmlTestParent/testHtml/test.html";
pub const LINKED_BY_HTML: &str = "tests/api/api_pkg/htmlTestParent/linked.txt";
pub const TEST_NATIVE: &str = "tests/api/api_pkg/testNative/TestNative.java";
pub const TEST_NATIVE_C: &str = "tests/api/api_pkg/testNative/libnative.c";
pub const SHARE_HEADER: &str = "src/share/lib/jckjni.h";

/// Every asserted file, for "nothing else leaked" checks.
pub const ALL: [&str; 15] = [
    DIRECT_A,
    JCK_A,
    TESTS_A,
    TEST_SIMPLE,
    TEST2_PARENT,
    TEST_PARENT,
    TEST_DIRECT_LIB,
    TEST_JCK_LIB,
    TEST_TEST_LIB,
    TEST_KSH,
    TEST_HTML,
    LINKED_BY_HTML,
    TEST_NATIVE,
    TEST_NATIVE_C,
    SHARE_HEADER,
];

impl FakeCorpus
{
    pub fn new() -> Self
    {
        // Initialize the temporary root holding corpus and output
        let tmp = assert_fs::TempDir::new().expect("tempdir");

        let write = |rel: &str, body: &str| {
            tmp.child("fake-jck")
                .child(rel)
                .write_str(body)
                .expect("write fixture");
        };

        tmp.child("output")
            .create_dir_all()
            .expect("output dir");

        // Library sources in package directories, in a module root and in src/tests
        write(DIRECT_A, "package direct.pkg;\n\npublic class DirectA {\n}\n");
        write(JCK_A, "package jck.pkg;\n\npublic class JckA {\n}\n");
        write(TESTS_A, "package testspkg.api.pkg.testslib;\n\npublic class TestsA {\n}\n");

        // Tests whose directories do not match their packages
        write(TEST_SIMPLE, "package testspkg.api.pkg.test1pkg;\n\npublic abstract class Test1 {\n}\n");
        write(
            TEST2_PARENT,
            "package testspkg.api.pkg.test2parentpkg;\n\npublic abstract class Test2Parent {\n}\n",
        );
        write(
            TEST_PARENT,
            "package testspkg.api.pkg.test2parentpkg.test2pkg;\n\n\
             import testspkg.api.pkg.test2parentpkg.Test2Parent;\n\n\
             public class Test2 extends Test2Parent {\n}\n",
        );
        write(
            TEST_DIRECT_LIB,
            "package testspkg.api.pkg.testDirecLib;\n\n\
             import direct.pkg.DirectA;\n\n\
             public class TestDirectLib {\n    DirectA directA;\n}\n",
        );
        write(
            TEST_JCK_LIB,
            "package testspkg.api.pkg.testJckLib;\n\n\
             import jck.pkg.JckA;\n\n\
             public class TestJckLib {\n    JckA jckA;\n}\n",
        );
        write(
            TEST_TEST_LIB,
            "package testspkg.api.pkg.testTestLib;\n\n\
             import testspkg.api.pkg.testslib.TestsA;\n\n\
             public class TestTestLib {\n    TestsA testsA;\n}\n",
        );

        // Script naming its classes only on the launcher line, one of which
        // exists nowhere in the corpus
        write(
            TEST_KSH,
            "#!/bin/ksh\n bin/java -somearg=direct.pkg.DirectA -arg2 jck.pkg.JckA no.such.Klass \n",
        );

        // Native test and the shared native tree it builds against
        write(TEST_NATIVE, "package testspkg.api.pkg.testNative;\n\npublic class TestNative {\n}\n");
        write(TEST_NATIVE_C, "#include \"jckjni.h\"\n\nint native_answer(void) { return JCK_ANSWER; }\n");
        write(SHARE_HEADER, "#define JCK_ANSWER 42\n");

        // Page linking a resource in its parent directory
        write(LINKED_BY_HTML, "hi!\n");
        write(
            TEST_HTML,
            "<!DOCTYPE HTML>\n<html>\n<head>\n</head>\n<body>\n\
             <a href=\"../linked.txt\">../linked.txt</a>\n</body>\n</html>\n",
        );

        Self { tmp }
    }

    pub fn root(&self) -> &Path
    {
        self.tmp
            .path()
    }

    pub fn corpus(&self) -> PathBuf
    {
        self.root()
            .join("fake-jck")
    }

    pub fn output(&self) -> PathBuf
    {
        self.root()
            .join("output")
    }

    /// Where a corpus-relative file lands after extraction.
    pub fn extracted(
        &self,
        rel: &str,
    ) -> PathBuf
    {
        self.output()
            .join(rel)
    }

    /// Corpus-relative files from `ALL` present in the output.
    pub fn extracted_set(&self) -> Vec<&'static str>
    {
        ALL.iter()
            .copied()
            .filter(|rel| {
                self.extracted(rel)
                    .exists()
            })
            .collect()
    }
}

/// Whether a usable javac is on PATH or under JAVA_HOME.
pub fn javac_available() -> bool
{
    let javac = std::env::var_os("JAVA_HOME")
        .map(|home| PathBuf::from(home).join("bin/javac"))
        .filter(|p| p.is_file())
        .unwrap_or_else(|| PathBuf::from("javac"));

    Command::new(javac)
        .arg("-version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
