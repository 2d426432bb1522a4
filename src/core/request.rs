//! Validated extraction request: corpus root, output root, and target test.
//!
//! All validation happens here, before anything touches the filesystem.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

use crate::cli::ExtractArgs;
use crate::infra::config::LayoutConfig;

/// Validation failure for the three request identifiers.
#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
#[diagnostic(code(jck_extract::request), help("see `jck-extract extract --help`"))]
pub enum RequestError
{
    #[error("Missing: --{0} arg")]
    Missing(&'static str),

    #[error("Wrong jck-dir: {}", .0.display())]
    WrongCorpus(PathBuf),

    #[error("Wrong output-dir: {}", .0.display())]
    WrongOutput(PathBuf),

    #[error("Wrong test name: {0}")]
    WrongTest(String),
}

/// Target-test identifier after anchor/prefix/descriptor normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestName
{
    /// Slash-delimited directory path relative to the corpus `tests` root
    pub dir: String,
    /// Page-like descriptor named by the identifier, relative to `tests`
    pub descriptor: Option<String>,
}

impl TestName
{
    /// Normalize a raw identifier such as
    /// "/tests/api/java_lang/Foo/index.html#Foo0001" into "api/java_lang/Foo".
    pub fn parse(
        raw: &str,
        tests_dir: &str,
        descriptor_ext: &str,
    ) -> Self
    {
        let mut name = raw;

        // Anchor fragment: only when something precedes the last '#'
        if let Some(idx) = name.rfind('#')
            && idx > 0
        {
            name = &name[..idx];
        }

        name = name
            .strip_prefix('/')
            .unwrap_or(name);

        let tests_prefix = format!("{tests_dir}/");
        name = name
            .strip_prefix(tests_prefix.as_str())
            .unwrap_or(name);

        let mut descriptor = None;
        if name.ends_with(&format!(".{descriptor_ext}"))
        {
            descriptor = Some(name.to_string());
            if let Some(idx) = name.rfind('/')
                && idx > 0
            {
                name = &name[..idx];
            }
        }

        Self { dir: name.to_string(), descriptor }
    }

    /// Resolve against the corpus `tests` root.
    pub fn resolve(
        &self,
        tests_root: &Path,
    ) -> PathBuf
    {
        self.dir
            .split('/')
            .filter(|seg| !seg.is_empty())
            .fold(tests_root.to_path_buf(), |acc, seg| acc.join(seg))
    }
}

/// Immutable description of one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractionRequest
{
    /// Absolute corpus root (contains `src` and `tests`)
    pub corpus_root: PathBuf,
    /// Absolute, existing output directory
    pub output_root: PathBuf,
    /// Absolute target test directory
    pub test_dir: PathBuf,
    /// Identifier exactly as given on the command line
    pub test_arg: String,
    /// Descriptor named by the identifier that does not exist on disk
    pub missing_descriptor: Option<PathBuf>,
}

impl ExtractionRequest
{
    /// Validate the command-line identifiers into a request.
    pub fn from_args(
        args: &ExtractArgs,
        layout: &LayoutConfig,
    ) -> Result<Self, RequestError>
    {
        let corpus = args
            .jck_dir
            .as_deref()
            .ok_or(RequestError::Missing("jck-dir"))?;
        let output = args
            .output_dir
            .as_deref()
            .ok_or(RequestError::Missing("output-dir"))?;
        let test = args
            .test
            .as_deref()
            .ok_or(RequestError::Missing("test"))?;

        Self::new(corpus, output, test, layout)
    }

    pub fn new(
        corpus: &Path,
        output: &Path,
        test: &str,
        layout: &LayoutConfig,
    ) -> Result<Self, RequestError>
    {
        if !corpus.is_dir()
            || !corpus
                .join(&layout.src_dir)
                .is_dir()
            || !corpus
                .join(&layout.tests_dir)
                .is_dir()
        {
            return Err(RequestError::WrongCorpus(corpus.to_path_buf()));
        }
        let corpus_root =
            dunce::canonicalize(corpus).map_err(|_| RequestError::WrongCorpus(corpus.to_path_buf()))?;

        if !output.is_dir()
        {
            return Err(RequestError::WrongOutput(output.to_path_buf()));
        }
        let output_root =
            dunce::canonicalize(output).map_err(|_| RequestError::WrongOutput(output.to_path_buf()))?;

        let tests_root = corpus_root.join(&layout.tests_dir);
        let name = TestName::parse(test, &layout.tests_dir, &layout.descriptor_ext);

        let missing_descriptor = name
            .descriptor
            .as_ref()
            .map(|d| {
                TestName { dir: d.clone(), descriptor: None }.resolve(&tests_root)
            })
            .filter(|p| !p.exists());

        let test_dir = name.resolve(&tests_root);
        if !test_dir.is_dir()
        {
            return Err(RequestError::WrongTest(test.to_string()));
        }

        Ok(Self {
            corpus_root,
            output_root,
            test_dir,
            test_arg: test.to_string(),
            missing_descriptor,
        })
    }

    pub fn src_root(
        &self,
        layout: &LayoutConfig,
    ) -> PathBuf
    {
        self.corpus_root
            .join(&layout.src_dir)
    }

    pub fn tests_root(
        &self,
        layout: &LayoutConfig,
    ) -> PathBuf
    {
        self.corpus_root
            .join(&layout.tests_dir)
    }
}
