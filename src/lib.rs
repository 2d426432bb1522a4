//! **jck-extract** - Pull one test and the exact closure of its source dependencies out of a JCK-style corpus
//!
//! The real compiler acts as the dependency oracle: every source file it reads while resolving
//! the test's units is part of the closure. Sources stored outside package-matching directories
//! are bridged into canonical trees first, so the compiler can find them.

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// Core pipeline - request validation, tree normalization, oracle discovery, assembly
pub mod core {
    /// Validated extraction request and target-test identifier normalization
    pub mod request;
    pub use request::{ExtractionRequest, RequestError, TestName};

    /// One extraction run end to end
    pub mod extract;
    pub use extract::{ExtractSummary, extract_with, run as extract_run};

    /// Symbolic bridges at canonical package locations
    pub mod normalize;
    pub use normalize::{PackageDeclaration, SourceTreeNormalizer};

    /// Compiler-as-oracle dependency discovery (javac subprocess + verbose trace)
    pub mod oracle;
    pub use oracle::{DependencyOracle, JavacOracle, SourceRoots};

    /// Source roots, per-file oracle calls and script stubs
    pub mod closure;
    pub use closure::{Closure, ClosureBuilder};

    /// Launcher-script class candidates and stub units
    pub mod script;

    /// Relative links in page-like test descriptors
    pub mod descriptor;

    /// Dependency set and bridge resolution
    pub mod resolve;
    pub use resolve::DependencySet;

    /// Copy to the output root (closure and native tree)
    pub mod assemble;

    /// Makefile and tryRun.sh next to the extracted test
    pub mod package;
}

/// Infrastructure - Configuration, directory walking, line scanning
pub mod infra {
    /// Configuration management with TOML support and env overrides
    pub mod config;
    pub use config::{Config, init as config_init, load_config};

    /// Corpus directory walking (no gitignore filtering, links not followed)
    pub mod walk;
    pub use walk::CorpusWalker;

    /// Regex line scanning over files with grep-searcher
    pub mod scan;
    pub use scan::LineScanner;
}

// Strategic re-exports for clean CLI interface
pub use cli::{AppContext, Cli, Commands};
pub use core::extract_run;
pub use infra::{Config, CorpusWalker, load_config};

// Core types for external consumers
pub use core::{DependencyOracle, DependencySet, ExtractionRequest, RequestError, SourceRoots};
