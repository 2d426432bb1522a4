use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,   // global --quiet
    pub dry_run: bool, // global --dry-run
}

#[derive(Parser)]
#[command(name = "jck-extract")]
#[command(
    about = "Extract a single test plus the exact closure of its source dependencies from a JCK-style corpus"
)]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Suppress progress bars and non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Resolve and print the dependency closure without writing output
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract one test and its dependency closure into an output directory
    Extract(ExtractArgs),

    /// Initialize a jck-extract.toml config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
pub struct ExtractArgs {
    /// Directory with the unpacked corpus (must contain src/ and tests/)
    #[arg(long, value_name = "DIR")]
    pub jck_dir: Option<PathBuf>,

    /// Existing directory where the extracted test is placed
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Name of the test to extract (e.g. api/java_lang/Foo/index.html#Foo0001)
    #[arg(long, value_name = "TEST")]
    pub test: Option<String>,

    /// javac executable used as the dependency oracle
    #[arg(long, value_name = "PATH")]
    pub javac: Option<PathBuf>,
}

#[derive(Parser)]
pub struct InitArgs {
    /// Directory to initialize config in
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Parser)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,

    /// Directory the script file is written into (required without --stdout)
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Print completion script to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,
}

/// Usage text printed alongside validation failures.
pub const USAGE: &str = "\
Args:
  --help                prints this help
  --jck-dir [DIR]       directory with unpacked jck (unpacked with -i shell_scripts)
  --output-dir [DIR]    directory where to place extracted test
  --test [TEST]         name of the test to extract
";
