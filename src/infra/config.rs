use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, InitArgs};

/// Config file names looked up in the working directory, first hit wins
const CONFIG_FILES: [&str; 2] = ["jck-extract.toml", ".jck-extract.toml"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config
{
    /// Corpus directory and file naming conventions
    pub layout: LayoutConfig,

    /// Compiler oracle settings
    pub oracle: OracleConfig,

    /// Launcher script scanning settings
    pub script: ScriptConfig,
}

/// Names the corpus uses for its directories and file kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig
{
    /// Library sources, relative to the corpus root
    pub src_dir: String,
    /// Grouped test directories, relative to the corpus root
    pub tests_dir: String,
    /// Shared native sources, relative to `src_dir`
    pub native_dir: String,
    /// Prefix of module-namespaced source roots under `src_dir`
    pub module_prefix: String,
    /// Suffix excluding a `src_dir` child from the source roots
    pub module_suffix: String,
    /// File name that short-circuits its siblings during normalization
    pub module_descriptor: String,
    pub source_ext: String,
    pub native_ext: String,
    pub script_ext: String,
    pub descriptor_ext: String,
    /// Globs (relative to the walked directory) pruned while normalizing
    /// source trees and copying the native tree, e.g. "**/SCCS"
    pub ignore: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig
{
    /// Explicit javac binary; falls back to $JAVA_HOME/bin/javac, then PATH
    pub javac: Option<PathBuf>,

    /// Extra arguments appended to every javac invocation
    pub extra_args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig
{
    /// Selects the launcher line inside a script
    pub launcher_pattern: String,

    /// Matches fully-qualified class name candidates on that line
    pub class_pattern: String,
}

impl Default for LayoutConfig
{
    fn default() -> Self
    {
        Self {
            src_dir: "src".to_string(),
            tests_dir: "tests".to_string(),
            native_dir: "share".to_string(),
            module_prefix: "jck.".to_string(),
            module_suffix: ".module".to_string(),
            module_descriptor: "module-info.java".to_string(),
            source_ext: "java".to_string(),
            native_ext: "c".to_string(),
            script_ext: "ksh".to_string(),
            descriptor_ext: "html".to_string(),
            ignore: Vec::new(),
        }
    }
}

impl Default for OracleConfig
{
    fn default() -> Self
    {
        Self {
            javac: None,
            // Keep attributing after errors so method bodies still resolve.
            // Both spellings are accepted silently by javac as -XD options.
            extra_args: vec![
                "-XDshould-stop.ifError=FLOW".to_string(),
                "-XDshouldStopPolicyIfError=FLOW".to_string(),
            ],
        }
    }
}

impl Default for ScriptConfig
{
    fn default() -> Self
    {
        Self {
            launcher_pattern: r"^.*bin/java.*$".to_string(),
            class_pattern: r"[A-Za-z_$][A-Za-z0-9_$-]*[.][.A-Za-z0-9_$-]+".to_string(),
        }
    }
}

/// Load configuration from the working directory and `JCK_EXTRACT__*` env vars.
pub fn load_config() -> Result<Config>
{
    load_config_from(Path::new("."))
}

/// Load configuration, probing for config files inside `dir`.
pub fn load_config_from(dir: &Path) -> Result<Config>
{
    let mut builder = config::Config::builder();

    for name in &CONFIG_FILES
    {
        let path = dir.join(name);
        if path.exists()
        {
            builder = builder.add_source(config::File::from(path));
            break;
        }
    }

    // Double underscore keeps field names like `src_dir` intact
    builder = builder.add_source(
        config::Environment::with_prefix("JCK_EXTRACT")
            .prefix_separator("__")
            .separator("__"),
    );

    let cfg = builder
        .build()
        .context("Failed to load configuration")?;
    let parsed: Config = cfg
        .try_deserialize()
        .context("Failed to parse configuration")?;

    Ok(parsed)
}

pub fn init(
    args: InitArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let config_path = args
        .path
        .join(CONFIG_FILES[0]);

    if config_path.exists() && !args.force
    {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config::default();
    let toml_string =
        toml::to_string_pretty(&config).context("Failed to serialize default config")?;

    if ctx.dry_run
    {
        if !ctx.quiet
        {
            println!("Would write {}:\n{}", config_path.display(), toml_string);
        }
        return Ok(());
    }

    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if !ctx.quiet
    {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}
