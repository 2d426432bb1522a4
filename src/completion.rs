//! Completion scripts for the `jck-extract` command line.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::CommandFactory;
use clap_complete::{Shell, generate, generate_to};

use crate::cli::{AppContext, Cli, CompletionsArgs};

/// Write the script for `shell` to `out`.
pub fn write_script(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    let bin = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin, out);
}

/// Write the script for `shell` into `dir` and return the file it landed in.
pub fn write_file(shell: Shell, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let mut cmd = Cli::command();
    let bin = cmd.get_name().to_string();
    generate_to(shell, &mut cmd, bin, dir)
        .with_context(|| format!("Failed to write {shell} completions into {}", dir.display()))
}

pub fn run(args: CompletionsArgs, ctx: &AppContext) -> Result<()> {
    if args.stdout {
        write_script(args.shell, &mut io::stdout());
        return Ok(());
    }

    let Some(dir) = args.out_dir else {
        bail!("--out-dir is required unless --stdout is set");
    };

    if ctx.dry_run {
        if !ctx.quiet {
            println!("Would write {} completions into {}", args.shell, dir.display());
        }
        return Ok(());
    }

    let path = write_file(args.shell, &dir)?;
    if !ctx.quiet {
        eprintln!("Wrote completion to {}", path.display());
    }
    Ok(())
}
