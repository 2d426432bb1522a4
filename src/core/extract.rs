//! One extraction run: validate, discover the closure, assemble the output.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tracing::{info, warn};

use crate::cli::{AppContext, ExtractArgs};
use crate::core::{
    assemble::Assembler,
    closure::{Closure, ClosureBuilder},
    oracle::{DependencyOracle, JavacOracle},
    package::{ScriptEnv, write_helpers},
    request::ExtractionRequest,
};
use crate::infra::config::{Config, load_config};

/// What an extraction produced.
#[derive(Debug, Clone)]
pub struct ExtractSummary
{
    pub closure: Closure,
    /// Files copied from the closure (0 on dry run)
    pub copied: usize,
    /// Files copied from the native tree (0 on dry run or without natives)
    pub natives: usize,
}

pub fn run(
    args: ExtractArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let config = load_config()?;

    // Validation precedes any filesystem change
    let request = ExtractionRequest::from_args(&args, &config.layout)?;
    let oracle = JavacOracle::detect(args.javac.as_deref(), &config.oracle, &config.layout.source_ext)?;

    let summary = extract_with(&request, &config, &oracle, ctx)?;

    if ctx.dry_run
    {
        if !ctx.quiet
        {
            println!("{}", "DRY RUN: Would extract:".yellow());
            for file in summary
                .closure
                .files
                .iter()
            {
                println!("  {}", file.display());
            }
            if summary
                .closure
                .has_natives
            {
                println!("  {}", "(plus the shared native tree)".dimmed());
            }
        }
    }
    else if !ctx.quiet
    {
        println!(
            "{} Extracted {} files ({} native) for {} into {}",
            "✓".green(),
            summary.copied,
            summary.natives,
            request.test_arg,
            request
                .output_root
                .display()
        );
    }

    Ok(())
}

/// Run an extraction against an already validated request.
pub fn extract_with<O: DependencyOracle>(
    request: &ExtractionRequest,
    config: &Config,
    oracle: &O,
    ctx: &AppContext,
) -> Result<ExtractSummary>
{
    let layout = &config.layout;

    if let Some(page) = &request.missing_descriptor
    {
        warn!(descriptor = %page.display(), "named test descriptor does not exist");
    }

    let progress = progress_bar(ctx);
    let closure = ClosureBuilder::new(request, config, oracle)
        .with_progress(progress.clone())
        .build()?;
    progress.finish_and_clear();

    info!(files = closure.files.len(), natives = closure.has_natives, "dependency closure resolved");

    if ctx.dry_run
    {
        return Ok(ExtractSummary { closure, copied: 0, natives: 0 });
    }

    let progress = progress_bar(ctx);
    let assembler = Assembler::new(&request.corpus_root, &request.output_root)
        .with_ignores(&layout.ignore)
        .with_progress(progress.clone());
    let copied = assembler.copy_closure(&closure.files)?;

    let natives = if closure.has_natives
    {
        let native_dir = request
            .src_root(layout)
            .join(&layout.native_dir);
        assembler.copy_native_tree(&native_dir, &layout.src_dir)?
    }
    else
    {
        0
    };
    progress.finish_and_clear();

    write_helpers(&request.output_root, &request.test_arg, &ScriptEnv::current())?;

    Ok(ExtractSummary { closure, copied, natives })
}

fn progress_bar(ctx: &AppContext) -> ProgressBar
{
    if ctx.quiet
    {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style.progress_chars("#>-"));
    pb
}
