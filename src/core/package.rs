//! Build descriptor and reproducer script placed beside an extracted test.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use chrono::Local;

const MAKEFILE: &[u8] = include_bytes!("../../res/TestMakefile.mk");
const TRY_RUN: &str = include_str!("../../res/tryRun.sh");

pub const MAKEFILE_NAME: &str = "Makefile";
pub const TRY_RUN_NAME: &str = "tryRun.sh";

/// Values substituted into the reproducer script.
#[derive(Debug, Clone, Default)]
pub struct ScriptEnv
{
    pub date: String,
    pub jenkins_url: Option<String>,
    pub job_name: Option<String>,
    pub build_id: Option<String>,
    pub java_tool_options: Option<String>,
}

impl ScriptEnv
{
    /// Capture the current time and process environment.
    pub fn current() -> Self
    {
        let var = |key: &str| std::env::var(key).ok();
        Self {
            date: Local::now()
                .format("%a %b %e %H:%M:%S %Z %Y")
                .to_string(),
            jenkins_url: var("JENKINS_URL"),
            job_name: var("JOB_NAME"),
            build_id: var("BUILD_ID"),
            java_tool_options: var("JAVA_TOOL_OPTIONS"),
        }
    }
}

fn or_missing(
    value: &Option<String>,
    key: &str,
) -> String
{
    value
        .clone()
        .unwrap_or_else(|| format!("missing-{key}"))
}

/// Fill the reproducer template for `test`.
pub fn render_try_run(
    test: &str,
    env: &ScriptEnv,
) -> String
{
    let script = TRY_RUN
        .replace("{TEST}", test)
        .replace("{DATE}", &env.date)
        .replace("{JENKINS_URL}", &or_missing(&env.jenkins_url, "JENKINS_URL"))
        .replace("{JOB_NAME}", &or_missing(&env.job_name, "JOB_NAME"))
        .replace("{BUILD_ID}", &or_missing(&env.build_id, "BUILD_ID"));

    match &env.java_tool_options
    {
        Some(jto) => script
            .replace("={JAVA_TOOL_OPTIONS}", &format!("='{jto}'"))
            .replace("#{JAVA_TOOL_OPTIONS}", &format!("export JAVA_TOOL_OPTIONS='{jto}'")),
        None => script
            .replace("={JAVA_TOOL_OPTIONS}", "=")
            .replace("#{JAVA_TOOL_OPTIONS}", "# no JAVA_TOOL_OPTIONS found in runtime of this tool"),
    }
}

/// Write `Makefile` verbatim and the rendered `tryRun.sh` into `output_root`.
pub fn write_helpers(
    output_root: &Path,
    test: &str,
    env: &ScriptEnv,
) -> Result<()>
{
    let makefile = output_root.join(MAKEFILE_NAME);
    fs::write(&makefile, MAKEFILE).with_context(|| format!("Failed to write {}", makefile.display()))?;

    let try_run = output_root.join(TRY_RUN_NAME);
    fs::write(&try_run, render_try_run(test, env))
        .with_context(|| format!("Failed to write {}", try_run.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&try_run, fs::Permissions::from_mode(0o755))
            .with_context(|| format!("Failed to make {} executable", try_run.display()))?;
    }

    Ok(())
}
