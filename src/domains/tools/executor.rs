//! Tool executor - runs a tool's script or inline command.
//!
//! Arguments are bound as environment variables named after each argument
//! key, layered over the proxy's own environment. Values are not escaped:
//! registered tools are local programs the user already trusts, and an
//! inline command sees them through ordinary shell expansion (`$a`).

use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

use crate::core::config::ExecutorConfig;

use super::definition::{ToolArgs, ToolDefinition, ToolSource};
use super::error::{ExecutionError, ToolResult};

/// Captured result of a successful tool run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutput {
    /// Standard output, trimmed of surrounding whitespace.
    pub stdout: String,
    /// Exit code (always success when returned).
    pub code: Option<i32>,
}

/// Spawns one independent process per call. Holds no per-call state.
#[derive(Debug, Clone)]
pub struct Executor {
    shell: String,
    timeout: Option<Duration>,
}

impl Executor {
    pub fn new(config: &ExecutorConfig) -> Self {
        Self {
            shell: config.shell.clone(),
            timeout: config.timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run `def` with `args` bound, returning its trimmed standard output.
    ///
    /// A spawn failure, a non-zero exit, or an expired deadline is an
    /// [`ExecutionError`]. On timeout the child is killed.
    #[instrument(skip(self, def, args), fields(tool = %def.name, args = args.len()))]
    pub async fn execute(&self, def: &ToolDefinition, args: &ToolArgs) -> ToolResult<ExecutionOutput> {
        args.validate()?;

        let (program, mut cmd) = match &def.source {
            ToolSource::Script(path) => (path.display().to_string(), Command::new(path)),
            ToolSource::Command(body) => {
                let mut cmd = Command::new(&self.shell);
                cmd.arg("-c").arg(body);
                (self.shell.clone(), cmd)
            }
        };

        for (name, value) in args.iter() {
            cmd.env(name, value.to_string());
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .map_err(|source| ExecutionError::Spawn { program, source })?;
        debug!("Spawned process {:?}", child.id());

        // Dropping the output future drops the child, which kills it.
        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(result) => result,
                Err(_) => {
                    warn!("Tool '{}' timed out after {:?}", def.name, limit);
                    return Err(ExecutionError::Timeout { after: limit }.into());
                }
            },
            None => child.wait_with_output().await,
        }
        .map_err(ExecutionError::Wait)?;

        let code = output.status.code();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!("Tool '{}' failed with exit code {:?}", def.name, code);
            return Err(ExecutionError::Exit { code, stderr }.into());
        }

        Ok(ExecutionOutput {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            code,
        })
    }
}
