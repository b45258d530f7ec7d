use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::Command,
};

use crate::error::ExternalToolError;

use super::Tool;

/// One external tool command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    tool: Tool,
    program: PathBuf,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
    envs: Vec<(OsString, OsString)>,
}

impl ToolInvocation {
    pub fn new(tool: Tool, program: impl Into<PathBuf>) -> ToolInvocation {
        Self {
            tool,
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            envs: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    pub fn args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator,
        <I as IntoIterator>::Item: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|arg| arg.as_ref().to_owned()));
        self
    }

    /// Sets the working directory of the process.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Adds environment variables on top of the inherited environment.
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<OsStr>,
        V: AsRef<OsStr>,
    {
        self.envs.extend(
            vars.into_iter()
                .map(|(k, v)| (k.as_ref().to_owned(), v.as_ref().to_owned())),
        );
        self
    }

    #[inline]
    pub fn tool(&self) -> Tool {
        self.tool
    }

    #[inline]
    pub fn program(&self) -> &Path {
        &self.program
    }

    #[inline]
    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    #[inline]
    pub fn get_envs(&self) -> &[(OsString, OsString)] {
        &self.envs
    }

    #[inline]
    pub fn get_current_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    /// Returns the command line for log messages.
    pub fn display(&self) -> String {
        let mut cmdline = self.program.to_string_lossy().into_owned();
        for arg in &self.args {
            cmdline.push(' ');
            cmdline.push_str(&arg.to_string_lossy());
        }
        cmdline
    }
}

/// Captured output of a successful tool run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs external tools.
///
/// Implementations must report a non-zero exit status as an error.
pub trait ToolRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ExternalToolError>;
}

/// Runs tools as child processes and waits for them to exit.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandRunner;

impl ToolRunner for CommandRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ExternalToolError> {
        let mut cmd = Command::new(invocation.program());
        cmd.args(invocation.get_args());
        cmd.envs(invocation.get_envs().iter().map(|(k, v)| (k, v)));

        if let Some(dir) = invocation.get_current_dir() {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|error| ExternalToolError::Spawn {
            tool: invocation.tool(),
            error,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            // MSVC tools print their diagnostics on stdout
            let mut combined = stdout;
            if !stderr.trim().is_empty() {
                combined.push('\n');
                combined.push_str(&stderr);
            }

            return Err(ExternalToolError::Failed {
                tool: invocation.tool(),
                status: output.status,
                output: combined,
            });
        }

        Ok(ToolOutput { stdout, stderr })
    }
}
