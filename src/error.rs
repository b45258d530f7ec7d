use std::{path::PathBuf, process::ExitStatus};

use crate::toolchain::Tool;

/// Top level error for building a forwarder DLL.
#[derive(Debug, thiserror::Error)]
pub enum ForwarderError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Toolchain(#[from] ToolchainError),

    #[error(transparent)]
    ExternalTool(#[from] ExternalToolError),

    #[error("{}: {error}", .path.display())]
    Io {
        path: PathBuf,
        error: std::io::Error,
    },
}

impl ForwarderError {
    pub(crate) fn io(path: impl Into<PathBuf>, error: std::io::Error) -> ForwarderError {
        Self::Io {
            path: path.into(),
            error,
        }
    }
}

/// Invalid command line or environment configuration.
///
/// These are always reported before any external tool is started.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{}: expected a path ending in '.dll'", .path.display())]
    InvalidExtension { path: PathBuf },

    #[error("{}: path has no file name", .path.display())]
    MissingFileName { path: PathBuf },

    #[error("input and output both use the module name '{name}'")]
    SameModuleName { name: String },

    #[error("unknown architecture '{value}' (expected amd64, arm64 or x86)")]
    UnknownArchitecture { value: String },

    #[error("unknown target platform '{value}' (expected win-64, win-arm64, win-32 or noarch)")]
    UnknownTargetPlatform { value: String },

    #[error("could not determine the target machine; pass --machine")]
    NoArchitecture,

    #[error("could not resolve the current directory: {0}")]
    CurrentDir(std::io::Error),
}

/// Errors locating the native toolchain.
#[derive(Debug, thiserror::Error)]
pub enum ToolchainError {
    #[error("unable to find {tool}")]
    NotFound { tool: Tool },

    #[error("{}: {tool} not found next to the compiler", .dir.display())]
    MissingSibling { tool: Tool, dir: PathBuf },

    #[error("could not run vswhere: {0}")]
    Vswhere(std::io::Error),

    #[error("no Visual Studio installation with the C++ build tools was found")]
    NoInstallation,

    #[error("{}: {reason}", .script.display())]
    VcVars { script: PathBuf, reason: String },

    #[error("the MSVC toolchain can only be located automatically on Windows")]
    Unsupported,
}

/// A subprocess could not be started or did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum ExternalToolError {
    #[error("could not run {tool}: {error}")]
    Spawn { tool: Tool, error: std::io::Error },

    #[error("{tool} failed ({status}){}", display_output(.output))]
    Failed {
        tool: Tool,
        status: ExitStatus,
        output: String,
    },

    #[error("{}: export listing has no 'ordinal' header", .path.display())]
    MissingExportHeader { path: PathBuf },
}

fn display_output(output: &str) -> String {
    let output = output.trim();
    if output.is_empty() {
        String::new()
    } else {
        format!("\n{output}")
    }
}
