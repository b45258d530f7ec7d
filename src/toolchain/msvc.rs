use std::{ffi::OsString, path::PathBuf};

use indexmap::IndexMap;

use crate::{config::Environment, error::ToolchainError, machine::Machine};

use super::{PathSearcher, Tool, Toolchain, ToolchainLocator};

/// Finds the MSVC toolchain.
///
/// A `cl.exe` already on `PATH` (a developer prompt) is used as is. Otherwise
/// the latest Visual Studio installation is found with `vswhere` and its
/// `vcvarsall.bat` environment is captured for the tool invocations. That
/// environment selects the compiler running on `host` and building for
/// `target`.
#[derive(Debug, Clone)]
pub struct MsvcLocator {
    #[cfg_attr(not(windows), allow(dead_code))]
    host: Machine,

    #[cfg_attr(not(windows), allow(dead_code))]
    target: Machine,

    path: Option<OsString>,

    #[cfg_attr(not(windows), allow(dead_code))]
    program_files_x86: Option<PathBuf>,
}

impl MsvcLocator {
    pub fn new(host: Machine, target: Machine, env: &Environment) -> MsvcLocator {
        Self {
            host,
            target,
            path: env.path.clone(),
            program_files_x86: env.program_files_x86.clone(),
        }
    }

    fn locate_on_path(&self) -> Option<PathBuf> {
        let path = self.path.as_ref()?;
        PathSearcher::from_path_var(path).find(Tool::Compiler.exe_name())
    }

    #[cfg(windows)]
    fn locate_installation(&self) -> Result<Toolchain, ToolchainError> {
        let program_files = self
            .program_files_x86
            .as_ref()
            .ok_or(ToolchainError::NoInstallation)?;

        let vswhere = program_files
            .join("Microsoft Visual Studio")
            .join("Installer")
            .join("vswhere.exe");

        let install_dir = windows::query_vswhere(&vswhere)?;
        log::debug!("using Visual Studio installation {}", install_dir.display());

        let vcvarsall = install_dir
            .join("VC")
            .join("Auxiliary")
            .join("Build")
            .join("vcvarsall.bat");

        let env = windows::capture_vcvars(&vcvarsall, &self.host.vcvars_arg(self.target))?;

        let compiler = env
            .iter()
            .find_map(|(k, v)| k.eq_ignore_ascii_case("path").then_some(v))
            .and_then(|path| PathSearcher::from_path_var(path).find(Tool::Compiler.exe_name()))
            .ok_or(ToolchainError::NotFound {
                tool: Tool::Compiler,
            })?;

        log::debug!("found {}", compiler.display());

        let env = env
            .into_iter()
            .map(|(k, v)| (OsString::from(k), OsString::from(v)))
            .collect();

        Ok(Toolchain::from_compiler(compiler)?.with_env(env))
    }

    #[cfg(not(windows))]
    fn locate_installation(&self) -> Result<Toolchain, ToolchainError> {
        Err(ToolchainError::Unsupported)
    }
}

impl ToolchainLocator for MsvcLocator {
    fn locate(&self) -> Result<Toolchain, ToolchainError> {
        if let Some(compiler) = self.locate_on_path() {
            log::debug!("found {} on PATH", compiler.display());
            return Toolchain::from_compiler(compiler);
        }

        self.locate_installation()
    }
}

/// Parses the output of the `set` shell command into an ordered map.
///
/// Lines without an `=` or with an empty name are skipped.
pub fn parse_set_output(output: &str) -> IndexMap<String, String> {
    output
        .lines()
        .filter_map(|line| line.split_once('='))
        .filter(|(name, _)| !name.is_empty())
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

#[cfg(windows)]
mod windows {
    use std::{
        os::windows::process::CommandExt,
        path::{Path, PathBuf},
        process::Command,
    };

    use indexmap::IndexMap;

    use crate::error::ToolchainError;

    const VC_TOOLS_COMPONENT: &str = "Microsoft.VisualStudio.Component.VC.Tools.x86.x64";

    pub fn query_vswhere(vswhere: &Path) -> Result<PathBuf, ToolchainError> {
        let output = Command::new(vswhere)
            .args([
                "-latest",
                "-prerelease",
                "-products",
                "*",
                "-requires",
                VC_TOOLS_COMPONENT,
                "-property",
                "installationPath",
                "-utf8",
            ])
            .output()
            .map_err(ToolchainError::Vswhere)?;

        if !output.status.success() {
            return Err(ToolchainError::NoInstallation);
        }

        String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(PathBuf::from)
            .ok_or(ToolchainError::NoInstallation)
    }

    pub fn capture_vcvars(
        vcvarsall: &Path,
        arch: &str,
    ) -> Result<IndexMap<String, String>, ToolchainError> {
        let vcvars_error = |reason: String| ToolchainError::VcVars {
            script: vcvarsall.to_path_buf(),
            reason,
        };

        if !vcvarsall.is_file() {
            return Err(vcvars_error("file does not exist".into()));
        }

        log::debug!("running {} {arch}", vcvarsall.display());

        // `/u` makes cmd write the `set` output as UTF-16
        let output = Command::new("cmd.exe")
            .args(["/u", "/c"])
            .raw_arg(format!(
                "\"\"{}\" {arch} && set\"",
                vcvarsall.display()
            ))
            .output()
            .map_err(|e| vcvars_error(e.to_string()))?;

        if !output.status.success() {
            return Err(vcvars_error(format!(
                "exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let wide = output
            .stdout
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect::<Vec<_>>();

        let env = super::parse_set_output(&String::from_utf16_lossy(&wide));
        if env.is_empty() {
            return Err(vcvars_error("produced no environment".into()));
        }

        Ok(env)
    }
}

#[cfg(test)]
mod tests {
    use super::{MsvcLocator, parse_set_output};
    use crate::{
        config::Environment,
        machine::Machine,
        toolchain::{Tool, ToolchainLocator},
    };

    #[test]
    fn set_output() {
        let output = "\
ALLUSERSPROFILE=C:\\ProgramData\r
INCLUDE=C:\\VS\\include;C:\\SDK\\include\r
not a variable\r
=C:=C:\\\r
VSCMD_ARG_TGT_ARCH=x64\r
";

        let env = parse_set_output(output);
        let names = env.keys().map(String::as_str).collect::<Vec<_>>();
        assert_eq!(names, ["ALLUSERSPROFILE", "INCLUDE", "VSCMD_ARG_TGT_ARCH"]);
        assert_eq!(env["INCLUDE"], "C:\\VS\\include;C:\\SDK\\include");
        assert_eq!(env["VSCMD_ARG_TGT_ARCH"], "x64");
    }

    #[test]
    fn compiler_on_path() {
        let dir = tempfile::tempdir().expect("failed creating temp dir");
        for tool in [Tool::Compiler, Tool::Librarian, Tool::Linker, Tool::Dumpbin] {
            std::fs::write(dir.path().join(tool.exe_name()), b"").unwrap();
        }

        let env = Environment {
            path: Some(std::env::join_paths([dir.path()]).unwrap()),
            ..Default::default()
        };

        let toolchain = MsvcLocator::new(Machine::X64, Machine::X86, &env)
            .locate()
            .expect("cl.exe is on PATH");
        assert_eq!(toolchain.path(Tool::Linker), dir.path().join("link.exe"));
        assert!(toolchain.env().is_empty());
    }

    #[cfg(not(windows))]
    #[test]
    fn no_installation_search_off_windows() {
        use crate::error::ToolchainError;

        let dir = tempfile::tempdir().expect("failed creating temp dir");
        let env = Environment {
            path: Some(std::env::join_paths([dir.path()]).unwrap()),
            ..Default::default()
        };

        let err = MsvcLocator::new(Machine::X64, Machine::X86, &env)
            .locate()
            .expect_err("no cl.exe available");
        assert!(matches!(err, ToolchainError::Unsupported), "{err:?}");
    }
}
