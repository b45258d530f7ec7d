use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use crate::{
    error::ConfigError,
    machine::{Machine, resolve_machine},
};

/// Environment variable holding the host processor architecture.
pub const PROCESSOR_ARCHITECTURE: &str = "PROCESSOR_ARCHITECTURE";

/// Environment variable holding the conda style target platform.
pub const TARGET_PLATFORM: &str = "target_platform";

const PROGRAM_FILES_X86: &str = "ProgramFiles(x86)";

/// Snapshot of the environment variables used for defaulting.
///
/// Taken once at startup and passed down so nothing below reads the process
/// environment on its own.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Environment {
    pub processor_architecture: Option<String>,
    pub target_platform: Option<String>,

    /// Executable search path used for finding the compiler.
    pub path: Option<OsString>,

    /// Root of the 32-bit program files directory holding `vswhere.exe`.
    pub program_files_x86: Option<PathBuf>,
}

impl Environment {
    /// Reads the current process environment.
    pub fn from_env() -> Environment {
        let var = |name: &str| {
            std::env::var_os(name).map(|value| value.to_string_lossy().into_owned())
        };

        Self {
            processor_architecture: var(PROCESSOR_ARCHITECTURE),
            target_platform: var(TARGET_PLATFORM),
            path: std::env::var_os("PATH"),
            program_files_x86: std::env::var_os(PROGRAM_FILES_X86).map(PathBuf::from),
        }
    }

    /// Returns the host machine if the processor architecture is known.
    pub fn host_machine(&self) -> Option<Machine> {
        self.processor_architecture
            .as_deref()
            .and_then(Machine::from_host_arch)
    }

    /// Resolves the target machine with `explicit` taking precedence over the
    /// environment.
    pub fn resolve_machine(&self, explicit: Option<Machine>) -> Result<Machine, ConfigError> {
        resolve_machine(
            explicit,
            self.target_platform.as_deref(),
            self.processor_architecture.as_deref(),
        )
    }
}

/// Validated settings for one forwarder build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwarderConfig {
    input: PathBuf,
    output: PathBuf,
    input_module: String,
    output_module: String,
    machine: Machine,
    use_temp_dir: bool,
}

impl ForwarderConfig {
    /// Validates the input and output DLL paths.
    ///
    /// Both paths are made absolute against the current directory so the
    /// build can run from a different working directory.
    pub fn new(
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        machine: Machine,
    ) -> Result<ForwarderConfig, ConfigError> {
        let input = input.as_ref();
        let output = output.as_ref();

        let input_module = dll_module_name(input)?;
        let output_module = dll_module_name(output)?;

        if input_module.eq_ignore_ascii_case(&output_module) {
            return Err(ConfigError::SameModuleName { name: input_module });
        }

        Ok(Self {
            input: std::path::absolute(input).map_err(ConfigError::CurrentDir)?,
            output: std::path::absolute(output).map_err(ConfigError::CurrentDir)?,
            input_module,
            output_module,
            machine,
            use_temp_dir: true,
        })
    }

    /// Build inside a temporary directory (the default) or in the current
    /// directory.
    pub fn use_temp_dir(mut self, val: bool) -> Self {
        self.use_temp_dir = val;
        self
    }

    #[inline]
    pub fn input(&self) -> &Path {
        &self.input
    }

    #[inline]
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Module name of the input DLL (file name without `.dll`).
    #[inline]
    pub fn input_module(&self) -> &str {
        &self.input_module
    }

    /// Module name of the output DLL (file name without `.dll`).
    #[inline]
    pub fn output_module(&self) -> &str {
        &self.output_module
    }

    #[inline]
    pub fn machine(&self) -> Machine {
        self.machine
    }

    #[inline]
    pub fn temp_dir_enabled(&self) -> bool {
        self.use_temp_dir
    }
}

/// Returns the module name of a `.dll` path.
fn dll_module_name(path: &Path) -> Result<String, ConfigError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| ConfigError::MissingFileName {
            path: path.to_path_buf(),
        })?
        .to_string_lossy();

    let stem_len = file_name.len().saturating_sub(4);
    match (file_name.get(..stem_len), file_name.get(stem_len..)) {
        (Some(stem), Some(ext)) if !stem.is_empty() && ext.eq_ignore_ascii_case(".dll") => {
            Ok(stem.to_string())
        }
        _ => Err(ConfigError::InvalidExtension {
            path: path.to_path_buf(),
        }),
    }
}
