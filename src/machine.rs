use clap::ValueEnum;

use crate::error::ConfigError;

/// Target machine passed to the librarian and linker as `/MACHINE:<token>`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Machine {
    #[value(name = "x64")]
    X64,

    #[value(name = "ARM64")]
    Arm64,

    #[value(name = "X86")]
    X86,
}

impl Machine {
    /// Returns the `/MACHINE` token for the machine.
    pub fn token(self) -> &'static str {
        match self {
            Self::X64 => "x64",
            Self::Arm64 => "ARM64",
            Self::X86 => "X86",
        }
    }

    /// Returns the name `vcvarsall.bat` uses for this machine.
    pub fn vcvars_arch(self) -> &'static str {
        match self {
            Self::X64 => "x64",
            Self::Arm64 => "arm64",
            Self::X86 => "x86",
        }
    }

    /// Returns the `vcvarsall.bat` argument selecting a toolchain that runs on
    /// this machine and builds for `target`.
    ///
    /// Cross toolchains are named `<host>_<target>`.
    pub fn vcvars_arg(self, target: Machine) -> String {
        if self == target {
            self.vcvars_arch().to_string()
        } else {
            format!("{}_{}", self.vcvars_arch(), target.vcvars_arch())
        }
    }

    /// Maps a `PROCESSOR_ARCHITECTURE` value.
    pub fn from_host_arch(value: &str) -> Option<Machine> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("amd64") {
            Some(Self::X64)
        } else if value.eq_ignore_ascii_case("arm64") {
            Some(Self::Arm64)
        } else if value.eq_ignore_ascii_case("x86") {
            Some(Self::X86)
        } else {
            None
        }
    }

    /// Maps a conda style `target_platform` value.
    pub fn from_target_platform(value: &str) -> Option<Machine> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("win-64") {
            Some(Self::X64)
        } else if value.eq_ignore_ascii_case("win-arm64") {
            Some(Self::Arm64)
        } else if value.eq_ignore_ascii_case("win-32") {
            Some(Self::X86)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Machine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// Resolves the target machine.
///
/// An explicit override wins, then the target platform, then the host
/// architecture. A target platform of `noarch`, an empty one or one that does
/// not name a Windows machine defers to the host architecture.
pub fn resolve_machine(
    explicit: Option<Machine>,
    target_platform: Option<&str>,
    host_arch: Option<&str>,
) -> Result<Machine, ConfigError> {
    if let Some(machine) = explicit {
        return Ok(machine);
    }

    let mut unknown_platform = None;
    if let Some(platform) = target_platform.map(str::trim)
        && !platform.is_empty()
        && !platform.eq_ignore_ascii_case("noarch")
    {
        match Machine::from_target_platform(platform) {
            Some(machine) => return Ok(machine),
            None => {
                log::warn!("ignoring unknown target platform '{platform}'");
                unknown_platform = Some(platform);
            }
        }
    }

    match host_arch.map(str::trim) {
        Some(arch) if !arch.is_empty() => {
            Machine::from_host_arch(arch).ok_or_else(|| ConfigError::UnknownArchitecture {
                value: arch.to_string(),
            })
        }
        _ => Err(match unknown_platform {
            Some(platform) => ConfigError::UnknownTargetPlatform {
                value: platform.to_string(),
            },
            None => ConfigError::NoArchitecture,
        }),
    }
}
