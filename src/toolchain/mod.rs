//! Native toolchain discovery and invocation.

use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
};

use indexmap::{IndexMap, IndexSet};

use crate::error::ToolchainError;

mod msvc;
pub mod runner;

pub use msvc::{MsvcLocator, parse_set_output};
pub use runner::{CommandRunner, ToolInvocation, ToolOutput, ToolRunner};

/// The external tools used for building a forwarder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    /// `cl.exe`
    Compiler,

    /// `lib.exe`
    Librarian,

    /// `link.exe`
    Linker,

    /// `dumpbin.exe`
    Dumpbin,
}

impl Tool {
    /// File name of the tool executable.
    pub fn exe_name(self) -> &'static str {
        match self {
            Self::Compiler => "cl.exe",
            Self::Librarian => "lib.exe",
            Self::Linker => "link.exe",
            Self::Dumpbin => "dumpbin.exe",
        }
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.exe_name())
    }
}

/// Resolved paths to the tools along with the environment they need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    compiler: PathBuf,
    librarian: PathBuf,
    linker: PathBuf,
    dumpbin: PathBuf,
    env: IndexMap<OsString, OsString>,
}

impl Toolchain {
    /// Creates a toolchain from explicit tool paths without checking them.
    pub fn new(
        compiler: impl Into<PathBuf>,
        librarian: impl Into<PathBuf>,
        linker: impl Into<PathBuf>,
        dumpbin: impl Into<PathBuf>,
    ) -> Toolchain {
        Self {
            compiler: compiler.into(),
            librarian: librarian.into(),
            linker: linker.into(),
            dumpbin: dumpbin.into(),
            env: IndexMap::new(),
        }
    }

    /// Creates a toolchain from the path to `cl.exe`.
    ///
    /// The other tools are expected to live in the same directory.
    pub fn from_compiler(compiler: impl Into<PathBuf>) -> Result<Toolchain, ToolchainError> {
        let compiler = compiler.into();
        let dir = compiler
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let sibling = |tool: Tool| {
            let path = dir.join(tool.exe_name());
            if path.is_file() {
                Ok(path)
            } else {
                Err(ToolchainError::MissingSibling {
                    tool,
                    dir: dir.clone(),
                })
            }
        };

        Ok(Self {
            librarian: sibling(Tool::Librarian)?,
            linker: sibling(Tool::Linker)?,
            dumpbin: sibling(Tool::Dumpbin)?,
            compiler,
            env: IndexMap::new(),
        })
    }

    /// Sets the environment variables applied to every tool invocation.
    pub fn with_env(mut self, env: IndexMap<OsString, OsString>) -> Self {
        self.env = env;
        self
    }

    /// Returns the path to `tool`.
    pub fn path(&self, tool: Tool) -> &Path {
        match tool {
            Tool::Compiler => &self.compiler,
            Tool::Librarian => &self.librarian,
            Tool::Linker => &self.linker,
            Tool::Dumpbin => &self.dumpbin,
        }
    }

    #[inline]
    pub fn env(&self) -> &IndexMap<OsString, OsString> {
        &self.env
    }

    /// Starts a command line for `tool` with the toolchain environment.
    pub fn invocation(&self, tool: Tool) -> ToolInvocation {
        ToolInvocation::new(tool, self.path(tool)).envs(self.env.iter())
    }
}

/// Locates a toolchain.
pub trait ToolchainLocator {
    fn locate(&self) -> Result<Toolchain, ToolchainError>;
}

/// Searches an ordered list of directories for executables.
#[derive(Debug, Default, Clone)]
pub struct PathSearcher {
    search_paths: IndexSet<PathBuf>,
}

impl PathSearcher {
    pub fn new() -> PathSearcher {
        Default::default()
    }

    /// Creates a searcher from a `PATH` style variable value.
    pub fn from_path_var(value: impl AsRef<OsStr>) -> PathSearcher {
        let mut searcher = Self::new();
        searcher.extend_search_paths(
            std::env::split_paths(value.as_ref()).filter(|p| !p.as_os_str().is_empty()),
        );
        searcher
    }

    pub fn extend_search_paths<I, P>(&mut self, search_paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.search_paths
            .extend(search_paths.into_iter().map(|v| v.into()));
    }

    /// Returns the first `name` file in the search paths.
    pub fn find(&self, name: impl AsRef<Path>) -> Option<PathBuf> {
        let name = name.as_ref();
        self.search_paths.iter().find_map(|search_path| {
            let full_path = search_path.join(name);
            if full_path.is_file() {
                Some(full_path)
            } else {
                log::trace!("{} does not exist", full_path.display());
                None
            }
        })
    }
}
