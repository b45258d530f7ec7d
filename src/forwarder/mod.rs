use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::{
    config::ForwarderConfig,
    error::ForwarderError,
    toolchain::{ToolRunner, ToolchainLocator},
};

mod builder;

pub use builder::{BuildContext, BuildReport, ForwarderBuilder};

/// Directory holding the intermediate build files.
#[derive(Debug)]
pub enum WorkDir {
    /// Removed when dropped.
    Temporary(TempDir),

    /// Left in place with all intermediate files.
    Persistent(PathBuf),
}

impl WorkDir {
    /// Creates a fresh temporary directory.
    pub fn temporary() -> Result<WorkDir, ForwarderError> {
        tempfile::Builder::new()
            .prefix("dllfwd-")
            .tempdir()
            .map(Self::Temporary)
            .map_err(|e| ForwarderError::io(std::env::temp_dir(), e))
    }

    #[inline]
    pub fn path(&self) -> &Path {
        match self {
            Self::Temporary(dir) => dir.path(),
            Self::Persistent(dir) => dir,
        }
    }

    /// Removes the directory if it is temporary.
    pub fn close(self) -> Result<(), ForwarderError> {
        match self {
            Self::Temporary(dir) => {
                let path = dir.path().to_path_buf();
                dir.close().map_err(|e| ForwarderError::io(path, e))
            }
            Self::Persistent(_) => Ok(()),
        }
    }
}

/// Creates forwarder DLLs.
///
/// Locates the toolchain, sets up the working directory and drives the
/// [`ForwarderBuilder`].
#[derive(Debug)]
pub struct Forwarder {
    config: ForwarderConfig,
    persistent_dir: Option<PathBuf>,
}

impl Forwarder {
    pub fn new(config: ForwarderConfig) -> Forwarder {
        Self {
            config,
            persistent_dir: None,
        }
    }

    /// Directory used for intermediate files when the temporary directory is
    /// disabled. Defaults to the current directory.
    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.persistent_dir = Some(dir.into());
        self
    }

    #[inline]
    pub fn config(&self) -> &ForwarderConfig {
        &self.config
    }

    /// Builds the forwarder DLL.
    ///
    /// A temporary working directory is removed afterwards whether or not the
    /// build succeeded.
    pub fn run(
        &self,
        locator: &dyn ToolchainLocator,
        runner: &dyn ToolRunner,
    ) -> Result<BuildReport, ForwarderError> {
        let toolchain = locator.locate()?;
        let work_dir = self.setup_work_dir()?;
        log::debug!("working directory: {}", work_dir.path().display());

        let ctx = BuildContext {
            toolchain: &toolchain,
            config: &self.config,
            work_dir: work_dir.path(),
        };

        let report = ForwarderBuilder::new(ctx, runner).build()?;

        if let Err(e) = work_dir.close() {
            log::warn!("could not remove working directory: {e}");
        }

        log::info!(
            "{}: forwarding {} exports to {}.dll",
            report.output.display(),
            report.symbols.len(),
            self.config.input_module()
        );

        Ok(report)
    }

    fn setup_work_dir(&self) -> Result<WorkDir, ForwarderError> {
        if self.config.temp_dir_enabled() {
            return WorkDir::temporary();
        }

        match &self.persistent_dir {
            Some(dir) => Ok(WorkDir::Persistent(dir.clone())),
            None => std::env::current_dir()
                .map(WorkDir::Persistent)
                .map_err(|e| ForwarderError::io(".", e)),
        }
    }
}
