use std::path::{Path, PathBuf};

use crate::{
    config::ForwarderConfig,
    error::ForwarderError,
    exports::extract_exports,
    moduledef::ModuleDefinition,
    toolchain::{Tool, ToolInvocation, ToolRunner, Toolchain},
};

const EMPTY_SOURCE: &str = "empty.c";
const EMPTY_OBJECT: &str = "empty.obj";

/// Everything a forwarder build needs.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    /// Resolved tool paths.
    pub toolchain: &'a Toolchain,

    /// Input/output paths, module names and target machine.
    pub config: &'a ForwarderConfig,

    /// Directory receiving the intermediate files.
    pub work_dir: &'a Path,
}

/// Result of a successful build.
///
/// The intermediate file paths no longer exist once a temporary working
/// directory is removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Forwarded symbols in export order.
    pub symbols: Vec<String>,

    /// Definition file of the input DLL.
    pub input_def: PathBuf,

    /// Definition file of the output DLL.
    pub output_def: PathBuf,

    /// Import library of the input DLL.
    pub import_library: PathBuf,

    /// The DLL produced by the linker inside the working directory.
    pub built_dll: PathBuf,

    /// Final location of the forwarder DLL.
    pub output: PathBuf,
}

/// Builds a forwarder DLL with the native toolchain.
///
/// Every step must succeed before the next one starts.
pub struct ForwarderBuilder<'a> {
    ctx: BuildContext<'a>,
    runner: &'a dyn ToolRunner,
}

impl<'a> ForwarderBuilder<'a> {
    pub fn new(ctx: BuildContext<'a>, runner: &'a dyn ToolRunner) -> ForwarderBuilder<'a> {
        Self { ctx, runner }
    }

    /// Runs the build.
    pub fn build(&self) -> Result<BuildReport, ForwarderError> {
        let config = self.ctx.config;

        let empty_obj = self.compile_empty_object()?;

        let symbols = extract_exports(
            self.ctx.toolchain,
            self.runner,
            config.input(),
            self.ctx.work_dir,
        )?;

        let input_def = self.write_definition(&ModuleDefinition::exports(
            config.input_module(),
            symbols.iter().cloned(),
        ))?;

        let import_library = self.build_import_library(&input_def)?;

        let output_def = self.write_definition(&ModuleDefinition::forwards(
            config.output_module(),
            config.input_module(),
            symbols.iter().cloned(),
        ))?;

        let built_dll = self.link(&output_def, &empty_obj, &import_library)?;
        self.copy_output(&built_dll)?;

        Ok(BuildReport {
            symbols,
            input_def,
            output_def,
            import_library,
            built_dll,
            output: config.output().to_path_buf(),
        })
    }

    fn work_path(&self, name: impl AsRef<Path>) -> PathBuf {
        self.ctx.work_dir.join(name)
    }

    fn tool(&self, tool: Tool) -> ToolInvocation {
        self.ctx
            .toolchain
            .invocation(tool)
            .arg("/NOLOGO")
            .current_dir(self.ctx.work_dir)
    }

    fn run(&self, invocation: ToolInvocation) -> Result<(), ForwarderError> {
        log::debug!("{}", invocation.display());
        let output = self.runner.run(&invocation)?;
        if !output.stdout.trim().is_empty() {
            log::trace!("{}: {}", invocation.tool(), output.stdout.trim());
        }
        Ok(())
    }

    /// Compiles an empty translation unit for the linker to attach the export
    /// table to.
    fn compile_empty_object(&self) -> Result<PathBuf, ForwarderError> {
        let source = self.work_path(EMPTY_SOURCE);
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&source)
            .map_err(|e| ForwarderError::io(&source, e))?;

        self.run(self.tool(Tool::Compiler).args(["/c", EMPTY_SOURCE]))?;
        Ok(self.work_path(EMPTY_OBJECT))
    }

    fn write_definition(&self, def: &ModuleDefinition) -> Result<PathBuf, ForwarderError> {
        let path = self.work_path(def.file_name());
        std::fs::write(&path, def.render()).map_err(|e| ForwarderError::io(&path, e))?;
        log::debug!(
            "wrote {} ({} exports)",
            path.display(),
            def.entries().len()
        );
        Ok(path)
    }

    /// Builds an import library resolving against the input DLL.
    fn build_import_library(&self, def_path: &Path) -> Result<PathBuf, ForwarderError> {
        let lib_name = format!("{}.lib", self.ctx.config.input_module());

        self.run(self.tool(Tool::Librarian).args([
            format!("/def:{}", file_name(def_path)),
            format!("/out:{lib_name}"),
            format!("/MACHINE:{}", self.ctx.config.machine()),
        ]))?;

        Ok(self.work_path(lib_name))
    }

    /// Links the forwarder DLL from the empty object and import library.
    fn link(
        &self,
        def_path: &Path,
        empty_obj: &Path,
        import_library: &Path,
    ) -> Result<PathBuf, ForwarderError> {
        let dll_name = format!("{}.dll", self.ctx.config.output_module());

        self.run(
            self.tool(Tool::Linker)
                .arg("/DLL")
                .arg(format!("/OUT:{dll_name}"))
                .arg(format!("/DEF:{}", file_name(def_path)))
                .arg(format!("/MACHINE:{}", self.ctx.config.machine()))
                .arg(file_name(empty_obj))
                .arg(file_name(import_library)),
        )?;

        Ok(self.work_path(dll_name))
    }

    fn copy_output(&self, built_dll: &Path) -> Result<(), ForwarderError> {
        let output = self.ctx.config.output();

        if is_same_file(built_dll, output) {
            log::debug!("{} is already in place", output.display());
            return Ok(());
        }

        std::fs::copy(built_dll, output).map_err(|e| ForwarderError::io(output, e))?;
        log::debug!("copied {} to {}", built_dll.display(), output.display());
        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
