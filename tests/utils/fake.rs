use std::{cell::RefCell, path::Path};

use dllfwd::{
    error::{ExternalToolError, ToolchainError},
    toolchain::{Tool, ToolInvocation, ToolOutput, ToolRunner, Toolchain, ToolchainLocator},
};

/// A toolchain whose tools do not exist.
#[allow(unused)]
pub fn fake_toolchain() -> Toolchain {
    Toolchain::new(
        "C:/VS/bin/cl.exe",
        "C:/VS/bin/lib.exe",
        "C:/VS/bin/link.exe",
        "C:/VS/bin/dumpbin.exe",
    )
}

/// Hands out a fixed toolchain, or fails like a machine without one.
pub struct FakeLocator(pub Option<Toolchain>);

#[allow(unused)]
impl FakeLocator {
    pub fn new() -> FakeLocator {
        Self(Some(fake_toolchain()))
    }
}

impl ToolchainLocator for FakeLocator {
    fn locate(&self) -> Result<Toolchain, ToolchainError> {
        self.0.clone().ok_or(ToolchainError::NotFound {
            tool: Tool::Compiler,
        })
    }
}

/// Records tool invocations and imitates their outputs.
///
/// The compiler, librarian and linker create their output files in the
/// invocation working directory. The linker writes the contents of the
/// definition file it was given into the DLL so the final copy can be
/// checked.
#[derive(Debug, Default)]
pub struct FakeTools {
    listing: String,
    fail: Option<Tool>,
    calls: RefCell<Vec<ToolInvocation>>,
}

#[allow(unused)]
impl FakeTools {
    /// `dumpbin /EXPORTS` reports `symbols`.
    pub fn with_exports(symbols: &[&str]) -> FakeTools {
        let mut listing = String::from(
            "\nDump of file input.dll\n\nFile Type: DLL\n\n    ordinal hint RVA      name\n\n",
        );

        for (idx, symbol) in symbols.iter().enumerate() {
            listing.push_str(&format!(
                "{:>11} {:>4X} {:08X} {symbol}\n",
                idx + 1,
                idx,
                0x1000 + idx * 0x10
            ));
        }

        listing.push_str("\n  Summary\n\n        1000 .rdata\n");
        Self::with_listing(listing)
    }

    /// `dumpbin /EXPORTS` prints `listing`.
    pub fn with_listing(listing: impl Into<String>) -> FakeTools {
        Self {
            listing: listing.into(),
            ..Default::default()
        }
    }

    /// Makes `tool` fail.
    pub fn fail_on(mut self, tool: Tool) -> Self {
        self.fail = Some(tool);
        self
    }

    pub fn calls(&self) -> Vec<ToolInvocation> {
        self.calls.borrow().clone()
    }

    pub fn tools(&self) -> Vec<Tool> {
        self.calls.borrow().iter().map(|call| call.tool()).collect()
    }

    pub fn call(&self, tool: Tool) -> ToolInvocation {
        self.calls
            .borrow()
            .iter()
            .find(|call| call.tool() == tool)
            .cloned()
            .unwrap_or_else(|| panic!("{tool} was not invoked"))
    }

    pub fn args(&self, tool: Tool) -> Vec<String> {
        self.call(tool)
            .get_args()
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }
}

fn flag_value(invocation: &ToolInvocation, flag: &str) -> Option<String> {
    invocation.get_args().iter().find_map(|arg| {
        let arg = arg.to_string_lossy();
        let (name, value) = arg.split_once(':')?;
        name.eq_ignore_ascii_case(flag).then(|| value.to_string())
    })
}

fn write(dir: &Path, name: &str, contents: impl AsRef<[u8]>) -> Result<(), ExternalToolError> {
    std::fs::write(dir.join(name), contents).map_err(|error| ExternalToolError::Spawn {
        tool: Tool::Compiler,
        error,
    })
}

impl ToolRunner for FakeTools {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ExternalToolError> {
        self.calls.borrow_mut().push(invocation.clone());

        if self.fail == Some(invocation.tool()) {
            return Err(ExternalToolError::Spawn {
                tool: invocation.tool(),
                error: std::io::Error::other("simulated failure"),
            });
        }

        let dir = invocation
            .get_current_dir()
            .expect("tools should run in the working directory");

        match invocation.tool() {
            Tool::Compiler => write(dir, "empty.obj", b"")?,
            Tool::Dumpbin => {
                return Ok(ToolOutput {
                    stdout: self.listing.clone(),
                    stderr: String::new(),
                });
            }
            Tool::Librarian => {
                let out = flag_value(invocation, "/out").expect("lib.exe needs /out");
                write(dir, &out, b"!<arch>\n")?;
            }
            Tool::Linker => {
                let out = flag_value(invocation, "/OUT").expect("link.exe needs /OUT");
                let def = flag_value(invocation, "/DEF").expect("link.exe needs /DEF");
                let contents = std::fs::read(dir.join(def)).expect("def file should exist");
                write(dir, &out, contents)?;
            }
        }

        Ok(ToolOutput::default())
    }
}
