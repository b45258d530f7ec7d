//! Writer for Windows [Module-Definition (.Def) Files](https://learn.microsoft.com/en-us/cpp/build/reference/module-definition-dot-def-files)
//!
//! Only the `LIBRARY` and `EXPORTS` statements are produced.
//! ```text
//! LIBRARY output.dll
//! EXPORTS
//!   Foo = input.Foo
//!   Bar = input.Bar
//! ```
//!
//! Export names are written as is without quoting.

/// One definition in the `EXPORTS` statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExportEntry {
    name: String,
    forward: Option<String>,
}

impl ExportEntry {
    /// A plain export.
    pub fn new(name: impl Into<String>) -> ExportEntry {
        Self {
            name: name.into(),
            forward: None,
        }
    }

    /// An export forwarded to `module.name`.
    pub fn forwarded(name: impl Into<String>, module: &str) -> ExportEntry {
        let name = name.into();
        let forward = format!("{module}.{name}");
        Self {
            name,
            forward: Some(forward),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the `other_module.exported_name` forward target if present.
    #[inline]
    pub fn forward(&self) -> Option<&str> {
        self.forward.as_deref()
    }
}

impl std::fmt::Display for ExportEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.forward {
            Some(forward) => write!(f, "{} = {forward}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// A module-definition file for a DLL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleDefinition {
    library: String,
    exports: Vec<ExportEntry>,
}

impl ModuleDefinition {
    /// Definition for `library` exporting each symbol directly.
    ///
    /// Used for building an import library of an existing DLL.
    pub fn exports<I>(library: impl Into<String>, symbols: I) -> ModuleDefinition
    where
        I: IntoIterator,
        <I as IntoIterator>::Item: Into<String>,
    {
        Self {
            library: library.into(),
            exports: symbols.into_iter().map(ExportEntry::new).collect(),
        }
    }

    /// Definition for `library` forwarding each symbol to the same name in
    /// `target`.
    pub fn forwards<I>(library: impl Into<String>, target: &str, symbols: I) -> ModuleDefinition
    where
        I: IntoIterator,
        <I as IntoIterator>::Item: Into<String>,
    {
        Self {
            library: library.into(),
            exports: symbols
                .into_iter()
                .map(|symbol| ExportEntry::forwarded(symbol, target))
                .collect(),
        }
    }

    /// Module name without the `.dll` extension.
    #[inline]
    pub fn library(&self) -> &str {
        &self.library
    }

    #[inline]
    pub fn entries(&self) -> &[ExportEntry] {
        &self.exports
    }

    /// File name used for the definition file (`<library>.def`).
    pub fn file_name(&self) -> String {
        format!("{}.def", self.library)
    }

    /// Renders the file contents.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for ModuleDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "LIBRARY {}.dll", self.library)?;
        writeln!(f, "EXPORTS")?;
        self.exports
            .iter()
            .try_for_each(|entry| writeln!(f, "  {entry}"))
    }
}
