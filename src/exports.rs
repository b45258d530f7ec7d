//! Export symbol extraction from `dumpbin /EXPORTS` listings.
//!
//! The export table in the listing looks like this.
//! ```text
//!     ordinal hint RVA      name
//!
//!           1    0 00001000 Foo
//!           2    1 00001010 Bar
//!
//!   Summary
//! ```

use std::path::Path;

use crate::{
    error::{ExternalToolError, ForwarderError},
    toolchain::{Tool, ToolRunner, Toolchain},
};

const TABLE_HEADER: &str = "ordinal";
const TABLE_END: &str = "Summary";

/// Parses the exported symbol names out of an export listing.
///
/// Returns `None` if the listing has no export table header. A header followed
/// by no rows is an empty export list.
pub fn parse_export_listing(listing: &str) -> Option<Vec<String>> {
    let mut lines = listing.lines().map(str::trim);

    lines.by_ref().find(|line| line.starts_with(TABLE_HEADER))?;

    Some(
        lines
            .take_while(|line| !line.starts_with(TABLE_END))
            .filter_map(|line| line.split_whitespace().next_back())
            .map(String::from)
            .collect(),
    )
}

/// Runs `dumpbin /EXPORTS` on `dll` and returns its exported symbol names in
/// listing order.
pub fn extract_exports(
    toolchain: &Toolchain,
    runner: &dyn ToolRunner,
    dll: &Path,
    work_dir: &Path,
) -> Result<Vec<String>, ForwarderError> {
    let invocation = toolchain
        .invocation(Tool::Dumpbin)
        .args(["/NOLOGO", "/EXPORTS"])
        .arg(dll)
        .current_dir(work_dir);

    log::debug!("{}", invocation.display());
    let output = runner.run(&invocation)?;

    let symbols = parse_export_listing(&output.stdout).ok_or_else(|| {
        ExternalToolError::MissingExportHeader {
            path: dll.to_path_buf(),
        }
    })?;

    if symbols.is_empty() {
        log::warn!("{} does not export any symbols", dll.display());
    }

    for symbol in &symbols {
        log::trace!("export: {symbol}");
    }

    Ok(symbols)
}
