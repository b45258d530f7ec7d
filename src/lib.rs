//! Create Windows DLLs that forward every export to another DLL.
//!
//! The exports of the input DLL are listed with `dumpbin`, written to two
//! module-definition files and linked into a new DLL whose export table
//! forwards each symbol to `<input>.<symbol>`.
//!
//! ```no_run
//! use dllfwd::{
//!     config::{Environment, ForwarderConfig},
//!     forwarder::Forwarder,
//!     toolchain::{CommandRunner, MsvcLocator},
//! };
//!
//! # fn main() -> Result<(), dllfwd::error::ForwarderError> {
//! let env = Environment::from_env();
//! let machine = env.resolve_machine(None)?;
//! let config = ForwarderConfig::new("python3.dll", "python3_compat.dll", machine)?;
//!
//! let locator = MsvcLocator::new(env.host_machine().unwrap_or(machine), machine, &env);
//! Forwarder::new(config).run(&locator, &CommandRunner)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod exports;
pub mod forwarder;
pub mod machine;
pub mod moduledef;
pub mod toolchain;
