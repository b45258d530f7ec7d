use std::path::PathBuf;

use clap::{ArgAction, Args, CommandFactory, Parser, ValueEnum, error::ErrorKind};
use dllfwd::machine::Machine;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_SHORT_HASH"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_BIN_NAME"), version = VERSION, about, long_about = None)]
pub struct CliArgs {
    /// Path to the input DLL
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Path to the output DLL
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    #[command(flatten)]
    pub options: CliOptionArgs,
}

#[derive(Args, Debug)]
pub struct CliOptionArgs {
    /// Target machine [default: from 'target_platform' or 'PROCESSOR_ARCHITECTURE']
    #[arg(long, value_enum, ignore_case = true, value_name = "MACHINE")]
    pub machine: Option<Machine>,

    /// Build in the current directory and keep the intermediate files
    #[arg(long)]
    pub no_temp_dir: bool,

    /// Use colors in log messages
    #[arg(long, value_enum, default_value_t = ColorOption::Auto, value_name = "WHEN")]
    pub color: ColorOption,

    /// Increase logging verbosity
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Color options for the logger
#[derive(ValueEnum, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorOption {
    /// Automatically use colors depending on the environment
    #[value(name = "auto")]
    #[default]
    Auto,

    /// Always use colors
    #[value(name = "always")]
    Always,

    /// Never use colors
    #[value(name = "never")]
    Never,
}

impl std::fmt::Display for ColorOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(v) = self.to_possible_value() {
            write!(f, "{}", v.get_name())?;
        }

        Ok(())
    }
}

impl From<ColorOption> for termcolor::ColorChoice {
    fn from(value: ColorOption) -> Self {
        match value {
            ColorOption::Auto => Self::Auto,
            ColorOption::Always => Self::Always,
            ColorOption::Never => Self::Never,
        }
    }
}

/// Parses the command line with `@file` response files expanded.
pub fn parse_arguments() -> CliArgs {
    let args = argfile::expand_args(argfile::parse_fromfile, argfile::PREFIX)
        .unwrap_or_else(|e| CliArgs::command().error(ErrorKind::Io, e).exit());

    CliArgs::parse_from(args)
}
