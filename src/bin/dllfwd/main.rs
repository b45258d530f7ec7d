use std::process::ExitCode;

use anyhow::{Context, Result};
use arguments::CliArgs;
use log::error;

use dllfwd::{
    config::{Environment, ForwarderConfig},
    forwarder::Forwarder,
    toolchain::{CommandRunner, MsvcLocator},
};

mod arguments;
mod logging;

/// cli entrypoint
fn main() -> ExitCode {
    let args = arguments::parse_arguments();

    if let Err(e) = logging::setup_logger(&args.options) {
        eprintln!("{}: error: {e}", env!("CARGO_BIN_NAME"));
        return ExitCode::FAILURE;
    }

    if let Err(e) = try_main(args) {
        error!("{e:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Main program entrypoint
fn try_main(args: CliArgs) -> Result<()> {
    let env = Environment::from_env();
    let machine = env.resolve_machine(args.options.machine)?;

    let config = ForwarderConfig::new(&args.input, &args.output, machine)?
        .use_temp_dir(!args.options.no_temp_dir);

    log::debug!(
        "forwarding {} to {} for {machine}",
        config.output_module(),
        config.input_module()
    );

    let locator = MsvcLocator::new(env.host_machine().unwrap_or(machine), machine, &env);

    Forwarder::new(config)
        .run(&locator, &CommandRunner)
        .with_context(|| format!("could not create {}", args.output.display()))?;

    Ok(())
}
