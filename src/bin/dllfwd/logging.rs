use std::io::{IsTerminal, Write};

use log::Level;
use termcolor::{BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

use crate::arguments::{CliOptionArgs, ColorOption};

struct CliLogger {
    stdout: BufferWriter,
    stderr: BufferWriter,
}

impl CliLogger {
    fn write_record(&self, record: &log::Record) -> std::io::Result<()> {
        let writer = if record.level() <= Level::Warn {
            &self.stderr
        } else {
            &self.stdout
        };

        let (tag, color) = match record.level() {
            Level::Error => ("error:", Color::Red),
            Level::Warn => ("warn:", Color::Yellow),
            Level::Info => ("info:", Color::Green),
            Level::Debug => ("debug:", Color::White),
            Level::Trace => ("trace:", Color::Blue),
        };

        let mut buffer = writer.buffer();
        write!(buffer, "{}: ", env!("CARGO_BIN_NAME"))?;

        let _ = buffer.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
        write!(buffer, "{tag}")?;
        buffer.reset()?;

        writeln!(buffer, " {}", record.args())?;
        writer.print(&buffer)
    }
}

impl log::Log for CliLogger {
    #[inline]
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        if record.args().as_str().is_some_and(|args| args.is_empty()) {
            return;
        }

        let _ = self.write_record(record);
    }

    fn flush(&self) {}
}

fn color_choice(option: ColorOption, is_terminal: bool) -> ColorChoice {
    match option {
        ColorOption::Never => ColorChoice::Never,
        ColorOption::Always => ColorChoice::Always,
        ColorOption::Auto => {
            if is_terminal
                && std::env::var("TERM")
                    .ok()
                    .is_none_or(|term| !term.eq_ignore_ascii_case("dumb"))
                && std::env::var_os("NO_COLOR").is_none_or(|v| v.is_empty())
            {
                ColorChoice::Auto
            } else {
                ColorChoice::Never
            }
        }
    }
}

/// Sets up logging for the cli
pub fn setup_logger(options: &CliOptionArgs) -> anyhow::Result<()> {
    log::set_boxed_logger(Box::from(CliLogger {
        stdout: BufferWriter::stdout(color_choice(
            options.color,
            std::io::stdout().is_terminal(),
        )),
        stderr: BufferWriter::stderr(color_choice(
            options.color,
            std::io::stderr().is_terminal(),
        )),
    }))
    .map(|()| {
        if options.verbose >= 2 {
            log::set_max_level(log::LevelFilter::Trace);
        } else if options.verbose >= 1 {
            log::set_max_level(log::LevelFilter::Debug);
        } else {
            log::set_max_level(log::LevelFilter::Info);
        }
    })?;

    Ok(())
}
