use xet_core::logging;

mod cli;

use crate::cli::CliCommand;

fn main() {
    // Initialize logging as early as possible; stderr if the state dir is unusable.
    match logging::init_logging() {
        Ok(path) => tracing::info!(path = %path.display(), "logging initialized"),
        Err(file_err) => match logging::init_logging_stderr() {
            Ok(()) => tracing::warn!("file logging unavailable, using stderr: {file_err:#}"),
            Err(e) => eprintln!("xet: logging disabled: {file_err:#}; {e:#}"),
        },
    }

    if let Err(err) = CliCommand::run_from_args() {
        eprintln!("xet error: {:#}", err);
        std::process::exit(1);
    }
}
