//! Binary entrypoint for the `actionables` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    actionables::logging::init();

    // Recording is handled in commands::dispatch via ACTIONABLES_RECORD=<dir>.
    match actionables::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
