//! mixctx - project context and umbrella orchestration

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = mix_context::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
