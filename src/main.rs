//! agentshift - Convert agent prompts, rules and skills between tool formats

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = agentshift::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
