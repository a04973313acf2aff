//! Guildtrack CLI - plugin-driven utilities for community game tracking

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = guildtrack::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
