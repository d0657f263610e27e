//! gantt - Inspect Gantt task lists with the scheduling engine

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = gantt_engine::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
