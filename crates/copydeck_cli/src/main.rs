//! CLI smoke entry point.
//!
//! Opens the database given as the first argument (in-memory when absent),
//! applies migrations and prints the public timeline size.

use copydeck_core::{core_version, CoreConfig, CoreContext};
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = match std::env::args_os().nth(1) {
        Some(path) => CoreConfig::with_db_path(path),
        None => CoreConfig::default(),
    };

    println!("copydeck_core version={}", core_version());
    match run(&config) {
        Ok(count) => {
            println!("copydeck_core timeline_entries={count}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("copydeck_core error={err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &CoreConfig) -> copydeck_core::CoreResult<usize> {
    let context = CoreContext::open(config)?;
    let count = context.timeline()?.len();
    context.close()?;
    Ok(count)
}
