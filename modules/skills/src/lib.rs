pub mod error;
pub mod fetch;
pub mod price;
pub mod search;
pub mod x;

pub use error::SchemaError;

use std::io;
use std::process::ExitCode;

use serde::Serialize;
use skills_common::{config_error, Reporter, RunResult, SkillError, EXIT_ALL_FAILED};

/// Turn a skill's result into output and an exit status.
pub fn finish<T: Serialize>(result: Result<RunResult<T>, SkillError>, reporter: Reporter) -> ExitCode {
    let run = match result {
        Ok(run) => run,
        Err(e) => return config_error(&e),
    };

    let written = {
        let mut out = io::stdout().lock();
        let mut err = io::stderr().lock();
        reporter.report(&run, &mut out, &mut err)
    };

    match written {
        Ok(status) => status.into(),
        Err(e) => {
            eprintln!("error: failed to write output: {e}");
            ExitCode::from(EXIT_ALL_FAILED)
        }
    }
}
