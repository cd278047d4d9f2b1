use std::io::{self, Write};
use std::process::ExitCode;

use serde::Serialize;

use crate::outcome::RunResult;

/// Exit status when every work item failed.
pub const EXIT_ALL_FAILED: u8 = 1;
/// Exit status for startup errors (missing credential, bad argument).
pub const EXIT_CONFIG: u8 = 2;

/// How successful records are laid out on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One JSON array holding every success.
    Array,
    /// One JSON object per line.
    Lines,
    /// A single JSON object, for skills that take exactly one item.
    Single,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    AllFailed,
}

impl From<RunStatus> for ExitCode {
    fn from(status: RunStatus) -> Self {
        match status {
            RunStatus::Success => ExitCode::SUCCESS,
            RunStatus::AllFailed => ExitCode::from(EXIT_ALL_FAILED),
        }
    }
}

/// Writes a run's successes to stdout and its failures to stderr.
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    format: OutputFormat,
    /// Singular and plural noun for a work item, e.g. ("query", "queries").
    noun: (&'static str, &'static str),
}

impl Reporter {
    pub const fn new(format: OutputFormat, singular: &'static str, plural: &'static str) -> Self {
        Self {
            format,
            noun: (singular, plural),
        }
    }

    pub fn report<T: Serialize>(
        &self,
        run: &RunResult<T>,
        out: &mut impl Write,
        err: &mut impl Write,
    ) -> io::Result<RunStatus> {
        match self.format {
            OutputFormat::Array => {
                let records: Vec<&T> = run.successes().collect();
                if !records.is_empty() {
                    serde_json::to_writer(&mut *out, &records)?;
                    writeln!(out)?;
                }
            }
            OutputFormat::Lines => {
                for record in run.successes() {
                    serde_json::to_writer(&mut *out, record)?;
                    writeln!(out)?;
                }
            }
            OutputFormat::Single => {
                if let Some(record) = run.successes().next() {
                    serde_json::to_writer(&mut *out, record)?;
                    writeln!(out)?;
                }
            }
        }
        out.flush()?;

        for failure in run.failures() {
            writeln!(
                err,
                "warning: {} {:?} failed: {}",
                self.noun.0, failure.item, failure.error
            )?;
        }

        if run.all_failed() {
            if run.len() > 1 {
                writeln!(err, "error: all {} failed", self.noun.1)?;
            } else {
                writeln!(err, "error: {} failed", self.noun.0)?;
            }
            return Ok(RunStatus::AllFailed);
        }

        Ok(RunStatus::Success)
    }
}

/// Print a startup error and return the config exit status.
pub fn config_error(err: &dyn std::fmt::Display) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(EXIT_CONFIG)
}
