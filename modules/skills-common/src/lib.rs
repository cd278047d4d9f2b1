pub mod config;
pub mod error;
pub mod outcome;
pub mod report;
pub mod retry;
pub mod runner;
pub mod telemetry;

pub use config::Config;
pub use error::{Result, SkillError};
pub use outcome::{Failure, Outcome, RunResult, WorkItem};
pub use report::{config_error, OutputFormat, Reporter, RunStatus, EXIT_ALL_FAILED, EXIT_CONFIG};
pub use retry::{Depth, FetchAttempt, RetryExhausted, RetryPolicy};
pub use runner::run_all;
