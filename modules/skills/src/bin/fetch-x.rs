use std::process::ExitCode;

use clap::Parser;
use skills::x::{self, XArgs};
use skills_common::{telemetry, Config};

#[tokio::main]
async fn main() -> ExitCode {
    telemetry::init_tracing();

    let args = XArgs::parse();
    let config = Config::from_env();

    skills::finish(x::execute(&config, args).await, x::REPORTER)
}
