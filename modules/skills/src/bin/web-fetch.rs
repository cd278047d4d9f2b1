use std::process::ExitCode;

use clap::Parser;
use skills::fetch::{self, FetchArgs};
use skills_common::{telemetry, Config};

#[tokio::main]
async fn main() -> ExitCode {
    telemetry::init_tracing();

    let args = FetchArgs::parse();
    let config = Config::from_env();

    skills::finish(fetch::execute(&config, args).await, fetch::REPORTER)
}
