use std::process::ExitCode;

use clap::Parser;
use skills::search::{self, SearchArgs};
use skills_common::{telemetry, Config};

#[tokio::main]
async fn main() -> ExitCode {
    telemetry::init_tracing();

    let args = SearchArgs::parse();
    let config = Config::from_env();

    skills::finish(search::execute(&config, args).await, search::REPORTER)
}
