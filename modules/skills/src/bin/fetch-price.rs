use std::process::ExitCode;

use clap::Parser;
use skills::price::{self, PriceArgs};
use skills_common::{telemetry, Config};

#[tokio::main]
async fn main() -> ExitCode {
    telemetry::init_tracing();

    let args = PriceArgs::parse();
    let config = Config::from_env();

    skills::finish(price::execute(&config, args).await, price::REPORTER)
}
