use std::future::Future;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::outcome::{Failure, Outcome, RunResult, WorkItem};

/// Run `pipeline` over every target with at most `cap` items in flight.
///
/// Each item's error is captured as its own `Outcome::Failure`; siblings keep
/// running. The result holds exactly one outcome per target, in input order
/// regardless of completion order.
pub async fn run_all<T, F, Fut>(targets: Vec<String>, cap: usize, pipeline: F) -> RunResult<T>
where
    F: Fn(WorkItem) -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let total = targets.len();
    let cap = cap.max(1);
    info!(items = total, cap, "Starting fan-out");

    let tasks = targets.into_iter().enumerate().map(|(index, target)| {
        let item = WorkItem {
            index,
            target: target.clone(),
        };
        let fut = pipeline(item);
        async move {
            let outcome = match fut.await {
                Ok(value) => Outcome::Success(value),
                Err(e) => {
                    let error = format!("{e:#}");
                    warn!(item = %target, %error, "Work item failed");
                    Outcome::Failure(Failure {
                        item: target,
                        error,
                    })
                }
            };
            (index, outcome)
        }
    });

    let mut slots: Vec<(usize, Outcome<T>)> =
        stream::iter(tasks).buffer_unordered(cap).collect().await;
    slots.sort_by_key(|(index, _)| *index);

    let outcomes: Vec<Outcome<T>> = slots.into_iter().map(|(_, outcome)| outcome).collect();
    debug_assert_eq!(outcomes.len(), total);

    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    info!(items = total, failed, "Fan-out complete");

    RunResult::from(outcomes)
}
