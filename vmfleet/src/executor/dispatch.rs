//! Dispatch of batch items.

use std::future::Future;

use futures::future::join_all;
use serde::{Deserialize, Serialize};

/// How the items of one batch are run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Run all items concurrently using `join_all`. Each item still holds
    /// its own session lock.
    ///
    /// Every item starts before any result is in, so an unreachable
    /// engine does not turn the remaining items into not-attempted ones.
    /// That batch abort only applies to `Sequential`.
    Parallel,
    /// Run items one after another, in selection order.
    #[default]
    Sequential,
}

/// Run `run` over `items` according to `mode`, returning outputs in item
/// order either way.
pub(crate) async fn dispatch<T, F, Fut>(mode: ExecutionMode, items: Vec<T>, run: F) -> Vec<Fut::Output>
where
    F: Fn(T) -> Fut,
    Fut: Future,
{
    match mode {
        ExecutionMode::Parallel => join_all(items.into_iter().map(run)).await,
        ExecutionMode::Sequential => {
            let mut outputs = Vec::with_capacity(items.len());
            for item in items {
                outputs.push(run(item).await);
            }
            outputs
        }
    }
}
