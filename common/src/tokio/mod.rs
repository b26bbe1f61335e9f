//! Thin layer over the tokio runtime.
//!
//! Tasks are spawned through [`spawn_task`] so that every background task
//! carries a name in the logs.

use std::future::Future;

use log::trace;

pub use tokio::{sync, task::JoinHandle, time};

/// Spawn a named task on the current runtime.
pub fn spawn_task<F>(name: &'static str, future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    if log::log_enabled!(log::Level::Trace) {
        trace!("Spawning task {}", name);
    }
    tokio::spawn(future)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawn_task() {
        let handle = spawn_task("test", async { 42 });
        assert_eq!(handle.await.unwrap(), 42);
    }
}
