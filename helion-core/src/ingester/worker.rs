use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::Utc;
use helion_model::Status;

use super::request::{Reply, Request};
use crate::plugin::{root_cause_first_line, PluginFactory};

/// Runs up to `worker_count` OS threads (via `spawn_blocking`, since a
/// plugin call may block for seconds to minutes) pulling from a shared
/// request queue, and returns every reply collected before the threads
/// exited.
///
/// The request channel is closed (all senders dropped) rather than fed an
/// explicit sentinel value per worker — the idiomatic Rust equivalent the
/// design notes call out for languages whose channels support it. A worker
/// whose plugin fails to construct reports every request it would have
/// handled as a `FAILURE` rather than silently dropping them.
pub async fn dispatch(requests: Vec<Request>, worker_count: usize, factory: Arc<dyn PluginFactory>) -> Vec<Reply> {
    if requests.is_empty() || worker_count == 0 {
        return Vec::new();
    }

    let (req_tx, req_rx) = mpsc::channel::<Request>();
    for req in requests {
        if req_tx.send(req).is_err() {
            break;
        }
    }
    drop(req_tx);
    let req_rx = Arc::new(Mutex::new(req_rx));

    let (reply_tx, reply_rx) = mpsc::channel::<Reply>();

    let mut handles = Vec::with_capacity(worker_count);
    for _ in 0..worker_count {
        let req_rx = Arc::clone(&req_rx);
        let reply_tx = reply_tx.clone();
        let factory = Arc::clone(&factory);
        handles.push(tokio::task::spawn_blocking(move || worker_loop(req_rx, reply_tx, factory)));
    }
    drop(reply_tx);

    for handle in handles {
        if let Err(err) = handle.await {
            tracing::error!(error = %err, "ingest worker thread panicked");
        }
    }

    reply_rx.try_iter().collect()
}

fn worker_loop(
    req_rx: Arc<Mutex<mpsc::Receiver<Request>>>,
    reply_tx: mpsc::Sender<Reply>,
    factory: Arc<dyn PluginFactory>,
) {
    let mut plugin = match factory.build() {
        Ok(plugin) => plugin,
        Err(err) => {
            let message = root_cause_first_line(&err);
            drain_as_failures(&req_rx, &reply_tx, &message);
            return;
        }
    };

    loop {
        let request = match next_request(&req_rx) {
            Some(r) => r,
            None => break,
        };

        let timestamp = Utc::now();
        let started = Instant::now();
        let outcome = plugin.execute(&request.filepath);
        let duration = started.elapsed();
        let version = Some(plugin.version());

        let reply = match outcome {
            Ok(()) => Reply {
                id: request.id,
                version,
                timestamp,
                duration,
                message: None,
                status: Status::Success,
            },
            Err(err) => Reply {
                id: request.id,
                version,
                timestamp,
                duration,
                message: Some(root_cause_first_line(&err)),
                status: Status::Failure,
            },
        };

        if reply_tx.send(reply).is_err() {
            break;
        }
    }
}

fn next_request(req_rx: &Arc<Mutex<mpsc::Receiver<Request>>>) -> Option<Request> {
    let guard = req_rx.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.recv().ok()
}

/// A plugin that fails to construct cannot process anything; every request
/// this worker would have handled is reported as a failure rather than
/// silently vanishing into an `UNKNOWN` at reap time.
fn drain_as_failures(req_rx: &Arc<Mutex<mpsc::Receiver<Request>>>, reply_tx: &mpsc::Sender<Reply>, message: &str) {
    while let Some(request) = next_request(req_rx) {
        let reply = Reply {
            id: request.id,
            version: None,
            timestamp: Utc::now(),
            duration: std::time::Duration::ZERO,
            message: Some(message.to_string()),
            status: Status::Failure,
        };
        if reply_tx.send(reply).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::IngestPlugin;
    use std::path::Path;

    struct AlwaysSucceeds;
    impl IngestPlugin for AlwaysSucceeds {
        fn execute(&mut self, _path: &Path) -> anyhow::Result<()> {
            Ok(())
        }
        fn version(&self) -> String {
            "v1.0".to_string()
        }
    }

    struct AlwaysFails;
    impl IngestPlugin for AlwaysFails {
        fn execute(&mut self, _path: &Path) -> anyhow::Result<()> {
            anyhow::bail!("repository unreachable")
        }
        fn version(&self) -> String {
            "v1.0".to_string()
        }
    }

    struct Factory<F>(F);
    impl<F: Fn() -> anyhow::Result<Box<dyn IngestPlugin>> + Send + Sync> PluginFactory for Factory<F> {
        fn build(&self) -> anyhow::Result<Box<dyn IngestPlugin>> {
            (self.0)()
        }
    }

    fn requests(n: i64) -> Vec<Request> {
        (0..n)
            .map(|id| Request {
                id,
                filepath: std::path::PathBuf::from(format!("/storage/{id}.fits")),
            })
            .collect()
    }

    #[tokio::test]
    async fn every_request_gets_exactly_one_reply() {
        let factory: Arc<dyn PluginFactory> = Arc::new(Factory(|| Ok(Box::new(AlwaysSucceeds) as Box<dyn IngestPlugin>)));
        let replies = dispatch(requests(5), 2, factory).await;
        assert_eq!(replies.len(), 5);
        assert!(replies.iter().all(|r| r.status == Status::Success));

        let mut ids: Vec<_> = replies.iter().map(|r| r.id).collect();
        ids.sort();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn plugin_failures_surface_as_failure_replies_with_root_cause() {
        let factory: Arc<dyn PluginFactory> = Arc::new(Factory(|| Ok(Box::new(AlwaysFails) as Box<dyn IngestPlugin>)));
        let replies = dispatch(requests(1), 1, factory).await;
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].status, Status::Failure);
        assert_eq!(replies[0].message.as_deref(), Some("repository unreachable"));
    }

    #[tokio::test]
    async fn empty_request_list_dispatches_no_workers() {
        let factory: Arc<dyn PluginFactory> = Arc::new(Factory(|| Ok(Box::new(AlwaysSucceeds) as Box<dyn IngestPlugin>)));
        let replies = dispatch(Vec::new(), 4, factory).await;
        assert!(replies.is_empty());
    }
}
