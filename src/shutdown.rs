use helion_core::ShutdownFlag;
use tracing::info;

/// Spawns a task that waits for `SIGINT` (Ctrl-C) or, on Unix, `SIGTERM`,
/// and sets `flag` once either arrives. Returns immediately; the caller's
/// main loop observes the flag at its own sleep boundary (§5), it is never
/// interrupted mid-tick.
pub fn install(flag: ShutdownFlag) {
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("shutdown signal received, finishing the current iteration");
        flag.request();
    });
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(_) => {
            // No SIGTERM handler available; fall back to Ctrl-C only.
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
