// recodec-cli/src/signals.rs
//
// Shutdown signal handling. The first Ctrl+C or SIGTERM cancels the run: the
// pipeline stops before the next file and the running encode is killed. A
// second signal exits immediately.

use anyhow::{Context, Result};
use recodec_core::CancellationToken;
use std::thread;
use tokio::signal;

/// Exit status when a second signal forces the process down (128 + SIGINT).
pub const FORCED_EXIT_CODE: i32 = 130;

/// Cancels `token` when a shutdown signal arrives.
///
/// The signal listeners run on a small current-thread runtime in a background
/// thread; the pipeline itself stays synchronous.
pub fn install_shutdown_handler(token: CancellationToken) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build signal handling runtime")?;

    thread::Builder::new()
        .name("recodec-signals".to_string())
        .spawn(move || {
            runtime.block_on(async move {
                shutdown_signal().await;
                log::warn!("Shutdown requested, stopping the running encode");
                token.cancel();

                shutdown_signal().await;
                log::error!("Second shutdown signal, exiting immediately");
                std::process::exit(FORCED_EXIT_CODE);
            });
        })
        .context("Failed to spawn signal handling thread")?;
    Ok(())
}

/// Waits for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                log::warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
