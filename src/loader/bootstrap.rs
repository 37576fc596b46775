//! Startup wiring: run auto-detection once the document is ready.

use crate::loader::scheduler::{LoadReport, PluginLoader};
use tokio::task::JoinHandle;

/// Spawn the auto-detect pass for when the document becomes ready.
///
/// If the document is already ready the pass still waits one scheduler
/// tick, so callers can finish registering plugins first.
pub fn start(loader: PluginLoader) -> JoinHandle<Option<LoadReport>> {
    tokio::spawn(async move {
        let document = loader.environment().document.clone();
        if document.ready_state().is_ready() {
            tokio::task::yield_now().await;
        } else {
            diag!(loader.config().debug, "Waiting for document ready");
            document.wait_ready().await;
        }
        loader.auto_detect().await
    })
}
