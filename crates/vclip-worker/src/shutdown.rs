//! Graceful shutdown signal (§5: stop reserving new tasks, drain in-flight
//! tasks up to a bounded window, then close client connections).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::info;

#[derive(Clone)]
pub struct Shutdown {
    triggered: Arc<AtomicBool>,
}

impl Shutdown {
    /// Spawn a task that flips the signal on SIGINT/ctrl-c.
    pub fn install() -> Self {
        let triggered = Arc::new(AtomicBool::new(false));
        let flag = triggered.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            info!("shutdown signal received, draining in-flight tasks");
            flag.store(true, Ordering::SeqCst);
        });
        Self { triggered }
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }
}
