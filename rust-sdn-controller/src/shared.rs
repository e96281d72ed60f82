//! Controller handle for concurrent callers.
//!
//! `Controller` itself is single-caller: lookup, rule installation and metric
//! updates are read-modify-write sequences. `SharedController` serialises all
//! of them behind one async mutex.

use rust_sdn_common::{metrics::PerformanceMetrics, Packet, Result};
use rust_sdn_flow::{Action, ActionOutcome, FlowMatch};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::{Controller, PerformanceReport};

#[derive(Debug, Clone)]
pub struct SharedController {
    inner: Arc<Mutex<Controller>>,
}

impl SharedController {
    pub fn new(controller: Controller) -> Self {
        Self {
            inner: Arc::new(Mutex::new(controller)),
        }
    }

    pub async fn process_packet(&self, switch_id: &str, packet: Packet) -> Result<ActionOutcome> {
        self.inner.lock().await.process_packet(switch_id, packet)
    }

    pub async fn add_flow_rule(
        &self,
        switch_id: &str,
        flow_match: FlowMatch,
        action: Action,
    ) -> Result<u32> {
        self.inner.lock().await.add_flow_rule(switch_id, flow_match, action)
    }

    pub async fn performance_report(&self) -> PerformanceReport {
        self.inner.lock().await.performance_report()
    }

    /// Copy of the current metrics.
    pub async fn metrics(&self) -> PerformanceMetrics {
        self.inner.lock().await.metrics().clone()
    }

    pub async fn reset_metrics(&self) {
        self.inner.lock().await.reset_metrics();
    }

    /// Runs `f` with exclusive access to the controller.
    pub async fn with<R>(&self, f: impl FnOnce(&mut Controller) -> R) -> R {
        let mut controller = self.inner.lock().await;
        f(&mut controller)
    }
}
