use crate::application::learning::{ContinuousLearningController, SweepSummary};
use std::sync::Arc;
use tracing::{info, warn};

pub struct ShutdownService {
    controller: Arc<ContinuousLearningController>,
}

impl ShutdownService {
    pub fn new(controller: Arc<ContinuousLearningController>) -> Self {
        Self { controller }
    }

    /// Stop the sweep task, resolve whatever has matured, and report the final state.
    ///
    /// Returns the summary of the final sweep.
    pub async fn shutdown(&self) -> SweepSummary {
        info!("Initiating Graceful Shutdown Sequence...");

        // 1. Stop periodic outcome logging
        info!("Step 1: Stopping periodic outcome logging...");
        if !self.controller.logger().stop_periodic_logging().await {
            info!("Periodic outcome logging was not running.");
        }

        // 2. Resolve matured predictions one last time
        info!("Step 2: Running final outcome sweep...");
        let summary = self.controller.logger().check_and_log_outcomes().await;
        if summary.failed_symbols.is_empty() {
            info!("Final sweep resolved {} outcome(s).", summary.resolved);
        } else {
            warn!(
                "Final sweep resolved {} outcome(s); no price for {:?}",
                summary.resolved, summary.failed_symbols
            );
        }

        // 3. Report the A/B test left running, if any
        if let Some(test) = self.controller.current_ab_test().await {
            info!(
                "Step 3: A/B test {} left running ({} vs {}); not concluded on exit.",
                test.id, test.control_model_id, test.treatment_model_id
            );
        }

        // 4. Log final registry state
        let stats = self.controller.registry().stats().await;
        let pending = self.controller.logger().pending_count().await;
        info!(
            "Final state: {} model(s), {} outcome(s) logged, {} prediction(s) still pending.",
            stats.total_models, stats.total_predictions, pending
        );

        info!("Graceful Shutdown Complete. Goodbye!");
        summary
    }
}
