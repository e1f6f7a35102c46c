//! Telemetry for guarded runs using the `tracing` ecosystem.
//!
//! The library only emits events and spans; installing a subscriber is the
//! binary's job:
//!
//! ```rust,ignore
//! tracing_subscriber::fmt::init();
//! ```

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

/// Metrics collected during one guarded run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunMetrics {
    /// Classifier calls issued, including failed ones.
    pub classifier_calls: usize,
    /// Gates that produced a verdict.
    pub gates_evaluated: usize,
    /// Whether the agent runtime was called.
    pub agent_invoked: bool,
    /// Total duration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
}

impl std::fmt::Display for RunMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Guarded Run Metrics")?;
        writeln!(f, "  Classifier calls: {}", self.classifier_calls)?;
        writeln!(f, "  Gates evaluated:  {}", self.gates_evaluated)?;
        writeln!(
            f,
            "  Agent invoked:    {}",
            if self.agent_invoked { "yes" } else { "no" }
        )?;
        if let Some(d) = self.duration {
            writeln!(f, "  Duration:         {:.2}s", d.as_secs_f64())?;
        }
        Ok(())
    }
}

/// Telemetry collector that integrates with tracing.
#[derive(Debug, Clone, Copy)]
pub struct Telemetry {
    start: Instant,
    metrics: RunMetrics,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl Telemetry {
    /// Create a new collector; the clock starts now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            metrics: RunMetrics::default(),
        }
    }

    /// Record that a gate's classifier call is about to be issued.
    pub fn record_classifier_call(&mut self, gate: &str) {
        self.metrics.classifier_calls += 1;
        debug!(gate, "classifier_call");
    }

    /// Record a gate verdict.
    pub fn record_verdict(&mut self, gate: &str, passed: bool) {
        self.metrics.gates_evaluated += 1;
        debug!(gate, passed, "gate_verdict");
    }

    /// Record the agent invocation.
    pub fn record_agent_call(&mut self, profile: &str) {
        self.metrics.agent_invoked = true;
        debug!(profile, "agent_invoked");
    }

    /// Complete the run and return final metrics.
    #[must_use]
    pub fn complete(&mut self, outcome: &str) -> RunMetrics {
        let duration = self.start.elapsed();
        self.metrics.duration = Some(duration);

        info!(
            outcome,
            classifier_calls = self.metrics.classifier_calls,
            gates_evaluated = self.metrics.gates_evaluated,
            agent_invoked = self.metrics.agent_invoked,
            duration_ms = duration.as_millis(),
            "run_completed"
        );

        self.metrics
    }

    /// Get current metrics snapshot.
    #[must_use]
    pub const fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }
}
