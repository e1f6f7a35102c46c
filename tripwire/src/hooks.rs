//! Lifecycle hooks for guarded runs.
//!
//! Implement [`RunHooks`] to observe a run as it moves through its phases:
//! audit logging, progress display, or assertions in tests. Hooks are
//! observers only; they cannot veto or alter a run.
//!
//! All methods have no-op defaults, so implementors override only what
//! they need.

use async_trait::async_trait;

use crate::agent::RunPhase;
use crate::guardrail::ClassificationVerdict;

/// Observer for [`GuardedRun`](crate::agent::GuardedRun) lifecycle events.
#[async_trait]
pub trait RunHooks: Send + Sync {
    /// Called after every phase transition.
    async fn on_transition(&self, _profile: &str, _from: RunPhase, _to: RunPhase) {}

    /// Called before a gate's classifier call is issued.
    async fn on_gate_start(&self, _phase: RunPhase, _gate: &str) {}

    /// Called after a gate produced a verdict.
    async fn on_gate_end(&self, _phase: RunPhase, _verdict: &ClassificationVerdict) {}

    /// Called right before the agent runtime is invoked.
    async fn on_agent_start(&self, _profile: &str) {}

    /// Called with the agent's full output, before any output gate runs.
    async fn on_agent_end(&self, _profile: &str, _output: &str) {}
}

/// [`RunHooks`] implementation that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRunHooks;

impl RunHooks for NoopRunHooks {}
