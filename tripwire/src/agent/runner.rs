//! Drives a guarded request through its gates and the agent.
//!
//! # Execution Flow
//!
//! ```text
//! Runner::run(profile, message)
//!   ├─ input gates       (sequential, first veto: InputBlocked)
//!   ├─ agent runtime     (single call, full output)
//!   └─ output gates      (sequential, first veto: OutputBlocked)
//! ```
//!
//! Any classifier or agent failure ends the run with
//! [`PipelineResult::UpstreamError`]. Nothing is retried and no gate is
//! skipped on failure.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{Instrument, debug, info_span, warn};

use super::{AgentProfile, AgentRuntime, CompletionAgent, PipelineResult, RunPhase, RunReport};
use crate::classifier::{Classifier, ModelClassifier};
use crate::error::UpstreamError;
use crate::guardrail::{ClassificationVerdict, GateSpec};
use crate::hooks::{NoopRunHooks, RunHooks};
use crate::providers::CompletionModel;
use crate::telemetry::{RunMetrics, Telemetry};

/// Stateless engine that evaluates guarded requests.
///
/// `Runner` holds only shared, read-only collaborators. All per-request
/// state lives in a [`GuardedRun`], so concurrent runs never interfere.
#[derive(Clone)]
pub struct Runner {
    classifier: Arc<dyn Classifier>,
    runtime: Arc<dyn AgentRuntime>,
    hooks: Arc<dyn RunHooks>,
}

impl fmt::Debug for Runner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runner").finish_non_exhaustive()
    }
}

impl Runner {
    /// Create a runner with no hooks.
    #[must_use]
    pub fn new(classifier: Arc<dyn Classifier>, runtime: Arc<dyn AgentRuntime>) -> Self {
        Self {
            classifier,
            runtime,
            hooks: Arc::new(NoopRunHooks),
        }
    }

    /// Use one completion model for both gate classification and the agent,
    /// each call bounded by `timeout`.
    #[must_use]
    pub fn with_model<M>(model: Arc<M>, timeout: Duration) -> Self
    where
        M: CompletionModel + 'static,
    {
        let classifier = ModelClassifier::new(Arc::clone(&model)).with_timeout(timeout);
        let runtime = CompletionAgent::new(model).with_timeout(timeout);
        Self::new(Arc::new(classifier), Arc::new(runtime))
    }

    /// Attach lifecycle hooks.
    #[must_use]
    pub fn with_hooks(mut self, hooks: Arc<dyn RunHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Begin a run in [`RunPhase::Idle`] without doing any work.
    ///
    /// Use [`GuardedRun::advance`] to step through it, or
    /// [`GuardedRun::finish`] to drive it to completion.
    #[must_use]
    pub fn start<'a>(&'a self, profile: &'a AgentProfile, message: &'a str) -> GuardedRun<'a> {
        GuardedRun {
            runner: self,
            profile,
            message,
            phase: RunPhase::Idle,
            output: None,
            result: None,
            verdicts: Vec::new(),
            telemetry: Telemetry::new(),
        }
    }

    /// Run `message` through `profile` and return the outcome.
    pub async fn run(&self, profile: &AgentProfile, message: &str) -> PipelineResult {
        self.run_detailed(profile, message).await.result
    }

    /// Like [`Runner::run`], but also returns verdicts and metrics.
    pub async fn run_detailed(&self, profile: &AgentProfile, message: &str) -> RunReport {
        let span = info_span!("guarded_run", profile = profile.name());
        self.start(profile, message).finish().instrument(span).await
    }
}

/// State of a single guarded request.
///
/// Each [`advance`](Self::advance) performs exactly one transition. Terminal
/// phases are sticky: advancing them does nothing.
pub struct GuardedRun<'a> {
    runner: &'a Runner,
    profile: &'a AgentProfile,
    message: &'a str,
    phase: RunPhase,
    output: Option<String>,
    result: Option<PipelineResult>,
    verdicts: Vec<ClassificationVerdict>,
    telemetry: Telemetry,
}

impl fmt::Debug for GuardedRun<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardedRun")
            .field("profile", &self.profile.name())
            .field("phase", &self.phase)
            .field("verdicts", &self.verdicts)
            .finish_non_exhaustive()
    }
}

impl GuardedRun<'_> {
    /// Returns the current phase.
    #[must_use]
    pub const fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Verdicts produced so far, in evaluation order.
    #[must_use]
    pub fn verdicts(&self) -> &[ClassificationVerdict] {
        &self.verdicts
    }

    /// The outcome, once the run is in a terminal phase.
    #[must_use]
    pub const fn result(&self) -> Option<&PipelineResult> {
        self.result.as_ref()
    }

    /// Counters recorded so far. `duration` stays unset until
    /// [`finish`](Self::finish).
    #[must_use]
    pub const fn metrics(&self) -> &RunMetrics {
        self.telemetry.metrics()
    }

    /// Perform one transition and return the new phase.
    pub async fn advance(&mut self) -> RunPhase {
        let next = match self.phase {
            RunPhase::Idle => RunPhase::InputChecking,
            RunPhase::InputChecking => self.check_input().await,
            RunPhase::Invoking => self.invoke().await,
            RunPhase::OutputChecking => self.check_output().await,
            terminal => return terminal,
        };

        let from = std::mem::replace(&mut self.phase, next);
        debug!(profile = self.profile.name(), %from, to = %next, "phase transition");
        self.runner
            .hooks
            .on_transition(self.profile.name(), from, next)
            .await;
        next
    }

    /// Advance until a terminal phase and return the report.
    pub async fn finish(mut self) -> RunReport {
        while !self.phase.is_terminal() {
            self.advance().await;
        }

        let phase = self.phase;
        let result = self
            .result
            .take()
            .unwrap_or_else(|| unreachable!("run stopped in {phase} without a result"));
        let metrics = self.telemetry.complete(result.label());

        RunReport {
            result,
            phase,
            verdicts: self.verdicts,
            metrics,
        }
    }

    async fn check_input(&mut self) -> RunPhase {
        let (profile, message) = (self.profile, self.message);
        match self.evaluate_gates(profile.input_gates(), message).await {
            Ok(None) => RunPhase::Invoking,
            Ok(Some(veto)) => {
                warn!(profile = self.profile.name(), gate = %veto.gate, reason = %veto.reason, "input blocked");
                self.stop(RunPhase::InputBlocked, PipelineResult::blocked_input(&veto))
            }
            Err(err) => self.fail(&err),
        }
    }

    async fn invoke(&mut self) -> RunPhase {
        let (runner, profile) = (self.runner, self.profile);
        let name = profile.name();
        runner.hooks.on_agent_start(name).await;
        self.telemetry.record_agent_call(name);

        match runner.runtime.run(profile, self.message).await {
            Ok(text) => {
                runner.hooks.on_agent_end(name, &text).await;
                self.output = Some(text);
                RunPhase::OutputChecking
            }
            Err(err) => self.fail(&err),
        }
    }

    async fn check_output(&mut self) -> RunPhase {
        let profile = self.profile;
        let output = self.output.take().unwrap_or_default();
        match self.evaluate_gates(profile.output_gates(), &output).await {
            Ok(None) => self.stop(RunPhase::Done, PipelineResult::Success { text: output }),
            Ok(Some(veto)) => {
                warn!(profile = self.profile.name(), gate = %veto.gate, reason = %veto.reason, "output blocked");
                self.stop(RunPhase::OutputBlocked, PipelineResult::blocked_output(&veto))
            }
            Err(err) => self.fail(&err),
        }
    }

    /// Evaluate `gates` in order and return the first veto.
    async fn evaluate_gates(
        &mut self,
        gates: &[Arc<GateSpec>],
        subject: &str,
    ) -> Result<Option<ClassificationVerdict>, UpstreamError> {
        let runner = self.runner;
        for gate in gates {
            runner.hooks.on_gate_start(self.phase, gate.name()).await;
            self.telemetry.record_classifier_call(gate.name());

            let verdict = gate
                .evaluate(runner.classifier.as_ref(), subject)
                .await?;

            self.telemetry.record_verdict(gate.name(), verdict.passed);
            runner.hooks.on_gate_end(self.phase, &verdict).await;
            self.verdicts.push(verdict);

            if let Some(veto) = self.verdicts.last().filter(|v| v.is_tripwire()) {
                return Ok(Some(veto.clone()));
            }
        }
        Ok(None)
    }

    fn fail(&mut self, err: &UpstreamError) -> RunPhase {
        warn!(profile = self.profile.name(), phase = %self.phase, error = %err, "upstream call failed");
        self.stop(RunPhase::Failed, PipelineResult::upstream(err))
    }

    fn stop(&mut self, phase: RunPhase, result: PipelineResult) -> RunPhase {
        self.result = Some(result);
        phase
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::agent::AgentRegistry;
    use crate::error::UpstreamErrorKind;
    use crate::guardrail::{DecisionRule, math_topic, output_safety};
    use crate::providers::{MockModel, MockReply};

    const MATH_PROMPT: &str = "math-related";
    const SAFETY_PROMPT: &str = "safe and non-harmful";

    fn runner(model: &Arc<MockModel>) -> Runner {
        Runner::with_model(Arc::clone(model), Duration::from_secs(60))
    }

    fn profile(name: &str) -> Arc<AgentProfile> {
        AgentRegistry::standard().get(name).unwrap()
    }

    #[tokio::test]
    async fn test_math_question_succeeds() {
        let model = Arc::new(
            MockModel::new()
                .on(MATH_PROMPT, "Yes, this is math.")
                .on(SAFETY_PROMPT, "This is safe.")
                .otherwise("4"),
        );

        let report = runner(&model)
            .run_detailed(&profile("math"), "What is 2 + 2?")
            .await;

        assert_eq!(report.result, PipelineResult::Success { text: "4".into() });
        assert_eq!(report.phase, RunPhase::Done);
        assert_eq!(report.verdicts.len(), 2);
        assert_eq!(report.metrics.classifier_calls, 2);
        assert!(report.metrics.agent_invoked);

        // Input gate, then agent, then output gate.
        let prompts = model.prompts();
        assert_eq!(
            prompts,
            vec![
                "Check if this input is math-related: What is 2 + 2?".to_owned(),
                "What is 2 + 2?".to_owned(),
                "Check if this output is safe and non-harmful: 4".to_owned(),
            ]
        );
    }

    #[tokio::test]
    async fn test_off_topic_question_is_blocked_before_agent() {
        let model = Arc::new(
            MockModel::new()
                .on(MATH_PROMPT, "No, this is about cooking.")
                .otherwise("Knead the dough."),
        );

        let report = runner(&model)
            .run_detailed(&profile("math"), "How do I bake bread?")
            .await;

        assert_eq!(
            report.result,
            PipelineResult::InputBlocked {
                gate: "math-topic".into(),
                reason: "no, this is about cooking.".into(),
            }
        );
        assert_eq!(report.phase, RunPhase::InputBlocked);
        assert!(!report.metrics.agent_invoked);
        assert_eq!(model.total_calls(), 1);
    }

    #[tokio::test]
    async fn test_unsafe_answer_is_withheld() {
        let model = Arc::new(
            MockModel::new()
                .on(SAFETY_PROMPT, "Unsafe, this could enable harm")
                .otherwise("Here is how to pick a lock"),
        );

        let result = runner(&model).run(&profile("general"), "Tell me something").await;

        assert_eq!(
            result,
            PipelineResult::OutputBlocked {
                gate: "output-safety".into(),
                reason: "unsafe, this could enable harm".into(),
            }
        );
        assert_eq!(result.text(), None);
        assert_eq!(model.total_calls(), 2);
    }

    #[tokio::test]
    async fn test_classifier_failure_is_upstream_error() {
        let model = Arc::new(
            MockModel::new()
                .on_reply(MATH_PROMPT, MockReply::Fail(UpstreamError::network("connection refused")))
                .otherwise("4"),
        );

        let report = runner(&model)
            .run_detailed(&profile("math"), "What is 2 + 2?")
            .await;

        assert!(matches!(
            report.result,
            PipelineResult::UpstreamError { kind: UpstreamErrorKind::Network, .. }
        ));
        assert_eq!(report.phase, RunPhase::Failed);
        assert!(report.verdicts.is_empty());
        assert!(!report.metrics.agent_invoked);
        assert_eq!(model.total_calls(), 1);
    }

    #[tokio::test]
    async fn test_agent_failure_skips_output_gates() {
        let model = Arc::new(
            MockModel::new()
                .on(SAFETY_PROMPT, "safe")
                .otherwise_reply(MockReply::Fail(UpstreamError::http_status(503, "overloaded"))),
        );

        let result = runner(&model).run(&profile("general"), "hello").await;

        let PipelineResult::UpstreamError { kind, detail } = result else {
            panic!("expected upstream error, got {result:?}");
        };
        assert_eq!(kind, UpstreamErrorKind::HttpStatus);
        assert!(detail.contains("503"));
        assert_eq!(model.call_count(SAFETY_PROMPT), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_classifier_times_out() {
        let model = Arc::new(MockModel::new().otherwise_reply(MockReply::Hang));
        let runner = Runner::with_model(Arc::clone(&model), Duration::from_secs(3));

        let result = runner.run(&profile("math"), "What is 2 + 2?").await;

        assert!(matches!(
            result,
            PipelineResult::UpstreamError { kind: UpstreamErrorKind::Timeout, .. }
        ));
    }

    #[tokio::test]
    async fn test_first_veto_short_circuits_remaining_gates() {
        let strict = GateSpec::new(
            "strict",
            "Second opinion: {input}",
            DecisionRule::keywords(["yes"]),
        )
        .unwrap();
        let profile = AgentProfile::new("double")
            .input_gate(Arc::new(math_topic()))
            .input_gate(Arc::new(strict));
        let model = Arc::new(MockModel::new().on(MATH_PROMPT, "no").otherwise("yes"));

        let report = runner(&model).run_detailed(&profile, "bread").await;

        assert!(matches!(report.result, PipelineResult::InputBlocked { ref gate, .. } if gate == "math-topic"));
        assert_eq!(model.call_count("Second opinion"), 0);
        assert_eq!(report.metrics.classifier_calls, 1);
    }

    #[tokio::test]
    async fn test_ungated_profile_returns_agent_output() {
        let model = Arc::new(MockModel::new().otherwise("plain answer"));
        let result = runner(&model).run(&AgentProfile::new("open"), "hi").await;
        assert_eq!(result, PipelineResult::Success { text: "plain answer".into() });
        assert_eq!(model.total_calls(), 1);
    }

    #[tokio::test]
    async fn test_advance_steps_one_phase_at_a_time() {
        let model = Arc::new(
            MockModel::new()
                .on(MATH_PROMPT, "yes")
                .on(SAFETY_PROMPT, "safe")
                .otherwise("4"),
        );
        let runner = runner(&model);
        let profile = profile("math");
        let mut run = runner.start(&profile, "2 + 2");

        assert_eq!(run.phase(), RunPhase::Idle);
        assert_eq!(run.advance().await, RunPhase::InputChecking);
        assert_eq!(model.total_calls(), 0);
        assert_eq!(run.advance().await, RunPhase::Invoking);
        assert_eq!(run.verdicts().len(), 1);
        assert_eq!(run.metrics().classifier_calls, 1);
        assert!(!run.metrics().agent_invoked);
        assert_eq!(run.advance().await, RunPhase::OutputChecking);
        assert!(run.metrics().agent_invoked);
        assert!(run.result().is_none());
        assert_eq!(run.advance().await, RunPhase::Done);
        assert_eq!(run.advance().await, RunPhase::Done);
        assert_eq!(model.total_calls(), 3);
        assert_eq!(run.metrics().gates_evaluated, 2);
        assert!(run.metrics().duration.is_none());
        assert_eq!(run.result().and_then(PipelineResult::text), Some("4"));

        let report = run.finish().await;
        assert!(report.metrics.duration.is_some());
    }

    #[tokio::test]
    async fn test_profiles_are_unchanged_by_runs() {
        let model = Arc::new(MockModel::new().on(MATH_PROMPT, "no").otherwise("x"));
        let runner = runner(&model);
        let profile = profile("math");

        let first = runner.run(&profile, "bread").await;
        let second = runner.run(&profile, "bread").await;
        assert_eq!(first, second);
        assert_eq!(profile.input_gates().len(), 1);
    }

    fn scripted() -> MockModel {
        MockModel::new()
            .on("math-related: What is 2 + 2?", "Yes, this is math.")
            .on("math-related: How do I bake bread?", "No, this is about cooking.")
            .on(SAFETY_PROMPT, "This is safe.")
            .otherwise("4")
    }

    fn fresh_math_profile() -> AgentProfile {
        AgentProfile::new("math")
            .instructions("You are a math agent.")
            .input_gate(Arc::new(math_topic()))
            .output_gate(Arc::new(output_safety()))
    }

    #[tokio::test]
    async fn test_identically_built_profiles_behave_identically() {
        let first_model = Arc::new(scripted());
        let second_model = Arc::new(scripted());

        for message in ["What is 2 + 2?", "How do I bake bread?"] {
            let first = runner(&first_model)
                .run_detailed(&fresh_math_profile(), message)
                .await;
            let second = runner(&second_model)
                .run_detailed(&fresh_math_profile(), message)
                .await;

            assert_eq!(first.result, second.result);
            assert_eq!(first.phase, second.phase);
            assert_eq!(first.verdicts, second.verdicts);
        }
        assert_eq!(first_model.prompts(), second_model.prompts());
    }

    #[tokio::test]
    async fn test_concurrent_runs_share_a_profile_independently() {
        let model = Arc::new(scripted());
        let runner = runner(&model);
        let profile = profile("math");

        let (math, bread) = tokio::join!(
            runner.run_detailed(&profile, "What is 2 + 2?"),
            runner.run_detailed(&profile, "How do I bake bread?"),
        );

        assert_eq!(math.result, PipelineResult::Success { text: "4".into() });
        assert_eq!(math.verdicts.len(), 2);
        assert!(math.verdicts.iter().all(|v| v.passed));
        assert_eq!(math.metrics.classifier_calls, 2);

        assert!(matches!(bread.result, PipelineResult::InputBlocked { ref gate, .. } if gate == "math-topic"));
        assert_eq!(bread.verdicts.len(), 1);
        assert_eq!(bread.metrics.classifier_calls, 1);
        assert!(!bread.metrics.agent_invoked);

        assert_eq!(model.call_count("How do I bake bread?"), 1);
        assert_eq!(model.total_calls(), 4);
    }

    #[derive(Default)]
    struct RecordingHooks {
        events: Mutex<Vec<String>>,
    }

    impl RecordingHooks {
        fn push(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[async_trait]
    impl RunHooks for RecordingHooks {
        async fn on_transition(&self, _profile: &str, from: RunPhase, to: RunPhase) {
            self.push(format!("{from}->{to}"));
        }

        async fn on_gate_end(&self, _phase: RunPhase, verdict: &ClassificationVerdict) {
            self.push(format!("gate:{}:{}", verdict.gate, verdict.passed));
        }

        async fn on_agent_end(&self, profile: &str, output: &str) {
            self.push(format!("agent:{profile}:{output}"));
        }
    }

    #[tokio::test]
    async fn test_hooks_observe_every_transition() {
        let model = Arc::new(
            MockModel::new()
                .on(MATH_PROMPT, "yes")
                .on(SAFETY_PROMPT, "unsafe")
                .otherwise("4"),
        );
        let hooks = Arc::new(RecordingHooks::default());
        let runner = runner(&model).with_hooks(hooks.clone());

        runner.run(&profile("math"), "2 + 2").await;

        let events = hooks.events.lock().unwrap().clone();
        assert_eq!(
            events,
            [
                "idle->input_checking",
                "gate:math-topic:true",
                "input_checking->invoking",
                "agent:math:4",
                "invoking->output_checking",
                "gate:output-safety:false",
                "output_checking->output_blocked",
            ]
        );
    }
}
