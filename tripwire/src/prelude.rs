//! Common imports for building guarded pipelines.

pub use crate::agent::{
    AgentProfile, AgentRegistry, AgentRuntime, CompletionAgent, PipelineResult, RunPhase,
    RunReport, Runner,
};
pub use crate::classifier::{Classifier, ModelClassifier};
pub use crate::guardrail::{ClassificationVerdict, DecisionRule, GateSpec};
pub use crate::hooks::{NoopRunHooks, RunHooks};
pub use crate::providers::{CompletionModel, GeminiClient};
