//! Run phases and pipeline outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{UpstreamError, UpstreamErrorKind};
use crate::guardrail::ClassificationVerdict;
use crate::telemetry::RunMetrics;

/// Phase of a [`GuardedRun`](super::GuardedRun).
///
/// ```text
/// Idle -> InputChecking -> Invoking -> OutputChecking -> Done
///              |               |              |
///              v               v              v
///         InputBlocked      Failed      OutputBlocked
/// ```
///
/// `InputChecking` and `OutputChecking` also move to `Failed` when a
/// classifier call fails. Terminal phases never change again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// Created, nothing evaluated yet.
    Idle,
    /// Running input gates against the message.
    InputChecking,
    /// Waiting for the agent runtime.
    Invoking,
    /// Running output gates against the agent's answer.
    OutputChecking,
    /// An input gate vetoed the message.
    InputBlocked,
    /// An output gate vetoed the answer.
    OutputBlocked,
    /// Every gate passed.
    Done,
    /// A classifier or agent call failed.
    Failed,
}

impl RunPhase {
    /// Returns `true` for phases a run can never leave.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::InputBlocked | Self::OutputBlocked | Self::Done | Self::Failed
        )
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::InputChecking => "input_checking",
            Self::Invoking => "invoking",
            Self::OutputChecking => "output_checking",
            Self::InputBlocked => "input_blocked",
            Self::OutputBlocked => "output_blocked",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Outcome of one guarded request.
///
/// Exactly one variant per run. Blocks carry the name of the vetoing gate
/// and its lower-cased classifier answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineResult {
    /// The agent answered and every output gate passed.
    Success {
        /// The agent's answer.
        text: String,
    },
    /// An input gate vetoed the message; the agent was never invoked.
    InputBlocked {
        /// Name of the vetoing gate.
        gate: String,
        /// Lower-cased classifier answer.
        reason: String,
    },
    /// An output gate vetoed the agent's answer; the answer is withheld.
    OutputBlocked {
        /// Name of the vetoing gate.
        gate: String,
        /// Lower-cased classifier answer.
        reason: String,
    },
    /// A classifier or agent call failed.
    UpstreamError {
        /// Failure category.
        kind: UpstreamErrorKind,
        /// Rendered error, including provider and status code if known.
        detail: String,
    },
}

impl PipelineResult {
    pub(crate) fn blocked_input(verdict: &ClassificationVerdict) -> Self {
        Self::InputBlocked {
            gate: verdict.gate.clone(),
            reason: verdict.reason.clone(),
        }
    }

    pub(crate) fn blocked_output(verdict: &ClassificationVerdict) -> Self {
        Self::OutputBlocked {
            gate: verdict.gate.clone(),
            reason: verdict.reason.clone(),
        }
    }

    pub(crate) fn upstream(err: &UpstreamError) -> Self {
        Self::UpstreamError {
            kind: err.kind,
            detail: err.to_string(),
        }
    }

    /// Returns `true` for [`PipelineResult::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The agent's answer, only for [`PipelineResult::Success`].
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Success { text } => Some(text),
            _ => None,
        }
    }

    /// Short outcome label used in logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::InputBlocked { .. } => "input_blocked",
            Self::OutputBlocked { .. } => "output_blocked",
            Self::UpstreamError { .. } => "upstream_error",
        }
    }
}

/// A [`PipelineResult`] together with everything observed on the way.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// The outcome.
    pub result: PipelineResult,
    /// Terminal phase the run stopped in.
    pub phase: RunPhase,
    /// Verdicts in evaluation order.
    pub verdicts: Vec<ClassificationVerdict>,
    /// Call counts and timing.
    pub metrics: RunMetrics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_phases() {
        for phase in [
            RunPhase::InputBlocked,
            RunPhase::OutputBlocked,
            RunPhase::Done,
            RunPhase::Failed,
        ] {
            assert!(phase.is_terminal(), "{phase}");
        }
        for phase in [
            RunPhase::Idle,
            RunPhase::InputChecking,
            RunPhase::Invoking,
            RunPhase::OutputChecking,
        ] {
            assert!(!phase.is_terminal(), "{phase}");
        }
    }

    #[test]
    fn test_serializes_with_status_tag() {
        let blocked = PipelineResult::InputBlocked {
            gate: "math-topic".into(),
            reason: "no".into(),
        };
        let json = serde_json::to_value(&blocked).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "input_blocked", "gate": "math-topic", "reason": "no"})
        );

        let failed = PipelineResult::upstream(&UpstreamError::network("refused"));
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["status"], "upstream_error");
        assert_eq!(json["kind"], "network");
    }

    #[test]
    fn test_text_only_on_success() {
        let ok = PipelineResult::Success { text: "4".into() };
        assert_eq!(ok.text(), Some("4"));
        assert!(ok.is_success());
        assert_eq!(ok.label(), "success");

        let verdict = ClassificationVerdict {
            gate: "output-safety".into(),
            passed: false,
            reason: "unsafe".into(),
        };
        let blocked = PipelineResult::blocked_output(&verdict);
        assert_eq!(blocked.text(), None);
        assert_eq!(blocked.label(), "output_blocked");
    }
}
