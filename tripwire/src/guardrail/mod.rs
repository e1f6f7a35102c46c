//! Classifier-backed gates for agent inputs and outputs.
//!
//! A gate is a stateless, single-shot check. It embeds the subject text into
//! a prompt template, asks a [`Classifier`](crate::classifier::Classifier),
//! lower-cases the answer and applies a [`DecisionRule`] to it. The result
//! is a [`ClassificationVerdict`].
//!
//! # Tripwire Mechanism
//!
//! A verdict with `passed == false` is a tripwire: the
//! [`Runner`](crate::agent::Runner) stops the pipeline and reports
//! [`PipelineResult::InputBlocked`](crate::agent::PipelineResult) or
//! [`PipelineResult::OutputBlocked`](crate::agent::PipelineResult). Blocks are
//! ordinary values, never errors.
//!
//! # Decision Rules
//!
//! The stock gates use a keyword-presence heuristic and never parse the
//! answer, so a negated reply such as "not math" still passes. The topic
//! gate matches inside longer words ([`DecisionRule::substrings`]) so that
//! "mathematical" counts. The safety gate needs whole words
//! ([`DecisionRule::keywords`]) so that "unsafe" does not count as "safe".
//! [`DecisionRule::custom`] accepts any stricter predicate.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tripwire::guardrail::{DecisionRule, GateSpec};
//!
//! let gate = GateSpec::new(
//!     "no-recipes",
//!     "Is the following text a cooking recipe? Answer yes or no: {input}",
//!     DecisionRule::custom("starts-with-no", |text| text.trim_start().starts_with("no")),
//! )?;
//!
//! let verdict = gate.evaluate(&classifier, "How do I bake bread?").await?;
//! ```

mod builtin;
mod gate;
mod rule;

pub use builtin::{MATH_TOPIC, OUTPUT_SAFETY, math_topic, output_safety};
pub use gate::{GateSpec, INPUT_PLACEHOLDER};
pub use rule::DecisionRule;

use serde::{Deserialize, Serialize};

/// The outcome of one gate evaluation.
///
/// Scoped to a single pipeline run and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationVerdict {
    /// Name of the gate that produced this verdict.
    pub gate: String,
    /// Whether the subject passed the gate.
    pub passed: bool,
    /// The lower-cased classifier answer.
    pub reason: String,
}

impl ClassificationVerdict {
    /// Returns `true` if this verdict vetoes the pipeline.
    #[must_use]
    pub const fn is_tripwire(&self) -> bool {
        !self.passed
    }
}
