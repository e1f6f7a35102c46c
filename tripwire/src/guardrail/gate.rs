//! Gate definition and evaluation.

use tracing::debug;

use super::{ClassificationVerdict, DecisionRule};
use crate::classifier::Classifier;
use crate::error::{ConfigError, UpstreamError};

/// Placeholder replaced by the subject text in a prompt template.
pub const INPUT_PLACEHOLDER: &str = "{input}";

/// Immutable gate configuration: a prompt template plus a decision rule.
///
/// Created once at startup and shared read-only (usually behind an `Arc`)
/// by every profile and every concurrent run that uses it.
#[derive(Debug, Clone)]
pub struct GateSpec {
    name: String,
    prompt_template: String,
    decision_rule: DecisionRule,
}

impl GateSpec {
    /// Create a gate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTemplate`] if `prompt_template` does not
    /// contain [`INPUT_PLACEHOLDER`].
    pub fn new(
        name: impl Into<String>,
        prompt_template: impl Into<String>,
        decision_rule: DecisionRule,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        let prompt_template = prompt_template.into();
        if !prompt_template.contains(INPUT_PLACEHOLDER) {
            return Err(ConfigError::InvalidTemplate { gate: name });
        }
        Ok(Self {
            name,
            prompt_template,
            decision_rule,
        })
    }

    /// Returns the gate name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the prompt template.
    #[must_use]
    pub fn prompt_template(&self) -> &str {
        &self.prompt_template
    }

    /// Returns the decision rule.
    #[must_use]
    pub const fn decision_rule(&self) -> &DecisionRule {
        &self.decision_rule
    }

    /// Embed `subject` into the prompt template.
    #[must_use]
    pub fn render(&self, subject: &str) -> String {
        self.prompt_template.replace(INPUT_PLACEHOLDER, subject)
    }

    /// Decide a verdict from raw classifier text.
    ///
    /// The text is lower-cased before the rule runs, and the lower-cased
    /// text becomes the verdict reason.
    #[must_use]
    pub fn decide(&self, raw: &str) -> ClassificationVerdict {
        let reason = raw.to_lowercase();
        ClassificationVerdict {
            gate: self.name.clone(),
            passed: self.decision_rule.passes(&reason),
            reason,
        }
    }

    /// Classify `subject` and decide a verdict.
    ///
    /// # Errors
    ///
    /// Propagates the classifier's [`UpstreamError`] unchanged.
    pub async fn evaluate(
        &self,
        classifier: &dyn Classifier,
        subject: &str,
    ) -> Result<ClassificationVerdict, UpstreamError> {
        let raw = classifier.classify(&self.render(subject)).await?;
        let verdict = self.decide(&raw);
        debug!(gate = %self.name, passed = verdict.passed, "gate evaluated");
        Ok(verdict)
    }
}
