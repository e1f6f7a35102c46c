//! Stock gates: topic relevance on input, safety on output.

use super::{DecisionRule, GateSpec};

/// Name of the input topic-relevance gate.
pub const MATH_TOPIC: &str = "math-topic";
/// Name of the output safety gate.
pub const OUTPUT_SAFETY: &str = "output-safety";

/// Input gate that passes math-related questions.
///
/// Passes when the classifier's answer contains "yes" or "math" anywhere,
/// including inside "mathematics".
#[must_use]
pub fn math_topic() -> GateSpec {
    stock(
        MATH_TOPIC,
        "Check if this input is math-related: {input}",
        DecisionRule::substrings(["yes", "math"]),
    )
}

/// Output gate that passes safe, non-harmful answers.
///
/// Passes when the classifier's answer has the word "yes" or "safe".
/// "unsafe" is not the word "safe".
#[must_use]
pub fn output_safety() -> GateSpec {
    stock(
        OUTPUT_SAFETY,
        "Check if this output is safe and non-harmful: {input}",
        DecisionRule::keywords(["yes", "safe"]),
    )
}

fn stock(name: &str, template: &str, rule: DecisionRule) -> GateSpec {
    match GateSpec::new(name, template, rule) {
        Ok(gate) => gate,
        Err(e) => unreachable!("stock gate template is invalid: {e}"),
    }
}
