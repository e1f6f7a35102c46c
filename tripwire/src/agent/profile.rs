//! Agent profile: instructions plus the gates that guard them.

use std::sync::Arc;

use crate::guardrail::GateSpec;

/// Immutable configuration of one agent.
///
/// Profiles are assembled once at startup and shared read-only by every
/// run. Gates are held behind `Arc` so several profiles can share one gate.
///
/// ```rust,ignore
/// let safety = Arc::new(guardrail::output_safety());
/// let profile = AgentProfile::new("math")
///     .instructions("You are a math agent. Solve math problems step by step.")
///     .input_gate(Arc::new(guardrail::math_topic()))
///     .output_gate(safety);
/// ```
#[derive(Debug, Clone)]
pub struct AgentProfile {
    name: String,
    instructions: String,
    input_gates: Vec<Arc<GateSpec>>,
    output_gates: Vec<Arc<GateSpec>>,
}

impl AgentProfile {
    /// Create a profile with no instructions and no gates.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: String::new(),
            input_gates: Vec::new(),
            output_gates: Vec::new(),
        }
    }

    /// Set the system instructions sent with every agent invocation.
    #[must_use]
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Append an input gate. Gates run in the order they were added.
    #[must_use]
    pub fn input_gate(mut self, gate: Arc<GateSpec>) -> Self {
        self.input_gates.push(gate);
        self
    }

    /// Append an output gate. Gates run in the order they were added.
    #[must_use]
    pub fn output_gate(mut self, gate: Arc<GateSpec>) -> Self {
        self.output_gates.push(gate);
        self
    }

    /// Returns the profile name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the system instructions.
    #[must_use]
    pub fn get_instructions(&self) -> &str {
        &self.instructions
    }

    /// Returns the input gates in evaluation order.
    #[must_use]
    pub fn input_gates(&self) -> &[Arc<GateSpec>] {
        &self.input_gates
    }

    /// Returns the output gates in evaluation order.
    #[must_use]
    pub fn output_gates(&self) -> &[Arc<GateSpec>] {
        &self.output_gates
    }
}
