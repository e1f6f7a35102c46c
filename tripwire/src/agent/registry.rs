//! Registry of named agent profiles.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::Arc;

use super::AgentProfile;
use crate::error::ConfigError;
use crate::guardrail::{math_topic, output_safety};

/// Name of the stock math profile.
pub const MATH_PROFILE: &str = "math";
/// Name of the stock general-purpose profile.
pub const GENERAL_PROFILE: &str = "general";

/// A collection of agent profiles, filled at startup and read-only after.
#[derive(Default)]
pub struct AgentRegistry {
    profiles: BTreeMap<String, Arc<AgentProfile>>,
}

impl AgentRegistry {
    /// Create a new empty registry.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The two stock profiles.
    ///
    /// `"math"` guards input with [`math_topic`] and output with
    /// [`output_safety`]; `"general"` only guards output. Both profiles
    /// share the same output gate value.
    #[must_use]
    pub fn standard() -> Self {
        let safety = Arc::new(output_safety());

        let math = AgentProfile::new(MATH_PROFILE)
            .instructions("You are a math agent. Solve math problems step by step.")
            .input_gate(Arc::new(math_topic()))
            .output_gate(Arc::clone(&safety));
        let general = AgentProfile::new(GENERAL_PROFILE)
            .instructions("You are a helpful agent for general questions.")
            .output_gate(safety);

        let mut profiles = BTreeMap::new();
        profiles.insert(MATH_PROFILE.to_owned(), Arc::new(math));
        profiles.insert(GENERAL_PROFILE.to_owned(), Arc::new(general));
        Self { profiles }
    }

    /// Register a profile under its own name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateProfile`] if the name is taken.
    pub fn register(&mut self, profile: AgentProfile) -> Result<(), ConfigError> {
        match self.profiles.entry(profile.name().to_owned()) {
            Entry::Occupied(e) => Err(ConfigError::DuplicateProfile {
                name: e.key().clone(),
            }),
            Entry::Vacant(e) => {
                e.insert(Arc::new(profile));
                Ok(())
            }
        }
    }

    /// Get a profile by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<AgentProfile>> {
        self.profiles.get(name).cloned()
    }

    /// Profile names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }

    /// Check if a profile with the given name exists.
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    /// Get the number of profiles.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Check if the registry is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl std::fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("profiles", &self.names())
            .finish()
    }
}
