//! Guarded agent invocation.
//!
//! An [`AgentProfile`] names an agent, its instructions, and the gates that
//! guard it. The [`Runner`] evaluates input gates, calls the
//! [`AgentRuntime`] only if they all pass, then evaluates output gates
//! against the complete answer. Every run ends in exactly one
//! [`PipelineResult`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tripwire::agent::{AgentRegistry, Runner};
//! use tripwire::providers::GeminiClient;
//!
//! let client = GeminiClient::from_settings(&settings)?;
//! let runner = Runner::with_model(Arc::new(client.completion_model(&settings.model)), settings.timeout);
//!
//! let registry = AgentRegistry::standard();
//! let math = registry.get("math").expect("stock profile");
//!
//! match runner.run(&math, "What is 2 + 2?").await {
//!     PipelineResult::Success { text } => println!("{text}"),
//!     other => eprintln!("{other:?}"),
//! }
//! ```

mod profile;
mod registry;
mod result;
mod runner;
mod runtime;

pub use profile::AgentProfile;
pub use registry::{AgentRegistry, GENERAL_PROFILE, MATH_PROFILE};
pub use result::{PipelineResult, RunPhase, RunReport};
pub use runner::{GuardedRun, Runner};
pub use runtime::{AgentRuntime, CompletionAgent};
