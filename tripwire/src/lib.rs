#![cfg_attr(docsrs, feature(doc_cfg))]
//! Tripwire guards an LLM agent with classifier gates on its input and output.
//!
//! A request passes through three stages: input gates, the agent, and output
//! gates. Each gate asks a completion service to classify the text and turns
//! the answer into a pass/fail verdict. The first failing gate stops the
//! pipeline, and the caller gets a typed [`PipelineResult`] telling policy
//! blocks apart from genuine upstream failures.

pub mod agent;
pub mod classifier;
pub mod config;
pub mod error;
pub mod guardrail;
pub mod hooks;
pub mod prelude;
pub mod providers;
pub mod telemetry;

pub use agent::{AgentProfile, AgentRegistry, PipelineResult, RunPhase, RunReport, Runner};
pub use config::Settings;
pub use error::{ConfigError, Error, Result, UpstreamError};
