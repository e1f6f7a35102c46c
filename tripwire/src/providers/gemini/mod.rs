//! Google Gemini provider.
//!
//! Talks to the Generative Language REST API:
//! `POST {base}/models/{model}:generateContent`.

mod client;
mod completion;

pub use client::{GEMINI_API_BASE_URL, GeminiClient, GeminiClientBuilder};
pub use completion::GeminiModel;
