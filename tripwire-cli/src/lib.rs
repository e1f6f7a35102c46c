//! Tripwire CLI library: console and environment helpers for the `tripwire` binary.

pub mod console;
pub mod env;

pub use console::{PROMPT, read_question, render};
pub use env::load_dotenv;
