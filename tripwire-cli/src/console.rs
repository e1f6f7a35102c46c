//! Console input and output for a single guarded question.

use std::io::{self, BufRead, Write};

use tripwire::PipelineResult;

/// Prompt shown before reading the question.
pub const PROMPT: &str = "Enter your question: ";

/// Print [`PROMPT`], read one line and return it trimmed.
///
/// Returns `None` when the input is already at end of file.
///
/// # Errors
///
/// Propagates I/O errors from either stream.
pub fn read_question<R, W>(input: &mut R, output: &mut W) -> io::Result<Option<String>>
where
    R: BufRead,
    W: Write,
{
    output.write_all(PROMPT.as_bytes())?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_owned()))
}

/// The one line a user sees for a pipeline outcome.
#[must_use]
pub fn render(result: &PipelineResult) -> String {
    match result {
        PipelineResult::Success { text } => text.clone(),
        PipelineResult::InputBlocked { gate, reason } => {
            format!("Input blocked by guardrail '{gate}': {reason}")
        }
        PipelineResult::OutputBlocked { gate, reason } => {
            format!("Output blocked by guardrail '{gate}': {reason}")
        }
        PipelineResult::UpstreamError { detail, .. } => format!("Error: {detail}"),
    }
}
