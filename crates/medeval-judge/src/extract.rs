//! Pulling the structured payload out of an oracle reply
//!
//! Replies usually wrap the JSON in a fenced block, sometimes add prose
//! around a bare object, and occasionally return the object alone.

use medeval_core::{EvalError, Result, ScoredEvaluation};

/// Body of every closed fenced block, in reply order
fn fenced_blocks(reply: &str) -> impl Iterator<Item = &str> {
    let segments: Vec<&str> = reply.split("```").collect();
    let closed = segments.len().saturating_sub(1);

    // Odd segments between fences are block contents
    segments
        .into_iter()
        .take(closed)
        .skip(1)
        .step_by(2)
        .map(|block| match block.find('\n') {
            // Drop an info string such as `json`
            Some(newline) if !block[..newline].contains('{') => block[newline + 1..].trim(),
            _ => block.trim(),
        })
}

/// Locate the JSON payload inside a reply
pub fn extract_payload(reply: &str) -> Result<&str> {
    let trimmed = reply.trim();

    if let Some(fenced) = fenced_blocks(trimmed).find(|body| body.starts_with('{')) {
        return Ok(fenced);
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(&trimmed[start..=end]),
        _ => Err(EvalError::JudgeParse(
            "no JSON object found in judge reply".to_string(),
        )),
    }
}

/// Parse an oracle reply into a scored evaluation
pub fn parse_evaluation(reply: &str) -> Result<ScoredEvaluation> {
    let payload = extract_payload(reply)?;
    serde_json::from_str(payload).map_err(|e| EvalError::JudgeParse(e.to_string()))
}
