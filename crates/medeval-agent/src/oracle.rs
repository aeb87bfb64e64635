//! The judge oracle capability

use async_trait::async_trait;
use medeval_core::{EvalError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// External judge: takes a rendered rubric prompt, returns raw reply text
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn judge(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
impl<T: Oracle + ?Sized> Oracle for Arc<T> {
    async fn judge(&self, prompt: &str) -> Result<String> {
        (**self).judge(prompt).await
    }
}

/// Oracle stub replying with canned text
///
/// Each rule pairs a needle with an outcome; the first rule whose needle
/// occurs in the prompt decides the reply. Prompts matching no rule fail
/// with a transport error.
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    rules: Vec<(String, std::result::Result<String, String>)>,
    calls: AtomicUsize,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(mut self, needle: impl Into<String>, reply: impl Into<String>) -> Self {
        self.rules.push((needle.into(), Ok(reply.into())));
        self
    }

    pub fn with_failure(mut self, needle: impl Into<String>, message: impl Into<String>) -> Self {
        self.rules.push((needle.into(), Err(message.into())));
        self
    }

    /// Number of prompts judged so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn judge(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match self.rules.iter().find(|(needle, _)| prompt.contains(needle.as_str())) {
            Some((_, Ok(reply))) => Ok(reply.clone()),
            Some((_, Err(message))) => Err(EvalError::JudgeTransport(message.clone())),
            None => Err(EvalError::JudgeTransport(
                "no scripted reply for prompt".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_matching_rule_wins() {
        let oracle = ScriptedOracle::new()
            .with_reply("fiber", "first")
            .with_reply("fiber intake", "second")
            .with_failure("bleeding", "connection reset");

        assert_eq!(oracle.judge("ask about fiber intake").await.unwrap(), "first");
        assert!(matches!(
            oracle.judge("rectal bleeding").await,
            Err(EvalError::JudgeTransport(_))
        ));
        assert!(oracle.judge("unrelated").await.is_err());
        assert_eq!(oracle.calls(), 3);
    }

    #[tokio::test]
    async fn test_shared_through_arc() {
        let oracle: Arc<dyn Oracle> = Arc::new(ScriptedOracle::new().with_reply("", "ok"));
        assert_eq!(oracle.judge("anything").await.unwrap(), "ok");
    }
}
