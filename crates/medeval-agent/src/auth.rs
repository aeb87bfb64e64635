//! API key lookup for the judge oracle

use medeval_core::{EvalError, Result};
use std::env;

/// Read the Anthropic API key from the configured environment variable
///
/// Blank values are treated as unset.
pub fn api_key(env_var: &str) -> Result<String> {
    match env::var(env_var) {
        Ok(key) if !key.trim().is_empty() => {
            tracing::debug!("Using API key from {}", env_var);
            Ok(key.trim().to_string())
        }
        _ => Err(EvalError::Auth(format!(
            "No API key found. Set {}=sk-ant-api03-... or change judge.api_key_env in .medeval/config.toml",
            env_var
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Serializes env var mutation across tests
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn with_env_var<F, R>(key: &str, value: Option<&str>, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _guard = ENV_LOCK.lock().unwrap();
        let original = env::var(key).ok();

        match value {
            Some(v) => env::set_var(key, v),
            None => env::remove_var(key),
        }

        let result = f();

        match original {
            Some(v) => env::set_var(key, v),
            None => env::remove_var(key),
        }

        result
    }

    #[test]
    fn test_reads_configured_variable() {
        with_env_var("MEDEVAL_TEST_KEY_A", Some("sk-test-123"), || {
            assert_eq!(api_key("MEDEVAL_TEST_KEY_A").unwrap(), "sk-test-123");
        });
    }

    #[test]
    fn test_missing_key_is_auth_error() {
        with_env_var("MEDEVAL_TEST_KEY_B", None, || {
            let err = api_key("MEDEVAL_TEST_KEY_B").unwrap_err();
            assert!(matches!(err, EvalError::Auth(_)));
            assert!(err.to_string().contains("MEDEVAL_TEST_KEY_B"));
        });
    }

    #[test]
    fn test_blank_key_rejected() {
        with_env_var("MEDEVAL_TEST_KEY_C", Some("   "), || {
            assert!(api_key("MEDEVAL_TEST_KEY_C").is_err());
        });
    }
}
