//! # medeval-agent
//!
//! External capabilities used by the evaluation pipeline:
//!
//! - [`Oracle`]: renders a verdict for a rubric prompt. [`AnthropicOracle`]
//!   calls the Anthropic Messages API with retry and a circuit breaker.
//! - [`SubjectSystem`]: the chatbot under test. [`HttpSubject`] talks to it
//!   over a small JSON endpoint.
//!
//! Both are traits so deterministic stages can be exercised with stubs such
//! as [`ScriptedOracle`].

mod auth;
mod circuit_breaker;
mod client;
mod oracle;
mod subject;
mod types;

pub use auth::api_key;
pub use circuit_breaker::{CircuitBreaker, CircuitState};
pub use client::{AnthropicOracle, RetryPolicy};
pub use oracle::{Oracle, ScriptedOracle};
pub use subject::{HttpSubject, SubjectSystem};
pub use types::*;
