//! The subject system under test

use async_trait::async_trait;
use medeval_core::{EvalError, Result, SubjectSettings};
use std::sync::Arc;
use std::time::Duration;

use crate::types::{SubjectRequest, SubjectResponse};

/// The conversational system being evaluated
#[async_trait]
pub trait SubjectSystem: Send + Sync {
    /// Answer one patient question
    async fn respond(&self, question: &str) -> Result<String>;
}

#[async_trait]
impl<T: SubjectSystem + ?Sized> SubjectSystem for Arc<T> {
    async fn respond(&self, question: &str) -> Result<String> {
        (**self).respond(question).await
    }
}

/// Subject reached over HTTP: `POST {"question": ..}` -> `{"response": ..}`
#[derive(Debug, Clone)]
pub struct HttpSubject {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpSubject {
    pub fn from_settings(settings: &SubjectSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| EvalError::Generation(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: settings.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SubjectSystem for HttpSubject {
    async fn respond(&self, question: &str) -> Result<String> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&SubjectRequest { question })
            .send()
            .await
            .map_err(|e| EvalError::Generation(format!("Failed to reach subject: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EvalError::Generation(format!(
                "Subject returned {}: {}",
                status, body
            )));
        }

        let body: SubjectResponse = response
            .json()
            .await
            .map_err(|e| EvalError::Generation(format!("Malformed subject reply: {}", e)))?;

        Ok(body.response)
    }
}
