//! Response collection

use medeval_agent::SubjectSystem;
use medeval_core::{EvalError, ResponseRecord, Result, TestCase};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Asks the subject system every question in a corpus
pub struct ResponseCollector<S> {
    subject: Arc<S>,
    concurrency: usize,
}

impl<S: SubjectSystem + 'static> ResponseCollector<S> {
    pub fn new(subject: S) -> Self {
        Self {
            subject: Arc::new(subject),
            concurrency: 1,
        }
    }

    /// Maximum in-flight subject calls (at least 1)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Collect one record per case, in corpus order
    ///
    /// A failing subject call yields an error record for that case only.
    pub async fn collect(&self, cases: &[TestCase]) -> Result<Vec<ResponseRecord>> {
        let total = cases.len();
        info!("Generating responses for {} test cases", total);

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut join_set = JoinSet::new();

        for (index, case) in cases.iter().enumerate() {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| EvalError::Other(format!("Collector pool closed: {}", e)))?;
            let subject = Arc::clone(&self.subject);
            let case = case.clone();

            join_set.spawn(async move {
                let _permit = permit;
                info!("[{}/{}] Generating response for {}", index + 1, total, case.id);

                let record = match subject.respond(&case.question).await {
                    Ok(response) => {
                        info!("Response generated ({} chars)", response.chars().count());
                        ResponseRecord::success(case, response)
                    }
                    Err(e) => {
                        warn!("Response for {} failed: {}", case.id, e);
                        ResponseRecord::failure(case, e.to_string())
                    }
                };
                (index, record)
            });
        }

        let mut slots: Vec<Option<ResponseRecord>> = vec![None; total];
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, record)) => slots[index] = Some(record),
                Err(e) => warn!("Collector task failed: {}", e),
            }
        }

        // A panicked task still leaves a record behind
        Ok(slots
            .into_iter()
            .zip(cases)
            .map(|(slot, case)| {
                slot.unwrap_or_else(|| {
                    ResponseRecord::failure(case.clone(), "response task aborted")
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use medeval_core::Category;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Echoes the question, failing on any question containing "boom"
    struct EchoSubject {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl EchoSubject {
        fn new() -> Self {
            Self {
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SubjectSystem for EchoSubject {
        async fn respond(&self, question: &str) -> Result<String> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if question.contains("boom") {
                Err(EvalError::Generation("subject exploded".to_string()))
            } else {
                Ok(format!("echo: {}", question))
            }
        }
    }

    fn cases(questions: &[&str]) -> Vec<TestCase> {
        questions
            .iter()
            .enumerate()
            .map(|(i, q)| TestCase::new(format!("case_{:03}", i), Category::General, *q))
            .collect()
    }

    #[tokio::test]
    async fn test_one_failure_keeps_every_record() {
        let corpus = cases(&["a", "b", "boom", "d", "e"]);
        let collector = ResponseCollector::new(EchoSubject::new());

        let records = collector.collect(&corpus).await.unwrap();

        assert_eq!(records.len(), 5);
        assert_eq!(records.iter().filter(|r| !r.is_success()).count(), 1);
        assert_eq!(records[2].outcome(), Err("Generation failed: subject exploded"));
        assert_eq!(records[3].outcome(), Ok("echo: d"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_bounded_concurrency_preserves_order() {
        let questions: Vec<String> = (0..12).map(|i| format!("q{}", i)).collect();
        let refs: Vec<&str> = questions.iter().map(String::as_str).collect();
        let corpus = cases(&refs);

        let subject = Arc::new(EchoSubject::new());
        let collector = ResponseCollector::new(Arc::clone(&subject)).with_concurrency(3);
        let records = collector.collect(&corpus).await.unwrap();

        let ids: Vec<&str> = records.iter().map(|r| r.test_case_id()).collect();
        let expected: Vec<String> = (0..12).map(|i| format!("case_{:03}", i)).collect();
        assert_eq!(ids, expected);
        assert!(subject.peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_default_is_sequential() {
        let subject = Arc::new(EchoSubject::new());
        let collector = ResponseCollector::new(Arc::clone(&subject));
        collector.collect(&cases(&["a", "b", "c"])).await.unwrap();
        assert_eq!(subject.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_corpus() {
        let collector = ResponseCollector::new(EchoSubject::new());
        assert!(collector.collect(&[]).await.unwrap().is_empty());
    }
}
