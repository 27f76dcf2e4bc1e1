//! Retrying upload executor
//!
//! The only component that actually calls a destination. Each attempt gets its own
//! [`UploadAttemptContext`]; failed attempts are retried after a fixed delay.

use crate::config::ConfigSource;
use crate::destination::DestinationRegistry;
use crate::error::{DestinationError, UploadError};
use crate::image::{ArtifactCache, ImageItem};
use crate::logging::{LOG_PREFIX, LogSink};
use crate::upload::UploadAttemptContext;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Fixed-delay retry bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_millis(2000))
    }
}

#[derive(Clone)]
pub struct RetryingUploadExecutor {
    registry: Arc<DestinationRegistry>,
    config: Arc<dyn ConfigSource>,
    log: Arc<dyn LogSink>,
    policy: RetryPolicy,
}

impl RetryingUploadExecutor {
    pub fn new(
        registry: Arc<DestinationRegistry>,
        config: Arc<dyn ConfigSource>,
        log: Arc<dyn LogSink>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            registry,
            config,
            log,
            policy,
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Upload the snapshot to one destination, retrying transient failures.
    ///
    /// An id missing from the registry fails at once and is never retried.
    pub async fn attempt(
        &self,
        destination_id: &str,
        cache: &ArtifactCache,
        filename_override: Option<&str>,
    ) -> Result<Vec<ImageItem>, UploadError> {
        let Some(destination) = self.registry.lookup(destination_id) else {
            self.log.error(&format!(
                "{} ❌ Uploader not found: {}",
                LOG_PREFIX, destination_id
            ));
            return Err(UploadError::UnknownDestination(destination_id.to_string()));
        };

        let mut attempt: u32 = 0;
        loop {
            let mut ctx = UploadAttemptContext::new(
                destination_id,
                attempt,
                cache,
                filename_override,
                Arc::clone(&self.config),
                Arc::clone(&self.log),
            );

            let outcome: Result<Vec<ImageItem>, DestinationError> = match ctx.ensure_content() {
                Err(e) => Err(e),
                Ok(()) => match destination.upload(&mut ctx).await {
                    Ok(()) => ctx.into_results(),
                    Err(e) => Err(e),
                },
            };

            match outcome {
                Ok(results) => {
                    self.log.success(&format!(
                        "{} ✅ {} upload successful",
                        LOG_PREFIX, destination_id
                    ));
                    return Ok(results);
                }
                Err(e) if attempt >= self.policy.max_retries => {
                    self.log.error(&format!(
                        "{} ❌ {} upload failed after maximum retries: {}",
                        LOG_PREFIX, destination_id, e
                    ));
                    return Err(UploadError::Exhausted {
                        destination: destination_id.to_string(),
                        attempts: attempt + 1,
                        last: e,
                    });
                }
                Err(e) => {
                    self.log.warn(&format!(
                        "{} ⚠️ {} upload failed, retrying ({}/{})... Error: {}",
                        LOG_PREFIX,
                        destination_id,
                        attempt + 1,
                        self.policy.max_retries,
                        e
                    ));
                    sleep(self.policy.delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Run [`attempt`](Self::attempt) on its own task
    pub fn spawn(
        &self,
        destination_id: String,
        cache: Arc<ArtifactCache>,
        filename_override: Option<String>,
    ) -> JoinHandle<Result<Vec<ImageItem>, UploadError>> {
        let executor = self.clone();
        tokio::spawn(async move {
            executor
                .attempt(&destination_id, &cache, filename_override.as_deref())
                .await
        })
    }

    /// Like [`spawn`](Self::spawn) but awaited in place, with a panicking destination
    /// reported as [`UploadError::TaskFailed`].
    pub async fn attempt_isolated(
        &self,
        destination_id: &str,
        cache: &Arc<ArtifactCache>,
        filename_override: Option<&str>,
    ) -> Result<Vec<ImageItem>, UploadError> {
        self.spawn(
            destination_id.to_string(),
            Arc::clone(cache),
            filename_override.map(str::to_string),
        )
        .await
        .unwrap_or_else(|e| {
            Err(UploadError::TaskFailed {
                destination: destination_id.to_string(),
                reason: e.to_string(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JsonConfig;
    use crate::destination::Destination;
    use crate::logging::{LogLevel, MemoryLogger};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures` attempts, then succeeds
    struct Flaky {
        failures: u32,
        calls: AtomicU32,
        seen_names: Mutex<Vec<Option<String>>>,
    }

    impl Flaky {
        fn new(failures: u32) -> Arc<Self> {
            Arc::new(Self {
                failures,
                calls: AtomicU32::new(0),
                seen_names: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Destination for Flaky {
        async fn upload(&self, ctx: &mut UploadAttemptContext) -> Result<(), DestinationError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(ctx.output.iter().all(|item| !item.has_url()));
            self.seen_names
                .lock()
                .unwrap()
                .push(ctx.output[0].file_name.clone());
            for item in ctx.output.iter_mut() {
                item.url = Some(format!("https://flaky/{}", call));
                item.file_name = Some("mutated.png".to_string());
            }
            if call < self.failures {
                return Err(DestinationError::Upload(format!("boom {}", call)));
            }
            Ok(())
        }
    }

    fn cache() -> ArtifactCache {
        ArtifactCache::capture(&[ImageItem {
            file_name: Some("a.png".to_string()),
            buffer: Some(vec![7; 4]),
            ..Default::default()
        }])
    }

    fn executor(
        registry: DestinationRegistry,
        retries: u32,
    ) -> (RetryingUploadExecutor, Arc<MemoryLogger>) {
        let log = Arc::new(MemoryLogger::new());
        let executor = RetryingUploadExecutor::new(
            Arc::new(registry),
            Arc::new(JsonConfig::default()),
            log.clone(),
            RetryPolicy::new(retries, Duration::from_millis(500)),
        );
        (executor, log)
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_third_attempt_after_two_delays() {
        let flaky = Flaky::new(2);
        let (executor, log) = executor(DestinationRegistry::new().with("github", flaky.clone()), 2);

        let start = tokio::time::Instant::now();
        let results = executor.attempt("github", &cache(), Some("u.png")).await.unwrap();

        assert_eq!(start.elapsed(), Duration::from_millis(1000));
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 3);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url.as_deref(), Some("https://flaky/2"));
        assert_eq!(log.messages(LogLevel::Warn).len(), 2);
        assert!(log.contains(LogLevel::Warn, "retrying (2/2)"));
        // every attempt starts from the snapshot, not from the previous attempt's leftovers
        assert_eq!(
            *flaky.seen_names.lock().unwrap(),
            vec![Some("u.png".to_string()); 3]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_bound() {
        let flaky = Flaky::new(10);
        let (executor, log) = executor(DestinationRegistry::new().with("github", flaky.clone()), 2);

        let err = executor.attempt("github", &cache(), None).await.unwrap_err();
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 3);
        assert!(matches!(err, UploadError::Exhausted { attempts: 3, .. }));
        assert!(log.contains(LogLevel::Error, "after maximum retries"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_destination_is_not_retried() {
        let (executor, log) = executor(DestinationRegistry::new(), 5);

        let start = tokio::time::Instant::now();
        let err = executor.attempt("qiniu", &cache(), None).await.unwrap_err();
        assert_eq!(err, UploadError::UnknownDestination("qiniu".to_string()));
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert!(log.messages(LogLevel::Warn).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_artifact_fails_every_attempt() {
        let flaky = Flaky::new(0);
        let registry = DestinationRegistry::new().with("github", flaky.clone());
        let (executor, _log) = executor(registry, 1);
        let malformed = ArtifactCache::capture(&[ImageItem::default()]);

        let err = executor.attempt("github", &malformed, None).await.unwrap_err();
        match err {
            UploadError::Exhausted { attempts, last, .. } => {
                assert_eq!(attempts, 2);
                assert!(matches!(last, DestinationError::MalformedArtifact(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 0);
    }

    struct Panics;

    #[async_trait]
    impl Destination for Panics {
        async fn upload(&self, _ctx: &mut UploadAttemptContext) -> Result<(), DestinationError> {
            panic!("destination bug");
        }
    }

    #[tokio::test]
    async fn test_isolated_attempt_contains_panics() {
        let registry = DestinationRegistry::new().with("bad", Arc::new(Panics));
        let (executor, _log) = executor(registry, 0);
        let err = executor
            .attempt_isolated("bad", &Arc::new(cache()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::TaskFailed { .. }));
    }
}
