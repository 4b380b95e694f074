use anyhow::Result;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::ExtractorConfig;

#[derive(Clone)]
pub struct Limiters {
    pub extraction: Arc<Semaphore>,
    pub acquire_timeout: Duration,
}

impl Limiters {
    pub fn new(cfg: &ExtractorConfig) -> Self {
        Self {
            extraction: Arc::new(Semaphore::new(cfg.max_concurrency.max(1))),
            acquire_timeout: Duration::from_millis(cfg.acquire_timeout_ms.max(1)),
        }
    }

    pub async fn acquire_timed(
        sem: Arc<Semaphore>,
        acquire_timeout: Duration,
        op: &'static str,
    ) -> Result<(OwnedSemaphorePermit, Duration)> {
        let start = Instant::now();

        let permit = tokio::time::timeout(acquire_timeout, sem.acquire_owned())
            .await
            .map_err(|_| anyhow::anyhow!("Limiter acquire timeout for op={}", op))??;

        Ok((permit, start.elapsed()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_acquire_times_out_when_exhausted() {
        let limiters = Limiters::new(&ExtractorConfig {
            max_concurrency: 1,
            acquire_timeout_ms: 20,
            ..ExtractorConfig::default()
        });

        let (_held, _) = Limiters::acquire_timed(
            limiters.extraction.clone(),
            limiters.acquire_timeout,
            "first",
        )
        .await
        .unwrap();

        let second = Limiters::acquire_timed(
            limiters.extraction.clone(),
            limiters.acquire_timeout,
            "second",
        )
        .await;
        assert!(second.is_err());
    }
}
