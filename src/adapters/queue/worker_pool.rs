//! Scoring worker pool.
//!
//! Workers share one receiver and drain the queue concurrently. Each
//! job runs through the scoring handler with bounded retries; a job
//! that exhausts its attempts is dropped and the response stays
//! unscored, which analysis treats the same as a skipped drill.
//!
//! ## Graceful Shutdown
//!
//! Workers finish the job in flight and exit. Jobs still queued at
//! shutdown are dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{error, info, warn};

use crate::application::ScoreResponseHandler;
use crate::ports::ScoringJob;

/// Tuning for the pool.
#[derive(Debug, Clone)]
pub struct ScoringWorkerConfig {
    /// Concurrent workers draining the queue.
    pub workers: usize,

    /// Attempts per job, the first try included.
    pub max_attempts: u32,

    /// Delay before the first retry; doubles after each failure.
    pub retry_backoff: Duration,
}

impl Default for ScoringWorkerConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            max_attempts: 3,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

impl ScoringWorkerConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }
}

/// Pool of workers running scoring jobs off the queue.
pub struct ScoringWorkerPool {
    handler: Arc<ScoreResponseHandler>,
    config: ScoringWorkerConfig,
}

impl ScoringWorkerPool {
    pub fn new(handler: Arc<ScoreResponseHandler>) -> Self {
        Self {
            handler,
            config: ScoringWorkerConfig::default(),
        }
    }

    pub fn with_config(handler: Arc<ScoreResponseHandler>, config: ScoringWorkerConfig) -> Self {
        Self { handler, config }
    }

    /// Spawns the workers and hands back their join handles.
    ///
    /// The receiver is shared through a mutex: one worker at a time
    /// waits on the channel while the rest process or queue for the
    /// lock, which is released before the job runs.
    pub fn spawn(
        &self,
        receiver: mpsc::Receiver<ScoringJob>,
        shutdown: watch::Receiver<bool>,
    ) -> Vec<JoinHandle<()>> {
        let receiver = Arc::new(Mutex::new(receiver));

        (0..self.config.workers)
            .map(|worker| {
                let receiver = Arc::clone(&receiver);
                let handler = Arc::clone(&self.handler);
                let config = self.config.clone();
                let mut shutdown = shutdown.clone();

                tokio::spawn(async move {
                    loop {
                        let job = {
                            let mut rx = receiver.lock().await;
                            tokio::select! {
                                _ = shutdown.changed() => {
                                    if *shutdown.borrow() {
                                        info!(worker, "Scoring worker stopping");
                                        return;
                                    }
                                    continue;
                                }
                                job = rx.recv() => job,
                            }
                        };

                        match job {
                            Some(job) => run_job(&handler, &config, job).await,
                            None => {
                                info!(worker, "Scoring queue closed, worker stopping");
                                return;
                            }
                        }
                    }
                })
            })
            .collect()
    }
}

async fn run_job(handler: &ScoreResponseHandler, config: &ScoringWorkerConfig, job: ScoringJob) {
    let mut attempt = 1;
    let mut backoff = config.retry_backoff;

    loop {
        match handler.handle(job.clone()).await {
            Ok(_) => return,
            Err(err) if err.is_retryable() && attempt < config.max_attempts => {
                warn!(
                    session_id = %job.session_id,
                    attempt,
                    error = %err,
                    "Scoring attempt failed, retrying"
                );
                time::sleep(backoff).await;
                backoff *= 2;
                attempt += 1;
            }
            Err(err) => {
                error!(
                    session_id = %job.session_id,
                    attempts = attempt,
                    error = %err,
                    "Scoring failed, response stays unscored"
                );
                return;
            }
        }
    }
}
