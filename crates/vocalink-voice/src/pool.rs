//! Fixed-size worker pool for blocking external calls.
//!
//! The speech client performs blocking I/O, so its calls must never run on
//! the async request-serving threads. Jobs are submitted to a shared
//! unbounded queue consumed by a fixed number of plain threads; the
//! submitter gets a `oneshot` receiver for the result. A caller blocks
//! only on its own result, never on another caller's work, while overall
//! external-call throughput is capped by the worker count.
//!
//! A submitted job always runs to completion, even if the requester drops
//! its receiver — persistence performed inside the job is not lost when
//! the originating connection goes away.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use tokio::sync::oneshot;

use crate::error::VoiceError;

/// Number of workers in the reference configuration.
pub const DEFAULT_WORKERS: usize = 4;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A fixed-size pool of threads executing blocking jobs.
#[derive(Debug, Clone)]
pub struct BlockingPool {
    tx: mpsc::Sender<Job>,
}

impl BlockingPool {
    /// Spawns `workers` threads consuming the shared job queue.
    ///
    /// Worker threads run for the life of the process; they exit when the
    /// last pool handle (and with it the sending side) is dropped.
    pub fn new(workers: usize) -> Self {
        let (tx, rx) = mpsc::channel::<Job>();
        let rx = Arc::new(Mutex::new(rx));

        for index in 0..workers.max(1) {
            let rx = Arc::clone(&rx);
            thread::Builder::new()
                .name(format!("voice-worker-{index}"))
                .spawn(move || loop {
                    let job = {
                        let Ok(guard) = rx.lock() else { break };
                        guard.recv()
                    };
                    match job {
                        Ok(job) => job(),
                        // Sender side dropped, pool is shutting down.
                        Err(_) => break,
                    }
                })
                .expect("failed to spawn voice worker thread");
        }

        Self { tx }
    }

    /// Enqueues a job immediately and returns a receiver for its result.
    ///
    /// The job runs regardless of whether the receiver is ever awaited.
    pub fn submit<T, F>(&self, job: F) -> oneshot::Receiver<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (result_tx, result_rx) = oneshot::channel();
        let wrapped: Job = Box::new(move || {
            // The requester may have gone away; the job's side effects
            // stand either way.
            let _ = result_tx.send(job());
        });

        if self.tx.send(wrapped).is_err() {
            tracing::error!("voice worker pool queue is closed, job dropped");
        }
        result_rx
    }

    /// Submits a job and awaits its result.
    pub async fn run<T, F>(&self, job: F) -> Result<T, VoiceError>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        self.submit(job)
            .await
            .map_err(|_| VoiceError::Dispatch("voice worker pool is gone".to_string()))
    }
}

impl Default for BlockingPool {
    fn default() -> Self {
        Self::new(DEFAULT_WORKERS)
    }
}
