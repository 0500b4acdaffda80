//! Session runtime for concurrent queries.
//!
//! Chaining itself is synchronous. This module runs independent sessions
//! on a small, bounded pool of worker threads sharing one read-only engine;
//! each job builds its own working sets and trace.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use tracing::{debug, warn};

use crate::config::RuntimeConfig;
use crate::engine::{EngineResponse, InferenceEngine};
use crate::error::{ExecutionError, FactchainError, FactchainResult};
use crate::ir::Query;

enum Job {
    Execute {
        query: Query,
        reply: Sender<FactchainResult<EngineResponse>>,
    },

    #[cfg(test)]
    Sleep {
        duration: Duration,
        reply: Sender<()>,
    },
}

/// Handle returned by `submit`.
#[derive(Debug)]
pub struct SessionHandle {
    rx: Receiver<FactchainResult<EngineResponse>>,
}

impl SessionHandle {
    /// Waits for the session to complete.
    pub fn join(self) -> FactchainResult<EngineResponse> {
        self.rx
            .recv()
            .map_err(|_| FactchainError::Execution(ExecutionError::Disconnected))?
    }

    /// Waits for the session to complete with a timeout.
    pub fn join_timeout(self, timeout: Duration) -> FactchainResult<EngineResponse> {
        self.rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => FactchainError::Execution(ExecutionError::Timeout {
                duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }),
            RecvTimeoutError::Disconnected => FactchainError::Execution(ExecutionError::Disconnected),
        })?
    }
}

/// A bounded pool of session workers over one shared engine.
pub struct SessionRuntime {
    engine: Arc<InferenceEngine>,
    tx: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
    queue_capacity: usize,
}

impl SessionRuntime {
    /// Starts the worker threads.
    pub fn new(engine: InferenceEngine, config: &RuntimeConfig) -> FactchainResult<Self> {
        let engine = Arc::new(engine);
        let workers = config.workers.max(1);
        let queue_capacity = config.queue_capacity.max(1);
        let (tx, rx) = bounded::<Job>(queue_capacity);

        let mut handles = Vec::with_capacity(workers);
        for idx in 0..workers {
            let rx: Receiver<Job> = rx.clone();
            let engine = Arc::clone(&engine);
            let handle = thread::Builder::new()
                .name(format!("factchain-session-{idx}"))
                .spawn(move || worker_loop(&rx, &engine))
                .map_err(|e| FactchainError::internal(format!("failed to spawn session worker: {e}")))?;
            handles.push(handle);
        }
        debug!(workers, queue_capacity, "session runtime started");

        Ok(Self {
            engine,
            tx: Some(tx),
            workers: handles,
            queue_capacity,
        })
    }

    /// Queues a query without blocking.
    pub fn submit(&self, query: Query) -> FactchainResult<SessionHandle> {
        let (reply, rx) = bounded::<FactchainResult<EngineResponse>>(1);
        self.try_submit(Job::Execute { query, reply })?;
        Ok(SessionHandle { rx })
    }

    /// Queues a query and waits for its response.
    pub fn execute(&self, query: Query) -> FactchainResult<EngineResponse> {
        self.submit(query)?.join()
    }

    /// Runs every query, returning responses in input order.
    pub fn execute_all(&self, queries: Vec<Query>) -> Vec<FactchainResult<EngineResponse>> {
        let handles: Vec<_> = queries.into_iter().map(|q| self.submit(q)).collect();
        handles
            .into_iter()
            .map(|handle| handle.and_then(SessionHandle::join))
            .collect()
    }

    /// The shared engine.
    #[must_use]
    pub fn engine(&self) -> &InferenceEngine {
        &self.engine
    }

    fn try_submit(&self, job: Job) -> FactchainResult<()> {
        let Some(tx) = self.tx.as_ref() else {
            return Err(ExecutionError::Disconnected.into());
        };
        match tx.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                warn!(capacity = self.queue_capacity, "session queue full");
                Err(ExecutionError::QueueFull {
                    capacity: self.queue_capacity,
                }
                .into())
            }
            Err(TrySendError::Disconnected(_)) => Err(ExecutionError::Disconnected.into()),
        }
    }

    #[cfg(test)]
    fn submit_sleep(&self, duration: Duration) -> FactchainResult<Receiver<()>> {
        let (reply, rx) = bounded::<()>(1);
        self.try_submit(Job::Sleep { duration, reply })?;
        Ok(rx)
    }
}

fn worker_loop(rx: &Receiver<Job>, engine: &InferenceEngine) {
    loop {
        match rx.recv() {
            Ok(Job::Execute { query, reply }) => {
                let _ = reply.send(engine.execute(query));
            }
            Err(_) => break,

            #[cfg(test)]
            Ok(Job::Sleep { duration, reply }) => {
                thread::sleep(duration);
                let _ = reply.send(());
            }
        }
    }
}

impl Drop for SessionRuntime {
    fn drop(&mut self) {
        // Closing the channel lets workers drain queued jobs, then exit.
        drop(self.tx.take());
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}
