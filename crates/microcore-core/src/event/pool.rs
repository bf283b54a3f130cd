use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, mpsc};
use tokio::task::JoinHandle;

use crate::event::error::EventSystemError;

/// Unit of work accepted by the pool.
pub type Job = BoxFuture<'static, ()>;

/// Default number of workers, matching the bus's historical capacity.
pub const DEFAULT_WORKERS: usize = 10;

/// Fixed-size pool of Tokio tasks draining a shared job queue.
///
/// Submission never blocks and never spawns: jobs are queued and picked up
/// by whichever of the `size` workers is free, so at most `size` jobs run at
/// once regardless of how many are submitted. A job that panics is caught
/// and counted; its worker keeps serving the queue.
pub struct WorkerPool {
    size: usize,
    sender: Mutex<Option<mpsc::UnboundedSender<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    completed: Arc<AtomicU64>,
    panicked: Arc<AtomicU64>,
}

impl WorkerPool {
    /// Start `size` workers (at least one) on the current Tokio runtime.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let (sender, receiver) = mpsc::unbounded_channel::<Job>();
        let receiver = Arc::new(AsyncMutex::new(receiver));
        let completed = Arc::new(AtomicU64::new(0));
        let panicked = Arc::new(AtomicU64::new(0));

        let workers = (0..size)
            .map(|id| {
                let receiver = Arc::clone(&receiver);
                let completed = Arc::clone(&completed);
                let panicked = Arc::clone(&panicked);
                tokio::spawn(async move {
                    loop {
                        // Only one idle worker waits on the queue at a time; the
                        // lock is released before the job runs.
                        let job = { receiver.lock().await.recv().await };
                        let Some(job) = job else { break };
                        if AssertUnwindSafe(job).catch_unwind().await.is_err() {
                            panicked.fetch_add(1, Ordering::SeqCst);
                            log::error!("BusWorker-{}: job panicked", id);
                        }
                        completed.fetch_add(1, Ordering::SeqCst);
                    }
                    log::debug!("BusWorker-{} stopped", id);
                })
            })
            .collect();

        log::debug!("Worker pool started with {} workers", size);
        Self {
            size,
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
            completed,
            panicked,
        }
    }

    /// Queue a job for execution.
    pub fn submit(&self, job: Job) -> Result<(), EventSystemError> {
        let sender = self.sender.lock();
        match sender.as_ref() {
            Some(sender) => sender.send(job).map_err(|_| EventSystemError::PoolClosed),
            None => Err(EventSystemError::PoolClosed),
        }
    }

    /// Stop accepting jobs. Already queued jobs still run.
    pub fn close(&self) {
        if self.sender.lock().take().is_some() {
            log::debug!("Worker pool closed");
        }
    }

    /// Close the pool and wait for every worker to drain the queue and exit.
    pub async fn shutdown(&self) {
        self.close();
        let workers: Vec<JoinHandle<()>> = std::mem::take(&mut *self.workers.lock());
        for worker in workers {
            if let Err(e) = worker.await {
                log::warn!("Worker pool task ended abnormally: {}", e);
            }
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_closed(&self) -> bool {
        self.sender.lock().is_none()
    }

    /// Jobs finished so far, including those that panicked.
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn panicked(&self) -> u64 {
        self.panicked.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("size", &self.size)
            .field("closed", &self.is_closed())
            .field("completed", &self.completed())
            .field("panicked", &self.panicked())
            .finish()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Dropping the sender lets idle workers observe the closed queue and exit.
        self.sender.get_mut().take();
    }
}
