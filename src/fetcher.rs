use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::Result;
use crate::source::{EntrySource, FetchOutcome, FetchRequest};

/// Runs fetches on worker threads and posts the outcomes back over a channel.
///
/// Workers only call the source; all cache state stays with whoever drains
/// the pool.
pub struct FetchPool {
    pool: ThreadPool,
    source: Arc<dyn EntrySource>,
    sender: Sender<FetchOutcome>,
    receiver: Receiver<FetchOutcome>,
    in_flight: usize,
}

impl FetchPool {
    /// Worker count when none is configured.
    pub fn default_parallelism() -> usize {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        (cores * 2).clamp(4, 64)
    }

    pub fn new(source: Arc<dyn EntrySource>, threads: Option<usize>) -> Result<Self> {
        let threads = threads.unwrap_or_else(Self::default_parallelism).max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("zoomtree-fetch-{}", i))
            .build()?;
        let (sender, receiver) = mpsc::channel();
        tracing::debug!(threads, "fetch pool started");

        Ok(Self {
            pool,
            source,
            sender,
            receiver,
            in_flight: 0,
        })
    }

    /// Start one worker task per request.
    pub fn dispatch(&mut self, requests: Vec<FetchRequest>) {
        for request in requests {
            let source = Arc::clone(&self.source);
            let sender = self.sender.clone();
            self.in_flight += 1;

            self.pool.spawn(move || {
                let result = source.fetch(&request);
                if sender.send(FetchOutcome { request, result }).is_err() {
                    tracing::trace!("fetch finished after the pool was dropped");
                }
            });
        }
    }

    /// Outcomes that have arrived, without blocking.
    pub fn drain(&mut self) -> Vec<FetchOutcome> {
        let outcomes: Vec<FetchOutcome> = self.receiver.try_iter().collect();
        self.in_flight -= outcomes.len();
        outcomes
    }

    /// Block up to `timeout` for the next outcome. `None` when nothing is in
    /// flight or the timeout elapsed.
    pub fn wait(&mut self, timeout: Duration) -> Option<FetchOutcome> {
        if self.in_flight == 0 {
            return None;
        }
        match self.receiver.recv_timeout(timeout) {
            Ok(outcome) => {
                self.in_flight -= 1;
                Some(outcome)
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}
