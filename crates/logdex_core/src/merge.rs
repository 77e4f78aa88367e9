//! Fan-in of several ordered streams into one.
//!
//! Each source is drained by its own worker thread into a shared bounded
//! channel. The consumer sees items in arrival order; items of one source
//! keep their relative order, and nothing is promised across sources.
//!
//! # Invariants
//!
//! - The merged stream ends only after every source has ended
//! - The first error ends the merged stream
//! - A worker blocks once `buffer` items are waiting
//! - Dropping the stream stops every worker at its next send

use crate::error::{CoreError, CoreResult};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// One input of a [`FanIn`].
pub type Source<T> = Box<dyn Iterator<Item = CoreResult<T>> + Send>;

enum Slot<T> {
    Item(CoreResult<T>),
    Done,
}

/// Merged pull stream over several sources.
pub struct FanIn<T> {
    receiver: Option<Receiver<Slot<T>>>,
    cancel: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
    live: usize,
    finished: bool,
}

impl<T: Send + 'static> FanIn<T> {
    /// Starts one worker per source.
    ///
    /// `buffer` is the shared channel capacity (at least 1). With no
    /// sources the stream is empty.
    pub fn new<I>(sources: I, buffer: usize) -> Self
    where
        I: IntoIterator<Item = Source<T>>,
    {
        let (sender, receiver) = mpsc::sync_channel(buffer.max(1));
        let cancel = Arc::new(AtomicBool::new(false));

        let workers: Vec<JoinHandle<()>> = sources
            .into_iter()
            .enumerate()
            .map(|(slot, source)| {
                let sender = sender.clone();
                let cancel = Arc::clone(&cancel);
                thread::spawn(move || pump(slot, source, &sender, &cancel))
            })
            .collect();

        tracing::trace!(sources = workers.len(), buffer, "fan-in started");
        Self {
            receiver: Some(receiver),
            cancel,
            live: workers.len(),
            workers,
            finished: false,
        }
    }
}

impl<T> FanIn<T> {
    /// Returns the number of sources that have not ended yet.
    #[must_use]
    pub fn live_sources(&self) -> usize {
        if self.finished {
            0
        } else {
            self.live
        }
    }

    fn finish(&mut self) {
        self.finished = true;
        self.cancel.store(true, Ordering::SeqCst);
        self.receiver = None;
    }
}

fn pump<T>(slot: usize, source: Source<T>, sender: &SyncSender<Slot<T>>, cancel: &AtomicBool) {
    for item in source {
        if cancel.load(Ordering::SeqCst) {
            tracing::trace!(slot, "fan-in worker cancelled");
            return;
        }
        let failed = item.is_err();
        if sender.send(Slot::Item(item)).is_err() {
            tracing::trace!(slot, "fan-in consumer gone");
            return;
        }
        if failed {
            return;
        }
    }
    let _ = sender.send(Slot::Done);
    tracing::trace!(slot, "fan-in worker finished");
}

impl<T> Iterator for FanIn<T> {
    type Item = CoreResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished || self.live == 0 {
                return None;
            }
            let received = self.receiver.as_ref()?.recv();
            match received {
                Ok(Slot::Item(Ok(item))) => return Some(Ok(item)),
                Ok(Slot::Item(Err(e))) => {
                    self.finish();
                    return Some(Err(e));
                }
                Ok(Slot::Done) => self.live -= 1,
                Err(_) => {
                    self.finish();
                    return Some(Err(CoreError::SourceDisconnected));
                }
            }
        }
    }
}

impl<T> Drop for FanIn<T> {
    fn drop(&mut self) {
        let completed = self.live == 0;
        self.finish();
        // Workers that already reported `Done` exit promptly. Others may
        // be blocked inside their source and are left to stop on their
        // next send.
        if completed {
            for worker in self.workers.drain(..) {
                let _ = worker.join();
            }
        }
    }
}

impl<T> fmt::Debug for FanIn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FanIn")
            .field("workers", &self.workers.len())
            .field("live", &self.live)
            .field("finished", &self.finished)
            .finish()
    }
}
