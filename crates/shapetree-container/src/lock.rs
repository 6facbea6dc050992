//! Strict FIFO mutual exclusion for one container.
//!
//! Each [`SequentialLock::acquire`] resolves only after every earlier
//! acquisition has released. Release happens when the returned
//! [`SequenceGuard`] drops, on every exit path. A waiter whose future is
//! dropped while still queued gives up its place without wedging the queue.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

#[derive(Debug, Default)]
struct Queue {
    held: bool,
    waiters: VecDeque<oneshot::Sender<()>>,
}

/// A FIFO lock without an owned value; the critical section is whatever
/// runs while the guard is alive.
#[derive(Debug, Default)]
pub struct SequentialLock {
    queue: Mutex<Queue>,
}

/// Held access to a [`SequentialLock`]. Dropping it wakes the next waiter.
#[derive(Debug)]
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct SequenceGuard<'a> {
    lock: &'a SequentialLock,
}

impl Drop for SequenceGuard<'_> {
    fn drop(&mut self) {
        self.lock.release();
    }
}

/// A queued acquisition. If dropped before being granted, it leaves the
/// queue; if the grant raced with the drop, it passes the lock on.
struct Waiter<'a> {
    lock: &'a SequentialLock,
    rx: oneshot::Receiver<()>,
    granted: bool,
}

impl Drop for Waiter<'_> {
    fn drop(&mut self) {
        if self.granted {
            return;
        }
        self.rx.close();
        if self.rx.try_recv().is_ok() {
            self.lock.release();
        }
    }
}

impl SequentialLock {
    pub fn new() -> Self {
        Self::default()
    }

    // The queue holds no invariant a panic elsewhere could break.
    fn queue(&self) -> MutexGuard<'_, Queue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wait for every earlier acquisition to finish, then enter.
    pub async fn acquire(&self) -> SequenceGuard<'_> {
        let rx = {
            let mut queue = self.queue();
            if !queue.held {
                queue.held = true;
                return SequenceGuard { lock: self };
            }
            let (tx, rx) = oneshot::channel();
            queue.waiters.push_back(tx);
            rx
        };
        let mut waiter = Waiter {
            lock: self,
            rx,
            granted: false,
        };
        // The sender only goes away by being used, so any completion is a grant.
        let _ = (&mut waiter.rx).await;
        waiter.granted = true;
        SequenceGuard { lock: self }
    }

    /// Enter only if nobody holds or waits for the lock.
    pub fn try_acquire(&self) -> Option<SequenceGuard<'_>> {
        let mut queue = self.queue();
        if queue.held {
            return None;
        }
        queue.held = true;
        Some(SequenceGuard { lock: self })
    }

    pub fn is_locked(&self) -> bool {
        self.queue().held
    }

    /// Number of acquisitions currently queued behind the holder.
    pub fn waiting(&self) -> usize {
        self.queue().waiters.len()
    }

    fn release(&self) {
        let mut queue = self.queue();
        while let Some(next) = queue.waiters.pop_front() {
            if next.send(()).is_ok() {
                return;
            }
        }
        queue.held = false;
    }
}
