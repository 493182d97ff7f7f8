//! `TreeLock`: a reader-writer lock where the writer may also take read
//! locks on itself, without blocking.
//!
//! `std::sync::RwLock` cannot do this — a writer that calls `.read()` on
//! itself deadlocks. This is a direct port of `util.py`'s `RWLock`: a
//! reader count, a flag for "is a writer currently active", and a side
//! counter of read locks the writer itself opened while holding the write
//! lock. On write-release, that side counter is transferred into the
//! reader count, so a thread that downgrades from write to read (take a
//! read lock, then release the write lock) keeps its read lock live with
//! no gap — which is exactly what `Store::commit` needs to run "under a
//! read lock" immediately after a mutation, without releasing exclusivity
//! in between (spec.md §5).

use std::{
    sync::{Condvar, Mutex},
    thread::{self, ThreadId},
};

struct State {
    readers: i64,
    writer: Option<ThreadId>,
    writer_read_locks: u64,
}

/// The reentrant-writer reader-writer lock guarding a `Store`'s tree.
pub struct TreeLock {
    state: Mutex<State>,
    cond: Condvar,
}

impl TreeLock {
    pub fn new() -> Self {
        TreeLock {
            state: Mutex::new(State {
                readers: 0,
                writer: None,
                writer_read_locks: 0,
            }),
            cond: Condvar::new(),
        }
    }

    /// Acquires a read lock. Blocks only if another thread holds the write
    /// lock; if *this* thread holds it, the read lock is granted
    /// immediately and tracked separately so it can be folded back into
    /// the reader count on write-release.
    pub fn read(&self) -> ReadGuard<'_> {
        let me = thread::current().id();
        let mut state = self.state.lock().unwrap();
        if state.writer == Some(me) {
            state.writer_read_locks += 1;
        } else {
            while state.writer.is_some() {
                state = self.cond.wait(state).unwrap();
            }
            state.readers += 1;
        }
        drop(state);
        ReadGuard { lock: self }
    }

    fn release_read(&self) {
        let me = thread::current().id();
        let mut state = self.state.lock().unwrap();
        if state.writer == Some(me) {
            state.writer_read_locks -= 1;
        } else {
            state.readers -= 1;
        }
        self.cond.notify_all();
    }

    /// Acquires the write lock, blocking until there are no active readers
    /// and no other writer.
    pub fn write(&self) -> WriteGuard<'_> {
        let me = thread::current().id();
        let mut state = self.state.lock().unwrap();
        while state.readers > 0 || state.writer.is_some() {
            state = self.cond.wait(state).unwrap();
        }
        state.writer = Some(me);
        drop(state);
        WriteGuard { lock: self }
    }

    fn release_write(&self) {
        let mut state = self.state.lock().unwrap();
        state.readers = state.writer_read_locks as i64;
        state.writer_read_locks = 0;
        state.writer = None;
        self.cond.notify_all();
    }
}

impl Default for TreeLock {
    fn default() -> Self {
        Self::new()
    }
}

/// Held while a reader (or a downgrading writer) has read access.
pub struct ReadGuard<'a> {
    lock: &'a TreeLock,
}

impl Drop for ReadGuard<'_> {
    fn drop(&mut self) {
        self.lock.release_read();
    }
}

/// Held while a writer has exclusive access.
pub struct WriteGuard<'a> {
    lock: &'a TreeLock,
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        self.lock.release_write();
    }
}
