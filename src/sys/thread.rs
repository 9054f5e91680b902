//! Thread affinity for the engine's mutators.

use std::thread::{self, ThreadId};

/// Remembers the thread that created the engine. Every public mutator calls
/// [`OwningThread::assert_on_owning_thread`] first.
#[derive(Debug, Clone, Copy)]
pub struct OwningThread {
    id: ThreadId,
    enforced: bool,
}

impl OwningThread {
    pub fn current(enforced: bool) -> Self { Self { id: thread::current().id(), enforced } }

    pub fn is_current(&self) -> bool { thread::current().id() == self.id }

    #[track_caller]
    pub fn assert_on_owning_thread(&self) {
        if self.enforced && !self.is_current() {
            panic!(
                "tool window state mutated off its owning thread (owner={:?}, current={:?})",
                self.id,
                thread::current().id()
            );
        }
    }
}
