//! Interrupt source for blocked callers
//!
//! An [`Interrupt`] plays the role of a pending signal: any thread can raise
//! it, and a caller sleeping in a FIFO wait returns
//! [`crate::FifoError::Interrupted`] instead of sleeping on.
//!
//! # Waking a sleeper
//!
//! Raising the flag alone is not enough: a sleeper is parked on a device
//! condition variable and only re-checks its predicates when woken. So every
//! caller that goes to sleep arms the interrupt with its own wake hook. The
//! workflow is:
//!
//! 10. Sleeper (device lock held): arm, registering its hook
//! 20. Sleeper (device lock held): check for delivery, then wait on the
//!     condvar (the wait releases the device lock atomically)
//!
//! 30. Raiser: mark every armed sleeper as interrupted, or leave the
//!     interrupt pending if nobody is armed
//! 40. Raiser: call the hooks of the marked sleepers
//! 50. Hook: take the device lock, notify the condvars
//!
//! If step 30 happens before step 10, the pending interrupt is visible in
//! step 20 and the sleeper never waits. If it happens after, the hook in
//! step 50 cannot take the device lock until the sleeper is parked, so the
//! notification is never lost.
//!
//! One raise reaches every caller sleeping on the interrupt (or a clone of
//! it), as a signal to a process reaches each of its blocked threads. A
//! pending interrupt is consumed by the first call that would sleep. A
//! sleeper marked interrupted that returns for another reason (its data
//! arrived first) puts the interrupt back to pending.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

type WakeHook = Arc<dyn Fn() + Send + Sync>;

struct Sleeper {
    id: u64,
    hook: WakeHook,
    interrupted: bool,
}

#[derive(Default)]
struct InterruptState {
    pending: bool,
    next_id: u64,
    sleepers: Vec<Sleeper>,
}

/// Cloneable interrupt source
///
/// Clones share the same state: raise on one, interrupt the sleepers of all.
#[derive(Clone, Default)]
pub struct Interrupt {
    inner: Arc<Mutex<InterruptState>>,
}

impl Interrupt {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the interrupt and wake every caller sleeping on it
    ///
    /// With no caller asleep, the interrupt stays pending.
    pub fn raise(&self) {
        let hooks: Vec<WakeHook> = {
            let mut state = self.inner.lock();
            if state.sleepers.is_empty() {
                state.pending = true;
                Vec::new()
            } else {
                state
                    .sleepers
                    .iter_mut()
                    .map(|sleeper| {
                        sleeper.interrupted = true;
                        Arc::clone(&sleeper.hook)
                    })
                    .collect()
            }
        };
        // Call outside the lock: the hooks take device locks
        for hook in hooks {
            hook();
        }
    }

    /// Whether an interrupt is raised and not yet delivered
    #[must_use]
    pub fn is_raised(&self) -> bool {
        let state = self.inner.lock();
        state.pending || state.sleepers.iter().any(|s| s.interrupted)
    }

    /// Consume a pending interrupt; returns whether one was pending
    pub fn take(&self) -> bool {
        std::mem::take(&mut self.inner.lock().pending)
    }

    /// Register a sleeper and its wake hook for the duration of a sleep
    ///
    /// The sleeper is removed when the returned guard drops.
    pub(crate) fn arm<F>(&self, hook: F) -> Armed<'_>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut state = self.inner.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.sleepers.push(Sleeper {
            id,
            hook: Arc::new(hook),
            interrupted: false,
        });
        Armed {
            interrupt: self,
            id,
        }
    }
}

impl fmt::Debug for Interrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        write!(
            f,
            "Interrupt(pending={}, sleepers={})",
            state.pending,
            state.sleepers.len()
        )
    }
}

/// One registered sleeper; unregisters on drop
pub(crate) struct Armed<'a> {
    interrupt: &'a Interrupt,
    id: u64,
}

impl Armed<'_> {
    /// Consume an interrupt meant for this sleeper, or a pending one
    pub(crate) fn take(&self) -> bool {
        let mut state = self.interrupt.inner.lock();
        if let Some(sleeper) = state.sleepers.iter_mut().find(|s| s.id == self.id) {
            if std::mem::take(&mut sleeper.interrupted) {
                return true;
            }
        }
        std::mem::take(&mut state.pending)
    }
}

impl Drop for Armed<'_> {
    fn drop(&mut self) {
        let mut state = self.interrupt.inner.lock();
        if let Some(index) = state.sleepers.iter().position(|s| s.id == self.id) {
            let sleeper = state.sleepers.swap_remove(index);
            if sleeper.interrupted {
                log::debug!("interrupt: sleeper {} left before delivery", self.id);
                state.pending = true;
            }
        }
    }
}
