use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot_core::SpinWait;

/// The version counter lives in the upper 62 bits of the word; the lock bit
/// is bit 1 and the obsolete bit is bit 0. Adding `LOCK_INCREMENT` to a
/// locked word clears the lock bit and advances the counter in one step.
pub(crate) const OBSOLETE_BIT: u64 = 1;
pub(crate) const LOCK_BIT: u64 = 1 << 1;
pub(crate) const LOCK_INCREMENT: u64 = 1 << 1;

/// A traversal observed a concurrent mutation (the version moved under it,
/// or the node left the tree) and must re-enter from the root.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) struct Restart;

impl Display for Restart {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Restart")
    }
}

impl std::error::Error for Restart {}

// Optimistic lock.
// Encodes a version, a lock bit and an obsolete bit into the same atomic.
// Readers capture the version, read without locking, and re-check the word
// before trusting anything they derived; writers take the lock with a CAS
// against the exact version they captured.
pub(crate) struct OptimisticVersion {
    version_lock_obsolete: AtomicU64,
}

impl OptimisticVersion {
    pub(crate) fn new() -> Self {
        Self {
            version_lock_obsolete: AtomicU64::new(0),
        }
    }

    /// Wait out a held write lock, then return the stable version. Observing
    /// the obsolete bit means the node has been detached and the traversal
    /// that reached it must restart.
    pub(crate) fn read_lock(&self) -> Result<u64, Restart> {
        let mut spin = SpinWait::new();
        loop {
            let version = self.version_lock_obsolete.load(Ordering::Acquire);
            if version & LOCK_BIT != 0 {
                // Bounded spin, then yield so a writer on a shared core can
                // finish its critical section.
                if !spin.spin() {
                    spin.reset();
                    std::thread::yield_now();
                }
                continue;
            }
            if version & OBSOLETE_BIT != 0 {
                return Err(Restart);
            }
            return Ok(version);
        }
    }

    /// Re-check that the word still matches the captured version.
    #[inline]
    pub(crate) fn validate(&self, version: u64) -> Result<(), Restart> {
        if self.version_lock_obsolete.load(Ordering::SeqCst) == version {
            Ok(())
        } else {
            Err(Restart)
        }
    }

    /// Take the write lock, but only if the word is still exactly the
    /// captured version. Losing the race maps to a restart.
    #[inline]
    pub(crate) fn upgrade_to_write_lock(&self, version: u64) -> Result<(), Restart> {
        match self.version_lock_obsolete.compare_exchange(
            version,
            version | LOCK_BIT,
            Ordering::Acquire,
            Ordering::Relaxed,
        ) {
            Ok(_) => Ok(()),
            Err(_) => Err(Restart),
        }
    }

    /// Release the write lock, advancing the counter by one.
    #[inline]
    pub(crate) fn write_unlock(&self) {
        self.version_lock_obsolete
            .fetch_add(LOCK_INCREMENT, Ordering::Release);
    }

    /// Release the write lock and mark the node obsolete in one transition:
    /// the counter advance and the obsolete bit land together, so a reader
    /// can never observe the unlock without the obsolete marking.
    pub(crate) fn write_unlock_obsolete(&self) {
        let mut current = self.version_lock_obsolete.load(Ordering::Relaxed);
        loop {
            debug_assert!(current & LOCK_BIT != 0, "unlocking a lock that is not held");
            let next = current.wrapping_add(LOCK_INCREMENT) | OBSOLETE_BIT;
            match self.version_lock_obsolete.compare_exchange_weak(
                current,
                next,
                Ordering::Release,
                Ordering::Relaxed,
            ) {
                Ok(_) => return,
                Err(observed) => current = observed,
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn version(&self) -> u64 {
        self.version_lock_obsolete.load(Ordering::Relaxed)
    }
}
