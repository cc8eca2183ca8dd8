//! Lock-free single-slot handoff of control snapshots to the audio thread.
//!
//! The control thread publishes whole [`ControlSnapshot`]s; the audio thread
//! polls once at the start of each block. The slot is an
//! [`ArcSwap`](arc_swap::ArcSwap), so a snapshot is swapped in with a single
//! pointer store and never read half-written. A separate dirty flag tells the
//! reader whether anything changed since its last poll.
//!
//! # Memory ordering
//!
//! - `publish`: store the new snapshot, then set the flag with `Release`.
//! - `take`: clear the flag with an `AcqRel` swap; if it was set, load the
//!   slot. The acquire half pairs with the publisher's release, so the load
//!   sees the snapshot that raised the flag (or a newer one).
//!
//! Allocation happens only in `publish`, on the control thread. Neither side
//! blocks.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arc_swap::ArcSwap;

use crate::control::ControlSnapshot;

/// Single-writer, single-reader snapshot mailbox.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use cynthia_synth::{ControlMailbox, ControlSnapshot};
///
/// let mailbox = Arc::new(ControlMailbox::default());
///
/// // Control thread
/// let mut snapshot = ControlSnapshot::default();
/// snapshot.filter.cutoff_hz = 800.0;
/// mailbox.publish(snapshot);
///
/// // Audio thread, start of block
/// let applied = mailbox.take().expect("fresh snapshot");
/// assert_eq!(applied.filter.cutoff_hz, 800.0);
/// assert!(mailbox.take().is_none());
/// ```
#[derive(Debug)]
pub struct ControlMailbox {
    slot: ArcSwap<ControlSnapshot>,
    dirty: AtomicBool,
}

impl Default for ControlMailbox {
    fn default() -> Self {
        Self::new(ControlSnapshot::default())
    }
}

impl ControlMailbox {
    /// Create a mailbox holding `initial`, not marked dirty.
    pub fn new(initial: ControlSnapshot) -> Self {
        Self {
            slot: ArcSwap::from_pointee(initial),
            dirty: AtomicBool::new(false),
        }
    }

    /// Replace the published snapshot and mark it for pickup.
    pub fn publish(&self, snapshot: ControlSnapshot) {
        self.slot.store(Arc::new(snapshot));
        self.dirty.store(true, Ordering::Release);
    }

    /// Take the latest snapshot if one was published since the last take.
    pub fn take(&self) -> Option<ControlSnapshot> {
        if self.dirty.swap(false, Ordering::AcqRel) {
            Some(**self.slot.load())
        } else {
            None
        }
    }

    /// Latest published snapshot, without consuming the dirty flag.
    pub fn current(&self) -> ControlSnapshot {
        **self.slot.load()
    }

    /// Whether a snapshot is waiting for pickup.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_take_once_per_publish() {
        let mailbox = ControlMailbox::default();
        assert!(mailbox.take().is_none());

        let mut s = ControlSnapshot::default();
        s.output_gain = 0.9;
        mailbox.publish(s);
        assert!(mailbox.is_dirty());
        assert_eq!(mailbox.take().map(|s| s.output_gain), Some(0.9));
        assert!(!mailbox.is_dirty());
        assert!(mailbox.take().is_none());
    }

    #[test]
    fn test_latest_publish_wins() {
        let mailbox = ControlMailbox::default();
        for gain in [0.1, 0.2, 0.3] {
            let mut s = ControlSnapshot::default();
            s.output_gain = gain;
            mailbox.publish(s);
        }
        assert_eq!(mailbox.take().map(|s| s.output_gain), Some(0.3));
    }

    #[test]
    fn test_current_does_not_consume() {
        let mailbox = ControlMailbox::default();
        let mut s = ControlSnapshot::default();
        s.lfo.depth = 0.7;
        mailbox.publish(s);
        assert_eq!(mailbox.current().lfo.depth, 0.7);
        assert!(mailbox.is_dirty());
    }

    #[test]
    fn test_cross_thread_publish() {
        let mailbox = Arc::new(ControlMailbox::default());
        let writer = {
            let mailbox = Arc::clone(&mailbox);
            thread::spawn(move || {
                for i in 1..=1000 {
                    let mut s = ControlSnapshot::default();
                    s.filter.cutoff_hz = i as f32;
                    s.oscillator.morph = i as f32 / 1000.0;
                    mailbox.publish(s);
                }
            })
        };

        let mut last = 0.0f32;
        loop {
            if let Some(s) = mailbox.take() {
                // Fields from one publish always arrive together.
                assert_eq!(s.oscillator.morph, s.filter.cutoff_hz / 1000.0);
                assert!(s.filter.cutoff_hz >= last, "snapshots must not go backwards");
                last = s.filter.cutoff_hz;
            }
            if writer.is_finished() && !mailbox.is_dirty() {
                break;
            }
        }
        writer.join().expect("writer thread panicked");
        assert_eq!(mailbox.current().filter.cutoff_hz, 1000.0);
    }
}
