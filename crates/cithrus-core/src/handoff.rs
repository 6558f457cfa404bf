//! Lock-guarded double buffering between a foreign producer and the tick
//! thread.
//!
//! Components fed from outside the tick loop (a GPU readback callback, a
//! network receive thread) hold a [`DoubleBuffer`] and hand a [`Publisher`]
//! to the producer. The cell cycles
//! `Empty → Writing → Dirty → Consumed → Empty`:
//!
//! - the producer writes a whole frame into the back buffer under the lock
//!   and marks the cell dirty;
//! - the tick thread, under the same lock, flips the exposed index only if
//!   the cell is dirty, then publishes the newly exposed buffer.
//!
//! The exposed buffer is never the one being written, so the tick thread
//! never observes a torn frame. A clean cell is never swapped, so a frame is
//! never delivered twice.
//!
//! Delivery is latest-wins: if the producer publishes twice before the tick
//! thread takes, the first frame is overwritten and counted in
//! [`HandoffStats::overwritten`].
//!
//! ```rust
//! use cithrus_core::handoff::DoubleBuffer;
//!
//! let mut cell = DoubleBuffer::new();
//! let publisher = cell.publisher();
//! std::thread::spawn(move || {
//!     publisher.publish(|frame| frame.extend_from_slice(&[1, 2, 3]));
//! })
//! .join()
//! .unwrap();
//!
//! let view = cell.take().expect("a frame was published");
//! assert_eq!(view.as_bytes(), &[1, 2, 3]);
//! assert!(cell.take().is_none());
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::buffer::BufferView;

/// Delivery counters for one cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandoffStats {
    /// Frames written by the producer.
    pub published: u64,
    /// Frames swapped in by the consumer.
    pub delivered: u64,
    /// Frames replaced before the consumer took them.
    pub overwritten: u64,
}

struct Cell {
    buffers: [Arc<Vec<u8>>; 2],
    exposed: usize,
    dirty: bool,
    destroyed: bool,
    stats: HandoffStats,
}

/// Consumer side of a double-buffer cell, owned by the tick-thread component.
pub struct DoubleBuffer {
    cell: Arc<Mutex<Cell>>,
}

impl DoubleBuffer {
    /// Creates an empty cell.
    pub fn new() -> Self {
        Self {
            cell: Arc::new(Mutex::new(Cell {
                buffers: [Arc::default(), Arc::default()],
                exposed: 0,
                dirty: false,
                destroyed: false,
                stats: HandoffStats::default(),
            })),
        }
    }

    /// Returns a producer handle for this cell.
    pub fn publisher(&self) -> Publisher {
        Publisher {
            cell: Arc::clone(&self.cell),
        }
    }

    /// Swaps in the latest frame if one has been published since the last
    /// take.
    ///
    /// Returns `None` on a clean cell; the caller should keep whatever it
    /// exposed before.
    pub fn take(&mut self) -> Option<BufferView> {
        let mut cell = self.cell.lock();
        if !cell.dirty {
            return None;
        }
        cell.exposed ^= 1;
        cell.dirty = false;
        cell.stats.delivered += 1;
        Some(BufferView::from_shared(Arc::clone(&cell.buffers[cell.exposed])))
    }

    /// The currently exposed frame; empty until the first take.
    pub fn current(&self) -> BufferView {
        let cell = self.cell.lock();
        BufferView::from_shared(Arc::clone(&cell.buffers[cell.exposed]))
    }

    /// Returns `true` if a frame is waiting to be taken.
    pub fn is_dirty(&self) -> bool {
        self.cell.lock().dirty
    }

    /// Delivery counters.
    pub fn stats(&self) -> HandoffStats {
        self.cell.lock().stats
    }
}

impl Default for DoubleBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DoubleBuffer {
    fn drop(&mut self) {
        self.cell.lock().destroyed = true;
    }
}

impl fmt::Debug for DoubleBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell = self.cell.lock();
        f.debug_struct("DoubleBuffer")
            .field("exposed", &cell.exposed)
            .field("dirty", &cell.dirty)
            .field("stats", &cell.stats)
            .finish()
    }
}

/// Producer side of a double-buffer cell. Cheap to clone; safe to move to
/// any thread.
#[derive(Clone)]
pub struct Publisher {
    cell: Arc<Mutex<Cell>>,
}

impl Publisher {
    /// Writes one frame into the back buffer.
    ///
    /// `fill` receives the back buffer cleared to length zero and must leave a
    /// complete frame in it. The lock is held for the duration of `fill`, so
    /// it should only copy.
    ///
    /// Returns `false`, without calling `fill`, once the consumer is gone.
    pub fn publish(&self, fill: impl FnOnce(&mut Vec<u8>)) -> bool {
        let mut cell = self.cell.lock();
        if cell.destroyed {
            return false;
        }
        let back = cell.exposed ^ 1;
        // A reader may still hold a view of the back buffer from an earlier
        // exposure; make_mut detaches it instead of writing under it.
        let buf = Arc::make_mut(&mut cell.buffers[back]);
        buf.clear();
        fill(buf);

        if cell.dirty {
            cell.stats.overwritten += 1;
        }
        cell.dirty = true;
        cell.stats.published += 1;
        true
    }

    /// Copies `bytes` in as one frame.
    pub fn publish_bytes(&self, bytes: &[u8]) -> bool {
        self.publish(|buf| buf.extend_from_slice(bytes))
    }

    /// Returns `true` once the consumer has been dropped.
    pub fn is_closed(&self) -> bool {
        self.cell.lock().destroyed
    }
}

impl fmt::Debug for Publisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Publisher")
            .field("closed", &self.is_closed())
            .finish()
    }
}
