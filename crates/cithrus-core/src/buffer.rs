//! Frame views and per-component output arenas.
//!
//! A [`BufferView`] is what travels through ports: a read-only handle to one
//! frame's bytes. The writer owns the frame; readers borrow it for the tick in
//! which it was published. Cloning a view is a pointer copy, so a
//! [`Duplicator`](crate::scaffold::Duplicator) fanning one frame out to many
//! consumers never copies pixels.
//!
//! A [`FrameSlab`] is the writer side. Components keep one slab per output and
//! call [`write()`](FrameSlab::write) every tick: the allocation is reused as
//! long as no reader still holds last tick's view, and is copied-on-write when
//! one does, so a reader can never observe a frame being rewritten underneath
//! it.

use std::fmt;
use std::sync::Arc;

/// Read-only view of one frame, or the explicit "no data this tick" state.
#[derive(Clone, Default)]
pub struct BufferView {
    data: Option<Arc<Vec<u8>>>,
}

impl BufferView {
    /// The empty view: no frame was produced this tick.
    pub const fn empty() -> Self {
        Self { data: None }
    }

    /// Wraps an owned byte vector. A zero-length vector yields the empty view.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        if bytes.is_empty() {
            Self::empty()
        } else {
            Self {
                data: Some(Arc::new(bytes)),
            }
        }
    }

    pub(crate) fn from_shared(bytes: Arc<Vec<u8>>) -> Self {
        if bytes.is_empty() {
            Self::empty()
        } else {
            Self { data: Some(bytes) }
        }
    }

    /// Returns the frame bytes, or `None` for the empty view.
    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref().map(Vec::as_slice)
    }

    /// Returns the frame bytes; the empty view yields an empty slice.
    pub fn as_bytes(&self) -> &[u8] {
        self.data().unwrap_or(&[])
    }

    /// Number of bytes in the frame.
    pub fn len(&self) -> usize {
        self.data.as_ref().map_or(0, |d| d.len())
    }

    /// Returns `true` if no frame was produced.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if both views point at the same allocation.
    ///
    /// Two empty views are considered the same buffer.
    pub fn same_buffer(&self, other: &BufferView) -> bool {
        match (&self.data, &other.data) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl PartialEq for BufferView {
    fn eq(&self, other: &Self) -> bool {
        self.same_buffer(other) || self.as_bytes() == other.as_bytes()
    }
}

impl Eq for BufferView {}

impl fmt::Debug for BufferView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            Some(data) => f
                .debug_struct("BufferView")
                .field("ptr", &Arc::as_ptr(data))
                .field("len", &data.len())
                .finish(),
            None => f.write_str("BufferView(empty)"),
        }
    }
}

/// Reusable output arena owned by a single writer.
///
/// The slab resizes lazily when the requested frame size changes, matching
/// the "reallocate the output buffer only when the size changes" behavior of
/// the leaf converters.
#[derive(Default)]
pub struct FrameSlab {
    buf: Arc<Vec<u8>>,
}

impl FrameSlab {
    /// Creates an empty slab.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a slab pre-sized to `len` zeroed bytes.
    pub fn with_len(len: usize) -> Self {
        Self {
            buf: Arc::new(vec![0; len]),
        }
    }

    /// Returns exactly `len` writable bytes for this tick's frame.
    ///
    /// Existing contents are preserved up to `len`; growth is zero-filled.
    /// The buffer is reused in place only when no view of it is alive,
    /// including the one held by the output port; otherwise it is copied
    /// first. Clear the port before writing to reuse it across ticks.
    pub fn write(&mut self, len: usize) -> &mut [u8] {
        let buf = Arc::make_mut(&mut self.buf);
        buf.resize(len, 0);
        buf.as_mut_slice()
    }

    /// Replaces the frame with a copy of `bytes`.
    pub fn copy_from(&mut self, bytes: &[u8]) {
        self.write(bytes.len()).copy_from_slice(bytes);
    }

    /// Publishes the current contents as a view.
    pub fn view(&self) -> BufferView {
        BufferView::from_shared(Arc::clone(&self.buf))
    }

    /// Current frame size in bytes.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if the slab holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Returns `true` if a reader still holds a view of the current contents.
    pub fn is_shared(&self) -> bool {
        Arc::strong_count(&self.buf) > 1
    }
}

impl fmt::Debug for FrameSlab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameSlab")
            .field("len", &self.buf.len())
            .field("shared", &self.is_shared())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_view() {
        let view = BufferView::empty();
        assert!(view.is_empty());
        assert_eq!(view.data(), None);
        assert_eq!(view.as_bytes(), &[] as &[u8]);
        assert!(BufferView::from_vec(Vec::new()).is_empty());
    }

    #[test]
    fn clones_share_the_allocation() {
        let view = BufferView::from_vec(vec![1, 2, 3]);
        let copy = view.clone();
        assert!(view.same_buffer(&copy));
        assert_eq!(copy.as_bytes(), &[1, 2, 3]);
    }

    #[test]
    fn slab_reuses_allocation_when_unshared() {
        let mut slab = FrameSlab::new();
        slab.write(4).copy_from_slice(&[1, 2, 3, 4]);
        let first = slab.view();
        drop(first);
        let before = slab.view();
        let ptr = before.data().unwrap().as_ptr();
        drop(before);
        slab.write(4)[0] = 9;
        assert_eq!(slab.view().data().unwrap().as_ptr(), ptr);
    }

    #[test]
    fn slab_copies_on_write_while_a_reader_holds_a_view() {
        let mut slab = FrameSlab::new();
        slab.copy_from(&[7; 8]);
        let held = slab.view();
        assert!(slab.is_shared());

        slab.write(8).fill(1);

        assert_eq!(held.as_bytes(), &[7; 8], "reader must keep its frame");
        assert_eq!(slab.view().as_bytes(), &[1; 8]);
        assert!(!held.same_buffer(&slab.view()));
    }

    #[test]
    fn slab_resizes_lazily() {
        let mut slab = FrameSlab::with_len(2);
        assert_eq!(slab.len(), 2);
        assert_eq!(slab.write(6).len(), 6);
        assert_eq!(slab.write(3).len(), 3);
        assert!(FrameSlab::new().view().is_empty());
    }
}
