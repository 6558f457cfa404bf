//! Handing views across graph boundaries.
//!
//! A [`ProxySink`] ends one graph by capturing its input views into a
//! [`ProxyTap`]; a [`ProxySource`] starts another graph by publishing whatever
//! was last pushed into the same tap. Both graphs must be ticked on the same
//! thread, upstream first: the tap holds views for exactly one hand-over.
//!
//! A tap is also the way to observe a graph's terminal frames from outside:
//! end the pipeline with a `ProxySink` and read [`ProxyTap::latest`].

use std::array;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::buffer::BufferView;
use crate::component::{Component, Sink, Source, short_type_name};
use crate::error::{PipelineError, Result};
use crate::format::{Accepts, Format};
use crate::port::{InputPort, InputPorts, OutputPort, OutputPorts};

struct TapState<const N: usize> {
    views: [BufferView; N],
    formats: Option<Vec<Format>>,
    pushes: u64,
}

/// Shared slot of `N` views connecting a [`ProxySink`] to a [`ProxySource`].
pub struct ProxyTap<const N: usize> {
    shared: Arc<Mutex<TapState<N>>>,
}

impl<const N: usize> ProxyTap<N> {
    /// Creates a tap whose formats are learned from the `ProxySink` that
    /// feeds it.
    pub fn new() -> Self {
        Self::from_state(None)
    }

    /// Creates a tap with formats known up front, for taps fed by hand.
    pub fn with_formats(formats: [Format; N]) -> Self {
        Self::from_state(Some(formats.to_vec()))
    }

    fn from_state(formats: Option<Vec<Format>>) -> Self {
        Self {
            shared: Arc::new(Mutex::new(TapState {
                views: array::from_fn(|_| BufferView::empty()),
                formats,
                pushes: 0,
            })),
        }
    }

    /// Stores `views` for the next reader, replacing anything unread.
    pub fn push(&self, views: [BufferView; N]) {
        let mut state = self.shared.lock();
        state.views = views;
        state.pushes += 1;
    }

    /// Removes and returns the stored views, leaving empty views behind.
    pub fn take(&self) -> [BufferView; N] {
        let mut state = self.shared.lock();
        std::mem::replace(&mut state.views, array::from_fn(|_| BufferView::empty()))
    }

    /// Returns the stored views without consuming them.
    pub fn latest(&self) -> [BufferView; N] {
        self.shared.lock().views.clone()
    }

    /// The formats of the views flowing through the tap, once known.
    pub fn formats(&self) -> Option<Vec<Format>> {
        self.shared.lock().formats.clone()
    }

    /// Number of pushes so far.
    pub fn pushes(&self) -> u64 {
        self.shared.lock().pushes
    }

    fn set_formats(&self, formats: Vec<Format>) {
        self.shared.lock().formats = Some(formats);
    }
}

impl<const N: usize> Clone for ProxyTap<N> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<const N: usize> Default for ProxyTap<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Debug for ProxyTap<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("ProxyTap")
            .field("formats", &state.formats)
            .field("pushes", &state.pushes)
            .finish()
    }
}

/// Terminates a graph by pushing its input views into a [`ProxyTap`] each tick.
pub struct ProxySink<const N: usize> {
    inputs: InputPorts<N>,
    tap: ProxyTap<N>,
}

impl<const N: usize> ProxySink<N> {
    /// Creates a sink accepting any format, and the tap it feeds.
    pub fn new() -> (Self, ProxyTap<N>) {
        Self::accepting(&Accepts::Any)
    }

    /// Creates a sink restricted to `accepts`, and the tap it feeds.
    pub fn accepting(accepts: &Accepts) -> (Self, ProxyTap<N>) {
        let tap = ProxyTap::new();
        let sink = Self {
            inputs: InputPorts::accepting(short_type_name::<Self>(), accepts),
            tap: tap.clone(),
        };
        (sink, tap)
    }
}

impl<const N: usize> Component for ProxySink<N> {
    fn on_inputs_connected(&mut self) -> Result<()> {
        let formats = self
            .inputs
            .iter()
            .map(InputPort::format)
            .collect::<Result<Vec<_>>>()?;
        self.tap.set_formats(formats);
        Ok(())
    }

    fn process(&mut self) -> Result<()> {
        let mut views: [BufferView; N] = array::from_fn(|_| BufferView::empty());
        for (slot, input) in views.iter_mut().zip(self.inputs.iter()) {
            *slot = input.read()?;
        }
        self.tap.push(views);
        Ok(())
    }

    fn input_ports(&mut self) -> &mut [InputPort] {
        &mut self.inputs
    }
}

impl<const N: usize> Sink<N> for ProxySink<N> {}

/// Starts a graph by publishing the views held in a [`ProxyTap`].
///
/// Each tick takes the tap's contents, so a tick with no new push publishes
/// empty views rather than repeating the previous frame.
pub struct ProxySource<const N: usize> {
    outputs: OutputPorts<N>,
    tap: ProxyTap<N>,
}

impl<const N: usize> ProxySource<N> {
    /// Creates a source reading from `tap`.
    ///
    /// # Errors
    ///
    /// [`PipelineError::InvalidArgument`] if the tap's formats are not known
    /// yet: build the graph holding the matching [`ProxySink`] first, or use
    /// [`ProxyTap::with_formats`].
    pub fn new(tap: &ProxyTap<N>) -> Result<Self> {
        let owner = short_type_name::<Self>();
        let formats = tap
            .formats()
            .filter(|f| f.len() == N)
            .ok_or_else(|| {
                PipelineError::invalid_argument(format!(
                    "{owner} needs a tap with {N} known format(s)"
                ))
            })?;

        let mut outputs = OutputPorts::<N>::new();
        for (port, format) in outputs.iter_mut().zip(formats) {
            port.initialize(owner, format)?;
        }
        Ok(Self {
            outputs,
            tap: tap.clone(),
        })
    }
}

impl<const N: usize> Component for ProxySource<N> {
    fn process(&mut self) -> Result<()> {
        for (output, view) in self.outputs.iter_mut().zip(self.tap.take()) {
            output.set_view(view);
        }
        Ok(())
    }

    fn output_ports(&self) -> &[OutputPort] {
        &self.outputs
    }
}

impl<const N: usize> Source<N> for ProxySource<N> {}
