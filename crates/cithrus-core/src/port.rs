//! Typed port endpoints.
//!
//! An [`OutputPort`] publishes one [`BufferView`] per tick under a fixed
//! [`Format`]. An [`InputPort`] is bound to exactly one output through an
//! [`OutputHandle`] and reads whatever that output currently exposes.
//!
//! Format compatibility is checked once, in [`InputPort::connect`]; reads on
//! the hot path do no validation beyond the binding itself. Bindings are
//! irreversible and lock the output's format, because nothing downstream could
//! re-finalize against a changed format.
//!
//! The output's state lives in a shared slot so that bound inputs can read it
//! without borrowing the owning component. The slot's mutex is uncontended in
//! a single-threaded tick and only guards the view/format pair.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::buffer::BufferView;
use crate::edge::Edge;
use crate::error::{PipelineError, Result};
use crate::format::{Accepts, Format};

fn describe(index: usize, owner: Option<&str>) -> String {
    format!("{index} of {}", owner.unwrap_or("<uninitialized>"))
}

#[derive(Default)]
struct SlotState {
    owner: Option<String>,
    format: Option<Format>,
    view: BufferView,
    connected: bool,
    released: bool,
}

struct OutputSlot {
    index: usize,
    state: Mutex<SlotState>,
}

impl OutputSlot {
    fn descriptor(&self) -> String {
        let state = self.state.lock();
        describe(self.index, state.owner.as_deref())
    }
}

/// One output stream of a component.
pub struct OutputPort {
    slot: Arc<OutputSlot>,
}

impl OutputPort {
    /// Creates an uninitialized output port at position `index`.
    pub fn new(index: usize) -> Self {
        Self {
            slot: Arc::new(OutputSlot {
                index,
                state: Mutex::new(SlotState::default()),
            }),
        }
    }

    /// Creates an output port that is already initialized.
    pub fn declared(index: usize, owner: impl Into<String>, format: Format) -> Self {
        Self {
            slot: Arc::new(OutputSlot {
                index,
                state: Mutex::new(SlotState {
                    owner: Some(owner.into()),
                    format: Some(format),
                    ..SlotState::default()
                }),
            }),
        }
    }

    /// Declares the port's owner and format.
    ///
    /// # Errors
    ///
    /// [`PipelineError::PortAlreadyInitialized`] if called twice.
    pub fn initialize(&mut self, owner: impl Into<String>, format: Format) -> Result<()> {
        let mut state = self.slot.state.lock();
        if state.format.is_some() {
            return Err(PipelineError::PortAlreadyInitialized {
                port: describe(self.slot.index, state.owner.as_deref()),
            });
        }
        state.owner = Some(owner.into());
        state.format = Some(format);
        Ok(())
    }

    /// Changes the declared format of an initialized, unconnected port.
    ///
    /// # Errors
    ///
    /// [`PipelineError::PortNotInitialized`] before [`initialize`](Self::initialize);
    /// [`PipelineError::FormatLocked`] once an input has bound to this port.
    pub fn set_format(&mut self, format: Format) -> Result<()> {
        let mut state = self.slot.state.lock();
        let port = describe(self.slot.index, state.owner.as_deref());
        if state.format.is_none() {
            return Err(PipelineError::PortNotInitialized { port });
        }
        if state.connected {
            return Err(PipelineError::FormatLocked { port, format });
        }
        state.format = Some(format);
        Ok(())
    }

    /// Publishes this tick's frame.
    #[inline]
    pub fn set_view(&mut self, view: BufferView) {
        self.slot.state.lock().view = view;
    }

    /// Publishes the explicit "no data this tick" state.
    #[inline]
    pub fn clear(&mut self) {
        self.set_view(BufferView::empty());
    }

    /// Returns the currently published frame.
    pub fn view(&self) -> BufferView {
        self.slot.state.lock().view.clone()
    }

    /// Returns the declared format, if initialized.
    pub fn format(&self) -> Option<Format> {
        self.slot.state.lock().format.clone()
    }

    /// Returns `true` once [`initialize`](Self::initialize) has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.slot.state.lock().format.is_some()
    }

    /// Returns `true` once an input has bound to this port.
    pub fn is_connected(&self) -> bool {
        self.slot.state.lock().connected
    }

    /// Position of the port on its component.
    pub fn index(&self) -> usize {
        self.slot.index
    }

    /// Human-readable `"<index> of <owner>"` descriptor.
    pub fn descriptor(&self) -> String {
        self.slot.descriptor()
    }

    /// Returns a shared handle that inputs bind to.
    pub fn handle(&self) -> OutputHandle {
        OutputHandle {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl Drop for OutputPort {
    fn drop(&mut self) {
        let mut state = self.slot.state.lock();
        state.view = BufferView::empty();
        state.released = true;
    }
}

impl fmt::Debug for OutputPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.slot.state.lock();
        f.debug_struct("OutputPort")
            .field("index", &self.slot.index)
            .field("owner", &state.owner)
            .field("format", &state.format)
            .field("connected", &state.connected)
            .field("view", &state.view)
            .finish()
    }
}

/// Shared reference to an [`OutputPort`]'s slot.
///
/// Inputs hold one of these as their binding. Scaffolding combinators pass
/// the handle their aggregate input is bound to straight through to an inner
/// member, so the member reads the upstream output directly.
#[derive(Clone)]
pub struct OutputHandle {
    slot: Arc<OutputSlot>,
}

impl OutputHandle {
    /// Reads the frame currently exposed by the output.
    ///
    /// # Errors
    ///
    /// [`PipelineError::PortReleased`] if the owning component has been dropped.
    #[inline]
    pub fn view(&self) -> Result<BufferView> {
        let state = self.slot.state.lock();
        if state.released {
            return Err(PipelineError::PortReleased {
                port: describe(self.slot.index, state.owner.as_deref()),
            });
        }
        Ok(state.view.clone())
    }

    /// Returns the output's declared format, if initialized.
    pub fn format(&self) -> Option<Format> {
        self.slot.state.lock().format.clone()
    }

    /// Human-readable descriptor of the output.
    pub fn descriptor(&self) -> String {
        self.slot.descriptor()
    }

    /// Returns `true` if both handles refer to the same output port.
    pub fn same_port(&self, other: &OutputHandle) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }

    fn lock_connection(&self) {
        self.slot.state.lock().connected = true;
    }
}

impl fmt::Debug for OutputHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OutputHandle").field(&self.descriptor()).finish()
    }
}

/// One input stream of a component.
pub struct InputPort {
    index: usize,
    owner: Option<String>,
    accepts: Option<Accepts>,
    binding: Option<OutputHandle>,
}

impl InputPort {
    /// Creates an uninitialized input port at position `index`.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            owner: None,
            accepts: None,
            binding: None,
        }
    }

    /// Creates an input port that is already initialized.
    pub fn accepting(index: usize, owner: impl Into<String>, accepts: impl Into<Accepts>) -> Self {
        Self {
            index,
            owner: Some(owner.into()),
            accepts: Some(accepts.into()),
            binding: None,
        }
    }

    /// Declares the port's owner and acceptable formats.
    ///
    /// # Errors
    ///
    /// [`PipelineError::PortAlreadyInitialized`] if called twice.
    pub fn initialize(&mut self, owner: impl Into<String>, accepts: impl Into<Accepts>) -> Result<()> {
        if self.accepts.is_some() {
            return Err(PipelineError::PortAlreadyInitialized {
                port: self.descriptor(),
            });
        }
        self.owner = Some(owner.into());
        self.accepts = Some(accepts.into());
        Ok(())
    }

    /// Binds this input to `output`.
    ///
    /// On failure neither port is modified.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::PortNotInitialized`] if either port is uninitialized
    /// - [`PipelineError::AlreadyConnected`] if this input already has a binding
    /// - [`PipelineError::FormatMismatch`] if the output's format is not accepted
    pub fn connect(&mut self, output: &OutputHandle) -> Result<Edge> {
        let Some(accepts) = &self.accepts else {
            return Err(PipelineError::PortNotInitialized {
                port: self.descriptor(),
            });
        };
        if self.binding.is_some() {
            return Err(PipelineError::AlreadyConnected {
                input: self.descriptor(),
            });
        }
        let Some(format) = output.format() else {
            return Err(PipelineError::PortNotInitialized {
                port: output.descriptor(),
            });
        };
        if !accepts.accepts(&format) {
            return Err(PipelineError::FormatMismatch {
                input: self.descriptor(),
                output: output.descriptor(),
                format,
                accepts: accepts.clone(),
            });
        }

        output.lock_connection();
        self.binding = Some(output.clone());
        Ok(Edge {
            from: output.descriptor(),
            to: self.descriptor(),
            format,
        })
    }

    /// Reads the frame exposed by the bound output.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Unbound`] if the port was never connected;
    /// [`PipelineError::PortReleased`] if the upstream component is gone.
    #[inline]
    pub fn read(&self) -> Result<BufferView> {
        self.connected_output()?.view()
    }

    /// Returns the format of the bound output.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Unbound`] if the port was never connected.
    pub fn format(&self) -> Result<Format> {
        let output = self.connected_output()?;
        output.format().ok_or_else(|| PipelineError::PortNotInitialized {
            port: output.descriptor(),
        })
    }

    /// Returns the handle of the bound output.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Unbound`] if the port was never connected.
    pub fn connected_output(&self) -> Result<&OutputHandle> {
        self.binding.as_ref().ok_or_else(|| PipelineError::Unbound {
            port: self.descriptor(),
        })
    }

    /// Returns `true` once the port has a binding.
    pub fn is_connected(&self) -> bool {
        self.binding.is_some()
    }

    /// Returns `true` once [`initialize`](Self::initialize) has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.accepts.is_some()
    }

    /// The accepted format set, if initialized.
    pub fn accepts(&self) -> Option<&Accepts> {
        self.accepts.as_ref()
    }

    /// Position of the port on its component.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Human-readable `"<index> of <owner>"` descriptor.
    pub fn descriptor(&self) -> String {
        describe(self.index, self.owner.as_deref())
    }
}

impl fmt::Debug for InputPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputPort")
            .field("index", &self.index)
            .field("owner", &self.owner)
            .field("accepts", &self.accepts)
            .field("binding", &self.binding)
            .finish()
    }
}

/// Fixed-size array of input ports, the "has inputs" capability of a component.
#[derive(Debug)]
pub struct InputPorts<const N: usize> {
    ports: [InputPort; N],
}

impl<const N: usize> InputPorts<N> {
    /// Creates `N` uninitialized inputs indexed `0..N`.
    pub fn new() -> Self {
        Self {
            ports: std::array::from_fn(InputPort::new),
        }
    }

    /// Creates `N` inputs already initialized with `owner` and `accepts`.
    pub fn accepting(owner: &str, accepts: &Accepts) -> Self {
        Self {
            ports: std::array::from_fn(|i| InputPort::accepting(i, owner, accepts.clone())),
        }
    }

    /// Initializes every port with the same owner and acceptance set.
    pub fn initialize_all(&mut self, owner: &str, accepts: &Accepts) -> Result<()> {
        for port in &mut self.ports {
            port.initialize(owner, accepts.clone())?;
        }
        Ok(())
    }

    /// Number of ports.
    pub const fn count(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for InputPorts<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Deref for InputPorts<N> {
    type Target = [InputPort];

    fn deref(&self) -> &[InputPort] {
        &self.ports
    }
}

impl<const N: usize> DerefMut for InputPorts<N> {
    fn deref_mut(&mut self) -> &mut [InputPort] {
        &mut self.ports
    }
}

/// Fixed-size array of output ports, the "has outputs" capability of a component.
#[derive(Debug)]
pub struct OutputPorts<const N: usize> {
    ports: [OutputPort; N],
}

impl<const N: usize> OutputPorts<N> {
    /// Creates `N` uninitialized outputs indexed `0..N`.
    pub fn new() -> Self {
        Self {
            ports: std::array::from_fn(OutputPort::new),
        }
    }

    /// Creates `N` outputs already initialized with `owner` and `format`.
    pub fn declared(owner: &str, format: &Format) -> Self {
        Self {
            ports: std::array::from_fn(|i| OutputPort::declared(i, owner, format.clone())),
        }
    }

    /// Initializes every port with the same owner and format.
    pub fn initialize_all(&mut self, owner: &str, format: &Format) -> Result<()> {
        for port in &mut self.ports {
            port.initialize(owner, format.clone())?;
        }
        Ok(())
    }

    /// Publishes the empty view on every port.
    pub fn clear_all(&mut self) {
        for port in &mut self.ports {
            port.clear();
        }
    }

    /// Number of ports.
    pub const fn count(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for OutputPorts<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Deref for OutputPorts<N> {
    type Target = [OutputPort];

    fn deref(&self) -> &[OutputPort] {
        &self.ports
    }
}

impl<const N: usize> DerefMut for OutputPorts<N> {
    fn deref_mut(&mut self) -> &mut [OutputPort] {
        &mut self.ports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn output(format: Format) -> OutputPort {
        let mut port = OutputPort::new(0);
        port.initialize("Upstream", format).unwrap();
        port
    }

    fn input(accepts: impl Into<Accepts>) -> InputPort {
        let mut port = InputPort::new(0);
        port.initialize("Downstream", accepts).unwrap();
        port
    }

    #[test]
    fn double_initialize_fails() {
        let mut out = output(Format::RGBA);
        let err = out.initialize("Upstream", Format::BGRA).unwrap_err();
        assert!(matches!(err, PipelineError::PortAlreadyInitialized { .. }));
        assert_eq!(out.format(), Some(Format::RGBA));

        let mut inp = input(Format::RGBA);
        assert!(inp.initialize("Downstream", Accepts::Any).is_err());
    }

    #[test]
    fn connect_locks_output_format() {
        let mut out = output(Format::RGBA);
        let mut inp = input(Format::RGBA);
        let edge = inp.connect(&out.handle()).unwrap();
        assert_eq!(edge.from, "0 of Upstream");
        assert_eq!(edge.to, "0 of Downstream");
        assert!(out.is_connected());

        let err = out.set_format(Format::YUV420).unwrap_err();
        assert!(matches!(err, PipelineError::FormatLocked { .. }));
        assert_eq!(out.format(), Some(Format::RGBA));
    }

    #[test]
    fn set_format_before_connection_is_allowed() {
        let mut out = output(Format::RGBA);
        out.set_format(Format::BGRA).unwrap();
        assert_eq!(out.format(), Some(Format::BGRA));
        assert!(OutputPort::new(1).set_format(Format::RGBA).is_err());
    }

    #[test]
    fn mismatched_format_leaves_both_ports_untouched() {
        let out = output(Format::RGBA);
        let mut inp = input(Format::HEVC);
        let err = inp.connect(&out.handle()).unwrap_err();
        assert!(matches!(err, PipelineError::FormatMismatch { .. }));
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(!inp.is_connected());
        assert!(!out.is_connected());
    }

    #[test]
    fn second_connect_keeps_first_binding() {
        let first = output(Format::RGBA);
        let second = output(Format::RGBA);
        let mut inp = input(Accepts::Any);
        inp.connect(&first.handle()).unwrap();
        let err = inp.connect(&second.handle()).unwrap_err();
        assert!(matches!(err, PipelineError::AlreadyConnected { .. }));
        assert!(inp.connected_output().unwrap().same_port(&first.handle()));
        assert!(!second.is_connected());
    }

    #[test]
    fn uninitialized_ports_cannot_connect() {
        let out = output(Format::RGBA);
        let mut inp = InputPort::new(0);
        assert!(matches!(
            inp.connect(&out.handle()),
            Err(PipelineError::PortNotInitialized { .. })
        ));

        let raw = OutputPort::new(0);
        let mut inp = input(Accepts::Any);
        assert!(matches!(
            inp.connect(&raw.handle()),
            Err(PipelineError::PortNotInitialized { .. })
        ));
    }

    #[test]
    fn reads_delegate_to_bound_output() {
        let mut out = output(Format::RGBA);
        let mut inp = input(Format::RGBA);
        inp.connect(&out.handle()).unwrap();

        let frame = BufferView::from_vec(vec![1, 2, 3, 4]);
        out.set_view(frame.clone());
        assert!(inp.read().unwrap().same_buffer(&frame));
        assert_eq!(inp.format().unwrap(), Format::RGBA);

        out.clear();
        assert!(inp.read().unwrap().is_empty());
    }

    #[test]
    fn unbound_read_is_a_precondition_violation() {
        let inp = input(Format::RGBA);
        let err = inp.read().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert!(inp.format().is_err());
    }

    #[test]
    fn dropped_output_fails_loudly() {
        let mut out = output(Format::BINARY);
        let mut inp = input(Accepts::Any);
        inp.connect(&out.handle()).unwrap();
        out.set_view(BufferView::from_vec(vec![1]));
        drop(out);
        assert!(matches!(inp.read(), Err(PipelineError::PortReleased { .. })));
    }

    #[test]
    fn port_arrays_are_indexed() {
        let mut outs = OutputPorts::<3>::new();
        outs.initialize_all("Splitter", &Format::YUV420).unwrap();
        assert_eq!(outs.count(), 3);
        assert_eq!(outs[2].descriptor(), "2 of Splitter");

        let mut ins = InputPorts::<2>::new();
        ins.initialize_all("Merger", &Accepts::Any).unwrap();
        assert_eq!(ins.len(), 2);
        assert_eq!(ins[1].index(), 1);

        let ready = OutputPorts::<2>::declared("Camera", &Format::RGBA);
        assert!(ready.iter().all(OutputPort::is_initialized));
        let ready = InputPorts::<1>::accepting("Writer", &Accepts::Any);
        assert_eq!(ready[0].descriptor(), "0 of Writer");
    }
}
