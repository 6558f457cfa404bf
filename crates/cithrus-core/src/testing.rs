//! Minimal components for unit tests.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::buffer::BufferView;
use crate::component::{Component, Filter, Sink, Source};
use crate::error::Result;
use crate::format::{Accepts, Format};
use crate::port::{InputPort, InputPorts, OutputPort, OutputPorts};

pub(crate) type Log = Arc<Mutex<Vec<String>>>;

/// Emits the same bytes on all `N` outputs every tick; empty bytes emit the
/// empty view.
pub(crate) struct Emit<const N: usize> {
    pub outputs: OutputPorts<N>,
    pub frame: Vec<u8>,
}

impl<const N: usize> Emit<N> {
    pub fn new(format: &Format, frame: &[u8]) -> Self {
        Self {
            outputs: OutputPorts::declared("Emit", format),
            frame: frame.to_vec(),
        }
    }
}

impl<const N: usize> Component for Emit<N> {
    fn process(&mut self) -> Result<()> {
        let view = BufferView::from_vec(self.frame.clone());
        for out in self.outputs.iter_mut() {
            out.set_view(view.clone());
        }
        Ok(())
    }

    fn output_ports(&self) -> &[OutputPort] {
        &self.outputs
    }

    fn name(&self) -> &str {
        "Emit"
    }
}

impl<const N: usize> Source<N> for Emit<N> {}

/// Appends `tag` to every non-empty frame and records its name in `log`.
pub(crate) struct Tag {
    name: String,
    tag: u8,
    inputs: InputPorts<1>,
    outputs: OutputPorts<1>,
    format: Format,
    log: Log,
}

impl Tag {
    pub fn new(name: &str, tag: u8, accepts: Accepts, format: Format, log: &Log) -> Self {
        Self {
            name: name.to_owned(),
            tag,
            inputs: InputPorts::accepting(name, &accepts),
            outputs: OutputPorts::new(),
            format,
            log: Arc::clone(log),
        }
    }
}

impl Component for Tag {
    fn on_inputs_connected(&mut self) -> Result<()> {
        self.outputs.initialize_all(&self.name, &self.format)
    }

    fn process(&mut self) -> Result<()> {
        self.log.lock().push(self.name.clone());
        let input = self.inputs[0].read()?;
        if input.is_empty() {
            self.outputs[0].clear();
        } else {
            let mut bytes = input.as_bytes().to_vec();
            bytes.push(self.tag);
            self.outputs[0].set_view(BufferView::from_vec(bytes));
        }
        Ok(())
    }

    fn input_ports(&mut self) -> &mut [InputPort] {
        &mut self.inputs
    }

    fn output_ports(&self) -> &[OutputPort] {
        &self.outputs
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Filter<1, 1> for Tag {}

/// Records every tick's input views.
pub(crate) struct Collect<const N: usize> {
    inputs: InputPorts<N>,
    pub seen: Arc<Mutex<Vec<Vec<BufferView>>>>,
}

impl<const N: usize> Collect<N> {
    pub fn new(accepts: &Accepts) -> Self {
        Self {
            inputs: InputPorts::accepting("Collect", accepts),
            seen: Arc::default(),
        }
    }
}

impl<const N: usize> Component for Collect<N> {
    fn process(&mut self) -> Result<()> {
        let views = self.inputs.iter().map(InputPort::read).collect::<Result<Vec<_>>>()?;
        self.seen.lock().push(views);
        Ok(())
    }

    fn input_ports(&mut self) -> &mut [InputPort] {
        &mut self.inputs
    }

    fn name(&self) -> &str {
        "Collect"
    }
}

impl<const N: usize> Sink<N> for Collect<N> {}
