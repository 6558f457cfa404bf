//! One-to-many fan-out.

use crate::component::{Component, Filter, short_type_name};
use crate::error::Result;
use crate::format::Accepts;
use crate::port::{InputPort, InputPorts, OutputPort, OutputPorts};

/// Exposes its single input on `N` outputs.
///
/// Every output carries the same view and format; the frame is shared, not
/// copied. Use it when several consumers need read-only access to one frame.
pub struct Duplicator<const N: usize> {
    inputs: InputPorts<1>,
    outputs: OutputPorts<N>,
}

impl<const N: usize> Duplicator<N> {
    /// Creates a duplicator with `N` outputs.
    pub fn new() -> Self {
        const { assert!(N > 0, "a duplicator needs at least one output") };
        Self {
            inputs: InputPorts::accepting(short_type_name::<Self>(), &Accepts::Any),
            outputs: OutputPorts::new(),
        }
    }
}

impl<const N: usize> Default for Duplicator<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Component for Duplicator<N> {
    fn on_inputs_connected(&mut self) -> Result<()> {
        let format = self.inputs[0].format()?;
        self.outputs
            .initialize_all(short_type_name::<Self>(), &format)
    }

    fn process(&mut self) -> Result<()> {
        let view = self.inputs[0].read()?;
        for output in self.outputs.iter_mut() {
            output.set_view(view.clone());
        }
        Ok(())
    }

    fn input_ports(&mut self) -> &mut [InputPort] {
        &mut self.inputs
    }

    fn output_ports(&self) -> &[OutputPort] {
        &self.outputs
    }
}

impl<const N: usize> Filter<1, N> for Duplicator<N> {}
